use std::fmt;

pub mod cache;
pub mod credentials;
pub mod login;
pub mod sso;

/// AWS temporary credentials structure
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

// Re-export commonly used types (functions should be accessed via module path)
pub use cache::CachedToken;
pub use credentials::{CredentialsStore, PersistOptions, PersistOutcome};
pub use login::{AwsCliLogin, LoginSession};
pub use sso::{CredentialExchange, SsoPortal};
