pub mod completions;
pub mod creds;
pub mod profiles;

pub use completions::CompletionsCommand;
pub use creds::CredsCommand;
pub use profiles::ProfilesCommand;
