use std::{env, path::PathBuf};

use dirs;

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// SSO token cache directory, relative to the AWS configuration directory
pub const SSO_CACHE_DIR: [&str; 2] = ["sso", "cache"];

/// Extension of SSO token cache files
pub const SSO_CACHE_EXTENSION: &str = "json";

/// Extension appended to the credentials file name for backups
pub const BACKUP_EXTENSION: &str = "bak";

/// Program invoked for interactive SSO login
pub const AWS_CLI_PROGRAM: &str = "aws";

/// Environment variable overriding the AWS config file location
pub const AWS_CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

/// Environment variable overriding the AWS credentials file location
pub const AWS_SHARED_CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";

fn aws_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME))
}

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(AWS_CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    aws_dir().map(|dir| dir.join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(AWS_SHARED_CREDENTIALS_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    aws_dir().map(|dir| dir.join(AWS_CREDENTIALS_FILE_NAME))
}

/// Get the directory holding cached SSO tokens (~/.aws/sso/cache)
pub fn get_sso_cache_dir() -> Option<PathBuf> {
    aws_dir().map(|dir| SSO_CACHE_DIR.iter().fold(dir, |acc, part| acc.join(part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_aws_config_path_with_env() {
        let original = env::var(AWS_CONFIG_FILE_ENV).ok();

        unsafe {
            env::set_var(AWS_CONFIG_FILE_ENV, "/custom/aws/config");
        }
        let path = get_aws_config_path();
        assert_eq!(path, Some(PathBuf::from("/custom/aws/config")));

        unsafe {
            match original {
                Some(val) => env::set_var(AWS_CONFIG_FILE_ENV, val),
                None => env::remove_var(AWS_CONFIG_FILE_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_config_path_default() {
        let original = env::var(AWS_CONFIG_FILE_ENV).ok();

        unsafe {
            env::remove_var(AWS_CONFIG_FILE_ENV);
        }
        let path = get_aws_config_path();

        if let Some(p) = path {
            assert!(p.ends_with(".aws/config"));
        }

        unsafe {
            if let Some(val) = original {
                env::set_var(AWS_CONFIG_FILE_ENV, val);
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_with_env() {
        let original = env::var(AWS_SHARED_CREDENTIALS_FILE_ENV).ok();

        unsafe {
            env::set_var(AWS_SHARED_CREDENTIALS_FILE_ENV, "/custom/path/credentials");
        }
        let path = get_aws_credentials_path();
        assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));

        unsafe {
            match original {
                Some(val) => env::set_var(AWS_SHARED_CREDENTIALS_FILE_ENV, val),
                None => env::remove_var(AWS_SHARED_CREDENTIALS_FILE_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_default() {
        let original = env::var(AWS_SHARED_CREDENTIALS_FILE_ENV).ok();

        unsafe {
            env::remove_var(AWS_SHARED_CREDENTIALS_FILE_ENV);
        }
        let path = get_aws_credentials_path();

        if let Some(p) = path {
            assert!(p.ends_with(".aws/credentials"));
        }

        unsafe {
            if let Some(val) = original {
                env::set_var(AWS_SHARED_CREDENTIALS_FILE_ENV, val);
            }
        }
    }

    #[test]
    fn test_get_sso_cache_dir() {
        if let Some(dir) = get_sso_cache_dir() {
            assert!(dir.ends_with(".aws/sso/cache"));
        }
    }
}
