use std::env;
use std::path::PathBuf;

/// Directory name used under the home directory for client data.
const DATA_DIR_NAME: &str = ".viva";

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> Result<String, String> {
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() {
            return Ok(home);
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Ok(profile);
        }
    }

    Err("Home directory not set".to_string())
}

/// `~/.viva`, or `./.viva` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    match get_home_dir() {
        Ok(home) => PathBuf::from(home).join(DATA_DIR_NAME),
        Err(_) => PathBuf::from(DATA_DIR_NAME),
    }
}
