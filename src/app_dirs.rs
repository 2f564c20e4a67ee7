use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_NAME: &str = "jotto";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where saved games and stats live when no override is configured.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
