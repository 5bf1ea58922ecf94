use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "ruleta";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the log file goes. Prefers `~/.local/state/ruleta`.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("ruleta.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("ruleta.log"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_end_with_expected_file_names() {
        if let Some(p) = AppDirs::log_path() {
            assert!(p.ends_with("ruleta.log"));
        }
        if let Some(p) = AppDirs::config_path() {
            assert!(p.ends_with("config.json"));
        }
    }
}
