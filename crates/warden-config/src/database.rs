//! Local libSQL database configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_path() -> String {
    ".warden/warden.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file. Relative paths resolve against the project root.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the database path against `root` unless it is absolute.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_resolves_against_root() {
        let config = DatabaseConfig::default();
        assert_eq!(
            config.resolve(Path::new("/srv/app")),
            PathBuf::from("/srv/app/.warden/warden.db")
        );
    }

    #[test]
    fn absolute_path_is_kept() {
        let config = DatabaseConfig {
            path: "/var/lib/warden.db".into(),
        };
        assert_eq!(
            config.resolve(Path::new("/srv/app")),
            PathBuf::from("/var/lib/warden.db")
        );
    }
}
