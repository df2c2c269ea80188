use crate::domain::save::SaveType;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Fixed width and zero padded, so snapshot names sort chronologically.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const BACKUP_DIRECTORY_NAME: &str = "SavesBackup";

/// Names the backup tree: `<root>/<game>/<save>/<Local|Cloud>/<timestamp>/`.
#[derive(Debug, Clone)]
pub struct BackupDirectories {
    root: PathBuf,
}

impl BackupDirectories {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> PathBuf {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("buddy-save").join(BACKUP_DIRECTORY_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_dir(&self, game_name: &str, save_name: &str, save_type: SaveType) -> PathBuf {
        self.root
            .join(sanitize_folder_name(game_name))
            .join(sanitize_folder_name(save_name))
            .join(save_type.as_str())
    }

    pub fn timestamped_dir(
        &self,
        game_name: &str,
        save_name: &str,
        save_type: SaveType,
        now: DateTime<Utc>,
    ) -> PathBuf {
        self.root_dir(game_name, save_name, save_type)
            .join(now.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl Default for BackupDirectories {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

fn sanitize_folder_name(name: &str) -> String {
    let invalid = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    let cleaned: String = name.chars().filter(|c| !invalid.contains(c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "save".to_string()
    } else {
        cleaned.to_string()
    }
}
