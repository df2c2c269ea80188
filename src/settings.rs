use crate::backup::BackupDirectories;
use crate::domain::save::{GameSave, Session};
use crate::error::{Error, Result};
use crate::session::{ClientParameters, ServerParameters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// `game_save` as written in `config.json`; the cloud side is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSaveConfig {
    pub game_name: String,
    pub save_name: String,
    pub local_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddySaveConfig {
    /// Shared folder every player syncs, e.g. a Dropbox or network share.
    pub cloud_path: PathBuf,
    #[serde(default)]
    pub backup_directory: Option<PathBuf>,
    pub game_save: GameSaveConfig,
    pub session: Session,
    #[serde(default)]
    pub server: ServerParameters,
    #[serde(default)]
    pub client: ClientParameters,
}

impl BuddySaveConfig {
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Reading configuration file {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::Config("configuration file is empty".to_string()));
        }
        let config: BuddySaveConfig = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("{} is not valid: {}", path.display(), e)))?;
        Ok(config.normalized())
    }

    /// Expands `~` in every configured path.
    fn normalized(mut self) -> Self {
        self.cloud_path = expand_home(&self.cloud_path);
        self.backup_directory = self.backup_directory.as_deref().map(expand_home);
        self.game_save.local_path = expand_home(&self.game_save.local_path);
        self.server.path = expand_home(&self.server.path);
        self.client.path = expand_home(&self.client.path);
        self
    }

    /// The configured save, shared under `<cloud_path>/<game_name>`.
    pub fn game_save(&self) -> GameSave {
        GameSave::new(
            self.game_save.game_name.clone(),
            self.game_save.save_name.clone(),
            self.game_save.local_path.clone(),
            self.cloud_path.join(&self.game_save.game_name),
        )
    }

    pub fn backup_directories(&self) -> BackupDirectories {
        match &self.backup_directory {
            Some(root) => BackupDirectories::new(root),
            None => BackupDirectories::default(),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
