use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One logical save and the two places it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSave {
    pub game_name: String,
    pub save_name: String,
    pub local_path: PathBuf,
    pub cloud_path: PathBuf,
}

impl GameSave {
    pub fn new(
        game_name: impl Into<String>,
        save_name: impl Into<String>,
        local_path: impl Into<PathBuf>,
        cloud_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            game_name: game_name.into(),
            save_name: save_name.into(),
            local_path: local_path.into(),
            cloud_path: cloud_path.into(),
        }
    }

    pub fn path(&self, save_type: SaveType) -> &Path {
        match save_type {
            SaveType::Local => &self.local_path,
            SaveType::Cloud => &self.cloud_path,
        }
    }

    /// `<cloud_path>.lock`, a sibling of the shared save directory.
    pub fn lock_path(&self) -> PathBuf {
        let mut raw = self.cloud_path.clone().into_os_string();
        raw.push(".lock");
        PathBuf::from(raw)
    }
}

/// A player, and the endpoint others use to join their server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_name: String,
    pub ip: String,
    pub port: String,
}

impl Session {
    pub fn new(user_name: impl Into<String>, ip: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ip: ip.into(),
            port: port.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveType {
    Local,
    Cloud,
}

impl SaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveType::Local => "Local",
            SaveType::Cloud => "Cloud",
        }
    }
}

impl fmt::Display for SaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorResult {
    Loaded,
    SaveLocked,
    Failed,
}

/// What a directional sync actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Transferred,
    /// The destination already held newer data.
    Skipped,
}
