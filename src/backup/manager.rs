use crate::backup::copier::SaveCopier;
use crate::backup::rolling::RollingBackups;
use crate::domain::save::SaveType;
use crate::error::Result;
use crate::services::clock::Clock;
use std::path::{Path, PathBuf};

/// Snapshots a destination before it is overwritten and puts it back on failure.
pub struct BackupManager<C: SaveCopier, K: Clock> {
    rolling: RollingBackups<C, K>,
    copier: C,
}

impl<C: SaveCopier, K: Clock> BackupManager<C, K> {
    pub fn new(rolling: RollingBackups<C, K>, copier: C) -> Self {
        Self { rolling, copier }
    }

    pub fn rolling(&self) -> &RollingBackups<C, K> {
        &self.rolling
    }

    /// Best effort: an empty or missing `source` means there is nothing to
    /// protect and yields `Ok(None)`. Otherwise returns the new snapshot.
    pub fn backup_files(
        &self,
        source: &Path,
        game_name: &str,
        save_name: &str,
        save_type: SaveType,
    ) -> Result<Option<PathBuf>> {
        if !self.copier.has_saves(save_name, source)? {
            log::info!("Nothing to backup in {}", source.display());
            return Ok(None);
        }
        let snapshot = self.rolling.add(source, game_name, save_name, save_type)?;
        Ok(Some(snapshot))
    }

    /// Copies the most recent snapshot over `destination`. Fails when there is
    /// no usable snapshot, since that leaves nothing to roll back to.
    pub fn restore_backup(
        &self,
        destination: &Path,
        game_name: &str,
        save_name: &str,
        save_type: SaveType,
    ) -> Result<PathBuf> {
        let snapshot = self.rolling.most_recent(game_name, save_name, save_type)?;
        self.copier.validate_source(save_name, &snapshot)?;
        self.copier.copy_over_saves(save_name, &snapshot, destination)?;
        log::info!(
            "Restored {} from backup {}",
            destination.display(),
            snapshot.display()
        );
        Ok(snapshot)
    }
}
