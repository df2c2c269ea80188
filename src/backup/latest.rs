use crate::backup::copier::save_files;
use crate::domain::save::{GameSave, SaveType};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Latest-write-wins: tells which side of a save holds the newest file.
#[derive(Clone, Copy, Default)]
pub struct LatestSaveTypeProvider;

impl LatestSaveTypeProvider {
    /// Cloud wins ties. A side with no save files always loses to one that has
    /// them.
    pub fn get(&self, game_save: &GameSave) -> Result<SaveType> {
        let local = latest_write(&game_save.save_name, &game_save.local_path)?;
        let cloud = latest_write(&game_save.save_name, &game_save.cloud_path)?;

        let newest = match (local, cloud) {
            (Some(local), Some(cloud)) if local > cloud => SaveType::Local,
            (Some(_), None) => SaveType::Local,
            _ => SaveType::Cloud,
        };
        log::debug!(
            "{} newest side: {} (local {:?}, cloud {:?})",
            game_save.save_name,
            newest,
            local,
            cloud
        );
        Ok(newest)
    }
}

/// Modification time of the most recently written save file in `dir`.
pub fn latest_write(save_name: &str, dir: &Path) -> Result<Option<DateTime<Utc>>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut latest: Option<DateTime<Utc>> = None;
    for file in save_files(save_name, dir)? {
        let modified = fs::metadata(&file)
            .and_then(|m| m.modified())
            .map_err(Error::io(format!("read mtime of {}", file.display())))?;
        let modified: DateTime<Utc> = modified.into();
        if latest.map(|l| modified > l).unwrap_or(true) {
            latest = Some(modified);
        }
    }
    Ok(latest)
}
