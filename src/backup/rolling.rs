use crate::backup::copier::SaveCopier;
use crate::backup::paths::BackupDirectories;
use crate::domain::save::SaveType;
use crate::error::{Error, Result};
use crate::services::clock::Clock;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MAX_BACKUPS: usize = 10;

/// Capped, timestamp ordered snapshots per (game, save, side).
pub struct RollingBackups<C: SaveCopier, K: Clock> {
    dirs: BackupDirectories,
    copier: C,
    clock: K,
}

impl<C: SaveCopier, K: Clock> RollingBackups<C, K> {
    pub fn new(dirs: BackupDirectories, copier: C, clock: K) -> Self {
        Self {
            dirs,
            copier,
            clock,
        }
    }

    pub fn directories(&self) -> &BackupDirectories {
        &self.dirs
    }

    /// Snapshots the save files in `source` and evicts the oldest snapshots
    /// beyond [`MAX_BACKUPS`]. Returns the new snapshot directory.
    pub fn add(
        &self,
        source: &Path,
        game_name: &str,
        save_name: &str,
        save_type: SaveType,
    ) -> Result<PathBuf> {
        let snapshot =
            self.dirs
                .timestamped_dir(game_name, save_name, save_type, self.clock.now());

        // Snapshots are never rewritten; a second backup within the same second keeps the first.
        if self.copier.has_saves(save_name, &snapshot)? {
            log::warn!(
                "Backup {} already exists, keeping it",
                snapshot.display()
            );
            return Ok(snapshot);
        }

        let existed = snapshot.exists();
        if let Err(e) = self.copier.copy_over_saves(save_name, source, &snapshot) {
            let cleanup = if existed {
                self.copier.delete_saves(save_name, &snapshot)
            } else {
                fs::remove_dir_all(&snapshot)
                    .map_err(Error::io(format!("delete backup {}", snapshot.display())))
            };
            if let Err(cleanup) = cleanup {
                log::error!("Could not remove partial backup: {}", cleanup);
            }
            return Err(e);
        }
        log::info!("Backed up {} to {}", source.display(), snapshot.display());

        while self.count(game_name, save_name, save_type)? > MAX_BACKUPS {
            self.delete_oldest(game_name, save_name, save_type)?;
        }
        Ok(snapshot)
    }

    pub fn most_recent(&self, game_name: &str, save_name: &str, save_type: SaveType) -> Result<PathBuf> {
        let root = self.dirs.root_dir(game_name, save_name, save_type);
        snapshots(&root)?
            .pop()
            .ok_or(Error::NoBackup { path: root })
    }

    pub fn count(&self, game_name: &str, save_name: &str, save_type: SaveType) -> Result<usize> {
        let root = self.dirs.root_dir(game_name, save_name, save_type);
        Ok(snapshots(&root)?.len())
    }

    /// Removes the snapshot with the smallest timestamp, if any.
    pub fn delete_oldest(
        &self,
        game_name: &str,
        save_name: &str,
        save_type: SaveType,
    ) -> Result<Option<PathBuf>> {
        let root = self.dirs.root_dir(game_name, save_name, save_type);
        let Some(oldest) = snapshots(&root)?.into_iter().next() else {
            return Ok(None);
        };
        fs::remove_dir_all(&oldest)
            .map_err(Error::io(format!("delete backup {}", oldest.display())))?;
        log::debug!("Evicted backup {}", oldest.display());
        Ok(Some(oldest))
    }
}

/// Snapshot directories under `root`, oldest first.
fn snapshots(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io {
            context: format!("list backups in {}", root.display()),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::services::clock::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    /// Clock that moves one second forward every time it is read.
    #[derive(Clone)]
    pub struct TickingClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl TickingClock {
        pub fn new() -> Self {
            Self {
                now: Arc::new(Mutex::new(
                    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
                )),
            }
        }
    }

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut now = self.now.lock().unwrap();
            let current = *now;
            *now = current + Duration::seconds(1);
            current
        }
    }
}
