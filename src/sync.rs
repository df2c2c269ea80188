use crate::backup::{BackupManager, LatestSaveTypeProvider, SaveCopier};
use crate::domain::save::{GameSave, SaveType, SyncOutcome};
use crate::error::{Error, Result};
use crate::services::clock::Clock;
use crate::services::notifier::Notifier;

/// Directional copies between the local and the shared copy of a save.
pub trait SaveSync {
    fn upload_save(&self, game_save: &GameSave) -> Result<SyncOutcome>;

    fn download_save(&self, game_save: &GameSave) -> Result<SyncOutcome>;
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Upload,
    Download,
}

impl Direction {
    fn source(self) -> SaveType {
        match self {
            Direction::Upload => SaveType::Local,
            Direction::Download => SaveType::Cloud,
        }
    }

    fn destination(self) -> SaveType {
        match self {
            Direction::Upload => SaveType::Cloud,
            Direction::Download => SaveType::Local,
        }
    }

    fn started(self) -> &'static str {
        match self {
            Direction::Upload => "Uploading game save to cloud...",
            Direction::Download => "Downloading game save from cloud...",
        }
    }

    fn finished(self) -> &'static str {
        match self {
            Direction::Upload => "Game save uploaded.",
            Direction::Download => "Game save downloaded.",
        }
    }

    fn skipped(self) -> &'static str {
        match self {
            Direction::Upload => "Newer save found in Cloud, uploading game save skipped!!",
            Direction::Download => {
                "Newer Local game save was found, downloading game save skipped!!"
            }
        }
    }

    fn failed(self) -> &'static str {
        match self {
            Direction::Upload => "Upload failed.",
            Direction::Download => "Download failed.",
        }
    }
}

pub struct GameSaveSyncManager<C: SaveCopier, K: Clock, N: Notifier> {
    copier: C,
    backups: BackupManager<C, K>,
    latest: LatestSaveTypeProvider,
    notifier: N,
}

impl<C: SaveCopier, K: Clock, N: Notifier> GameSaveSyncManager<C, K, N> {
    pub fn new(
        copier: C,
        backups: BackupManager<C, K>,
        latest: LatestSaveTypeProvider,
        notifier: N,
    ) -> Self {
        Self {
            copier,
            backups,
            latest,
            notifier,
        }
    }

    pub fn backups(&self) -> &BackupManager<C, K> {
        &self.backups
    }

    fn transfer(&self, game_save: &GameSave, direction: Direction) -> Result<SyncOutcome> {
        let save_name = game_save.save_name.as_str();
        let to = direction.destination();
        let source = game_save.path(direction.source());
        let destination = game_save.path(to);

        self.copier.validate_source(save_name, source)?;
        let backup = self
            .backups
            .backup_files(destination, &game_save.game_name, save_name, to)?;

        // The resolver naming the destination means it already holds the newer data.
        if self.latest.get(game_save)? == to {
            log::info!("{}", direction.skipped());
            self.notifier.notify(direction.skipped());
            return Ok(SyncOutcome::Skipped);
        }

        self.notifier.notify(direction.started());
        match self.copier.copy_over_saves(save_name, source, destination) {
            Ok(()) => {
                self.notifier.notify(direction.finished());
                Ok(SyncOutcome::Transferred)
            }
            Err(transfer) => {
                log::error!("{} {}", direction.failed(), transfer);
                self.roll_back(game_save, to, backup.is_some(), transfer)
            }
        }
    }

    /// Puts `side` back to how it was before the transfer started, then
    /// hands the transfer error back to the caller.
    fn roll_back(
        &self,
        game_save: &GameSave,
        side: SaveType,
        had_backup: bool,
        transfer: Error,
    ) -> Result<SyncOutcome> {
        let destination = game_save.path(side);
        let restored = if had_backup {
            self.backups
                .restore_backup(destination, &game_save.game_name, &game_save.save_name, side)
                .map(|_| ())
        } else {
            // Nothing was there before, so the partial copy is simply removed.
            self.copier.delete_saves(&game_save.save_name, destination)
        };

        match restored {
            Ok(()) => {
                let message = if had_backup {
                    format!("Transfer failed, restored {} save from backup.", side)
                } else {
                    format!("Transfer failed, removed partial {} save.", side)
                };
                self.notifier.notify(&message);
                Err(Error::RolledBack {
                    source: Box::new(transfer),
                })
            }
            Err(restore) => {
                log::error!("Rollback of {} failed: {}", destination.display(), restore);
                Err(Error::RollbackFailed {
                    transfer: Box::new(transfer),
                    restore: Box::new(restore),
                })
            }
        }
    }
}

impl<C: SaveCopier, K: Clock, N: Notifier> SaveSync for GameSaveSyncManager<C, K, N> {
    fn upload_save(&self, game_save: &GameSave) -> Result<SyncOutcome> {
        self.transfer(game_save, Direction::Upload)
    }

    fn download_save(&self, game_save: &GameSave) -> Result<SyncOutcome> {
        self.transfer(game_save, Direction::Download)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::copier::testing::FlakyCopier;
    use crate::backup::copier::StdSaveCopier;
    use crate::backup::rolling::testing::TickingClock;
    use crate::backup::{BackupDirectories, RollingBackups};
    use crate::services::notifier::testing::RecordingNotifier;
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::{tempdir, TempDir};

    fn sync_manager<C: SaveCopier + Clone>(
        root: &Path,
        copier: C,
    ) -> (GameSaveSyncManager<C, TickingClock, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let rolling = RollingBackups::new(
            BackupDirectories::new(root.join("backups")),
            copier.clone(),
            TickingClock::new(),
        );
        let backups = BackupManager::new(rolling, copier.clone());
        let manager =
            GameSaveSyncManager::new(copier, backups, LatestSaveTypeProvider, notifier.clone());
        (manager, notifier)
    }

    fn game_save(dir: &TempDir) -> GameSave {
        GameSave::new(
            "Game",
            "world",
            dir.path().join("local"),
            dir.path().join("cloud").join("Game"),
        )
    }

    fn write_save(dir: &Path, name: &str, body: &[u8], secs_ago: u64) {
        fs::create_dir_all(dir).expect("mkdir");
        let path = dir.join(name);
        fs::write(&path, body).expect("write");
        File::options()
            .write(true)
            .open(&path)
            .and_then(|f| f.set_modified(SystemTime::now() - Duration::from_secs(secs_ago)))
            .expect("set mtime");
    }

    fn contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut out = BTreeMap::new();
        if !dir.is_dir() {
            return out;
        }
        for entry in fs::read_dir(dir).expect("read dir") {
            let entry = entry.expect("entry");
            if entry.file_type().expect("type").is_file() {
                out.insert(
                    entry.file_name().to_string_lossy().to_string(),
                    fs::read(entry.path()).expect("read"),
                );
            }
        }
        out
    }

    #[test]
    fn upload_creates_missing_cloud_directory() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"db", 10);
        write_save(&save.local_path, "world.fwl", b"fwl", 10);
        let (manager, notifier) = sync_manager(dir.path(), StdSaveCopier);

        let outcome = manager.upload_save(&save).expect("upload");

        assert_eq!(outcome, SyncOutcome::Transferred);
        assert_eq!(contents(&save.cloud_path), contents(&save.local_path));
        assert!(notifier.saw("Uploading game save to cloud..."));
        assert!(notifier.saw("Game save uploaded."));
    }

    #[test]
    fn upload_skips_when_cloud_is_newer() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"old-local", 600);
        write_save(&save.cloud_path, "world.db", b"new-cloud", 10);
        let before = contents(&save.cloud_path);
        let (manager, notifier) = sync_manager(dir.path(), StdSaveCopier);

        let outcome = manager.upload_save(&save).expect("upload");

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(contents(&save.cloud_path), before);
        assert!(notifier.saw("Newer save found in Cloud, uploading game save skipped!!"));
        assert!(!notifier.saw("Game save uploaded."));
    }

    #[test]
    fn upload_backs_up_existing_cloud_save() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"new-local", 10);
        write_save(&save.cloud_path, "world.db", b"old-cloud", 600);
        let (manager, _) = sync_manager(dir.path(), StdSaveCopier);

        manager.upload_save(&save).expect("upload");

        let snapshot = manager
            .backups()
            .rolling()
            .most_recent("Game", "world", SaveType::Cloud)
            .expect("cloud backup");
        assert_eq!(fs::read(snapshot.join("world.db")).expect("read"), b"old-cloud");
        assert_eq!(fs::read(save.cloud_path.join("world.db")).expect("read"), b"new-local");
    }

    #[test]
    fn upload_fails_without_local_save_and_leaves_cloud_alone() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.cloud_path, "world.db", b"cloud", 10);
        let before = contents(&save.cloud_path);
        let (manager, _) = sync_manager(dir.path(), StdSaveCopier);

        let err = manager.upload_save(&save).expect_err("no local save");

        assert!(matches!(err, Error::InvalidSource { .. }));
        assert_eq!(contents(&save.cloud_path), before);
        assert_eq!(
            manager.backups().rolling().count("Game", "world", SaveType::Cloud).expect("count"),
            0
        );
    }

    #[test]
    fn download_fails_when_cloud_has_no_matching_files() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.cloud_path, "other.db", b"x", 10);
        write_save(&save.local_path, "world.db", b"local", 10);
        let before = contents(&save.local_path);
        let (manager, _) = sync_manager(dir.path(), StdSaveCopier);

        let err = manager.download_save(&save).expect_err("no cloud save");

        assert!(matches!(err, Error::InvalidSource { .. }));
        assert_eq!(contents(&save.local_path), before);
    }

    #[test]
    fn download_copies_newer_cloud_save() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"old-local", 600);
        write_save(&save.cloud_path, "world.db", b"new-cloud", 10);
        let (manager, notifier) = sync_manager(dir.path(), StdSaveCopier);

        let outcome = manager.download_save(&save).expect("download");

        assert_eq!(outcome, SyncOutcome::Transferred);
        assert_eq!(fs::read(save.local_path.join("world.db")).expect("read"), b"new-cloud");
        assert!(notifier.saw("Downloading game save from cloud..."));
        assert!(notifier.saw("Game save downloaded."));
    }

    #[test]
    fn download_skips_when_local_is_newer() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"new-local", 10);
        write_save(&save.cloud_path, "world.db", b"old-cloud", 600);
        let (manager, notifier) = sync_manager(dir.path(), StdSaveCopier);

        let outcome = manager.download_save(&save).expect("download");

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(fs::read(save.local_path.join("world.db")).expect("read"), b"new-local");
        assert!(notifier.saw("Newer Local game save was found, downloading game save skipped!!"));
    }

    #[test]
    fn interrupted_upload_restores_cloud_from_backup() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.local_path, "world.db", b"new-local", 10);
        write_save(&save.cloud_path, "world.db", b"old-cloud", 600);
        write_save(&save.cloud_path, "world.fwl", b"old-meta", 600);
        let before = contents(&save.cloud_path);
        let copier = FlakyCopier::failing_from(&save.local_path);
        let (manager, notifier) = sync_manager(dir.path(), copier);

        let err = manager.upload_save(&save).expect_err("copy is interrupted");

        assert!(err.is_rolled_back());
        assert!(matches!(err.original(), Error::Io { .. }));
        assert_eq!(contents(&save.cloud_path), before);
        assert!(notifier.saw("Transfer failed, restored Cloud save from backup."));
    }

    #[test]
    fn interrupted_download_into_empty_local_clears_partial_files() {
        let dir = tempdir().expect("tempdir");
        let save = game_save(&dir);
        write_save(&save.cloud_path, "world.db", b"cloud", 10);
        let copier = FlakyCopier::failing_from(&save.cloud_path);
        let (manager, notifier) = sync_manager(dir.path(), copier);

        let err = manager.download_save(&save).expect_err("copy is interrupted");

        assert!(err.is_rolled_back());
        assert!(contents(&save.local_path).is_empty());
        assert!(notifier.saw("Transfer failed, removed partial Local save."));
        assert!(!notifier.saw("Transfer failed, restored Local save from backup."));
    }
}
