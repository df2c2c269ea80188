use crate::domain::save::{GameSave, OrchestratorResult, Session};
use crate::error::Result;
use crate::lock::LockManager;
use crate::services::notifier::Notifier;
use crate::sync::SaveSync;

/// Lock, sync, unlock around one play session.
pub trait SharedSave {
    fn load(&self, game_save: &GameSave, session: &Session) -> OrchestratorResult;

    fn save(&self, game_save: &GameSave, session: &Session);
}

pub struct SharedSaveOrchestrator<S: SaveSync, N: Notifier> {
    locks: LockManager,
    sync: S,
    notifier: N,
}

impl<S: SaveSync, N: Notifier> SharedSaveOrchestrator<S, N> {
    pub fn new(locks: LockManager, sync: S, notifier: N) -> Self {
        Self {
            locks,
            sync,
            notifier,
        }
    }

    fn notify_locked(&self, game_save: &GameSave) {
        self.notifier
            .notify("Game save is locked, your friends are playing!");
        match self.locks.get_locked_session(game_save) {
            Ok(owner) => self.notifier.notify(&format!(
                "Connect to {}'s server using {}",
                owner.user_name,
                owner.endpoint()
            )),
            Err(e) => {
                log::warn!("Lock owner unknown: {}", e);
                self.notifier
                    .notify("The lock file is unreadable and has to be removed by hand.");
            }
        }
    }

    fn lock_and_download(&self, game_save: &GameSave, session: &Session) -> Result<()> {
        self.locks.create_lock(game_save, session)?;
        self.sync.download_save(game_save)?;
        Ok(())
    }

    fn release(&self, game_save: &GameSave, session: &Session) {
        match self.locks.delete_lock(game_save, session) {
            Ok(()) => self.notifier.notify("Game save lock released."),
            Err(e) => log::error!("Could not release lock for {}: {}", game_save.game_name, e),
        }
    }
}

impl<S: SaveSync, N: Notifier> SharedSave for SharedSaveOrchestrator<S, N> {
    fn load(&self, game_save: &GameSave, session: &Session) -> OrchestratorResult {
        if self.locks.lock_exists(game_save) {
            self.notify_locked(game_save);
            return OrchestratorResult::SaveLocked;
        }

        match self.lock_and_download(game_save, session) {
            Ok(()) => {
                self.notifier.notify("Game save is prepared! Enjoy Buddy :)");
                OrchestratorResult::Loaded
            }
            Err(e) => {
                log::error!("Error while loading. {}", e);
                self.notifier
                    .notify("Failed loading game save. Deleting game save lock...");
                // Ownership is checked on delete, so a lock won by someone else survives.
                self.release(game_save, session);
                OrchestratorResult::Failed
            }
        }
    }

    fn save(&self, game_save: &GameSave, session: &Session) {
        match self.locks.lock_held_by(game_save, session) {
            Ok(true) => {}
            Ok(false) => {
                self.notifier.notify(&format!(
                    "You don't have a lock on a {}, cannot save.",
                    game_save.game_name
                ));
                return;
            }
            Err(e) => {
                log::error!("Cannot read lock for {}: {}", game_save.game_name, e);
                self.notifier.notify(&format!(
                    "You don't have a lock on a {}, cannot save.",
                    game_save.game_name
                ));
                return;
            }
        }

        if let Err(e) = self.sync.upload_save(game_save) {
            log::error!("Error while saving. {}", e);
            self.notifier.notify("Error while saving.");
        }
        self.release(game_save, session);
    }
}
