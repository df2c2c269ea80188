//! Cooperative lock file guarding the shared save.
//!
//! The lock is `<cloud_path>.lock` holding the owner's [`Session`] as JSON.
//! Creation relies on the storage honouring create-if-absent; a holder that
//! crashes leaves the lock behind until someone removes it by hand.

use crate::domain::save::{GameSave, Session};
use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

#[derive(Clone, Copy, Default)]
pub struct LockManager;

impl LockManager {
    pub fn new() -> Self {
        Self
    }

    /// Whether anyone holds the lock.
    pub fn lock_exists(&self, game_save: &GameSave) -> bool {
        game_save.lock_path().exists()
    }

    /// Whether `session` holds the lock. Ownership is decided by user name.
    pub fn lock_held_by(&self, game_save: &GameSave, session: &Session) -> Result<bool> {
        let lock_path = game_save.lock_path();
        if !lock_path.exists() {
            return Ok(false);
        }
        let owner = read_session(&lock_path)?;
        Ok(owner.user_name == session.user_name)
    }

    pub fn get_locked_session(&self, game_save: &GameSave) -> Result<Session> {
        read_session(&game_save.lock_path())
    }

    /// Takes the lock. Fails with [`Error::LockCollision`] when it is already
    /// taken; an existing lock is never overwritten.
    pub fn create_lock(&self, game_save: &GameSave, session: &Session) -> Result<()> {
        let lock_path = game_save.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)
                .map_err(Error::io(format!("create {}", parent.display())))?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::LockCollision { path: lock_path });
            }
            Err(e) => {
                return Err(Error::Io {
                    context: format!("create lock {}", lock_path.display()),
                    source: e,
                })
            }
        };

        let body = serde_json::to_vec(session).map_err(|e| Error::LockIntegrity {
            path: lock_path.clone(),
            reason: e.to_string(),
        })?;
        let written = file.write_all(&body).and_then(|_| file.sync_all());
        if let Err(e) = written {
            // A half written lock would block everyone, so give it back.
            drop(file);
            let _ = fs::remove_file(&lock_path);
            return Err(Error::Io {
                context: format!("write lock {}", lock_path.display()),
                source: e,
            });
        }

        log::info!("Lock taken by {} at {}", session.user_name, lock_path.display());
        Ok(())
    }

    /// Releases the lock. A missing lock is fine; a lock owned by someone
    /// else is left in place and reported with the owner's name.
    pub fn delete_lock(&self, game_save: &GameSave, session: &Session) -> Result<()> {
        let lock_path = game_save.lock_path();
        if !lock_path.exists() {
            return Ok(());
        }

        let owner = read_session(&lock_path)?;
        if owner.user_name != session.user_name {
            return Err(Error::LockOwnership {
                owner: owner.user_name,
            });
        }

        match fs::remove_file(&lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Io {
                    context: format!("delete lock {}", lock_path.display()),
                    source: e,
                })
            }
        }
        log::info!("Lock released by {}", session.user_name);
        Ok(())
    }
}

fn read_session(lock_path: &Path) -> Result<Session> {
    let text = fs::read_to_string(lock_path)
        .map_err(Error::io(format!("read lock {}", lock_path.display())))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::LockIntegrity {
            path: lock_path.to_path_buf(),
            reason: "lock file is empty".to_string(),
        });
    }
    serde_json::from_str(text).map_err(|e| Error::LockIntegrity {
        path: lock_path.to_path_buf(),
        reason: e.to_string(),
    })
}
