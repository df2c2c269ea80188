pub mod app;
pub mod backup;
pub mod domain;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod settings;
pub mod sync;

pub use domain::save::{GameSave, OrchestratorResult, SaveType, Session, SyncOutcome};
pub use error::{Error, Result};
pub use lock::LockManager;
pub use orchestrator::{SharedSave, SharedSaveOrchestrator};
pub use sync::{GameSaveSyncManager, SaveSync};
