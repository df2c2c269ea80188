//! Save file copying, rolling snapshots and newest-side resolution.

pub mod copier;
pub mod paths;
pub mod latest;
pub mod manager;
pub mod rolling;

pub use copier::{SaveCopier, StdSaveCopier};
pub use paths::BackupDirectories;
pub use latest::LatestSaveTypeProvider;
pub use manager::BackupManager;
pub use rolling::{RollingBackups, MAX_BACKUPS};
