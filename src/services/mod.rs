pub mod clock;
pub mod notifier;
pub mod process;
