//! User-facing notifications, kept apart from diagnostic logging.

/// Reports state transitions to the person at the keyboard.
pub trait Notifier {
    fn notify(&self, text: &str);
}

/// Prints notifications on stdout.
#[derive(Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, text: &str) {
        log::debug!("notify: {}", text);
        println!("{}", text);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Notifier;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        pub fn saw(&self, text: &str) -> bool {
            self.messages().iter().any(|m| m == text)
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, text: &str) {
            self.messages.lock().unwrap().push(text.to_string());
        }
    }
}
