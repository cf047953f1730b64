//! Cooperative shutdown signal.
//!
//! Set by the Escape key (from the keyboard listener thread) or by Ctrl+C,
//! and polled by the bridge loop between reads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag requesting that the bridge loop stop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the bridge loop to stop. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler(signal: &ShutdownSignal) -> Result<(), ctrlc::Error> {
    let signal = signal.clone();
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down...");
        signal.request();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_starts_clear() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_requested());
    }

    #[test]
    fn test_request_visible_through_clones() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();
        other.request();
        assert!(signal.is_requested());

        // Requesting twice is harmless
        signal.request();
        assert!(other.is_requested());
    }
}
