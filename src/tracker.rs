//! Global keyboard capture for the tracked keys.
//!
//! Uses rdev for cross-platform global key listening. Press and release
//! events for W/A/S/D/Z/X update the shared [`KeyState`]; releasing Escape
//! requests shutdown.

use rdev::{listen, Event, EventType, Key};
use std::thread::{self, JoinHandle};

use crate::error::TrackerError;
use crate::keys::{KeyState, TrackedKey};
use crate::shutdown::ShutdownSignal;

/// Map an rdev key to a tracked key.
pub fn tracked_key(key: Key) -> Option<TrackedKey> {
    match key {
        Key::KeyW => Some(TrackedKey::W),
        Key::KeyA => Some(TrackedKey::A),
        Key::KeyS => Some(TrackedKey::S),
        Key::KeyD => Some(TrackedKey::D),
        Key::KeyZ => Some(TrackedKey::Z),
        Key::KeyX => Some(TrackedKey::X),
        _ => None,
    }
}

/// Apply one keyboard event to the key state.
///
/// Kept separate from the listener thread so it can be driven directly.
pub fn handle_event(event_type: EventType, state: &KeyState, shutdown: &ShutdownSignal) {
    match event_type {
        EventType::KeyPress(key) => {
            if let Some(key) = tracked_key(key) {
                state.on_press(key);
            }
        }
        EventType::KeyRelease(Key::Escape) => {
            if !shutdown.is_requested() {
                log::info!("Escape released, shutting down...");
            }
            shutdown.request();
        }
        EventType::KeyRelease(key) => {
            if let Some(key) = tracked_key(key) {
                state.on_release(key);
            }
        }
        _ => {}
    }
}

/// Owns the background keyboard listener.
pub struct InputTracker {
    state: KeyState,
    shutdown: ShutdownSignal,
    /// Handle to the listener thread
    listener_thread: Option<JoinHandle<()>>,
}

impl InputTracker {
    pub fn new(state: KeyState, shutdown: ShutdownSignal) -> Self {
        InputTracker {
            state,
            shutdown,
            listener_thread: None,
        }
    }

    /// Start listening for global key events.
    ///
    /// This spawns a background thread that captures global keyboard events.
    /// Returns an error if the listener is already running.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        if self.listener_thread.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }

        let state = self.state.clone();
        let shutdown = self.shutdown.clone();

        let handle = thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                let callback = move |event: Event| {
                    handle_event(event.event_type, &state, &shutdown);
                };

                // Blocks until error. On macOS this requires Accessibility
                // permissions; the bridge keeps sending neutral frames without it.
                if let Err(e) = listen(callback) {
                    log::error!("Keyboard listener error: {:?}", e);
                }
            })
            .map_err(TrackerError::Spawn)?;

        self.listener_thread = Some(handle);
        Ok(())
    }
}
