//! Playback state machine and the cancellable auto-stop timer.
//!
//! One foreground caller drives `init`/`play`/`stop` (enforced by `&mut
//! self`); the only other thread is the auto-stop timer spawned for a
//! finite-duration play. The timer blocks on a cancel channel with a
//! timeout, and `stop` joins it before touching the line, so a cancelled
//! timer can never write the GPIO or the shared state afterwards.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::ConfigLoader;
use crate::error::Error;
use crate::gpio::{Direction, Gpio, Level};

/// Duration sentinel: play until explicitly stopped.
pub const DURATION_KEEP: u64 = 0;

/// Longest finite play duration accepted, in seconds.
pub const MAX_DURATION_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Idle,
    Playing { duration: u64 },
}

/// State shared between the foreground caller and the auto-stop thread.
struct Shared {
    gpio: Box<dyn Gpio>,
    pin: u16,
    phase: Phase,
}

/// Cancel channel plus join handle for the auto-stop thread.
///
/// Present exactly while a finite-duration play session is active.
struct AutoStop {
    cancel_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl AutoStop {
    /// Acknowledged cancellation: after this returns the thread has exited
    /// and will never touch the GPIO line or the shared state again.
    fn cancel(self) {
        let _ = self.cancel_tx.send(());
        let _ = self.thread.join();
    }
}

/// Buzzer playback controller.
pub struct BuzzerController {
    shared: Arc<Mutex<Shared>>,
    loader: ConfigLoader,
    timer: Option<AutoStop>,
}

impl BuzzerController {
    pub fn new(gpio: impl Gpio + 'static, loader: ConfigLoader) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                gpio: Box::new(gpio),
                pin: 0,
                phase: Phase::Uninitialized,
            })),
            loader,
            timer: None,
        }
    }

    /// Load the config and set up the GPIO line.
    ///
    /// Idempotent: once initialized, further calls succeed without
    /// re-reading the config or touching the line. A partial failure leaves
    /// the controller uninitialized and a retry is safe, since the export
    /// check tolerates an already-exported pin.
    pub fn init(&mut self) -> Result<(), Error> {
        let mut state = lock(&self.shared)?;
        if state.phase != Phase::Uninitialized {
            return Ok(());
        }

        let config = self.loader.load()?;
        if !state.gpio.is_exported(config.gpio_pin) {
            state.gpio.export(config.gpio_pin)?;
        }
        state.gpio.set_direction(config.gpio_pin, Direction::Out)?;

        state.pin = config.gpio_pin;
        state.phase = Phase::Idle;
        log::debug!("buzzer initialized on gpio{}", config.gpio_pin);
        Ok(())
    }

    /// Start playback.
    ///
    /// A `duration_secs` of [`DURATION_KEEP`] plays until [`Self::stop`];
    /// any other value must be at most [`MAX_DURATION_SECS`] and arms an
    /// auto-stop that silences the buzzer once the duration elapses.
    /// Returns as soon as the line is high and the timer is armed.
    pub fn play(&mut self, duration_secs: u64) -> Result<(), Error> {
        let shared = Arc::clone(&self.shared);
        {
            let state = lock(&shared)?;
            match state.phase {
                Phase::Uninitialized => return Err(Error::NotInitialized),
                Phase::Playing { .. } => return Err(Error::AlreadyPlaying),
                Phase::Idle => {}
            }
        }
        if duration_secs > MAX_DURATION_SECS {
            return Err(Error::InvalidDuration(duration_secs));
        }

        // Reap the handle left over from a naturally-expired session.
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        let mut state = lock(&shared)?;
        let pin = state.pin;
        state.gpio.set_value(pin, Level::High)?;

        if duration_secs != DURATION_KEEP {
            let (cancel_tx, cancel_rx) = mpsc::channel();
            let thread_shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name("buzzer-autostop".into())
                .spawn(move || auto_stop(thread_shared, cancel_rx, duration_secs));
            match spawned {
                Ok(handle) => {
                    self.timer = Some(AutoStop {
                        cancel_tx,
                        thread: handle,
                    });
                }
                Err(e) => {
                    // Keep hardware and state in agreement: take the line
                    // back down and stay idle.
                    if let Err(gpio_err) = state.gpio.set_value(pin, Level::Low) {
                        log::error!("failed to silence buzzer after spawn error: {gpio_err}");
                    }
                    return Err(Error::System(format!("spawn auto-stop thread: {e}")));
                }
            }
            log::debug!("buzzer playing on gpio{pin} for {duration_secs}s");
        } else {
            log::debug!("buzzer playing on gpio{pin} until stopped");
        }

        state.phase = Phase::Playing {
            duration: duration_secs,
        };
        Ok(())
    }

    /// Stop playback immediately. A no-op when not playing.
    ///
    /// An outstanding auto-stop is cancelled and joined first, so no timer
    /// action can run concurrently with or after a successful return. If
    /// the GPIO write fails the phase stays `Playing` and a later `stop`
    /// retries it.
    pub fn stop(&mut self) -> Result<(), Error> {
        let shared = Arc::clone(&self.shared);
        {
            let state = lock(&shared)?;
            match state.phase {
                Phase::Uninitialized => return Err(Error::NotInitialized),
                Phase::Idle => return Ok(()),
                Phase::Playing { .. } => {}
            }
        }

        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        let mut state = lock(&shared)?;
        if let Phase::Playing { .. } = state.phase {
            let pin = state.pin;
            state.gpio.set_value(pin, Level::Low)?;
            state.phase = Phase::Idle;
            log::debug!("buzzer stopped on gpio{pin}");
        }
        Ok(())
    }

    /// Whether a play session is currently active.
    pub fn is_playing(&self) -> bool {
        self.shared
            .lock()
            .map(|state| matches!(state.phase, Phase::Playing { .. }))
            .unwrap_or(false)
    }
}

impl Drop for BuzzerController {
    fn drop(&mut self) {
        // An orphaned timer must not fire against a torn-down backend.
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

fn lock(shared: &Arc<Mutex<Shared>>) -> Result<MutexGuard<'_, Shared>, Error> {
    shared
        .lock()
        .map_err(|_| Error::System("buzzer state mutex poisoned".into()))
}

/// Auto-stop thread body: wait out the duration, then silence the buzzer
/// unless the session was cancelled in the meantime.
fn auto_stop(shared: Arc<Mutex<Shared>>, cancel_rx: Receiver<()>, duration_secs: u64) {
    match cancel_rx.recv_timeout(Duration::from_secs(duration_secs)) {
        // A message or a dropped sender both mean the session was cancelled.
        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        Err(RecvTimeoutError::Timeout) => {}
    }

    let Ok(mut state) = shared.lock() else {
        return;
    };
    // Re-check under the lock; only an active session may be silenced.
    if !matches!(state.phase, Phase::Playing { .. }) {
        return;
    }
    let pin = state.pin;
    if let Err(e) = state.gpio.set_value(pin, Level::Low) {
        // Leave the phase as-is so an explicit stop() retries the write.
        log::error!("auto-stop failed to silence buzzer: {e}");
        return;
    }
    state.phase = Phase::Idle;
    log::debug!("buzzer auto-stopped on gpio{pin}");
}
