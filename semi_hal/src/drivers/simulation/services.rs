//! In-process stand-ins for the externally owned services.
//!
//! - `CommandScheduler` - runs scheduled commands while enabled
//! - `MemoryTelemetry` - string-keyed telemetry map
//! - `SimCamera` - records started camera streams
//! - `SimDriverStation` - settable field management message
//! - `SimGamepad` - settable driver gamepad

use parking_lot::{Mutex, RwLock};
use semi_common::collab::{
    CaptureError, CaptureService, Command, CommandHandle, DriverStation, Gamepad, GamepadState,
    TaskScheduler, TelemetryStore,
};
use semi_common::consts::DEFAULT_PERIOD_MS;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Closure run on every pass. Never finishes on its own.
pub struct RunCommand<F> {
    body: F,
}

impl<F: FnMut() + Send> RunCommand<F> {
    /// Wrap `body`.
    pub fn new(body: F) -> Self {
        Self { body }
    }
}

impl<F: FnMut() + Send> Command for RunCommand<F> {
    fn name(&self) -> &str {
        "run"
    }

    fn execute(&mut self, _period: Duration) {
        (self.body)();
    }
}

struct Scheduled {
    command: Box<dyn Command>,
    handle: CommandHandle,
    initialized: bool,
}

impl Scheduled {
    fn finish(mut self, reason: &str) {
        if self.initialized {
            self.command.end();
        }
        self.handle.mark_finished();
        debug!("Command '{}' {}", self.command.name(), reason);
    }
}

/// Minimal cooperative command scheduler.
///
/// Commands run in scheduling order on every [`run`](TaskScheduler::run)
/// pass while the scheduler is enabled. A command that finishes is ended and
/// dropped. No lock is held while commands execute, so a command may
/// schedule or cancel other commands; those changes apply from the next
/// pass.
pub struct CommandScheduler {
    enabled: AtomicBool,
    passes: AtomicU64,
    period: Duration,
    commands: Mutex<Vec<Scheduled>>,
}

impl Default for CommandScheduler {
    fn default() -> Self {
        Self::with_period(Duration::from_millis(DEFAULT_PERIOD_MS))
    }
}

impl CommandScheduler {
    /// Create a disabled scheduler with no commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler whose passes are `period` apart.
    pub fn with_period(period: Duration) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            passes: AtomicU64::new(0),
            period,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Register a closure run on every pass.
    pub fn add_command(&self, command: impl FnMut() + Send + 'static) -> CommandHandle {
        self.schedule(Box::new(RunCommand::new(command)))
    }

    /// True while enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Number of passes that executed commands.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// Commands currently scheduled.
    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    /// True if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskScheduler for CommandScheduler {
    fn enable(&self) {
        debug!("Scheduler enabled");
        self.enabled.store(true, Ordering::Release);
    }

    fn disable(&self) {
        debug!("Scheduler disabled");
        self.enabled.store(false, Ordering::Release);
    }

    fn run(&self) {
        if !self.is_enabled() {
            return;
        }
        let mut running = std::mem::take(&mut *self.commands.lock());
        trace!("Scheduler pass with {} commands", running.len());

        let mut done = Vec::new();
        let mut kept = Vec::with_capacity(running.len());
        for mut entry in running.drain(..) {
            if entry.handle.is_cancel_requested() {
                done.push((entry, "cancelled"));
                continue;
            }
            if !entry.initialized {
                entry.command.initialize();
                entry.initialized = true;
            }
            entry.command.execute(self.period);
            if entry.command.is_finished() {
                done.push((entry, "finished"));
            } else {
                kept.push(entry);
            }
        }
        for (entry, reason) in done {
            entry.finish(reason);
        }

        // Anything scheduled during the pass runs after the survivors.
        let mut commands = self.commands.lock();
        let added = std::mem::replace(&mut *commands, kept);
        commands.extend(added);
        drop(commands);

        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    fn schedule(&self, command: Box<dyn Command>) -> CommandHandle {
        let handle = CommandHandle::new();
        debug!("Scheduling command '{}'", command.name());
        self.commands.lock().push(Scheduled {
            command,
            handle: handle.clone(),
            initialized: false,
        });
        handle
    }

    fn cancel(&self, handle: &CommandHandle) {
        handle.request_cancel();
        let entry = {
            let mut commands = self.commands.lock();
            commands
                .iter()
                .position(|entry| entry.handle.same_command(handle))
                .map(|index| commands.remove(index))
        };
        // A command executing right now is picked up at the end of its pass.
        if let Some(entry) = entry {
            entry.finish("cancelled");
        }
    }
}

/// Telemetry value as stored by [`MemoryTelemetry`].
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryValue {
    /// Text entry
    String(String),
    /// Boolean entry
    Boolean(bool),
    /// Numeric entry
    Number(f64),
}

/// Telemetry table held in memory.
///
/// Reading a key with a different type than it was written with returns the
/// default, as the real dashboard does.
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    entries: RwLock<HashMap<String, TelemetryValue>>,
}

impl MemoryTelemetry {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry for `key`.
    pub fn entry(&self, key: &str) -> Option<TelemetryValue> {
        self.entries.read().get(key).cloned()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn put(&self, key: &str, value: TelemetryValue) {
        trace!("telemetry {} = {:?}", key, value);
        self.entries.write().insert(key.to_string(), value);
    }
}

impl TelemetryStore for MemoryTelemetry {
    fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
        match self.entries.read().get(key) {
            Some(TelemetryValue::String(s)) => Some(s.clone()),
            _ => default.map(str::to_string),
        }
    }

    fn put_string(&self, key: &str, value: &str) {
        self.put(key, TelemetryValue::String(value.to_string()));
    }

    fn get_boolean(&self, key: &str, default: bool) -> bool {
        match self.entries.read().get(key) {
            Some(TelemetryValue::Boolean(b)) => *b,
            _ => default,
        }
    }

    fn put_boolean(&self, key: &str, value: bool) {
        self.put(key, TelemetryValue::Boolean(value));
    }

    fn get_number(&self, key: &str, default: f64) -> f64 {
        match self.entries.read().get(key) {
            Some(TelemetryValue::Number(n)) => *n,
            _ => default,
        }
    }

    fn put_number(&self, key: &str, value: f64) {
        self.put(key, TelemetryValue::Number(value));
    }
}

/// Camera server stand-in.
#[derive(Debug, Default)]
pub struct SimCamera {
    failure: Mutex<Option<CaptureError>>,
    streams: Mutex<Vec<(String, u32)>>,
}

impl SimCamera {
    /// Camera server that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera server that rejects every request with `error`.
    pub fn failing(error: CaptureError) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            streams: Mutex::new(Vec::new()),
        }
    }

    /// Streams started so far, in order.
    pub fn streams(&self) -> Vec<(String, u32)> {
        self.streams.lock().clone()
    }
}

impl CaptureService for SimCamera {
    fn start_capture(&self, name: &str, id: u32) -> Result<(), CaptureError> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        self.streams.lock().push((name.to_string(), id));
        Ok(())
    }
}

/// Driver station stand-in.
#[derive(Debug, Default)]
pub struct SimDriverStation {
    message: RwLock<Option<String>>,
}

impl SimDriverStation {
    /// Driver station without a game message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear) the game-specific message.
    pub fn set_game_specific_message(&self, message: Option<&str>) {
        *self.message.write() = message.map(str::to_string);
    }
}

impl DriverStation for SimDriverStation {
    fn game_specific_message(&self) -> Option<String> {
        self.message.read().clone()
    }
}

/// Gamepad stand-in.
#[derive(Debug, Default)]
pub struct SimGamepad {
    state: RwLock<GamepadState>,
}

impl SimGamepad {
    /// Gamepad at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole state.
    pub fn set_state(&self, state: GamepadState) {
        *self.state.write() = state;
    }

    /// Edit the state in place.
    pub fn update(&self, edit: impl FnOnce(&mut GamepadState)) {
        edit(&mut self.state.write());
    }
}

impl Gamepad for SimGamepad {
    fn state(&self) -> GamepadState {
        *self.state.read()
    }
}
