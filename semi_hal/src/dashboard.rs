//! Driver-station dashboard slots.
//!
//! The default dashboard exposes ten text fields, four buttons, four LEDs
//! and four sliders, all backed by telemetry keys of the form
//! `"DB/<Slot> <n>"`. [`Dashboard`] wraps a [`TelemetryStore`] with
//! range-checked accessors. Every `put_*` returns the value it replaced.
//!
//! LEDs are write-only on the telemetry side, so their state is cached
//! locally and reads come from the cache.

use parking_lot::Mutex;
use semi_common::collab::TelemetryStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Telemetry keys written by the robot outside the `DB/` slots.
pub mod keys {
    /// FMS plate assignment
    pub const FMS_GAME_DATA: &str = "Switch/Scale Positions";
    /// Gyroscope heading
    pub const GYROSCOPE: &str = "Gyroscope";
    /// Left drive encoder distance
    pub const LEFT_ENCODER: &str = "Left Encoder";
    /// Right drive encoder distance
    pub const RIGHT_ENCODER: &str = "Right Encoder";
    /// Intake throttle applied by the driver
    pub const INTAKE_THROTTLE: &str = "Intake Throttle";
    /// Autonomous routine chooser
    pub const CHOOSER_AUTONOMOUS: &str = "Autonomous Command";
    /// Chooser option: start on the left
    pub const AUTO_LEFT: &str = "Left Side";
    /// Chooser option: start in the middle
    pub const AUTO_CENTRE: &str = "Centred";
    /// Chooser option: start on the right
    pub const AUTO_RIGHT: &str = "Right Side";
    /// Reset-encoders button
    pub const CMD_RESET_ENCODERS: &str = "Reset Encoders to Zero";
}

/// Button slot used as the debug switch.
pub const DEBUG_BUTTON: u32 = 3;

/// Dashboard slot family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `DB/String 0..=9`
    String,
    /// `DB/Button 0..=3`
    Button,
    /// `DB/LED 0..=3`
    Led,
    /// `DB/Slider 0..=3`
    Slider,
}

impl Slot {
    /// Highest valid index.
    pub const fn max_index(self) -> u32 {
        match self {
            Self::String => 9,
            Self::Button | Self::Led | Self::Slider => 3,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Button => "Button",
            Self::Led => "LED",
            Self::Slider => "Slider",
        }
    }

    /// Telemetry key of slot `index`, without range checking.
    pub fn key(self, index: u32) -> String {
        format!("DB/{} {}", self.label(), index)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dashboard access error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Slot index past the last slot of its family.
    #[error("{slot} slot {index} out of range (0..={max})")]
    SlotOutOfRange {
        /// Slot family
        slot: Slot,
        /// Requested index
        index: u32,
        /// Highest valid index
        max: u32,
    },
}

fn slot_key(slot: Slot, index: u32) -> Result<String, DashboardError> {
    let max = slot.max_index();
    if index > max {
        return Err(DashboardError::SlotOutOfRange { slot, index, max });
    }
    Ok(slot.key(index))
}

/// Range-checked view of the dashboard slots.
pub struct Dashboard {
    store: Arc<dyn TelemetryStore>,
    leds: Mutex<HashMap<u32, bool>>,
}

impl Dashboard {
    /// Wrap a telemetry store.
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self {
            store,
            leds: Mutex::new(HashMap::new()),
        }
    }

    /// Underlying telemetry store.
    pub fn store(&self) -> &Arc<dyn TelemetryStore> {
        &self.store
    }

    // ─── Strings ────────────────────────────────────────────────────

    /// Text field `index`, or `default`.
    pub fn get_string(&self, index: u32, default: Option<&str>) -> Result<Option<String>, DashboardError> {
        let key = slot_key(Slot::String, index)?;
        Ok(self.store.get_string(&key, default))
    }

    /// Set text field `index`. Returns the old text.
    pub fn put_string(&self, index: u32, value: &str) -> Result<Option<String>, DashboardError> {
        let key = slot_key(Slot::String, index)?;
        let old = self.store.get_string(&key, None);
        self.store.put_string(&key, value);
        Ok(old)
    }

    // ─── Buttons ────────────────────────────────────────────────────

    /// Button `index`, or `default`.
    pub fn get_button(&self, index: u32, default: bool) -> Result<bool, DashboardError> {
        let key = slot_key(Slot::Button, index)?;
        Ok(self.store.get_boolean(&key, default))
    }

    /// Set button `index`. Returns the old state.
    pub fn put_button(&self, index: u32, value: bool) -> Result<bool, DashboardError> {
        let key = slot_key(Slot::Button, index)?;
        let old = self.store.get_boolean(&key, false);
        self.store.put_boolean(&key, value);
        Ok(old)
    }

    /// Flip button `index`. Returns the old state.
    pub fn toggle_button(&self, index: u32) -> Result<bool, DashboardError> {
        let current = self.get_button(index, false)?;
        self.put_button(index, !current)
    }

    // ─── LEDs ───────────────────────────────────────────────────────

    /// Cached state of LED `index`, or `default` if never set.
    pub fn get_led(&self, index: u32, default: bool) -> Result<bool, DashboardError> {
        slot_key(Slot::Led, index)?;
        Ok(self.leds.lock().get(&index).copied().unwrap_or(default))
    }

    /// Set LED `index`. Returns the old cached state.
    pub fn put_led(&self, index: u32, value: bool) -> Result<bool, DashboardError> {
        let key = slot_key(Slot::Led, index)?;
        let mut leds = self.leds.lock();
        self.store.put_boolean(&key, value);
        Ok(leds.insert(index, value).unwrap_or(false))
    }

    /// Flip LED `index`. Returns the old state.
    pub fn toggle_led(&self, index: u32) -> Result<bool, DashboardError> {
        let key = slot_key(Slot::Led, index)?;
        let mut leds = self.leds.lock();
        let old = leds.get(&index).copied().unwrap_or(false);
        self.store.put_boolean(&key, !old);
        leds.insert(index, !old);
        Ok(old)
    }

    // ─── Sliders ────────────────────────────────────────────────────

    /// Slider `index`, or `default`.
    pub fn get_slider(&self, index: u32, default: f64) -> Result<f64, DashboardError> {
        let key = slot_key(Slot::Slider, index)?;
        Ok(self.store.get_number(&key, default))
    }

    /// Set slider `index`. Returns the old position.
    pub fn put_slider(&self, index: u32, value: f64) -> Result<f64, DashboardError> {
        let key = slot_key(Slot::Slider, index)?;
        let old = self.store.get_number(&key, 0.0);
        self.store.put_number(&key, value);
        Ok(old)
    }

    // ─── Debug switch ───────────────────────────────────────────────

    /// True while the debug button is pressed.
    pub fn is_debug(&self) -> bool {
        self.store.get_boolean(&Slot::Button.key(DEBUG_BUTTON), false)
    }

    /// Set the debug button. Returns the old state.
    pub fn set_debug(&self, value: bool) -> bool {
        let key = Slot::Button.key(DEBUG_BUTTON);
        let old = self.store.get_boolean(&key, false);
        self.store.put_boolean(&key, value);
        old
    }

    /// Flip the debug button. Returns the old state.
    pub fn toggle_debug(&self) -> bool {
        self.set_debug(!self.is_debug())
    }
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("leds", &*self.leds.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::{MemoryTelemetry, TelemetryValue};

    fn dashboard() -> (Arc<MemoryTelemetry>, Dashboard) {
        let store = Arc::new(MemoryTelemetry::new());
        let db = Dashboard::new(store.clone());
        (store, db)
    }

    #[test]
    fn test_keys() {
        assert_eq!(Slot::String.key(9), "DB/String 9");
        assert_eq!(Slot::Led.key(0), "DB/LED 0");
    }

    #[test]
    fn test_put_string_returns_old() {
        let (store, db) = dashboard();
        assert_eq!(db.put_string(0, "hello").unwrap(), None);
        assert_eq!(db.put_string(0, "world").unwrap(), Some("hello".to_string()));
        assert_eq!(
            store.entry("DB/String 0"),
            Some(TelemetryValue::String("world".to_string()))
        );
        assert_eq!(db.get_string(1, Some("x")).unwrap(), Some("x".to_string()));
    }

    #[test]
    fn test_slot_out_of_range() {
        let (_, db) = dashboard();
        assert_eq!(
            db.put_string(10, "x"),
            Err(DashboardError::SlotOutOfRange {
                slot: Slot::String,
                index: 10,
                max: 9
            })
        );
        assert!(db.get_button(4, false).is_err());
        assert!(db.put_led(4, true).is_err());
        assert!(db.get_slider(4, 0.0).is_err());
        assert_eq!(
            db.put_slider(7, 1.0).unwrap_err().to_string(),
            "Slider slot 7 out of range (0..=3)"
        );
    }

    #[test]
    fn test_buttons_and_toggle() {
        let (_, db) = dashboard();
        assert!(!db.put_button(1, true).unwrap());
        assert!(db.toggle_button(1).unwrap());
        assert!(!db.get_button(1, true).unwrap());
    }

    #[test]
    fn test_led_cache_write_through() {
        let (store, db) = dashboard();
        assert!(!db.get_led(2, false).unwrap());
        assert!(db.get_led(2, true).unwrap());

        assert!(!db.put_led(2, true).unwrap());
        assert!(db.get_led(2, false).unwrap());
        assert_eq!(store.entry("DB/LED 2"), Some(TelemetryValue::Boolean(true)));

        assert!(db.toggle_led(2).unwrap());
        assert_eq!(store.entry("DB/LED 2"), Some(TelemetryValue::Boolean(false)));
    }

    #[test]
    fn test_slider_returns_old() {
        let (_, db) = dashboard();
        assert_eq!(db.put_slider(3, 2.5).unwrap(), 0.0);
        assert_eq!(db.put_slider(3, 1.0).unwrap(), 2.5);
        assert_eq!(db.get_slider(3, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_debug_uses_button_three() {
        let (_, db) = dashboard();
        assert!(!db.is_debug());
        assert!(!db.toggle_debug());
        assert!(db.is_debug());
        assert!(db.get_button(DEBUG_BUTTON, false).unwrap());
        assert!(db.set_debug(false));
    }
}
