use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::AppError;
use crate::gpio::{Direction, GpioBackend};

/// In-memory stand-in for the sysfs tree.
///
/// Pin files outlive an unexport so tests can inspect what teardown left
/// behind; only the exported set changes.
#[derive(Default)]
pub struct MockGpioBackend {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    pins: FxHashMap<u32, MockPinState>, // keyed by pin number
    exported: FxHashSet<u32>,
    last_export: Option<u32>,
    last_unexport: Option<u32>,
}

#[derive(Clone)]
struct MockPinState {
    direction: Option<Direction>,
    value: String,
}

impl Default for MockPinState {
    fn default() -> Self {
        Self {
            direction: None,
            value: "0".to_string(),
        }
    }
}

impl MockGpioBackend {
    pub fn set_input(&self, pin: u32, value: u8) {
        let mut state = self.state.lock();
        state.pins.entry(pin).or_default().value = value.to_string();
    }

    pub fn mark_exported(&self, pin: u32) {
        let mut state = self.state.lock();
        state.pins.entry(pin).or_default();
        state.exported.insert(pin);
    }

    pub fn value(&self, pin: u32) -> Option<String> {
        self.state.lock().pins.get(&pin).map(|p| p.value.clone())
    }

    pub fn direction(&self, pin: u32) -> Option<Direction> {
        self.state.lock().pins.get(&pin).and_then(|p| p.direction)
    }

    pub fn is_exported(&self, pin: u32) -> bool {
        self.state.lock().exported.contains(&pin)
    }

    pub fn last_export(&self) -> Option<u32> {
        self.state.lock().last_export
    }

    pub fn last_unexport(&self) -> Option<u32> {
        self.state.lock().last_unexport
    }
}

impl GpioBackend for MockGpioBackend {
    fn export(&self, pin: u32) -> Result<(), AppError> {
        let mut state = self.state.lock();
        state.pins.entry(pin).or_default();
        state.exported.insert(pin);
        state.last_export = Some(pin);
        Ok(())
    }

    fn unexport(&self, pin: u32) -> Result<(), AppError> {
        let mut state = self.state.lock();
        state.exported.remove(&pin);
        state.last_unexport = Some(pin);
        Ok(())
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), AppError> {
        let mut state = self.state.lock();
        let entry = state
            .pins
            .get_mut(&pin)
            .ok_or_else(|| AppError::Gpio(format!("pin {pin} has no direction file")))?;
        entry.direction = Some(direction);
        Ok(())
    }

    fn get_value(&self, pin: u32) -> Result<String, AppError> {
        let state = self.state.lock();
        state
            .pins
            .get(&pin)
            .map(|p| p.value.clone())
            .ok_or_else(|| AppError::Gpio(format!("pin {pin} has no value file")))
    }

    fn set_value(&self, pin: u32, value: u8) -> Result<(), AppError> {
        let mut state = self.state.lock();
        let entry = state
            .pins
            .get_mut(&pin)
            .ok_or_else(|| AppError::Gpio(format!("pin {pin} has no value file")))?;
        entry.value = value.to_string();
        Ok(())
    }

    fn exists(&self, pin: u32) -> bool {
        self.state.lock().exported.contains(&pin)
    }
}
