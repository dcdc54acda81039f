use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::AppError;
use crate::gpio::GpioBackend;

pub const VALID_PINS: [u32; 13] = [0, 1, 6, 7, 12, 13, 14, 18, 19, 20, 21, 23, 26];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PinStatus {
    pub pin: u32,
    pub claimed: bool,
    pub exported: bool,
}

pub struct PinRegistry {
    backend: Arc<dyn GpioBackend>,
    claimed: Mutex<FxHashSet<u32>>,
}

impl PinRegistry {
    pub fn new(backend: Arc<dyn GpioBackend>) -> Self {
        Self {
            backend,
            claimed: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn backend(&self) -> &dyn GpioBackend {
        self.backend.as_ref()
    }

    pub fn validate_pin(&self, pin: u32) -> Result<(), AppError> {
        if VALID_PINS.contains(&pin) {
            Ok(())
        } else {
            Err(AppError::InvalidPin(pin.to_string()))
        }
    }

    pub fn parse_pin(&self, text: &str) -> Result<u32, AppError> {
        let pin = text
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::InvalidPin(text.to_string()))?;
        self.validate_pin(pin)?;
        Ok(pin)
    }

    pub fn check_not_in_use(&self, pin: u32) -> Result<(), AppError> {
        if self.claimed.lock().contains(&pin) || self.backend.exists(pin) {
            return Err(AppError::PinInUse(pin));
        }
        Ok(())
    }

    pub(crate) fn claim(&self, pin: u32) -> Result<(), AppError> {
        self.backend.export(pin)?;
        self.claimed.lock().insert(pin);
        debug!("pin {pin} exported");
        Ok(())
    }

    pub(crate) fn release(&self, pin: u32) -> Result<(), AppError> {
        self.backend.unexport(pin)?;
        self.claimed.lock().remove(&pin);
        debug!("pin {pin} unexported");
        Ok(())
    }

    pub fn pins(&self) -> Vec<PinStatus> {
        let claimed = self.claimed.lock();
        VALID_PINS
            .iter()
            .map(|&pin| PinStatus {
                pin,
                claimed: claimed.contains(&pin),
                exported: self.backend.exists(pin),
            })
            .collect()
    }
}
