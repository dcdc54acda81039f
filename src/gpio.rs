use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PinOptions;
use crate::error::AppError;
use crate::registry::PinRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "in")]
    Input,
    #[serde(rename = "out")]
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "in",
            Direction::Output => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implementations do no validation of their own: direction and ownership
/// rules are enforced by [`GpioPin`] and [`PinRegistry`] before a call gets here.
pub trait GpioBackend: Send + Sync {
    fn export(&self, pin: u32) -> Result<(), AppError>;
    fn unexport(&self, pin: u32) -> Result<(), AppError>;
    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), AppError>;
    fn get_value(&self, pin: u32) -> Result<String, AppError>;
    fn set_value(&self, pin: u32, value: u8) -> Result<(), AppError>;
    fn exists(&self, pin: u32) -> bool;
}

pub struct GpioPin {
    pin: u32,
    direction: Direction,
    value: Option<u8>,
    exported: bool,
    registry: Arc<PinRegistry>,
}

impl GpioPin {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        direction: Direction,
        options: PinOptions,
    ) -> Result<Self, AppError> {
        registry.validate_pin(pin)?;
        if !options.skip_verify {
            registry.check_not_in_use(pin)?;
        }

        registry.claim(pin)?;
        let mut gpio = Self {
            pin,
            direction,
            value: None,
            exported: true,
            registry,
        };
        gpio.set_direction(direction)?;

        Ok(gpio)
    }

    pub fn number(&self) -> u32 {
        self.pin
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<(), AppError> {
        self.registry.backend().set_direction(self.pin, direction)?;
        debug!("pin {} direction set to {direction}", self.pin);
        self.direction = direction;
        Ok(())
    }

    pub fn read(&mut self) -> Result<u8, AppError> {
        if self.direction == Direction::Output {
            return Err(AppError::Direction(format!(
                "Cannot read from pin {} because it is configured as an output",
                self.pin
            )));
        }

        let raw = self.registry.backend().get_value(self.pin)?;
        let value = match raw.trim() {
            "0" => 0,
            "1" => 1,
            _ => {
                return Err(AppError::InvalidValue(format!(
                    "pin {} reported value {raw:?}",
                    self.pin
                )));
            }
        };
        self.value = Some(value);
        Ok(value)
    }

    pub fn write(&mut self, value: u8) -> Result<(), AppError> {
        if self.direction == Direction::Input {
            return Err(AppError::Direction(format!(
                "Cannot write to pin {} because it is configured as an input",
                self.pin
            )));
        }

        let value = u8::from(value != 0);
        self.registry.backend().set_value(self.pin, value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Returns the pin to input mode and unexports it. Safe to call twice.
    pub fn destroy(&mut self) -> Result<(), AppError> {
        self.set_direction(Direction::Input)?;
        self.registry.release(self.pin)?;
        self.exported = false;
        Ok(())
    }
}

pub trait Pin {
    fn gpio(&self) -> &GpioPin;
    fn gpio_mut(&mut self) -> &mut GpioPin;

    fn number(&self) -> u32 {
        self.gpio().number()
    }

    fn direction(&self) -> Direction {
        self.gpio().direction()
    }

    fn value(&self) -> Option<u8> {
        self.gpio().value()
    }

    fn read(&mut self) -> Result<u8, AppError> {
        self.gpio_mut().read()
    }

    fn write(&mut self, value: u8) -> Result<(), AppError> {
        self.gpio_mut().write(value)
    }

    fn destroy(&mut self) -> Result<(), AppError> {
        self.gpio_mut().destroy()
    }
}

impl Pin for GpioPin {
    fn gpio(&self) -> &GpioPin {
        self
    }

    fn gpio_mut(&mut self) -> &mut GpioPin {
        self
    }
}

pub struct InputPin {
    gpio: GpioPin,
}

impl InputPin {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: PinOptions,
    ) -> Result<Self, AppError> {
        let mut gpio = GpioPin::new(registry, pin, Direction::Input, options)?;
        gpio.read()?;
        Ok(Self { gpio })
    }
}

impl Pin for InputPin {
    fn gpio(&self) -> &GpioPin {
        &self.gpio
    }

    fn gpio_mut(&mut self) -> &mut GpioPin {
        &mut self.gpio
    }

    fn write(&mut self, _value: u8) -> Result<(), AppError> {
        Err(AppError::Direction(format!(
            "Cannot write to input pin {}",
            self.gpio.number()
        )))
    }
}

pub struct OutputPin {
    gpio: GpioPin,
}

impl OutputPin {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: PinOptions,
    ) -> Result<Self, AppError> {
        let gpio = GpioPin::new(registry, pin, Direction::Output, options)?;
        Ok(Self { gpio })
    }
}

impl Pin for OutputPin {
    fn gpio(&self) -> &GpioPin {
        &self.gpio
    }

    fn gpio_mut(&mut self) -> &mut GpioPin {
        &mut self.gpio
    }

    fn read(&mut self) -> Result<u8, AppError> {
        Err(AppError::Direction(format!(
            "Cannot read from output pin {}",
            self.gpio.number()
        )))
    }
}
