use std::sync::Arc;

use serde::Serialize;

use crate::config::{InputOptions, OutputOptions};
use crate::error::AppError;
use crate::gpio::{InputPin, OutputPin, Pin};
use crate::registry::PinRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low {
            ActiveLevel::Low
        } else {
            ActiveLevel::High
        }
    }

    pub fn from_pullup(pullup: bool) -> Self {
        Self::from_active_low(pullup)
    }

    pub fn level_for(self, on: bool) -> u8 {
        match self {
            ActiveLevel::High => u8::from(on),
            ActiveLevel::Low => u8::from(!on),
        }
    }

    pub fn is_active(self, raw: u8) -> bool {
        match self {
            ActiveLevel::High => raw != 0,
            ActiveLevel::Low => raw == 0,
        }
    }
}

pub struct OutputDevice {
    pin: OutputPin,
    active_level: ActiveLevel,
    is_on: bool,
}

impl OutputDevice {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: OutputOptions,
    ) -> Result<Self, AppError> {
        let pin = OutputPin::new(registry, pin, options.pin_options())?;
        let mut device = Self {
            pin,
            active_level: ActiveLevel::from_active_low(options.active_low),
            is_on: options.initial_state.is_on(),
        };

        let level = device.active_level.level_for(device.is_on);
        device.pin.write(level)?;
        Ok(device)
    }

    pub fn pin(&self) -> &OutputPin {
        &self.pin
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.active_level
    }

    pub fn raw_value(&self) -> Option<u8> {
        self.pin.value()
    }

    pub fn on(&mut self) -> Result<(), AppError> {
        self.pin.write(self.active_level.level_for(true))?;
        self.is_on = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), AppError> {
        self.pin.write(self.active_level.level_for(false))?;
        self.is_on = false;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), AppError> {
        let level = self.pin.value().unwrap_or(0) ^ 1;
        self.pin.write(level)?;
        self.is_on = self.active_level.is_active(level);
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn destroy(&mut self) -> Result<(), AppError> {
        self.pin.destroy()
    }
}

pub trait Actuator {
    fn output(&self) -> &OutputDevice;
    fn output_mut(&mut self) -> &mut OutputDevice;

    fn on(&mut self) -> Result<(), AppError> {
        self.output_mut().on()
    }

    fn off(&mut self) -> Result<(), AppError> {
        self.output_mut().off()
    }

    fn toggle(&mut self) -> Result<(), AppError> {
        self.output_mut().toggle()
    }

    fn is_on(&self) -> bool {
        self.output().is_on()
    }

    fn raw_value(&self) -> Option<u8> {
        self.output().raw_value()
    }

    fn destroy(&mut self) -> Result<(), AppError> {
        self.output_mut().destroy()
    }
}

impl Actuator for OutputDevice {
    fn output(&self) -> &OutputDevice {
        self
    }

    fn output_mut(&mut self) -> &mut OutputDevice {
        self
    }
}

pub struct Led {
    output: OutputDevice,
}

impl Led {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: OutputOptions,
    ) -> Result<Self, AppError> {
        Ok(Self {
            output: OutputDevice::new(registry, pin, options)?,
        })
    }

    pub fn is_lit(&self) -> bool {
        self.output.is_on()
    }
}

impl Actuator for Led {
    fn output(&self) -> &OutputDevice {
        &self.output
    }

    fn output_mut(&mut self) -> &mut OutputDevice {
        &mut self.output
    }
}

pub struct Relay {
    output: OutputDevice,
}

impl Relay {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: OutputOptions,
    ) -> Result<Self, AppError> {
        Ok(Self {
            output: OutputDevice::new(registry, pin, options)?,
        })
    }
}

impl Actuator for Relay {
    fn output(&self) -> &OutputDevice {
        &self.output
    }

    fn output_mut(&mut self) -> &mut OutputDevice {
        &mut self.output
    }
}

pub struct Buzzer {
    output: OutputDevice,
}

impl Buzzer {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: OutputOptions,
    ) -> Result<Self, AppError> {
        Ok(Self {
            output: OutputDevice::new(registry, pin, options)?,
        })
    }

    // TODO: needs a timed on/off cycle on OutputDevice, which LED blinking would share.
    pub fn beep(&mut self) -> Result<(), AppError> {
        Err(AppError::NotImplemented("beep"))
    }
}

impl Actuator for Buzzer {
    fn output(&self) -> &OutputDevice {
        &self.output
    }

    fn output_mut(&mut self) -> &mut OutputDevice {
        &mut self.output
    }
}

/// A two-state input contact. Every query reads the pin.
pub struct Switch {
    pin: InputPin,
    active_level: ActiveLevel,
}

impl Switch {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: InputOptions,
    ) -> Result<Self, AppError> {
        Ok(Self {
            pin: InputPin::new(registry, pin, options.pin_options())?,
            active_level: ActiveLevel::from_pullup(options.pullup),
        })
    }

    pub fn pin(&self) -> &InputPin {
        &self.pin
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.active_level
    }

    pub fn raw_value(&self) -> Option<u8> {
        self.pin.value()
    }

    pub fn is_on(&mut self) -> Result<bool, AppError> {
        let raw = self.pin.read()?;
        Ok(self.active_level.is_active(raw))
    }

    pub fn destroy(&mut self) -> Result<(), AppError> {
        self.pin.destroy()
    }
}

pub struct Button {
    switch: Switch,
}

impl Button {
    pub fn new(
        registry: Arc<PinRegistry>,
        pin: u32,
        options: InputOptions,
    ) -> Result<Self, AppError> {
        Ok(Self {
            switch: Switch::new(registry, pin, options)?,
        })
    }

    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    pub fn is_pressed(&mut self) -> Result<bool, AppError> {
        self.switch.is_on()
    }

    pub fn is_on(&mut self) -> Result<bool, AppError> {
        self.switch.is_on()
    }

    pub fn raw_value(&self) -> Option<u8> {
        self.switch.raw_value()
    }

    pub fn destroy(&mut self) -> Result<(), AppError> {
        self.switch.destroy()
    }
}
