use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{AppConfig, DeviceConfig, DeviceKind};
use crate::device::{Actuator, Button, Buzzer, Led, Relay, Switch};
use crate::error::AppError;
use crate::gpio::Pin;
use crate::registry::{PinRegistry, PinStatus};

pub enum Device {
    Led(Led),
    Relay(Relay),
    Buzzer(Buzzer),
    Switch(Switch),
    Button(Button),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeviceState {
    pub on: bool,
    pub raw: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    pub pin: u32,
    pub state: DeviceState,
}

impl Device {
    pub fn build(registry: Arc<PinRegistry>, cfg: &DeviceConfig) -> Result<Self, AppError> {
        let device = match cfg.kind {
            DeviceKind::Led => Device::Led(Led::new(registry, cfg.pin, cfg.output_options())?),
            DeviceKind::Relay => {
                Device::Relay(Relay::new(registry, cfg.pin, cfg.output_options())?)
            }
            DeviceKind::Buzzer => {
                Device::Buzzer(Buzzer::new(registry, cfg.pin, cfg.output_options())?)
            }
            DeviceKind::Switch => {
                Device::Switch(Switch::new(registry, cfg.pin, cfg.input_options())?)
            }
            DeviceKind::Button => {
                Device::Button(Button::new(registry, cfg.pin, cfg.input_options())?)
            }
        };
        Ok(device)
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Led(_) => DeviceKind::Led,
            Device::Relay(_) => DeviceKind::Relay,
            Device::Buzzer(_) => DeviceKind::Buzzer,
            Device::Switch(_) => DeviceKind::Switch,
            Device::Button(_) => DeviceKind::Button,
        }
    }

    pub fn pin(&self) -> u32 {
        match self {
            Device::Led(d) => d.output().pin().number(),
            Device::Relay(d) => d.output().pin().number(),
            Device::Buzzer(d) => d.output().pin().number(),
            Device::Switch(d) => d.pin().number(),
            Device::Button(d) => d.switch().pin().number(),
        }
    }

    fn actuator_mut(&mut self) -> Option<&mut dyn Actuator> {
        match self {
            Device::Led(d) => Some(d as &mut dyn Actuator),
            Device::Relay(d) => Some(d as &mut dyn Actuator),
            Device::Buzzer(d) => Some(d as &mut dyn Actuator),
            Device::Switch(_) | Device::Button(_) => None,
        }
    }

    pub fn state(&mut self) -> Result<DeviceState, AppError> {
        match self {
            Device::Switch(d) => Ok(DeviceState {
                on: d.is_on()?,
                raw: d.raw_value(),
            }),
            Device::Button(d) => Ok(DeviceState {
                on: d.is_pressed()?,
                raw: d.raw_value(),
            }),
            Device::Led(d) => Ok(actuator_state(&*d)),
            Device::Relay(d) => Ok(actuator_state(&*d)),
            Device::Buzzer(d) => Ok(actuator_state(&*d)),
        }
    }

    pub fn destroy(&mut self) -> Result<(), AppError> {
        match self {
            Device::Led(d) => d.destroy(),
            Device::Relay(d) => d.destroy(),
            Device::Buzzer(d) => d.destroy(),
            Device::Switch(d) => d.destroy(),
            Device::Button(d) => d.destroy(),
        }
    }
}

fn actuator_state<A: Actuator>(device: &A) -> DeviceState {
    DeviceState {
        on: device.is_on(),
        raw: device.raw_value(),
    }
}

pub struct DeviceManager {
    registry: Arc<PinRegistry>,
    devices: FxHashMap<String, Mutex<Device>>,
}

impl DeviceManager {
    pub fn new(config: &AppConfig, registry: Arc<PinRegistry>) -> Result<Self, AppError> {
        let mut devices: FxHashMap<String, Mutex<Device>> = FxHashMap::default();

        for (name, cfg) in &config.devices {
            match Device::build(registry.clone(), cfg) {
                Ok(device) => {
                    info!("{name}: {:?} on pin {}", cfg.kind, cfg.pin);
                    devices.insert(name.clone(), Mutex::new(device));
                }
                Err(e) => {
                    warn!("device {name} on pin {}: {e}", cfg.pin);
                    // release what was already exported before bailing out
                    teardown(&devices);
                    return Err(e);
                }
            }
        }

        Ok(Self { registry, devices })
    }

    fn device(&self, name: &str) -> Result<&Mutex<Device>, AppError> {
        self.devices
            .get(name)
            .ok_or_else(|| AppError::NotFoundDevice(name.to_string()))
    }

    fn with_actuator<F>(&self, name: &str, op: F) -> Result<DeviceState, AppError>
    where
        F: FnOnce(&mut dyn Actuator) -> Result<(), AppError>,
    {
        let mut device = self.device(name)?.lock();
        let actuator = device
            .actuator_mut()
            .ok_or_else(|| AppError::Direction(format!("device {name} is an input")))?;
        op(actuator)?;
        device.state()
    }

    pub async fn list_pins(&self) -> Vec<PinStatus> {
        self.registry.pins()
    }

    pub async fn list_devices(&self) -> Result<BTreeMap<String, DeviceDescriptor>, AppError> {
        let mut out = BTreeMap::new();
        for (name, lock) in &self.devices {
            let mut device = lock.lock();
            out.insert(name.clone(), describe(&mut device)?);
        }
        Ok(out)
    }

    pub async fn get_device(&self, name: &str) -> Result<DeviceDescriptor, AppError> {
        let mut device = self.device(name)?.lock();
        describe(&mut device)
    }

    pub async fn device_state(&self, name: &str) -> Result<DeviceState, AppError> {
        self.device(name)?.lock().state()
    }

    pub async fn turn_on(&self, name: &str) -> Result<DeviceState, AppError> {
        self.with_actuator(name, |a| a.on())
    }

    pub async fn turn_off(&self, name: &str) -> Result<DeviceState, AppError> {
        self.with_actuator(name, |a| a.off())
    }

    pub async fn toggle(&self, name: &str) -> Result<DeviceState, AppError> {
        self.with_actuator(name, |a| a.toggle())
    }

    pub async fn beep(&self, name: &str) -> Result<(), AppError> {
        let mut device = self.device(name)?.lock();
        match &mut *device {
            Device::Buzzer(buzzer) => buzzer.beep(),
            other => Err(AppError::InvalidValue(format!(
                "device {name} is a {:?}, not a buzzer",
                other.kind()
            ))),
        }
    }

    /// Unexports every device. Failures are logged so the rest still get released.
    pub fn shutdown(&self) {
        teardown(&self.devices);
    }

    pub fn release_on_error<T>(&self, bind: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
        bind().inspect_err(|e| {
            warn!("startup failed, releasing GPIO pins: {e}");
            self.shutdown();
        })
    }
}

fn describe(device: &mut Device) -> Result<DeviceDescriptor, AppError> {
    Ok(DeviceDescriptor {
        kind: device.kind(),
        pin: device.pin(),
        state: device.state()?,
    })
}

fn teardown(devices: &FxHashMap<String, Mutex<Device>>) {
    for (name, lock) in devices {
        let mut device = lock.lock();
        if let Err(e) = device.destroy() {
            warn!("failed to release {name} on pin {}: {e}", device.pin());
        }
    }
}
