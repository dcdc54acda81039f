mod backend;
mod config;
mod device;
mod error;
mod gpio;
mod manager;
mod registry;
mod routes;

pub use config::{
    AppConfig, DeviceConfig, DeviceKind, HttpConfig, InitialState, InputOptions, OutputOptions,
    PinOptions, SysfsConfig,
};
pub use device::{ActiveLevel, Actuator, Button, Buzzer, Led, OutputDevice, Relay, Switch};
pub use error::AppError;
pub use gpio::{Direction, GpioBackend, GpioPin, InputPin, OutputPin, Pin};
pub use manager::{Device, DeviceDescriptor, DeviceManager, DeviceState};
pub use registry::{PinRegistry, PinStatus, VALID_PINS};
pub use routes::AppState;

pub use backend::MockGpioBackend;
#[cfg(feature = "sysfs-gpio")]
pub use backend::SysfsBackend;
