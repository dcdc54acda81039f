use std::{fs, path::Path, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SysfsConfig {
    pub root: PathBuf,
    pub export: PathBuf,
    pub unexport: PathBuf,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class/gpio"),
            export: PathBuf::from("/sys/class/gpio/gpiochip0/subsystem/export"),
            unexport: PathBuf::from("/sys/class/gpio/gpiochip0/subsystem/unexport"),
        }
    }
}

impl SysfsConfig {
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            export: root.join("export"),
            unexport: root.join("unexport"),
            root,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    On,
    #[default]
    Off,
}

impl InitialState {
    pub fn is_on(self) -> bool {
        self == InitialState::On
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PinOptions {
    #[serde(alias = "skipVerify")]
    pub skip_verify: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputOptions {
    pub initial_state: InitialState,
    pub active_low: bool,
    #[serde(alias = "skipVerify")]
    pub skip_verify: bool,
}

impl OutputOptions {
    pub fn pin_options(&self) -> PinOptions {
        PinOptions {
            skip_verify: self.skip_verify,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct InputOptions {
    pub pullup: bool,
    #[serde(alias = "skipVerify")]
    pub skip_verify: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            pullup: true,
            skip_verify: false,
        }
    }
}

impl InputOptions {
    pub fn pin_options(&self) -> PinOptions {
        PinOptions {
            skip_verify: self.skip_verify,
        }
    }
}

#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    Led,
    Relay,
    Buzzer,
    Switch,
    Button,
}

fn default_pullup() -> bool {
    true
}

/// One configured device. Options that do not apply to `kind` are ignored.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    pub pin: u32,
    #[serde(default)]
    pub initial_state: InitialState,
    #[serde(default)]
    pub active_low: bool,
    #[serde(default = "default_pullup")]
    pub pullup: bool,
    #[serde(default, alias = "skipVerify")]
    pub skip_verify: bool,
}

impl DeviceConfig {
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            initial_state: self.initial_state,
            active_low: self.active_low,
            skip_verify: self.skip_verify,
        }
    }

    pub fn input_options(&self) -> InputOptions {
        InputOptions {
            pullup: self.pullup,
            skip_verify: self.skip_verify,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    #[serde(default)]
    pub sysfs: SysfsConfig,
    #[serde(default)]
    pub devices: FxHashMap<String, DeviceConfig>,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, AppError> {
        serde_json::from_str(contents)
            .map_err(|e| AppError::Config(format!("Invalid config json: {e}")))
    }
}
