use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SysfsConfig;
use crate::error::AppError;
use crate::gpio::{Direction, GpioBackend};

pub struct SysfsBackend {
    root: PathBuf,
    export: PathBuf,
    unexport: PathBuf,
}

impl SysfsBackend {
    pub fn new(config: &SysfsConfig) -> Self {
        Self {
            root: config.root.clone(),
            export: config.export.clone(),
            unexport: config.unexport.clone(),
        }
    }

    pub fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    pub fn value_path(&self, pin: u32) -> PathBuf {
        self.pin_dir(pin).join("value")
    }

    pub fn direction_path(&self, pin: u32) -> PathBuf {
        self.pin_dir(pin).join("direction")
    }

    fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
        fs::write(path, contents)
            .map_err(|e| AppError::Gpio(format!("write {}: {e}", path.display())))
    }
}

impl GpioBackend for SysfsBackend {
    fn export(&self, pin: u32) -> Result<(), AppError> {
        Self::write_file(&self.export, &pin.to_string())
    }

    fn unexport(&self, pin: u32) -> Result<(), AppError> {
        Self::write_file(&self.unexport, &pin.to_string())
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), AppError> {
        Self::write_file(&self.direction_path(pin), direction.as_str())
    }

    fn get_value(&self, pin: u32) -> Result<String, AppError> {
        let path = self.value_path(pin);
        fs::read_to_string(&path)
            .map_err(|e| AppError::Gpio(format!("read {}: {e}", path.display())))
    }

    fn set_value(&self, pin: u32, value: u8) -> Result<(), AppError> {
        Self::write_file(&self.value_path(pin), &value.to_string())
    }

    fn exists(&self, pin: u32) -> bool {
        self.pin_dir(pin).exists()
    }
}
