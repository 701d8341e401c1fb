//! Simulation configuration, layered from an embedded default, an
//! optional override file, and the environment via the `config` crate.
//! Plain value-passing rather than a global: this crate runs one
//! simulation per process invocation.

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{ErrorKind, Kind, Result};
use crate::types::Duration;

/// The embedded baseline configuration, overridable by a user-supplied
/// TOML file and then by `ELEVSIM_*` environment variables.
pub const DEFAULT_CONFIG: &str = include_str!("../resources/default_config.toml");

/// Physical and policy constants for one simulation run.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConstants {
    pub floors: usize,
    pub elevator_count: usize,
    pub capacity: usize,
    pub t_velocity: f64,
    pub t_accel: f64,
    pub t_door: f64,
    pub t_door_wait: f64,
    pub t_person: f64,
    pub seed: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl SimConstants {
    /// Load the embedded defaults, then merge a config file and
    /// environment overrides, then validate.
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(path) = config_file {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("ELEVSIM"))
            .build()
            .kind(ErrorKind::InvalidConfig)?;

        let constants: SimConstants = settings.try_deserialize().kind(ErrorKind::InvalidConfig)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn t_velocity(&self) -> Duration {
        Duration(self.t_velocity)
    }

    pub fn t_accel(&self) -> Duration {
        Duration(self.t_accel)
    }

    pub fn t_door(&self) -> Duration {
        Duration(self.t_door)
    }

    pub fn t_door_wait(&self) -> Duration {
        Duration(self.t_door_wait)
    }

    pub fn t_person(&self) -> Duration {
        Duration(self.t_person)
    }

    /// Reject fewer than two floors, no elevator capacity, no elevators,
    /// or any negative timing constant.
    fn validate(&self) -> Result<()> {
        if self.floors < 2 {
            return Err(anyhow::anyhow!("floors must be at least 2, got {}", self.floors)).kind(ErrorKind::InvalidConfig);
        }
        if self.elevator_count < 1 {
            return Err(anyhow::anyhow!("elevator_count must be at least 1, got {}", self.elevator_count))
                .kind(ErrorKind::InvalidConfig);
        }
        if self.capacity < 1 {
            return Err(anyhow::anyhow!("capacity must be at least 1, got {}", self.capacity)).kind(ErrorKind::InvalidConfig);
        }
        for (name, value) in [
            ("t_velocity", self.t_velocity),
            ("t_accel", self.t_accel),
            ("t_door", self.t_door),
            ("t_door_wait", self.t_door_wait),
            ("t_person", self.t_person),
        ] {
            if value < 0.0 {
                return Err(anyhow::anyhow!("{} must be non-negative, got {}", name, value)).kind(ErrorKind::InvalidConfig);
            }
        }
        Ok(())
    }
}
