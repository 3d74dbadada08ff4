//! Lateral control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{ControlMode, LatCtrlError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slowest allowed control cycle frequency, keeps the cycle period
/// representable as a `Duration`.
///
/// Units: Hz
pub const MIN_FREQ_HZ: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lateral control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Control mode, either `"PID"` to follow the planned path or `"File"` to
    /// replay `control_file`.
    pub control_mode: String,

    /// Recording to replay in `"File"` mode. Relative paths are taken from
    /// the params directory. If empty the mode is forced to `"PID"`.
    #[serde(default)]
    pub control_file: String,

    /// Gain on the y/x ratio of the target point
    #[serde(default = "default_gain")]
    pub steering_gain: f64,

    /// Gain on the base throttle demand
    #[serde(default = "default_gain")]
    pub throttle_gain: f64,

    /// Frequency of the control cycle.
    ///
    /// Units: Hz
    #[serde(default = "default_freq_hz")]
    pub freq_hz: f64,

    /// Maximum change in the steering demand in a single cycle.
    #[serde(default = "default_max_steering_step")]
    pub max_steering_step: f64,

    /// Throttle demand before the gain is applied, when following a path.
    #[serde(default = "default_base_throttle")]
    pub base_throttle: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Get the control mode these parameters select.
    ///
    /// An empty `control_file` always selects `LivePath`.
    pub fn control_mode(&self) -> Result<ControlMode, LatCtrlError> {
        match self.control_mode.as_str() {
            "PID" => Ok(ControlMode::LivePath),
            "File" if self.control_file.is_empty() => {
                log::warn!("\"File\" control mode requested with no control_file, using \"PID\"");
                Ok(ControlMode::LivePath)
            }
            "File" => Ok(ControlMode::Playback),
            m => Err(LatCtrlError::ConfigError(format!(
                "unknown control_mode {:?}, expected \"PID\" or \"File\"",
                m
            ))),
        }
    }

    /// Check that all numeric parameters are usable.
    pub fn validate(&self) -> Result<(), LatCtrlError> {
        let finite = [
            ("steering_gain", self.steering_gain),
            ("throttle_gain", self.throttle_gain),
            ("base_throttle", self.base_throttle),
        ];
        for (name, val) in finite.iter() {
            if !val.is_finite() {
                return Err(LatCtrlError::ConfigError(format!(
                    "{} must be finite, found {}",
                    name, val
                )));
            }
        }

        let positive = [
            ("freq_hz", self.freq_hz),
            ("max_steering_step", self.max_steering_step),
        ];
        for (name, val) in positive.iter() {
            if !(val.is_finite() && *val > 0.0) {
                return Err(LatCtrlError::ConfigError(format!(
                    "{} must be positive, found {}",
                    name, val
                )));
            }
        }

        if self.freq_hz < MIN_FREQ_HZ {
            return Err(LatCtrlError::ConfigError(format!(
                "freq_hz must be at least {} Hz, found {}",
                MIN_FREQ_HZ, self.freq_hz
            )));
        }

        Ok(())
    }

    /// Period of the control cycle in seconds.
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.freq_hz
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            control_mode: String::from("PID"),
            control_file: String::new(),
            steering_gain: default_gain(),
            throttle_gain: default_gain(),
            freq_hz: default_freq_hz(),
            max_steering_step: default_max_steering_step(),
            base_throttle: default_base_throttle(),
        }
    }
}

// ---------------------------------------------------------------------------
// DEFAULTS
// ---------------------------------------------------------------------------

fn default_gain() -> f64 {
    1.0
}

fn default_freq_hz() -> f64 {
    10.0
}

fn default_max_steering_step() -> f64 {
    0.1
}

fn default_base_throttle() -> f64 {
    0.55
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_from_toml() {
        let p: Params = toml::from_str("control_mode = \"PID\"").unwrap();

        assert_eq!(p.control_file, "");
        assert_eq!(p.steering_gain, 1.0);
        assert_eq!(p.throttle_gain, 1.0);
        assert_eq!(p.freq_hz, 10.0);
        assert_eq!(p.max_steering_step, 0.1);
        assert_eq!(p.base_throttle, 0.55);
        assert!(p.validate().is_ok());
        assert_eq!(p.control_mode().unwrap(), ControlMode::LivePath);
    }

    #[test]
    fn test_control_mode() {
        let mut p = Params {
            control_mode: String::from("File"),
            ..Default::default()
        };
        assert_eq!(p.control_mode().unwrap(), ControlMode::LivePath);

        p.control_file = String::from("inputs.csv");
        assert_eq!(p.control_mode().unwrap(), ControlMode::Playback);

        p.control_mode = String::from("MPC");
        assert!(matches!(p.control_mode(), Err(LatCtrlError::ConfigError(_))));
    }

    #[test]
    fn test_validate() {
        let bad = [
            Params {
                steering_gain: std::f64::NAN,
                ..Default::default()
            },
            Params {
                throttle_gain: std::f64::INFINITY,
                ..Default::default()
            },
            Params {
                freq_hz: 0.0,
                ..Default::default()
            },
            Params {
                max_steering_step: -0.1,
                ..Default::default()
            },
            Params {
                freq_hz: 1e-300,
                ..Default::default()
            },
        ];

        for p in bad.iter() {
            assert!(matches!(p.validate(), Err(LatCtrlError::ConfigError(_))));
        }
    }

    #[test]
    fn test_cycle_period_fits_duration() {
        for &freq_hz in [MIN_FREQ_HZ, 10.0, 1e300].iter() {
            let p = Params {
                freq_hz,
                ..Default::default()
            };
            assert!(p.validate().is_ok());

            let period = std::time::Duration::from_secs_f64(p.cycle_period_s());
            assert!(period.as_secs_f64() <= 1.0 / MIN_FREQ_HZ);
        }
    }
}
