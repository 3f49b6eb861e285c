use std::path::{Path, PathBuf};

use serde::Deserialize;

use rovax_core::algorithm::Pid;

use crate::robot::SensorKind;

/// Runtime configuration.
///
/// The configuration is read from an on disk TOML file. Every field
/// carries a default so a missing file yields a functional virtual
/// machine. Command line switches override the file afterwards.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether the machine is allowed to move.
    pub enable_motion: bool,

    /// Whether telemetrics are recorded to disk.
    pub enable_trace: bool,

    /// Whether the daemon only validates its setup, then exits.
    #[serde(skip)]
    pub enable_test: bool,

    /// Number of runtime workers.
    pub runtime_workers: usize,

    /// Directory holding route plan files.
    pub route_dir: PathBuf,

    /// Directory receiving trace files.
    pub trace_dir: PathBuf,

    /// Vehicle geometry and powertrain.
    pub vehicle: VehicleConfig,

    /// Odometry sensor arrangement.
    pub odometry: OdometryConfig,

    /// Straight drive regulator.
    pub lateral_pid: Pid,

    /// In place turn regulator.
    pub turn_pid: Pid,

    /// Mission to execute on startup.
    pub mission: MissionConfig,
}

impl Config {
    /// Read the configuration from the first existing candidate path.
    ///
    /// When none of the candidates exist the default configuration is
    /// returned. A candidate that exists but fails to parse is an error.
    pub fn try_from_file<T: AsRef<Path>>(candidates: Vec<T>) -> std::io::Result<Self> {
        for candidate in candidates {
            if candidate.as_ref().exists() {
                let contents = std::fs::read_to_string(candidate)?;
                return toml::from_str(&contents)
                    .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err));
            }
        }

        Ok(Self::default())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_motion: true,
            enable_trace: false,
            enable_test: false,
            runtime_workers: 4,
            route_dir: PathBuf::from("routes"),
            trace_dir: PathBuf::from("."),
            vehicle: VehicleConfig::default(),
            odometry: OdometryConfig::default(),
            lateral_pid: Pid::with_bounds(6.0, 0.0, 0.0065, 10.0, 127.0),
            turn_pid: Pid::with_bounds(54.0, 0.017, 0.002, 10.0, 127.0),
            mission: MissionConfig::default(),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Motion: {}; Trace: {}; Workers: {}; Route directory: {}",
            if self.enable_motion {
                "enabled"
            } else {
                "disabled"
            },
            if self.enable_trace {
                "enabled"
            } else {
                "disabled"
            },
            self.runtime_workers,
            self.route_dir.to_string_lossy(),
        )
    }
}

/// Vehicle geometry and powertrain parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Drivetrain topology.
    pub drive: DriveKind,

    /// Distance between the drive sides.
    pub track_width: f64,

    /// Drive motor cruise speed in revolutions per minute.
    pub rpm: f64,

    /// Drive wheel diameter.
    pub wheel_diameter: f64,

    /// Input to output ratio of the drive gearing.
    pub gear_ratio: f64,

    /// Regulate straight drives on motor encoders instead of pose.
    pub use_motor_encoders: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            drive: DriveKind::Differential,
            track_width: 16.0,
            rpm: 450.0,
            wheel_diameter: 3.25,
            gear_ratio: 0.75,
            use_motor_encoders: false,
        }
    }
}

/// Supported drivetrain topologies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveKind {
    /// Two independently driven sides.
    Differential,
    /// Four mecanum wheels.
    Holonomic,
}

/// Odometry sensor arrangement.
///
/// Any tracker slot may be left empty. The pose fuser adapts to
/// whatever arrangement is present. Slots absent from a provided
/// section stay empty.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct OdometryConfig {
    /// Right side tracking wheel.
    #[serde(default)]
    pub right: Option<TrackerConfig>,

    /// Left side tracking wheel.
    #[serde(default)]
    pub left: Option<TrackerConfig>,

    /// Perpendicular tracking wheel ahead of the rotation center.
    #[serde(default)]
    pub front: Option<TrackerConfig>,

    /// Perpendicular tracking wheel behind the rotation center.
    #[serde(default)]
    pub back: Option<TrackerConfig>,

    /// Whether an inertial unit provides absolute heading.
    #[serde(default = "OdometryConfig::default_inertial")]
    pub inertial: bool,

    /// Add measurement noise to virtual encoders.
    #[serde(default)]
    pub jitter: bool,
}

impl OdometryConfig {
    fn default_inertial() -> bool {
        true
    }
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            right: Some(TrackerConfig {
                kind: SensorKind::Rotary,
                wheel_diameter: 2.75,
                gear_ratio: 1.0,
                offset: 8.0,
                direction: 1,
            }),
            left: Some(TrackerConfig {
                kind: SensorKind::Rotary,
                wheel_diameter: 2.75,
                gear_ratio: 1.0,
                offset: 8.0,
                direction: 1,
            }),
            front: None,
            back: Some(TrackerConfig {
                kind: SensorKind::Rotary,
                wheel_diameter: 2.75,
                gear_ratio: 1.0,
                offset: 4.0,
                direction: -1,
            }),
            inertial: true,
            jitter: false,
        }
    }
}

/// A single tracking wheel.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TrackerConfig {
    /// Sensor behind the tracking wheel.
    #[serde(default = "TrackerConfig::default_kind")]
    pub kind: SensorKind,

    /// Tracking wheel diameter.
    pub wheel_diameter: f64,

    /// Sensor to wheel gear ratio.
    #[serde(default = "TrackerConfig::default_gear_ratio")]
    pub gear_ratio: f64,

    /// Mounting distance from the rotation center.
    #[serde(default)]
    pub offset: f64,

    /// Counting direction, 1 or -1.
    #[serde(default = "TrackerConfig::default_direction")]
    pub direction: i32,
}

impl TrackerConfig {
    fn default_kind() -> SensorKind {
        SensorKind::Rotary
    }

    fn default_gear_ratio() -> f64 {
        1.0
    }

    fn default_direction() -> i32 {
        1
    }
}

/// Mission to execute on startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Route plan name, resolved against the route directory.
    pub route: Option<String>,

    /// Start pose as x, y and heading in radians.
    pub start: [f64; 3],
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            route: None,
            start: [0.0, 0.0, 0.0],
        }
    }
}
