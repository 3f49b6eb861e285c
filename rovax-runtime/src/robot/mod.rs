use std::f64::consts::PI;

use serde::Deserialize;

use rovax_core::angle::signum;

use crate::config::{OdometryConfig, TrackerConfig, VehicleConfig};

pub mod odometry;

/// Sensor kind behind a tracking wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Absolute rotation sensor counting centidegrees.
    Rotary,
    /// Quadrature encoder counting degrees.
    Quadrature,
    /// Integrated motor encoder counting degrees.
    Motor,
}

impl SensorKind {
    /// Sensor counts for one full wheel rotation.
    pub fn unit(self) -> f64 {
        match self {
            SensorKind::Rotary => 36_000.0,
            SensorKind::Quadrature | SensorKind::Motor => 360.0,
        }
    }
}

/// A tracking wheel.
///
/// Converts a raw sensor reading into the linear distance the wheel
/// travelled since its sensor was zeroed.
#[derive(Clone, Copy, Debug)]
pub struct Tracker {
    kind: SensorKind,
    wheel_diameter: f64,
    gear_ratio: f64,
    offset: f64,
    direction: i32,
}

impl Tracker {
    pub fn new(
        kind: SensorKind,
        wheel_diameter: f64,
        gear_ratio: f64,
        offset: f64,
        direction: i32,
    ) -> Self {
        Self {
            kind,
            wheel_diameter,
            gear_ratio,
            offset,
            direction,
        }
    }

    /// Linear distance for a raw sensor reading.
    pub fn distance_travelled(&self, raw: f64) -> f64 {
        signum(self.direction as f64)
            * raw
            * ((self.wheel_diameter * self.gear_ratio * PI) / self.kind.unit())
    }

    /// Raw sensor reading for a linear distance.
    ///
    /// Inverse of [`Self::distance_travelled`], without the counting
    /// direction applied.
    pub fn raw_from_distance(&self, distance: f64) -> f64 {
        distance * (self.kind.unit() / (self.wheel_diameter * self.gear_ratio * PI))
    }

    /// Mounting distance from the rotation center.
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl From<TrackerConfig> for Tracker {
    fn from(config: TrackerConfig) -> Self {
        Self::new(
            config.kind,
            config.wheel_diameter,
            config.gear_ratio,
            config.offset,
            config.direction,
        )
    }
}

/// The tracking wheels and heading sensor mounted on the vehicle.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackerGroup {
    /// Right side tracking wheel.
    pub right: Option<Tracker>,
    /// Left side tracking wheel.
    pub left: Option<Tracker>,
    /// Perpendicular tracking wheel ahead of the rotation center.
    pub front: Option<Tracker>,
    /// Perpendicular tracking wheel behind the rotation center.
    pub back: Option<Tracker>,
    /// Whether an inertial unit provides absolute heading.
    pub inertial: bool,
}

impl From<&OdometryConfig> for TrackerGroup {
    fn from(config: &OdometryConfig) -> Self {
        Self {
            right: config.right.map(Tracker::from),
            left: config.left.map(Tracker::from),
            front: config.front.map(Tracker::from),
            back: config.back.map(Tracker::from),
            inertial: config.inertial,
        }
    }
}

/// Differential drive base.
///
/// Owns the geometry and powertrain parameters and converts between
/// linear distance and drive motor position.
#[derive(Clone, Copy, Debug)]
pub struct Drivetrain {
    track_width: f64,
    rpm: f64,
    wheel_diameter: f64,
    gear_ratio: f64,
}

impl Drivetrain {
    pub fn new(track_width: f64, rpm: f64, wheel_diameter: f64, gear_ratio: f64) -> Self {
        Self {
            track_width,
            rpm,
            wheel_diameter,
            gear_ratio,
        }
    }

    /// Distance between the drive sides.
    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    /// Drive motor position for a linear distance.
    pub fn distance_to_position(&self, distance: f64) -> f64 {
        distance / ((self.gear_ratio * self.wheel_diameter * PI) / 360.0)
    }

    /// Linear distance for a drive motor position.
    pub fn position_to_distance(&self, position: f64) -> f64 {
        ((self.gear_ratio * self.wheel_diameter * PI) / 360.0) * position
    }

    /// Top linear speed of the drive base.
    pub fn max_velocity(&self) -> f64 {
        PI * self.wheel_diameter * (self.rpm / 60.0)
    }
}

impl From<&VehicleConfig> for Drivetrain {
    fn from(config: &VehicleConfig) -> Self {
        Self::new(
            config.track_width,
            config.rpm,
            config.wheel_diameter,
            config.gear_ratio,
        )
    }
}
