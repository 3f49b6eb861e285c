use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rovax_core::algorithm::Pid;
use rovax_core::motion::Motion;
use rovax_core::route::{RouteAction, RoutePlan};
use rovax_core::Identity;

use crate::runtime::operand::Operand;
use crate::runtime::program::Program;
use crate::Config;

mod command;
mod drive;
mod navigate;
mod pursuit;
mod turn;

pub use navigate::NavigateProgram;
pub use turn::TurnForProgram;

/// Full scale actuator power.
const POWER_MAX: f64 = 127.0;
/// Rotation speed under which a turn is considered settled.
const TURN_SPEED_FLOOR: f64 = 20.0;

/// Actuator addresses on the motion device.
#[derive(Debug)]
pub enum Actuator {
    LeftDrive = 0,
    RightDrive = 1,
    BedLift = 2,
    BedTilt = 3,
}

impl From<Actuator> for u32 {
    fn from(value: Actuator) -> Self {
        value as u32
    }
}

/// Split drive instruction for the tracked sides.
///
/// Power is expressed in the full scale domain, the sign carries
/// the motion direction.
fn velocity_command(right: f64, left: f64) -> Motion {
    Motion::Change(vec![
        (Actuator::RightDrive.into(), right as i16),
        (Actuator::LeftDrive.into(), left as i16),
    ])
}

/// End position state of the load bed.
///
/// The bed actuators run without position feedback. The state only
/// remembers which end position every attachment was last driven
/// towards.
#[derive(Debug, Default)]
pub struct BedState {
    raised: AtomicBool,
    tilted: AtomicBool,
}

impl BedState {
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    pub fn is_tilted(&self) -> bool {
        self.tilted.load(Ordering::SeqCst)
    }

    /// Flip the lift state, returning the new state.
    fn toggle_raised(&self) -> bool {
        !self.raised.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the tilt state, returning the new state.
    fn toggle_tilted(&self) -> bool {
        !self.tilted.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Carrier vehicle.
///
/// A differential drive carrier with a load bed on its back. The
/// drive sides haul the machine over the plane, the bed attachments
/// lift and tilt the load.
#[derive(Clone)]
pub struct Carrier {
    lateral_pid: Pid,
    turn_pid: Pid,
    track_width: f64,
    use_motor_encoders: bool,
    bed: Arc<BedState>,
}

impl Carrier {
    /// Get the load bed state.
    pub fn bed(&self) -> &BedState {
        &self.bed
    }
}

impl Identity for Carrier {
    /// The introduction message makes it easier to spot the current running
    /// configuration.
    fn intro() -> String {
        format!(
            "Hello, I'm a {} 🚛. Load me up! ⚒️",
            ansi_term::Color::Yellow.paint("carrier")
        )
    }
}

impl Operand for Carrier {
    type MotionPlan = Motion;

    fn from_config(config: &Config) -> Self {
        Self {
            lateral_pid: config.lateral_pid,
            turn_pid: config.turn_pid,
            track_width: config.vehicle.track_width,
            use_motor_encoders: config.vehicle.use_motor_encoders,
            bed: Arc::new(BedState::default()),
        }
    }

    /// Fetch program from the mission action.
    ///
    /// The factory method returns a pointer to the carrier program.
    fn fetch_program(
        &self,
        plan: &RoutePlan,
        action: &RouteAction,
    ) -> Result<Box<dyn Program<MotionPlan = Motion> + Send + Sync>, ()> {
        match action {
            RouteAction::Lateral {
                distance,
                end_tolerance,
                timeout,
            } => Ok(Box::new(drive::LateralProgram::new(
                self.lateral_pid,
                self.track_width,
                *distance,
                *end_tolerance,
                *timeout,
                self.use_motor_encoders,
            ))),

            RouteAction::Turn {
                angle,
                end_tolerance,
                timeout,
            } => Ok(Box::new(turn::TurnProgram::new(
                self.turn_pid,
                *angle,
                *end_tolerance,
                *timeout,
                0,
            ))),

            RouteAction::Follow {
                route_name,
                end_tolerance,
                timeout,
                lookahead,
            } => {
                let route = match plan.routes.get(route_name) {
                    Some(route) => route.clone(),
                    None => return Err(()),
                };

                Ok(Box::new(pursuit::PursuitProgram::new(
                    route,
                    *lookahead,
                    self.lateral_pid.max_speed(),
                    self.track_width,
                    *end_tolerance,
                    *timeout,
                )))
            }

            RouteAction::Command { name } => match name.as_str() {
                "bed_lift" => Ok(Box::new(command::CommandProgram::new(
                    self.bed.clone(),
                    command::BedCommand::Lift,
                ))),
                "bed_tilt" => Ok(Box::new(command::CommandProgram::new(
                    self.bed.clone(),
                    command::BedCommand::Tilt,
                ))),
                _ => Err(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_address() {
        assert_eq!(u32::from(Actuator::LeftDrive), 0);
        assert_eq!(u32::from(Actuator::RightDrive), 1);
        assert_eq!(u32::from(Actuator::BedTilt), 3);
    }

    #[test]
    fn test_velocity_command() {
        let motion = velocity_command(100.4, -50.9);

        assert_eq!(motion, Motion::Change(vec![(1, 100), (0, -50)]));
    }

    #[test]
    fn test_bed_state_toggle() {
        let bed = BedState::default();

        assert!(!bed.is_raised());
        assert!(bed.toggle_raised());
        assert!(bed.is_raised());
        assert!(!bed.toggle_raised());
        assert!(!bed.is_raised());
        assert!(!bed.is_tilted());
    }

    #[test]
    fn test_fetch_program() {
        let operand = Carrier::from_config(&Config::default());
        let plan = RoutePlan::decode("rs 2 3000 8 p 0 0 p 24 0 re cs bed_tilt eof");

        for action in &plan.actions {
            assert!(operand.fetch_program(&plan, action).is_ok());
        }

        let unknown = RouteAction::Command {
            name: "warp_drive".to_owned(),
        };
        assert!(operand.fetch_program(&plan, &unknown).is_err());

        let missing = RouteAction::Follow {
            route_name: "9".to_owned(),
            end_tolerance: 2.0,
            timeout: 1000,
            lookahead: 8.0,
        };
        assert!(operand.fetch_program(&plan, &missing).is_err());
    }
}
