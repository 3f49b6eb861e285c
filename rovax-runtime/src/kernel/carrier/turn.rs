use std::f64::consts::PI;

use rovax_core::algorithm::Pid;
use rovax_core::angle::{direction, normalize_angle, shortest_angle, signum};
use rovax_core::motion::Motion;

use crate::runtime::program::{Context, Program};

use super::{velocity_command, Actuator, TURN_SPEED_FLOOR};

/// Turn in place onto a heading.
///
/// Both drive sides run in opposite directions until the heading
/// error falls within the tolerance. The rotation direction is
/// resolved at boot towards the shortest rotation and kept for the
/// whole turn.
pub(super) struct TurnProgram {
    pid: Pid,
    desired_heading: f64,
    end_tolerance: f64,
    timeout: i64,
    sign: i32,
    prev_error: f64,
    total_error: f64,
    finished: bool,
}

impl TurnProgram {
    /// Construct a turn onto the heading in radians.
    ///
    /// A zero sign leaves the rotation direction to be resolved at
    /// boot, any other sign forces it.
    pub fn new(pid: Pid, angle: f64, end_tolerance: f64, timeout: i64, sign: i32) -> Self {
        Self {
            pid,
            desired_heading: normalize_angle(angle),
            end_tolerance: end_tolerance.abs(),
            timeout,
            sign,
            prev_error: angle.abs(),
            total_error: 0.0,
            finished: false,
        }
    }
}

#[async_trait::async_trait]
impl Program for TurnProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        if self.sign == 0 {
            self.sign = direction(context.position().heading(), self.desired_heading);
        }

        info!(
            "Turn {} onto heading {:.4}rad",
            if self.sign == 1 {
                "clockwise"
            } else {
                "counterclockwise"
            },
            self.desired_heading
        );

        None
    }

    async fn step(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        let error = shortest_angle(context.position().heading(), self.desired_heading).abs();

        if error <= self.end_tolerance {
            self.finished = true;
            return None;
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
            return None;
        }

        self.total_error += error;
        let speed = self.pid.update(error, self.total_error, self.prev_error);
        self.prev_error = error;

        debug!("Error {:>+6.3} Speed {:>6.1}", error, speed);

        // Once the regulator settles the tolerance is near enough.
        if speed < TURN_SPEED_FLOOR {
            self.finished = true;
        }

        Some(velocity_command(
            -self.sign as f64 * speed,
            self.sign as f64 * speed,
        ))
    }

    fn can_terminate(&self, _: &mut Context) -> bool {
        self.finished
    }

    fn term_action(&self, _: &mut Context) -> Option<Self::MotionPlan> {
        Some(Motion::Stop(vec![
            Actuator::RightDrive.into(),
            Actuator::LeftDrive.into(),
        ]))
    }
}

/// Turn in place over an angle.
///
/// The angle is relative to the pose at boot, positive turns
/// counterclockwise. The turn regulates on the heading estimate, or
/// on the drive encoders when the machine is configured so.
pub struct TurnForProgram {
    pid: Pid,
    track_width: f64,
    angle: f64,
    end_tolerance: f64,
    timeout: i64,
    use_encoders: bool,
    desired_heading: f64,
    desired_travel: f64,
    baseline: (f64, f64),
    prev_error: f64,
    total_error: f64,
    finished: bool,
}

impl TurnForProgram {
    pub fn new(
        pid: Pid,
        track_width: f64,
        angle: f64,
        end_tolerance: f64,
        timeout: i64,
        use_encoders: bool,
    ) -> Self {
        Self {
            pid,
            track_width,
            angle,
            end_tolerance: end_tolerance.abs(),
            timeout,
            use_encoders,
            desired_heading: 0.0,
            desired_travel: 0.0,
            baseline: (0.0, 0.0),
            prev_error: angle.abs(),
            total_error: 0.0,
            finished: false,
        }
    }

    fn step_heading(&mut self, context: &mut Context) -> Option<Motion> {
        let error = shortest_angle(context.position().heading(), self.desired_heading).abs();

        if error <= self.end_tolerance {
            self.finished = true;
            return None;
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
            return None;
        }

        self.total_error += error;
        let speed = self.pid.update(error, self.total_error, self.prev_error);
        self.prev_error = error;

        debug!("Error {:>+6.3} Speed {:>6.1}", error, speed);

        if speed.abs() <= self.pid.min_speed() {
            self.finished = true;
        }

        Some(velocity_command(
            signum(self.angle) * speed,
            -signum(self.angle) * speed,
        ))
    }

    fn step_travel(&mut self, context: &mut Context) -> Option<Motion> {
        let (right_travel, left_travel) = context.estimate().travel;
        let travelled = ((right_travel - self.baseline.0).abs()
            + (left_travel - self.baseline.1).abs())
            / 2.0;

        if travelled >= self.desired_travel {
            self.finished = true;
            return None;
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
            return None;
        }

        let error = self.desired_travel - travelled;
        self.total_error += error;
        let speed = self.pid.update(error, self.total_error, self.prev_error);
        self.prev_error = error;

        debug!("Error {:>6.2} Speed {:>6.1}", error, speed);

        Some(velocity_command(
            signum(self.angle) * speed,
            -signum(self.angle) * speed,
        ))
    }
}

#[async_trait::async_trait]
impl Program for TurnForProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        let estimate = context.estimate();

        self.desired_heading = normalize_angle(estimate.current.heading() + self.angle);
        // Arc length either side covers over the turn.
        self.desired_travel =
            ((self.track_width * PI) / 360.0) * (self.angle.to_degrees().abs() / 2.0);
        self.baseline = estimate.travel;

        None
    }

    async fn step(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        if self.use_encoders {
            self.step_travel(context)
        } else {
            self.step_heading(context)
        }
    }

    fn can_terminate(&self, _: &mut Context) -> bool {
        self.finished
    }

    fn term_action(&self, _: &mut Context) -> Option<Self::MotionPlan> {
        Some(Motion::Stop(vec![
            Actuator::RightDrive.into(),
            Actuator::LeftDrive.into(),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::watch;

    use rovax_core::position::Pose;

    use super::*;
    use crate::robot::odometry::PoseEstimate;

    fn context_at(estimate: PoseEstimate) -> (watch::Sender<PoseEstimate>, Context) {
        let (sender, receiver) = watch::channel(estimate);
        (sender, Context::new(receiver))
    }

    fn estimate_at(pose: Pose) -> PoseEstimate {
        PoseEstimate {
            current: pose,
            previous: pose,
            travel: (0.0, 0.0),
        }
    }

    #[tokio::test]
    async fn test_turn_resolves_direction() {
        let pid = Pid::with_bounds(54.0, 0.0, 0.0, 10.0, 127.0);
        let mut program = TurnProgram::new(pid, PI / 2.0, 0.05, 3000, 0);

        let (_sender, mut ctx) = context_at(estimate_at(Pose::default()));

        assert!(program.boot(&mut ctx).is_none());
        assert_eq!(program.sign, -1);

        // Counterclockwise, the right side leads.
        match program.step(&mut ctx).await {
            Some(Motion::Change(actuators)) => {
                assert_eq!(actuators[0].0, Actuator::RightDrive.into());
                assert!(actuators[0].1 > 0);
                assert!(actuators[1].1 < 0);
            }
            motion => panic!("unexpected motion: {:?}", motion),
        }
        assert!(!program.can_terminate(&mut ctx));
    }

    #[tokio::test]
    async fn test_turn_within_tolerance() {
        let pid = Pid::with_bounds(54.0, 0.0, 0.0, 10.0, 127.0);
        let mut program = TurnProgram::new(pid, 1.5, 0.05, 3000, 0);

        let (_sender, mut ctx) = context_at(estimate_at(Pose::new(0.0, 0.0, 1.52)));

        program.boot(&mut ctx);
        assert!(program.step(&mut ctx).await.is_none());
        assert!(program.can_terminate(&mut ctx));
        assert!(matches!(
            program.term_action(&mut ctx),
            Some(Motion::Stop(_))
        ));
    }

    #[tokio::test]
    async fn test_turn_for_relative() {
        let pid = Pid::with_bounds(54.0, 0.0, 0.0, 10.0, 127.0);
        let mut program = TurnForProgram::new(pid, 16.0, 0.5, 0.05, 3000, false);

        let (sender, mut ctx) = context_at(estimate_at(Pose::new(4.0, 4.0, 0.2)));

        program.boot(&mut ctx);
        assert!((program.desired_heading - 0.7).abs() < 1e-9);

        match program.step(&mut ctx).await {
            Some(Motion::Change(actuators)) => {
                assert!(actuators[0].1 > 0, "right side leads counterclockwise");
                assert!(actuators[1].1 < 0);
            }
            motion => panic!("unexpected motion: {:?}", motion),
        }

        sender
            .send(estimate_at(Pose::new(4.0, 4.0, 0.69)))
            .unwrap();
        assert!(program.step(&mut ctx).await.is_none());
        assert!(program.can_terminate(&mut ctx));
    }

    #[tokio::test]
    async fn test_turn_for_travel() {
        let pid = Pid::with_bounds(54.0, 0.0, 0.0, 10.0, 127.0);
        let mut program = TurnForProgram::new(pid, 16.0, PI / 2.0, 0.05, 3000, true);

        let mut estimate = estimate_at(Pose::default());
        estimate.travel = (10.0, 10.0);
        let (sender, mut ctx) = context_at(estimate);

        program.boot(&mut ctx);
        assert!((program.desired_travel - 2.0 * PI).abs() < 1e-9);
        assert!(program.step(&mut ctx).await.is_some());

        // Either side hauled a quarter turn arc.
        estimate.travel = (16.4, 3.6);
        sender.send(estimate).unwrap();
        assert!(program.step(&mut ctx).await.is_none());
        assert!(program.can_terminate(&mut ctx));
    }
}
