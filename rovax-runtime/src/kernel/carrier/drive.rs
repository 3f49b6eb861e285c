use rovax_core::algorithm::Pid;
use rovax_core::angle::signum;
use rovax_core::geometry::directional_curvature;
use rovax_core::motion::Motion;
use rovax_core::position::Pose;

use crate::runtime::program::{Context, Program};

use super::{velocity_command, Actuator};

/// Drive a straight line.
///
/// The target pose is projected along the heading at boot. A negative
/// distance drives backwards. The drive regulates on the pose
/// estimate, or on the drive encoders when the machine is configured
/// so. Under pose regulation the drive sides are split to steer out
/// heading drift over the line.
pub(super) struct LateralProgram {
    pid: Pid,
    track_width: f64,
    distance: f64,
    end_tolerance: f64,
    timeout: i64,
    use_encoders: bool,
    target: Pose,
    baseline: (f64, f64),
    prev_error: f64,
    total_error: f64,
    finished: bool,
}

impl LateralProgram {
    pub fn new(
        pid: Pid,
        track_width: f64,
        distance: f64,
        end_tolerance: f64,
        timeout: i64,
        use_encoders: bool,
    ) -> Self {
        Self {
            pid,
            track_width,
            distance,
            end_tolerance: end_tolerance.abs(),
            timeout,
            use_encoders,
            target: Pose::default(),
            baseline: (0.0, 0.0),
            prev_error: distance,
            total_error: 0.0,
            finished: false,
        }
    }

    fn step_pose(&mut self, context: &mut Context) -> Option<Motion> {
        let estimate = context.estimate();
        let curr = estimate.current;

        let error = curr.distance(&self.target);
        let prev_dist = estimate.previous.distance(&self.target);

        // Hold out until the target is reached and the approach has
        // come to rest.
        if error <= self.end_tolerance && prev_dist >= error {
            self.finished = true;
            return None;
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
            return None;
        }

        self.total_error += error;
        let speed = self.pid.update(error, self.total_error, self.prev_error)
            * signum(self.distance);

        if speed.abs() <= self.pid.min_speed() {
            self.finished = true;
            return None;
        }

        self.prev_error = error;

        // Steer out drift from the line.
        let angular = directional_curvature(&curr, &self.target);
        let mut right = speed * (2.0 - angular * self.track_width) / 2.0;
        let mut left = speed * (2.0 + angular * self.track_width) / 2.0;

        let overdrive = right.abs().max(left.abs()) / self.pid.max_speed();
        if overdrive > 1.0 {
            right /= overdrive;
            left /= overdrive;
        }

        debug!("Error {:>6.2} Speed {:>+6.1}", error, speed);

        Some(velocity_command(right, left))
    }

    fn step_travel(&mut self, context: &mut Context) -> Option<Motion> {
        let (right_travel, left_travel) = context.estimate().travel;
        let travelled = ((right_travel - self.baseline.0).abs()
            + (left_travel - self.baseline.1).abs())
            / 2.0;

        if travelled >= self.distance.abs() {
            self.finished = true;
            return None;
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
            return None;
        }

        let error = self.distance.abs() - travelled;
        self.total_error += error;
        let speed = self.pid.update(error, self.total_error, self.prev_error)
            * signum(self.distance);
        self.prev_error = error;

        debug!("Error {:>6.2} Speed {:>+6.1}", error, speed);

        Some(velocity_command(speed, speed))
    }
}

#[async_trait::async_trait]
impl Program for LateralProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        let estimate = context.estimate();
        let curr = estimate.current;

        self.target = Pose::new(
            curr.heading().cos() * self.distance + curr.x,
            curr.heading().sin() * self.distance + curr.y,
            curr.heading(),
        );
        self.baseline = estimate.travel;

        None
    }

    async fn step(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        if self.use_encoders {
            self.step_travel(context)
        } else {
            self.step_pose(context)
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
