use std::f64::consts::PI;

use rovax_core::algorithm::Pid;
use rovax_core::geometry::directional_curvature;
use rovax_core::motion::Motion;
use rovax_core::position::Pose;

use crate::runtime::program::{Context, Program};

use super::{velocity_command, Actuator};

/// Drive onto a point.
///
/// The drive curves onto the target point from wherever the machine
/// stands, steering against the bearing error the whole way there. A
/// backwards navigation reverses onto the point instead.
pub struct NavigateProgram {
    pid: Pid,
    track_width: f64,
    target: Pose,
    forwards: bool,
    end_tolerance: f64,
    timeout: i64,
    prev_error: f64,
    total_error: f64,
    finished: bool,
}

impl NavigateProgram {
    pub fn new(
        pid: Pid,
        track_width: f64,
        target: Pose,
        forwards: bool,
        end_tolerance: f64,
        timeout: i64,
    ) -> Self {
        Self {
            pid,
            track_width,
            target,
            forwards,
            end_tolerance: end_tolerance.abs(),
            timeout,
            prev_error: 0.0,
            total_error: 0.0,
            finished: false,
        }
    }
}

#[async_trait::async_trait]
impl Program for NavigateProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        self.prev_error = context.position().distance(&self.target);

        None
    }

    async fn step(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        let estimate = context.estimate();
        let curr = estimate.current;

        let error = curr.distance(&self.target);
        let prev_dist = estimate.previous.distance(&self.target);

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
        let mut speed = self.pid.update(error, self.total_error, self.prev_error);

        if speed.abs() <= self.pid.min_speed() {
            self.finished = true;
            return None;
        }

        if !self.forwards {
            speed = -speed;
        }

        self.prev_error = error;

        // Bearing is taken from the hauling end of the machine.
        let heading_pose = if self.forwards {
            curr
        } else {
            Pose::new(curr.x, curr.y, curr.heading() - PI)
        };

        let angular = directional_curvature(&heading_pose, &self.target);
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
    async fn test_navigate_steers_onto_point() {
        let pid = Pid::with_bounds(6.0, 0.0, 0.0065, 10.0, 127.0);
        let mut program =
            NavigateProgram::new(pid, 16.0, Pose::new(20.0, -4.0, 0.0), true, 2.0, 5000);

        let (_sender, mut ctx) = context_at(estimate_at(Pose::default()));
        program.boot(&mut ctx);

        // Target right of the heading line, the left side leads.
        match program.step(&mut ctx).await {
            Some(Motion::Change(actuators)) => {
                assert!(actuators[0].1 > 0);
                assert!(actuators[1].1 > actuators[0].1);
            }
            motion => panic!("unexpected motion: {:?}", motion),
        }
        assert!(!program.can_terminate(&mut ctx));
    }

    #[tokio::test]
    async fn test_navigate_reverse() {
        let pid = Pid::with_bounds(6.0, 0.0, 0.0065, 10.0, 127.0);
        let mut program =
            NavigateProgram::new(pid, 16.0, Pose::new(-20.0, 0.0, 0.0), false, 2.0, 5000);

        let (_sender, mut ctx) = context_at(estimate_at(Pose::default()));
        program.boot(&mut ctx);

        // Reversing straight back, both sides haul backwards.
        match program.step(&mut ctx).await {
            Some(Motion::Change(actuators)) => {
                assert!(actuators[0].1 < 0);
                assert!(actuators[1].1 < 0);
            }
            motion => panic!("unexpected motion: {:?}", motion),
        }
    }

    #[tokio::test]
    async fn test_navigate_arrival_exit() {
        let pid = Pid::with_bounds(6.0, 0.0, 0.0065, 10.0, 127.0);
        let mut program =
            NavigateProgram::new(pid, 16.0, Pose::new(20.0, 0.0, 0.0), true, 2.0, 5000);

        let (sender, mut ctx) = context_at(estimate_at(Pose::default()));
        program.boot(&mut ctx);

        sender
            .send(PoseEstimate {
                current: Pose::new(18.5, 0.0, 0.0),
                previous: Pose::new(17.5, 0.0, 0.0),
                travel: (0.0, 0.0),
            })
            .unwrap();
        assert!(program.step(&mut ctx).await.is_none());
        assert!(program.can_terminate(&mut ctx));
        assert!(matches!(
            program.term_action(&mut ctx),
            Some(Motion::Stop(_))
        ));
    }

    #[tokio::test]
    async fn test_navigate_timeout() {
        let pid = Pid::with_bounds(6.0, 0.0, 0.0065, 10.0, 127.0);
        let mut program = NavigateProgram::new(pid, 16.0, Pose::new(20.0, 0.0, 0.0), true, 2.0, 20);

        let (_sender, mut ctx) = context_at(estimate_at(Pose::default()));
        program.boot(&mut ctx);

        assert!(program.step(&mut ctx).await.is_some());
        assert!(program.step(&mut ctx).await.is_some());
        assert!(program.step(&mut ctx).await.is_none());
        assert!(program.can_terminate(&mut ctx));
    }
}
