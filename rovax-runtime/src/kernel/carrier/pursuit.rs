use std::f64::consts::PI;

use rovax_core::angle::clamp;
use rovax_core::geometry::{circle_intersection, curvature, directional_curvature};
use rovax_core::motion::Motion;
use rovax_core::position::{lerp, Pose};
use rovax_core::route::Route;

use crate::runtime::program::{Context, Program};

use super::{velocity_command, Actuator};

/// Pursue a route.
///
/// The machine chases a lookahead point that slides over the route
/// ahead of it. The lookahead distance stretches on straights and
/// shrinks into bends, and the pace backs off with path curvature.
/// A negative lookahead pursues the route in reverse, hauling end
/// first.
///
/// The pursuit ends once the machine is within tolerance of the
/// final position and no route remains ahead of it.
pub(super) struct PursuitProgram {
    route: Route,
    max_lookahead: f64,
    forwards: bool,
    max_speed: f64,
    track_width: f64,
    end_tolerance: f64,
    timeout: i64,
    closest_i: usize,
    target_point: Pose,
    finished: bool,
}

impl PursuitProgram {
    pub fn new(
        route: Route,
        lookahead: f64,
        max_speed: f64,
        track_width: f64,
        end_tolerance: f64,
        timeout: i64,
    ) -> Self {
        let target_point = route.positions.first().copied().unwrap_or_default();

        Self {
            route,
            max_lookahead: lookahead.abs(),
            forwards: lookahead >= 0.0,
            max_speed,
            track_width,
            end_tolerance: end_tolerance.abs(),
            timeout,
            closest_i: 0,
            target_point,
            finished: false,
        }
    }
}

#[async_trait::async_trait]
impl Program for PursuitProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, _: &mut Context) -> Option<Self::MotionPlan> {
        if self.route.len() < 2 {
            warn!("Route holds less than two positions, refusing the pursuit");
            self.finished = true;
        }

        None
    }

    async fn step(&mut self, context: &mut Context) -> Option<Self::MotionPlan> {
        let positions = &self.route.positions;
        let last = positions.len() - 1;

        let mut curr = context.position();
        if !self.forwards {
            curr.set_heading(curr.heading() + PI);
        }

        // Stretch the lookahead with the route curvature ahead, once
        // the pursuit is underway.
        let mut lookahead = self.max_lookahead;
        if self.target_point != positions[0] {
            let path_curvature = curvature(
                &positions[self.closest_i.min(last)],
                &positions[(self.closest_i + 1).min(last)],
                &positions[(self.closest_i + 2).min(last)],
            );

            lookahead = clamp(
                self.max_lookahead * (4.0 / path_curvature) / self.max_speed,
                0.8 * self.max_lookahead,
                3.0 * self.max_lookahead,
            );
        }

        let error = curr.distance(&positions[last]);

        // Closest route position, never scanning backwards.
        let mut closest_dist = 1e5;
        for i in self.closest_i..positions.len() {
            let dist = curr.distance(&positions[i]);
            if dist < closest_dist {
                closest_dist = dist;
                self.closest_i = i;
            }
        }

        // Lookahead point over the remaining route, the farthest
        // crossing wins.
        for i in self.closest_i..last {
            if let Some(fraction) =
                circle_intersection(&positions[i + 1], &positions[i], &curr, lookahead)
            {
                self.target_point = lerp(&positions[i], &positions[i + 1], fraction);
            }
        }

        if error <= self.end_tolerance && self.closest_i == last {
            self.finished = true;
            return None;
        }

        // Back off the pace into bends.
        let mut target_speed = (2.0
            / curvature(
                &positions[self.closest_i.min(last)],
                &positions[(self.closest_i + 1).min(last)],
                &positions[(self.closest_i + 2).min(last)],
            ))
        .min(self.max_speed);

        let mut angular = directional_curvature(&curr, &self.target_point);

        // Creep over the final approach.
        let ratio = curr.distance(&self.target_point) / lookahead;
        if ratio < 0.3 {
            angular *= ratio * 0.1;
            target_speed *= ratio * 1.5;
        }

        let mut right = target_speed * (2.0 - angular * self.track_width) / 2.0;
        let mut left = target_speed * (2.0 + angular * self.track_width) / 2.0;

        let overdrive = right.abs().max(left.abs()) / self.max_speed;
        if overdrive > 1.0 {
            right /= overdrive;
            left /= overdrive;
        }

        if context.step_count % 15 == 0 {
            debug!(
                "Closest {:>3} Error {:>6.2} Speed {:>6.1} Lookahead {:>5.2}",
                self.closest_i, error, target_speed, lookahead
            );
        }

        self.timeout -= 10;
        if self.timeout < 0 {
            self.finished = true;
        }

        if self.forwards {
            Some(velocity_command(right, left))
        } else {
            Some(velocity_command(-left, -right))
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
