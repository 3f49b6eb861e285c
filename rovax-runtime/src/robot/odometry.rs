use nalgebra::{Rotation2, Vector2};

use rovax_core::angle::normalize_angle;
use rovax_core::position::Pose;
use rovax_core::{Trace, TraceWriter};

use super::TrackerGroup;

/// Raw sensor readings for one fuser tick.
///
/// Every slot is optional. A reading that did not arrive this tick
/// leaves its slot empty and contributes no displacement.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackerSample {
    /// Right tracking wheel, raw count.
    pub right: Option<f64>,
    /// Left tracking wheel, raw count.
    pub left: Option<f64>,
    /// Front perpendicular tracking wheel, raw count.
    pub front: Option<f64>,
    /// Back perpendicular tracking wheel, raw count.
    pub back: Option<f64>,
    /// Inertial heading in radians, sensor frame.
    pub heading: Option<f64>,
}

/// Pose estimate published after every fuser tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoseEstimate {
    /// Pose after the last tick.
    pub current: Pose,
    /// Pose before the last tick.
    pub previous: Pose,
    /// Cumulative right and left tracker travel.
    pub travel: (f64, f64),
}

#[derive(serde::Serialize)]
struct PoseTrace {
    timestamp: u128,
    x: f64,
    y: f64,
    heading: f64,
}

impl<T: TraceWriter> Trace<T> for PoseEstimate {
    fn record(&self, writer: &mut T, timestamp: std::time::Duration) {
        writer.write_record(PoseTrace {
            timestamp: timestamp.as_millis(),
            x: self.current.x,
            y: self.current.y,
            heading: self.current.heading(),
        });
    }
}

/// Tracking wheel odometry.
///
/// Fuses the tracking wheel and inertial readings into a planar pose.
/// The fuser runs an arc model: between two ticks the vehicle is
/// assumed to move over a circular arc, which the tracker deltas and
/// heading delta describe.
///
/// When both side trackers are present the heading follows from their
/// differential. Otherwise the inertial unit provides the heading, and
/// without either the heading holds.
pub struct Odometry {
    trackers: TrackerGroup,
    travel_right: f64,
    travel_left: f64,
    travel_front: f64,
    travel_back: f64,
    current: Pose,
    previous: Pose,
}

impl Odometry {
    pub fn new(trackers: TrackerGroup) -> Self {
        Self {
            trackers,
            travel_right: 0.0,
            travel_left: 0.0,
            travel_front: 0.0,
            travel_back: 0.0,
            current: Pose::default(),
            previous: Pose::default(),
        }
    }

    /// Teleport the vehicle onto a pose.
    ///
    /// Seeds both the current and the previous pose so the first tick
    /// after seeding observes no artificial displacement.
    pub fn set_position(&mut self, pose: Pose) {
        self.current = pose;
        self.previous = pose;
    }

    pub fn position(&self) -> Pose {
        self.current
    }

    pub fn estimate(&self) -> PoseEstimate {
        PoseEstimate {
            current: self.current,
            previous: self.previous,
            travel: (self.travel_right, self.travel_left),
        }
    }

    /// Cumulative travel of the front and back perpendicular wheels.
    pub fn strafe_travel(&self) -> (f64, f64) {
        (self.travel_front, self.travel_back)
    }

    /// Fuse one sample into the pose estimate.
    ///
    /// A non finite heading aborts the tick and leaves the pose pair
    /// untouched.
    pub fn advance(&mut self, sample: TrackerSample) -> PoseEstimate {
        let mut delta_right = 0.0;
        let mut delta_left = 0.0;
        let mut delta_back = 0.0;

        if let (Some(tracker), Some(raw)) = (self.trackers.right, sample.right) {
            let distance = tracker.distance_travelled(raw);
            delta_right = distance - self.travel_right;
            self.travel_right = distance;
        }
        if let (Some(tracker), Some(raw)) = (self.trackers.left, sample.left) {
            let distance = tracker.distance_travelled(raw);
            delta_left = distance - self.travel_left;
            self.travel_left = distance;
        }
        // The front reading is consumed but the pose model takes its
        // strafe displacement from the back tracker alone.
        if let (Some(tracker), Some(raw)) = (self.trackers.front, sample.front) {
            self.travel_front = tracker.distance_travelled(raw);
        }
        if let (Some(tracker), Some(raw)) = (self.trackers.back, sample.back) {
            let distance = tracker.distance_travelled(raw);
            delta_back = distance - self.travel_back;
            self.travel_back = distance;
        }

        let right_offset = self.trackers.right.map(|tracker| tracker.offset());
        let left_offset = self.trackers.left.map(|tracker| tracker.offset());

        let (new_heading, delta_heading) =
            if let (Some(right_offset), Some(left_offset)) = (right_offset, left_offset) {
                let delta_heading = (delta_left - delta_right) / (right_offset + left_offset);
                (self.current.heading() - delta_heading, delta_heading)
            } else if let (true, Some(raw)) = (self.trackers.inertial, sample.heading) {
                let new_heading = normalize_angle(-raw);
                (new_heading, new_heading - self.previous.heading())
            } else {
                (self.current.heading(), 0.0)
            };

        if !new_heading.is_finite() {
            return self.estimate();
        }

        let average_heading = normalize_angle(new_heading - (delta_heading / 2.0));

        let (delta_y, delta_y_offset) = match (right_offset, left_offset) {
            (Some(right_offset), Some(left_offset)) => (
                (delta_right + delta_left) / 2.0,
                (right_offset + left_offset) / 2.0,
            ),
            (Some(right_offset), None) => (delta_right, right_offset),
            (None, Some(left_offset)) => (delta_left, left_offset),
            (None, None) => (0.0, 0.0),
        };

        let delta_x = delta_back;
        let back_offset = self.trackers.back.map_or(0.0, |tracker| tracker.offset());

        self.previous = self.current;

        // Arc model. A zero heading delta degenerates into a straight
        // translation in the local frame.
        let (local_x, local_y) = if delta_heading == 0.0 {
            (delta_x, delta_y)
        } else {
            let chord = 2.0 * (delta_heading / 2.0).sin();
            (
                chord * (delta_x / delta_heading + back_offset),
                chord * (delta_y / delta_heading + delta_y_offset),
            )
        };

        let displacement = Rotation2::new(average_heading) * Vector2::new(local_y, local_x);

        self.current = Pose::new(
            self.current.x + displacement.x,
            self.current.y + displacement.y,
            new_heading,
        );

        self.estimate()
    }
}
