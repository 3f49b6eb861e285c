use std::sync::Arc;
use std::time::Duration;

use rovax_core::motion::Motion;

use crate::runtime::program::{Context, Program};

use super::{Actuator, BedState, POWER_MAX};

/// Attachment run time per command.
const ACTUATE_TIME: Duration = Duration::from_millis(400);

/// Commands the load bed understands.
#[derive(Clone, Copy, Debug)]
pub(super) enum BedCommand {
    Lift,
    Tilt,
}

/// Operate the load bed.
///
/// The command toggles an attachment between its end positions. The
/// actuator runs for a fixed time, there is no position feedback.
pub(super) struct CommandProgram {
    bed: Arc<BedState>,
    command: BedCommand,
}

impl CommandProgram {
    pub fn new(bed: Arc<BedState>, command: BedCommand) -> Self {
        Self { bed, command }
    }

    fn actuator(&self) -> Actuator {
        match self.command {
            BedCommand::Lift => Actuator::BedLift,
            BedCommand::Tilt => Actuator::BedTilt,
        }
    }
}

#[async_trait::async_trait]
impl Program for CommandProgram {
    type MotionPlan = Motion;

    fn boot(&mut self, _: &mut Context) -> Option<Self::MotionPlan> {
        let engage = match self.command {
            BedCommand::Lift => self.bed.toggle_raised(),
            BedCommand::Tilt => self.bed.toggle_tilted(),
        };

        let power = if engage { POWER_MAX } else { -POWER_MAX };

        info!(
            "Bed {:?} {}",
            self.command,
            if engage { "engaged" } else { "released" }
        );

        Some(Motion::Change(vec![(
            self.actuator().into(),
            power as i16,
        )]))
    }

    async fn step(&mut self, _: &mut Context) -> Option<Self::MotionPlan> {
        tokio::time::sleep(ACTUATE_TIME).await;

        None
    }

    fn can_terminate(&self, context: &mut Context) -> bool {
        context.start.elapsed() >= ACTUATE_TIME
    }

    fn term_action(&self, _: &mut Context) -> Option<Self::MotionPlan> {
        Some(Motion::Stop(vec![self.actuator().into()]))
    }
}
