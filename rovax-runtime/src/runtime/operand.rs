use rovax_core::motion::ToMotion;
use rovax_core::route::{RouteAction, RoutePlan};

use super::program::Program;

/// The operand maps mission actions onto motion programs.
///
/// An operand represents a machine kind. It knows which programs the
/// machine supports and how to parameterize them from a mission
/// action.
pub trait Operand: Send + Sync {
    type MotionPlan: ToMotion;

    /// Construct operand from configuration.
    fn from_config(config: &crate::Config) -> Self;

    /// Fetch program from the operand.
    ///
    /// The returned program is run to completion by the runtime. An
    /// action the operand does not recognize returns an error.
    fn fetch_program(
        &self,
        plan: &RoutePlan,
        action: &RouteAction,
    ) -> Result<Box<dyn Program<MotionPlan = Self::MotionPlan> + Send + Sync>, ()>;
}
