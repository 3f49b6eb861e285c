mod r#virtual;

pub use r#virtual::encoder::VirtualEncoder;
pub use r#virtual::hull::VirtualHull;
pub use r#virtual::inertial::VirtualInertial;
pub use r#virtual::SimState;

pub(crate) use r#virtual::encoder::{BACK_ADDR, FRONT_ADDR, LEFT_ADDR, RIGHT_ADDR};
