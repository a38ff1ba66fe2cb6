pub mod registry;
pub mod round;
pub mod session;
pub mod timer;
