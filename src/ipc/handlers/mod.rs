pub mod attendance;
pub mod core;
pub mod grading;
pub mod results;
