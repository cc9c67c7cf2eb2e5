pub mod range;
pub mod sample;
pub mod target;
