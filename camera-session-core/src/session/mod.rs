pub mod camera;
pub mod core;
pub mod photo;
pub mod recording;
pub mod tuner;
