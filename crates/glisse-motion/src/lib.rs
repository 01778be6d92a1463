//! Motion primitives for Glisse: the position model, damped springs, and
//! travel bounds with rubberband resistance.

mod position;
mod rubberband;
mod spring;

pub use position::PositionModel;
pub use rubberband::TravelBounds;
pub use spring::{MotionProfile, SpringProfile};
