//! Terminal user interface: drawing and input mapping

pub mod draw;
pub mod events;
