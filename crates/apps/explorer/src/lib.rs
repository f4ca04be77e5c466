pub mod config;
pub mod controller;
pub mod render;
pub mod replay;

pub use controller::InteractionController;
pub use render::{GlobeRenderer, LogRenderer};
