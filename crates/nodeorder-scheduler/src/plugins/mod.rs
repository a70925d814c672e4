//! Scheduling plugins

pub mod nodeorder;

pub use nodeorder::NodeOrderPlugin;
