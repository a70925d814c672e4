//! Session host and plugin plumbing

pub mod arguments;
pub mod conf;
pub mod plugin;
pub mod registry;
pub mod session;

pub use arguments::Arguments;
pub use conf::{PluginOption, SchedulerConf, Tier};
pub use plugin::{Plugin, PluginBuilder};
pub use registry::{build_plugins, plugin_builder, registered_plugins};
pub use session::{EventHandler, NodeOrderFn, Session};
