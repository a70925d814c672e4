use super::arguments::Arguments;
use super::session::Session;

/// A scheduling plugin hooked into the session lifecycle
pub trait Plugin: Send + Sync {
    /// Name the plugin is registered under
    fn name(&self) -> &str;

    /// Register scoring functions and event handlers on the opening session
    fn on_session_open(&self, ssn: &mut Session);

    /// Release anything held for the session
    fn on_session_close(&self, ssn: &mut Session);
}

/// Constructs a plugin from its configured arguments
pub type PluginBuilder = fn(Arguments) -> Box<dyn Plugin>;
