use super::conf::SchedulerConf;
use super::plugin::{Plugin, PluginBuilder};
use crate::plugins::nodeorder;
use crate::{Result, SchedulerError};
use tracing::info;

const BUILDERS: &[(&str, PluginBuilder)] = &[(nodeorder::PLUGIN_NAME, nodeorder::new as PluginBuilder)];

/// Names of every plugin that can be configured
pub fn registered_plugins() -> Vec<&'static str> {
    BUILDERS.iter().map(|(name, _)| *name).collect()
}

pub fn plugin_builder(name: &str) -> Option<PluginBuilder> {
    BUILDERS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, builder)| *builder)
}

/// Instantiate every plugin named in `conf`, in tier order
pub fn build_plugins(conf: &SchedulerConf) -> Result<Vec<Box<dyn Plugin>>> {
    conf.plugin_options()
        .map(|option| {
            let builder = plugin_builder(&option.name).ok_or_else(|| {
                SchedulerError::unknown_plugin(&option.name, &registered_plugins())
            })?;
            info!(
                "Building plugin {} with {} arguments",
                option.name,
                option.arguments.len()
            );
            Ok(builder(option.arguments.clone()))
        })
        .collect()
}
