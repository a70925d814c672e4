use super::arguments::Arguments;
use crate::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scheduler configuration file
///
/// ```yaml
/// actions: "allocate, backfill"
/// tiers:
/// - plugins:
///   - name: nodeorder
///     arguments:
///       leastrequested.weight: 2
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchedulerConf {
    #[serde(default)]
    pub actions: String,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Tier {
    #[serde(default)]
    pub plugins: Vec<PluginOption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PluginOption {
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl Default for SchedulerConf {
    fn default() -> Self {
        Self {
            actions: "allocate, backfill".to_string(),
            tiers: vec![Tier {
                plugins: vec![PluginOption {
                    name: crate::plugins::nodeorder::PLUGIN_NAME.to_string(),
                    arguments: Arguments::default(),
                }],
            }],
        }
    }
}

impl SchedulerConf {
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        nodeorder_core::from_yaml(data)
            .map_err(|e| SchedulerError::config_error(format!("invalid scheduler conf: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        nodeorder_core::from_yaml_file(path).map_err(|e| {
            SchedulerError::config_error(format!(
                "failed to load scheduler conf {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Action names in configured order
    pub fn actions(&self) -> Vec<&str> {
        self.actions
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Every configured plugin, tier by tier
    pub fn plugin_options(&self) -> impl Iterator<Item = &PluginOption> {
        self.tiers.iter().flat_map(|tier| tier.plugins.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONF: &str = r#"
actions: "allocate, backfill"
tiers:
- plugins:
  - name: priority
- plugins:
  - name: nodeorder
    arguments:
      leastrequested.weight: 2
      podaffinity.weight: "3"
"#;

    #[test]
    fn test_parse_conf() {
        let conf = SchedulerConf::from_yaml_str(CONF).unwrap();

        assert_eq!(conf.actions(), vec!["allocate", "backfill"]);
        assert_eq!(conf.tiers.len(), 2);

        let names: Vec<_> = conf.plugin_options().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["priority", "nodeorder"]);

        let nodeorder = conf.plugin_options().nth(1).unwrap();
        assert_eq!(nodeorder.arguments.get_int("leastrequested.weight"), Some(2));
        assert_eq!(nodeorder.arguments.get_int("podaffinity.weight"), Some(3));
        assert!(conf.plugin_options().next().unwrap().arguments.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONF.as_bytes()).unwrap();

        let conf = SchedulerConf::from_file(file.path()).unwrap();
        assert_eq!(conf.plugin_options().count(), 2);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchedulerConf::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = SchedulerConf::from_yaml_str("tiers: [plugins: {name: 3").unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigError { .. }));
    }

    #[test]
    fn test_default_conf_enables_nodeorder() {
        let conf = SchedulerConf::default();
        assert_eq!(conf.plugin_options().count(), 1);
        assert_eq!(conf.plugin_options().next().unwrap().name, "nodeorder");
    }
}
