use super::PriorityMap;
use crate::index::NodeState;
use crate::types::HostPriority;
use crate::Result;
use nodeorder_core::labels::node_selector_requirements_as_selector;
use nodeorder_core::TaskInfo;
use tracing::debug;

/// Sums the weights of the task's preferred node affinity terms that match
/// the node's labels.
///
/// Required terms are not evaluated here; nodes failing them never reach
/// scoring. The sum is not normalised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAffinityPriority;

impl PriorityMap for NodeAffinityPriority {
    fn map(&self, task: &TaskInfo, state: &NodeState) -> Result<HostPriority> {
        let preferred = task
            .pod
            .spec
            .as_ref()
            .and_then(|s| s.affinity.as_ref())
            .and_then(|a| a.node_affinity.as_ref())
            .and_then(|na| na.preferred_during_scheduling_ignored_during_execution.as_ref());

        let mut count = 0i64;

        for term in preferred.into_iter().flatten() {
            if term.weight == 0 {
                continue;
            }

            let expressions = term.preference.match_expressions.as_deref().unwrap_or_default();
            let selector = node_selector_requirements_as_selector(expressions)?;
            if selector.matches(state.labels()) {
                count += i64::from(term.weight);
            }
        }

        debug!("Node {} node affinity score: {}", state.name, count);

        Ok(HostPriority::new(&state.name, count))
    }

    fn name(&self) -> &str {
        "NodeAffinity"
    }
}
