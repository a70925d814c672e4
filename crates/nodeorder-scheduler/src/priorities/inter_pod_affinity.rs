//! Inter-task affinity and anti-affinity
//!
//! Unlike the other heuristics this one needs the whole cluster: a term on
//! any bound task, or on the incoming task, can move the score of every
//! node sharing a topology domain with the node that task sits on. One pass
//! produces the scores of all indexed nodes.

use crate::index::IndexSnapshot;
use crate::listers::NodeInfoLookup;
use crate::types::{HostPriority, HostPriorityList, MAX_PRIORITY};
use crate::Result;
use k8s_openapi::api::core::v1::{PodAffinityTerm, WeightedPodAffinityTerm};
use nodeorder_core::labels::label_selector_as_selector;
use nodeorder_core::{Node, TaskInfo};
use std::collections::HashMap;
use tracing::debug;

/// Weight given to a bound task's required affinity terms that the incoming
/// task satisfies
pub const DEFAULT_HARD_POD_AFFINITY_WEIGHT: i64 = 1;

#[derive(Debug, Clone, Copy)]
pub struct InterPodAffinityPriority {
    hard_pod_affinity_weight: i64,
}

impl Default for InterPodAffinityPriority {
    fn default() -> Self {
        Self::new(DEFAULT_HARD_POD_AFFINITY_WEIGHT)
    }
}

impl InterPodAffinityPriority {
    pub fn new(hard_pod_affinity_weight: i64) -> Self {
        Self {
            hard_pod_affinity_weight,
        }
    }

    pub fn name(&self) -> &str {
        "InterPodAffinity"
    }

    /// Score every node in `cluster` for `task`, normalised to
    /// `0..=MAX_PRIORITY`.
    ///
    /// Fails when a selector is malformed or when a bound task's node cannot
    /// be resolved through `nodes`.
    pub fn calculate(
        &self,
        task: &TaskInfo,
        cluster: &IndexSnapshot,
        nodes: &dyn NodeInfoLookup,
    ) -> Result<HostPriorityList> {
        let affinity = task.pod.spec.as_ref().and_then(|s| s.affinity.as_ref());
        let pod_affinity = affinity.and_then(|a| a.pod_affinity.as_ref());
        let pod_anti_affinity = affinity.and_then(|a| a.pod_anti_affinity.as_ref());
        let has_constraints = pod_affinity.is_some() || pod_anti_affinity.is_some();

        let mut counts = TopologyCounts::new(cluster);

        for state in cluster.nodes() {
            for existing in state.tasks() {
                let existing_affinity = existing.pod.spec.as_ref().and_then(|s| s.affinity.as_ref());
                let existing_pod_affinity = existing_affinity.and_then(|a| a.pod_affinity.as_ref());
                let existing_anti_affinity =
                    existing_affinity.and_then(|a| a.pod_anti_affinity.as_ref());

                // Neither side has terms, nothing can match
                if !has_constraints
                    && existing_pod_affinity.is_none()
                    && existing_anti_affinity.is_none()
                {
                    continue;
                }

                let existing_node_name = existing.node_name.as_deref().unwrap_or(&state.name);
                let existing_node = nodes.node_info(existing_node_name)?;

                if let Some(pa) = pod_affinity {
                    for wt in preferred(&pa.preferred_during_scheduling_ignored_during_execution) {
                        counts.process_term(
                            &wt.pod_affinity_term,
                            task,
                            existing,
                            &existing_node,
                            i64::from(wt.weight),
                        )?;
                    }
                }

                if let Some(paa) = pod_anti_affinity {
                    for wt in preferred(&paa.preferred_during_scheduling_ignored_during_execution) {
                        counts.process_term(
                            &wt.pod_affinity_term,
                            task,
                            existing,
                            &existing_node,
                            -i64::from(wt.weight),
                        )?;
                    }
                }

                if let Some(epa) = existing_pod_affinity {
                    // Symmetry: the bound task's hard affinity counts as a soft
                    // preference for the incoming task
                    if self.hard_pod_affinity_weight > 0 {
                        for term in epa
                            .required_during_scheduling_ignored_during_execution
                            .iter()
                            .flatten()
                        {
                            counts.process_term(
                                term,
                                existing,
                                task,
                                &existing_node,
                                self.hard_pod_affinity_weight,
                            )?;
                        }
                    }

                    for wt in preferred(&epa.preferred_during_scheduling_ignored_during_execution) {
                        counts.process_term(
                            &wt.pod_affinity_term,
                            existing,
                            task,
                            &existing_node,
                            i64::from(wt.weight),
                        )?;
                    }
                }

                if let Some(epaa) = existing_anti_affinity {
                    for wt in preferred(&epaa.preferred_during_scheduling_ignored_during_execution) {
                        counts.process_term(
                            &wt.pod_affinity_term,
                            existing,
                            task,
                            &existing_node,
                            -i64::from(wt.weight),
                        )?;
                    }
                }
            }
        }

        Ok(counts.normalize())
    }
}

fn preferred(
    terms: &Option<Vec<WeightedPodAffinityTerm>>,
) -> impl Iterator<Item = &WeightedPodAffinityTerm> {
    terms.iter().flatten()
}

/// Namespaces a term applies to: its own list, or the namespace of the
/// task that declares it
fn term_namespaces<'a>(defining: &'a TaskInfo, term: &'a PodAffinityTerm) -> Vec<&'a str> {
    match term.namespaces.as_deref() {
        Some(namespaces) if !namespaces.is_empty() => {
            namespaces.iter().map(String::as_str).collect()
        }
        _ => vec![defining.namespace.as_str()],
    }
}

fn topology_value<'n>(node: &'n Node, topology_key: &str) -> Option<&'n String> {
    node.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(topology_key))
}

fn same_topology(a: &Node, b: &Node, topology_key: &str) -> bool {
    if topology_key.is_empty() {
        return false;
    }
    match (topology_value(a, topology_key), topology_value(b, topology_key)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

struct TopologyCounts<'a> {
    cluster: &'a IndexSnapshot,
    counts: HashMap<&'a str, i64>,
}

impl<'a> TopologyCounts<'a> {
    fn new(cluster: &'a IndexSnapshot) -> Self {
        Self {
            cluster,
            counts: HashMap::new(),
        }
    }

    /// If `to_check` matches the term declared by `defining`, add `weight`
    /// to every node in the same topology domain as `fixed_node`
    fn process_term(
        &mut self,
        term: &PodAffinityTerm,
        defining: &TaskInfo,
        to_check: &TaskInfo,
        fixed_node: &Node,
        weight: i64,
    ) -> Result<()> {
        let namespaces = term_namespaces(defining, term);
        let selector = label_selector_as_selector(term.label_selector.as_ref())?;

        if !namespaces.contains(&to_check.namespace.as_str()) || !selector.matches(to_check.labels())
        {
            return Ok(());
        }

        let cluster = self.cluster;
        for state in cluster.nodes() {
            if same_topology(&state.node, fixed_node, &term.topology_key) {
                *self.counts.entry(state.name.as_str()).or_insert(0) += weight;
            }
        }

        Ok(())
    }

    fn normalize(self) -> HostPriorityList {
        let cluster = self.cluster;
        // min and max start at zero so untouched nodes anchor the scale
        let (min, max) = cluster
            .node_names()
            .iter()
            .map(|name| self.counts.get(name.as_str()).copied().unwrap_or(0))
            .fold((0i64, 0i64), |(min, max), c| (min.min(c), max.max(c)));

        cluster
            .node_names()
            .iter()
            .map(|name| {
                let count = self.counts.get(name.as_str()).copied().unwrap_or(0);
                let score = if max - min > 0 {
                    (MAX_PRIORITY as f64 * ((count - min) as f64 / (max - min) as f64)) as i64
                } else {
                    0
                };
                debug!("Node {} inter-pod affinity count: {}, score: {}", name, count, score);
                HostPriority::new(name, score)
            })
            .collect()
    }
}
