use super::weight::PriorityWeight;
use crate::capacity::{AllocatableCapacity, CapacityLookup};
use crate::index::{IndexSnapshot, NodeState, NodeStateIndex};
use crate::priorities::{
    BalancedResourcePriority, InterPodAffinityPriority, LeastRequestedPriority,
    NodeAffinityPriority, PriorityMap,
};
use crate::types::{host_score, HostPriorityList};
use crate::{Result, SchedulerError};
use nodeorder_core::{NodeInfo, TaskId, TaskInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Inter-pod affinity scores of one task against one index generation
struct CachedAffinity {
    generation: u64,
    scores: Arc<HostPriorityList>,
}

/// Weighted sum of the four node scoring heuristics
pub struct NodeOrderScorer {
    weight: PriorityWeight,
    index: Arc<NodeStateIndex>,
    least_requested: LeastRequestedPriority,
    balanced_resource: BalancedResourcePriority,
    node_affinity: NodeAffinityPriority,
    inter_pod_affinity: InterPodAffinityPriority,
    affinity_cache: Mutex<HashMap<TaskId, CachedAffinity>>,
}

impl NodeOrderScorer {
    pub fn new(weight: PriorityWeight, index: Arc<NodeStateIndex>) -> Self {
        Self::with_capacity(weight, index, Arc::new(AllocatableCapacity))
    }

    pub fn with_capacity(
        weight: PriorityWeight,
        index: Arc<NodeStateIndex>,
        capacity: Arc<dyn CapacityLookup>,
    ) -> Self {
        Self {
            weight,
            index,
            least_requested: LeastRequestedPriority::new(capacity.clone()),
            balanced_resource: BalancedResourcePriority::new(capacity),
            node_affinity: NodeAffinityPriority,
            inter_pod_affinity: InterPodAffinityPriority::default(),
            affinity_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Score `task` on `node`. Any heuristic failure fails the whole score.
    pub fn score(&self, task: &TaskInfo, node: &NodeInfo) -> Result<f64> {
        let snapshot = self.index.snapshot();

        let state = match snapshot.lookup(&node.name) {
            Some(state) => state.clone(),
            None => {
                warn!(
                    "node order, generate node state for {} at scoring time is unexpected",
                    node.name
                );
                Arc::new(NodeState::from_node_info(node))
            }
        };

        let mut score = 0.0;

        score += self.weighted(&self.least_requested, task, &state, self.weight.least_requested)?;
        score += self.weighted(
            &self.balanced_resource,
            task,
            &state,
            self.weight.balanced_resource,
        )?;
        score += self.weighted(&self.node_affinity, task, &state, self.weight.node_affinity)?;

        let affinity_scores = self
            .inter_pod_affinity_scores(task, &snapshot)
            .map_err(|e| {
                warn!("Calculate Inter Pod Affinity Priority Failed because of Error: {}", e);
                SchedulerError::priority_failed(self.inter_pod_affinity.name(), e)
            })?;
        let pod_affinity = host_score(&affinity_scores, &node.name);
        score += pod_affinity as f64 * self.weight.pod_affinity as f64;

        debug!("Total score for task {} on node {} is: {}", task, node.name, score);

        Ok(score)
    }

    fn weighted(
        &self,
        priority: &dyn PriorityMap,
        task: &TaskInfo,
        state: &NodeState,
        weight: i64,
    ) -> Result<f64> {
        let host = priority.map(task, state).map_err(|e| {
            warn!("Calculate {} Priority Failed because of Error: {}", priority.name(), e);
            SchedulerError::priority_failed(priority.name(), e)
        })?;
        Ok(host.score as f64 * weight as f64)
    }

    /// Cluster-wide affinity scores, computed once per task and index
    /// generation
    fn inter_pod_affinity_scores(
        &self,
        task: &TaskInfo,
        snapshot: &IndexSnapshot,
    ) -> Result<Arc<HostPriorityList>> {
        let generation = snapshot.generation();

        if let Some(cached) = self.affinity_cache.lock().get(&task.uid) {
            if cached.generation == generation {
                return Ok(cached.scores.clone());
            }
        }

        let scores = Arc::new(self.inter_pod_affinity.calculate(task, snapshot, snapshot)?);

        let mut cache = self.affinity_cache.lock();
        cache.retain(|_, c| c.generation >= generation);
        cache.insert(
            task.uid.clone(),
            CachedAffinity {
                generation,
                scores: scores.clone(),
            },
        );

        Ok(scores)
    }

    /// Drop every cached affinity result
    pub fn clear_cache(&self) {
        self.affinity_cache.lock().clear();
    }
}
