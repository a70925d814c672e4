use crate::framework::Arguments;
use tracing::{debug, warn};

pub const NODE_AFFINITY_WEIGHT: &str = "nodeaffinity.weight";
pub const POD_AFFINITY_WEIGHT: &str = "podaffinity.weight";
pub const LEAST_REQUESTED_WEIGHT: &str = "leastrequested.weight";
pub const BALANCED_RESOURCE_WEIGHT: &str = "balancedresource.weight";

const DEFAULT_WEIGHT: i64 = 1;

/// Per-heuristic multipliers applied by the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityWeight {
    pub least_requested: i64,
    pub balanced_resource: i64,
    pub node_affinity: i64,
    pub pod_affinity: i64,
}

impl Default for PriorityWeight {
    fn default() -> Self {
        Self {
            least_requested: DEFAULT_WEIGHT,
            balanced_resource: DEFAULT_WEIGHT,
            node_affinity: DEFAULT_WEIGHT,
            pod_affinity: DEFAULT_WEIGHT,
        }
    }
}

impl PriorityWeight {
    /// Resolve weights from plugin arguments. Absent or unparseable keys keep
    /// the default of 1; a zero weight disables the heuristic's contribution.
    pub fn from_arguments(args: &Arguments) -> Self {
        let weight = Self {
            least_requested: resolve(args, LEAST_REQUESTED_WEIGHT),
            balanced_resource: resolve(args, BALANCED_RESOURCE_WEIGHT),
            node_affinity: resolve(args, NODE_AFFINITY_WEIGHT),
            pod_affinity: resolve(args, POD_AFFINITY_WEIGHT),
        };
        debug!("Resolved node order weights: {:?}", weight);
        weight
    }
}

fn resolve(args: &Arguments, key: &str) -> i64 {
    match args.get_int(key) {
        Some(w) if w >= 0 => w,
        Some(w) => {
            warn!(
                "Ignoring negative weight {} for {}, using {}",
                w, key, DEFAULT_WEIGHT
            );
            DEFAULT_WEIGHT
        }
        None => DEFAULT_WEIGHT,
    }
}
