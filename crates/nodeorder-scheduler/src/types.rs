/// Upper bound of the normalised per-heuristic scores
pub const MAX_PRIORITY: i64 = 10;

/// Score of one heuristic for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPriority {
    /// Node name
    pub host: String,
    /// Score, higher is better
    pub score: i64,
}

impl HostPriority {
    /// Create a new host priority
    pub fn new(host: impl Into<String>, score: i64) -> Self {
        Self {
            host: host.into(),
            score,
        }
    }
}

/// Scores of one heuristic across nodes
pub type HostPriorityList = Vec<HostPriority>;

/// Look up the score of `host`, 0 when the host is absent
pub fn host_score(list: &[HostPriority], host: &str) -> i64 {
    list.iter()
        .find(|p| p.host == host)
        .map(|p| p.score)
        .unwrap_or(0)
}
