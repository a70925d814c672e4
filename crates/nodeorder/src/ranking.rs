use nodeorder_core::TaskInfo;
use nodeorder_scheduler::{SchedulerError, Session};
use std::cmp::Ordering;
use std::sync::Arc;

/// Score of one candidate node, or the reason it stayed unscored
#[derive(Debug)]
pub struct NodeScore {
    pub node_name: String,
    pub score: Result<f64, SchedulerError>,
}

impl NodeScore {
    pub fn is_scored(&self) -> bool {
        self.score.is_ok()
    }
}

/// Score `task` on every session node concurrently and order the results
/// best first. Ties break on node name; unscored nodes sort last.
pub async fn rank_nodes(ssn: &Arc<Session>, task: &TaskInfo) -> miette::Result<Vec<NodeScore>> {
    let mut handles = Vec::new();

    for node in ssn.nodes() {
        let ssn = ssn.clone();
        let task = task.clone();
        let node_name = node.name.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let score = match ssn.node(&node_name) {
                Some(node) => ssn.node_order(&task, node),
                None => Err(SchedulerError::node_not_found(&node_name)),
            };
            NodeScore { node_name, score }
        }));
    }

    let mut scores = Vec::with_capacity(handles.len());
    for handle in handles {
        let score = handle
            .await
            .map_err(|e| miette::miette!("Scoring worker failed: {}", e))?;
        scores.push(score);
    }

    scores.sort_by(compare);
    Ok(scores)
}

fn compare(a: &NodeScore, b: &NodeScore) -> Ordering {
    match (&a.score, &b.score) {
        (Ok(x), Ok(y)) => y
            .partial_cmp(x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node_name.cmp(&b.node_name)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.node_name.cmp(&b.node_name),
    }
}

/// Best scored node, if any
pub fn best_node(ranking: &[NodeScore]) -> Option<&NodeScore> {
    ranking.first().filter(|s| s.is_scored())
}
