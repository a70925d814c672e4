//! Builders shared by the unit tests

use k8s_openapi::api::core::v1::{
    Affinity, NodeAffinity, NodeSelectorRequirement, NodeSelectorTerm, PodAffinity,
    PodAffinityTerm, PodAntiAffinity, PreferredSchedulingTerm, WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use nodeorder_core::{Node, Pod};
use std::collections::BTreeMap;

pub const HOSTNAME_KEY: &str = "kubernetes.io/hostname";

pub fn create_test_node(name: &str, cpu: &str, memory: &str) -> Node {
    let mut node = Node::default();
    node.metadata.name = Some(name.to_string());
    set_labels(&mut node.metadata, &[(HOSTNAME_KEY, name)]);
    node.status = Some(Default::default());
    node.status.as_mut().unwrap().allocatable = Some(BTreeMap::new());
    let allocatable = node.status.as_mut().unwrap().allocatable.as_mut().unwrap();
    allocatable.insert("cpu".to_string(), Quantity(cpu.to_string()));
    allocatable.insert("memory".to_string(), Quantity(memory.to_string()));
    node
}

pub fn create_test_pod(name: &str, cpu: &str, memory: &str) -> Pod {
    let mut pod = Pod::default();
    pod.metadata.name = Some(name.to_string());
    pod.metadata.namespace = Some("default".to_string());
    pod.spec = Some(Default::default());
    pod.spec.as_mut().unwrap().containers = vec![Default::default()];
    pod.spec.as_mut().unwrap().containers[0].name = "test".to_string();
    pod.spec.as_mut().unwrap().containers[0].resources = Some(Default::default());
    pod.spec.as_mut().unwrap().containers[0]
        .resources
        .as_mut()
        .unwrap()
        .requests = Some(BTreeMap::from([
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ]));
    pod
}

/// Merge `pairs` into the object's labels
pub fn set_labels(meta: &mut ObjectMeta, pairs: &[(&str, &str)]) {
    let labels = meta.labels.get_or_insert_with(BTreeMap::new);
    for (k, v) in pairs {
        labels.insert(k.to_string(), v.to_string());
    }
}

pub fn selector(pairs: &[(&str, &str)]) -> LabelSelector {
    LabelSelector {
        match_labels: Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn affinity_term(label_selector: LabelSelector, topology_key: &str) -> PodAffinityTerm {
    PodAffinityTerm {
        label_selector: Some(label_selector),
        topology_key: topology_key.to_string(),
        ..Default::default()
    }
}

fn affinity_mut(pod: &mut Pod) -> &mut Affinity {
    pod.spec
        .get_or_insert_with(Default::default)
        .affinity
        .get_or_insert_with(Default::default)
}

pub fn add_preferred_pod_affinity(pod: &mut Pod, weight: i32, term: PodAffinityTerm) {
    affinity_mut(pod)
        .pod_affinity
        .get_or_insert_with(PodAffinity::default)
        .preferred_during_scheduling_ignored_during_execution
        .get_or_insert_with(Vec::new)
        .push(WeightedPodAffinityTerm {
            pod_affinity_term: term,
            weight,
        });
}

pub fn add_required_pod_affinity(pod: &mut Pod, term: PodAffinityTerm) {
    affinity_mut(pod)
        .pod_affinity
        .get_or_insert_with(PodAffinity::default)
        .required_during_scheduling_ignored_during_execution
        .get_or_insert_with(Vec::new)
        .push(term);
}

pub fn add_preferred_pod_anti_affinity(pod: &mut Pod, weight: i32, term: PodAffinityTerm) {
    affinity_mut(pod)
        .pod_anti_affinity
        .get_or_insert_with(PodAntiAffinity::default)
        .preferred_during_scheduling_ignored_during_execution
        .get_or_insert_with(Vec::new)
        .push(WeightedPodAffinityTerm {
            pod_affinity_term: term,
            weight,
        });
}

pub fn node_requirement(key: &str, operator: &str, values: &[&str]) -> NodeSelectorRequirement {
    NodeSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: Some(values.iter().map(|v| v.to_string()).collect()),
    }
}

pub fn add_preferred_node_affinity(
    pod: &mut Pod,
    weight: i32,
    expressions: Vec<NodeSelectorRequirement>,
) {
    affinity_mut(pod)
        .node_affinity
        .get_or_insert_with(NodeAffinity::default)
        .preferred_during_scheduling_ignored_during_execution
        .get_or_insert_with(Vec::new)
        .push(PreferredSchedulingTerm {
            preference: NodeSelectorTerm {
                match_expressions: Some(expressions),
                ..Default::default()
            },
            weight,
        });
}
