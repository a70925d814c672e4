pub mod quantities;

pub use quantities::ResourceQuantities;

use k8s_openapi::api::core::v1::{Container, Pod};
use quantities::lenient;

/// CPU counted for a container that requests none, for spreading purposes
pub const DEFAULT_MILLI_CPU_REQUEST: i64 = 100;

/// Memory counted for a container that requests none, for spreading purposes
pub const DEFAULT_MEMORY_REQUEST: i64 = 200 * 1024 * 1024;

/// Sum of the container requests of a pod
pub fn pod_requests(pod: &Pod) -> ResourceQuantities {
    containers(pod).fold(ResourceQuantities::default(), |acc, container| {
        acc + container
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .map(ResourceQuantities::from_k8s_resource_map)
            .unwrap_or_default()
    })
}

/// Sum of the container requests of a pod, with every container that
/// leaves CPU or memory unset, or sets it to something unparseable,
/// counted at the default request instead of zero
pub fn pod_non_zero_requests(pod: &Pod) -> ResourceQuantities {
    containers(pod).fold(ResourceQuantities::default(), |acc, container| {
        let requests = container.resources.as_ref().and_then(|r| r.requests.as_ref());

        let cpu_millicores = requests
            .and_then(|r| r.get("cpu"))
            .and_then(|q| lenient("cpu", &q.0, ResourceQuantities::parse_cpu(&q.0)))
            .unwrap_or(DEFAULT_MILLI_CPU_REQUEST);
        let memory_bytes = requests
            .and_then(|r| r.get("memory"))
            .and_then(|q| lenient("memory", &q.0, ResourceQuantities::parse_memory(&q.0)))
            .unwrap_or(DEFAULT_MEMORY_REQUEST);

        acc + ResourceQuantities::new(cpu_millicores, memory_bytes)
    })
}

fn containers(pod: &Pod) -> impl Iterator<Item = &Container> {
    pod.spec.iter().flat_map(|spec| spec.containers.iter())
}
