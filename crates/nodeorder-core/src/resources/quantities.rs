use crate::error::{CoreError, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tracing::warn;

/// Resource quantities for nodes and tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    /// CPU in millicores (1000 = 1 core)
    pub cpu_millicores: i64,
    /// Memory in bytes
    pub memory_bytes: i64,
}

impl ResourceQuantities {
    pub fn new(cpu_millicores: i64, memory_bytes: i64) -> Self {
        Self {
            cpu_millicores,
            memory_bytes,
        }
    }

    /// Parse CPU string (e.g., "2", "1000m", "0.5")
    pub fn parse_cpu(s: &str) -> std::result::Result<i64, String> {
        if let Some(m) = s.strip_suffix('m') {
            // Millicores
            m.parse::<i64>()
                .map_err(|e| format!("Invalid CPU millicore value: {}", e))
        } else if let Ok(cores) = s.parse::<f64>() {
            // Cores as float
            Ok((cores * 1000.0) as i64)
        } else {
            Err(format!("Invalid CPU format: {}", s))
        }
    }

    /// Parse memory string (e.g., "128Mi", "1.5Gi", "1G", "1024").
    /// Fractional byte counts round up.
    pub fn parse_memory(s: &str) -> std::result::Result<i64, String> {
        const SUFFIXES: [(&str, i64); 10] = [
            ("Ki", 1 << 10),
            ("Mi", 1 << 20),
            ("Gi", 1 << 30),
            ("Ti", 1 << 40),
            ("Pi", 1 << 50),
            ("k", 1_000),
            ("M", 1_000_000),
            ("G", 1_000_000_000),
            ("T", 1_000_000_000_000),
            ("P", 1_000_000_000_000_000),
        ];

        let (num, multiplier) = SUFFIXES
            .iter()
            .find_map(|(suffix, multiplier)| s.strip_suffix(*suffix).map(|n| (n, *multiplier)))
            .unwrap_or((s, 1));

        if let Ok(n) = num.parse::<i64>() {
            return n
                .checked_mul(multiplier)
                .ok_or_else(|| format!("Memory quantity out of range: {}", s));
        }

        let value = num
            .parse::<f64>()
            .map_err(|e| format!("Invalid memory format {}: {}", s, e))?;
        let bytes = (value * multiplier as f64).ceil();
        if !bytes.is_finite() || bytes < i64::MIN as f64 || bytes >= i64::MAX as f64 {
            return Err(format!("Memory quantity out of range: {}", s));
        }
        Ok(bytes as i64)
    }

    /// Get CPU and memory from a resource map. Missing entries are zero;
    /// unparseable ones are logged and counted as zero.
    pub fn from_k8s_resource_map(resources: &BTreeMap<String, Quantity>) -> Self {
        let cpu_millicores = resources
            .get("cpu")
            .and_then(|q| lenient("cpu", &q.0, Self::parse_cpu(&q.0)))
            .unwrap_or(0);

        let memory_bytes = resources
            .get("memory")
            .and_then(|q| lenient("memory", &q.0, Self::parse_memory(&q.0)))
            .unwrap_or(0);

        Self {
            cpu_millicores,
            memory_bytes,
        }
    }

    /// Strict variant of [`Self::from_k8s_resource_map`]: a present but
    /// unparseable quantity is an error. Missing entries are still zero.
    pub fn try_from_k8s_resource_map(resources: &BTreeMap<String, Quantity>) -> Result<Self> {
        let cpu_millicores = match resources.get("cpu") {
            Some(q) => {
                Self::parse_cpu(&q.0).map_err(|_| CoreError::invalid_quantity("cpu", &q.0))?
            }
            None => 0,
        };

        let memory_bytes = match resources.get("memory") {
            Some(q) => Self::parse_memory(&q.0)
                .map_err(|_| CoreError::invalid_quantity("memory", &q.0))?,
            None => 0,
        };

        Ok(Self {
            cpu_millicores,
            memory_bytes,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.cpu_millicores == 0 && self.memory_bytes == 0
    }
}

/// Value of a quantity that may be dropped, warning when it is
pub(crate) fn lenient<T>(
    resource: &str,
    raw: &str,
    parsed: std::result::Result<T, String>,
) -> Option<T> {
    match parsed {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring {} quantity {:?}: {}", resource, raw, e);
            None
        }
    }
}

impl Add for ResourceQuantities {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cpu_millicores: self.cpu_millicores.saturating_add(rhs.cpu_millicores),
            memory_bytes: self.memory_bytes.saturating_add(rhs.memory_bytes),
        }
    }
}

impl AddAssign for ResourceQuantities {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for ResourceQuantities {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            cpu_millicores: self.cpu_millicores.saturating_sub(rhs.cpu_millicores),
            memory_bytes: self.memory_bytes.saturating_sub(rhs.memory_bytes),
        }
    }
}

impl SubAssign for ResourceQuantities {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu() {
        assert_eq!(ResourceQuantities::parse_cpu("1").unwrap(), 1000);
        assert_eq!(ResourceQuantities::parse_cpu("0.5").unwrap(), 500);
        assert_eq!(ResourceQuantities::parse_cpu("100m").unwrap(), 100);
        assert_eq!(ResourceQuantities::parse_cpu("2").unwrap(), 2000);
        assert!(ResourceQuantities::parse_cpu("two").is_err());
    }

    #[test]
    fn test_parse_memory() {
        assert_eq!(ResourceQuantities::parse_memory("1024").unwrap(), 1024);
        assert_eq!(ResourceQuantities::parse_memory("1Ki").unwrap(), 1024);
        assert_eq!(
            ResourceQuantities::parse_memory("128Mi").unwrap(),
            128 * 1024 * 1024
        );
        assert_eq!(
            ResourceQuantities::parse_memory("1Gi").unwrap(),
            1024 * 1024 * 1024
        );
        assert_eq!(ResourceQuantities::parse_memory("2G").unwrap(), 2_000_000_000);
        assert!(ResourceQuantities::parse_memory("lots").is_err());
    }

    #[test]
    fn test_parse_fractional_memory() {
        assert_eq!(
            ResourceQuantities::parse_memory("1.5Gi").unwrap(),
            3 * (1 << 29)
        );
        assert_eq!(ResourceQuantities::parse_memory("0.5M").unwrap(), 500_000);
        assert_eq!(ResourceQuantities::parse_memory("2.5").unwrap(), 3);
        assert!(ResourceQuantities::parse_memory("1.5.0Gi").is_err());
    }

    #[test]
    fn test_parse_memory_out_of_range() {
        assert!(ResourceQuantities::parse_memory("9000000000Gi").is_err());
        assert!(ResourceQuantities::parse_memory("9000000000.5Gi").is_err());
        assert!(ResourceQuantities::parse_memory("infGi").is_err());
        assert!(ResourceQuantities::parse_memory("8Pi").is_ok());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = ResourceQuantities::new(i64::MAX, i64::MAX - 1);
        let one = ResourceQuantities::new(1, 2);

        let mut total = huge;
        total += one;
        assert_eq!(total, ResourceQuantities::new(i64::MAX, i64::MAX));

        let low = ResourceQuantities::new(i64::MIN, 0) - one;
        assert_eq!(low.cpu_millicores, i64::MIN);
    }

    #[test]
    fn test_try_from_resource_map_rejects_garbage() {
        let mut map = BTreeMap::new();
        map.insert("cpu".to_string(), Quantity("4".to_string()));
        map.insert("memory".to_string(), Quantity("eight".to_string()));

        let err = ResourceQuantities::try_from_k8s_resource_map(&map).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { .. }));

        // The permissive variant keeps going
        let lenient = ResourceQuantities::from_k8s_resource_map(&map);
        assert_eq!(lenient, ResourceQuantities::new(4000, 0));
    }

    #[test]
    fn test_add_sub_cancel() {
        let base = ResourceQuantities::new(1500, 3 << 30);
        let delta = ResourceQuantities::new(250, 1 << 20);

        let mut total = base;
        for _ in 0..100 {
            total += delta;
            total -= delta;
        }
        assert_eq!(total, base);
        assert_eq!(base + delta - delta, base);
    }
}
