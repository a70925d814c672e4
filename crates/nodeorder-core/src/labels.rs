//! Label selector evaluation
//!
//! Turns the selector shapes found on pods (`LabelSelector`) and in node
//! affinity terms (`NodeSelectorRequirement`) into a [`Selector`] that can
//! be matched against a label set. Construction validates operators and
//! value counts; a malformed selector is a [`CoreError::InvalidSelector`].

use crate::error::{CoreError, Result};
use k8s_openapi::api::core::v1::NodeSelectorRequirement;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;
use std::fmt;

static NO_LABELS: BTreeMap<String, String> = BTreeMap::new();

/// Selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
    Gt,
    Lt,
}

impl Operator {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "In" => Some(Self::In),
            "NotIn" => Some(Self::NotIn),
            "Exists" => Some(Self::Exists),
            "DoesNotExist" => Some(Self::DoesNotExist),
            "Gt" => Some(Self::Gt),
            "Lt" => Some(Self::Lt),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
            Self::Gt => "Gt",
            Self::Lt => "Lt",
        };
        f.write_str(s)
    }
}

/// A single `key <op> values` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: Vec<String>,
    /// Parsed bound for Gt/Lt
    bound: Option<i64>,
}

impl Requirement {
    /// Build a requirement, checking the value count against the operator
    pub fn new(key: impl Into<String>, operator: Operator, values: Vec<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::invalid_selector(
                "requirement key must not be empty",
                "Set the label key the requirement applies to",
            ));
        }

        let mut bound = None;
        match operator {
            Operator::In | Operator::NotIn => {
                if values.is_empty() {
                    return Err(CoreError::invalid_selector(
                        format!("{} requirement on {} has no values", operator, key),
                        "In and NotIn need at least one value",
                    ));
                }
            }
            Operator::Exists | Operator::DoesNotExist => {
                if !values.is_empty() {
                    return Err(CoreError::invalid_selector(
                        format!("{} requirement on {} must not carry values", operator, key),
                        "Drop the values list for Exists and DoesNotExist",
                    ));
                }
            }
            Operator::Gt | Operator::Lt => {
                if values.len() != 1 {
                    return Err(CoreError::invalid_selector(
                        format!(
                            "{} requirement on {} needs exactly one value, got {}",
                            operator,
                            key,
                            values.len()
                        ),
                        "Gt and Lt compare against a single integer",
                    ));
                }
                bound = Some(values[0].parse::<i64>().map_err(|_| {
                    CoreError::invalid_selector(
                        format!("{} requirement on {} has non-integer value {}", operator, key, values[0]),
                        "Gt and Lt compare against a single integer",
                    )
                })?);
            }
        }

        Ok(Self {
            key,
            operator,
            values,
            bound,
        })
    }

    /// Check the requirement against a label set
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::In => value.is_some_and(|v| self.values.contains(v)),
            Operator::NotIn => value.is_none_or(|v| !self.values.contains(v)),
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
            Operator::Gt | Operator::Lt => {
                let (Some(value), Some(bound)) = (value, self.bound) else {
                    return false;
                };
                match value.parse::<i64>() {
                    Ok(n) if self.operator == Operator::Gt => n > bound,
                    Ok(n) => n < bound,
                    Err(_) => false,
                }
            }
        }
    }
}

/// A conjunction of requirements, or the selector that matches nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Nothing,
    /// All requirements must hold. An empty list matches every label set.
    Requirements(Vec<Requirement>),
}

impl Selector {
    pub fn nothing() -> Self {
        Self::Nothing
    }

    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        let labels = labels.unwrap_or(&NO_LABELS);
        match self {
            Self::Nothing => false,
            Self::Requirements(reqs) => reqs.iter().all(|r| r.matches(labels)),
        }
    }
}

/// Convert a pod label selector. `None` selects nothing; an empty selector
/// selects everything. Only In, NotIn, Exists and DoesNotExist are valid.
pub fn label_selector_as_selector(selector: Option<&LabelSelector>) -> Result<Selector> {
    let Some(selector) = selector else {
        return Ok(Selector::nothing());
    };

    let mut reqs = Vec::new();

    if let Some(match_labels) = &selector.match_labels {
        for (key, value) in match_labels {
            reqs.push(Requirement::new(key, Operator::In, vec![value.clone()])?);
        }
    }

    if let Some(exprs) = &selector.match_expressions {
        for expr in exprs {
            let operator = match Operator::parse(&expr.operator) {
                Some(op @ (Operator::In | Operator::NotIn | Operator::Exists | Operator::DoesNotExist)) => op,
                _ => {
                    return Err(CoreError::invalid_selector(
                        format!("{:?} is not a valid pod selector operator", expr.operator),
                        "Use In, NotIn, Exists or DoesNotExist",
                    ))
                }
            };
            reqs.push(Requirement::new(
                &expr.key,
                operator,
                expr.values.clone().unwrap_or_default(),
            )?);
        }
    }

    Ok(Selector::Requirements(reqs))
}

/// Convert the match expressions of a node selector term. An empty list
/// selects nothing.
pub fn node_selector_requirements_as_selector(
    requirements: &[NodeSelectorRequirement],
) -> Result<Selector> {
    if requirements.is_empty() {
        return Ok(Selector::nothing());
    }

    let reqs = requirements
        .iter()
        .map(|expr| {
            let operator = Operator::parse(&expr.operator).ok_or_else(|| {
                CoreError::invalid_selector(
                    format!("{:?} is not a valid node selector operator", expr.operator),
                    "Use In, NotIn, Exists, DoesNotExist, Gt or Lt",
                )
            })?;
            Requirement::new(&expr.key, operator, expr.values.clone().unwrap_or_default())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Selector::Requirements(reqs))
}
