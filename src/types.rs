//! 通用类型定义
//!
//! 节点标识、边权重以及输入规范化

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// 边权重（非负整数）
pub type Weight = u64;

/// 节点 ID
///
/// 由用户输入的名称规范化而来：去除首尾空白并转为大写。
/// 构造后保证非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// 规范化并校验节点名称
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim().to_uppercase();
        if name.is_empty() {
            return Err(Error::Validation("节点名称不能为空".to_string()));
        }
        Ok(NodeId(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 有序节点对，标识一条有向边
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeKey {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// 单条边允许的最大权重
///
/// 权重限制在 32 位以内，路径代价、生成树总代价和流量值用 64 位累加不会溢出
pub const MAX_WEIGHT: Weight = u32::MAX as Weight;

/// 校验权重：必须是不超过 [`MAX_WEIGHT`] 的非负整数
pub fn validate_weight(weight: i64) -> Result<Weight> {
    let weight = u64::try_from(weight)
        .map_err(|_| Error::Validation(format!("权重必须是非负整数，实际为 {}", weight)))?;
    if weight > MAX_WEIGHT {
        return Err(Error::Validation(format!(
            "权重不能超过 {}，实际为 {}",
            MAX_WEIGHT, weight
        )));
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_normalization() {
        let id = NodeId::parse("  hub-a ").unwrap();
        assert_eq!(id.as_str(), "HUB-A");
        assert_eq!(id, NodeId::parse("HUB-A").unwrap());
    }

    #[test]
    fn test_node_id_rejects_blank() {
        assert!(matches!(NodeId::parse(""), Err(Error::Validation(_))));
        assert!(matches!(NodeId::parse(" \t "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_weight_validation() {
        assert_eq!(validate_weight(0).unwrap(), 0);
        assert_eq!(validate_weight(42).unwrap(), 42);
        assert!(matches!(validate_weight(-1), Err(Error::Validation(_))));
    }

    #[test]
    fn test_weight_upper_bound() {
        let max = MAX_WEIGHT as i64;
        assert_eq!(validate_weight(max).unwrap(), MAX_WEIGHT);
        assert!(matches!(validate_weight(max + 1), Err(Error::Validation(_))));
        assert!(matches!(validate_weight(i64::MAX), Err(Error::Validation(_))));
    }

    #[test]
    fn test_node_id_serializes_as_string() {
        let id = NodeId::parse("a").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"A\"");
    }
}
