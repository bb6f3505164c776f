//! 边定义
//!
//! 有向带权边，同一有序节点对至多一条

use crate::types::{EdgeKey, NodeId, Weight};
use serde::{Deserialize, Serialize};

/// 边
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// 源节点 ID
    source: NodeId,
    /// 目标节点 ID
    target: NodeId,
    /// 权重（最大流中作为容量）
    weight: Weight,
}

impl Edge {
    /// 创建新边
    pub fn new(source: NodeId, target: NodeId, weight: Weight) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }

    /// 获取源节点 ID
    pub fn source(&self) -> &NodeId {
        &self.source
    }

    /// 获取目标节点 ID
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    /// 获取权重
    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }

    /// 边的有序节点对
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone())
    }

    /// 是否为自环
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::parse(s).unwrap()
    }

    #[test]
    fn test_edge_endpoints() {
        let e = Edge::new(id("a"), id("b"), 10);

        assert_eq!(e.source().as_str(), "A");
        assert_eq!(e.target().as_str(), "B");
        assert_eq!(e.weight(), 10);
        assert_eq!(e.key(), EdgeKey::new(id("A"), id("B")));
        assert!(!e.is_loop());
    }
}
