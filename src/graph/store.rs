//! 图存储
//!
//! 节点与有向带权边的唯一数据源，只能通过经过校验的操作修改

use super::edge::Edge;
use super::index::EdgeIndex;
use super::node::Node;
use crate::error::{Error, Result};
use crate::types::{validate_weight, EdgeKey, NodeId, Weight};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 演示图的节点
pub const DEMO_NODES: [&str; 3] = ["A", "B", "C"];

/// 演示图的边
pub const DEMO_EDGES: [(&str, &str, i64); 2] = [("A", "B", 10), ("B", "C", 5)];

/// 图存储
///
/// 节点和边都按插入顺序枚举。对已存在的有序节点对再次加边只会覆盖权重，
/// 边在枚举中的位置保持不变。
#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    /// 节点表（按插入顺序）
    nodes: IndexMap<NodeId, Node>,
    /// 边表（按插入顺序）
    edges: IndexMap<EdgeKey, Edge>,
    /// 邻接索引
    index: EdgeIndex,
}

/// 图快照，供展示层和 API 使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<Edge>,
}

impl GraphStore {
    /// 创建空图
    pub fn new() -> Self {
        Self::default()
    }

    /// 从初始节点和边构建图，每一步都经过与 `add_node`/`add_edge` 相同的校验
    pub fn with_initial<N, E, S>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        E: IntoIterator<Item = (S, S, i64)>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for name in nodes {
            store.add_node(name.as_ref())?;
        }
        for (source, target, weight) in edges {
            store.add_edge(source.as_ref(), target.as_ref(), weight)?;
        }
        Ok(store)
    }

    /// 演示图：A -> B (10), B -> C (5)
    pub fn demo() -> Result<Self> {
        Self::with_initial(DEMO_NODES, DEMO_EDGES)
    }

    // ==================== 节点操作 ====================

    /// 添加节点，返回规范化后的 ID
    pub fn add_node(&mut self, name: &str) -> Result<NodeId> {
        let id = NodeId::parse(name)?;
        if self.nodes.contains_key(&id) {
            return Err(Error::Duplicate(id.into_string()));
        }

        self.nodes.insert(id.clone(), Node::new(id.clone()));
        debug!(node = %id, "节点已添加");
        Ok(id)
    }

    /// 获取节点
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// 节点是否存在
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// 规范化用户输入并确认节点存在
    pub fn resolve(&self, name: &str) -> Result<NodeId> {
        let id = NodeId::parse(name)?;
        if !self.nodes.contains_key(&id) {
            return Err(Error::NotFound(id.into_string()));
        }
        Ok(id)
    }

    /// 按插入顺序遍历节点
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// 第一个插入的节点
    pub fn first_node(&self) -> Option<&Node> {
        self.nodes.first().map(|(_, node)| node)
    }

    /// 节点在插入顺序中的位置
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// 获取节点数量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ==================== 边操作 ====================

    /// 添加或更新边
    ///
    /// 先校验全部输入，任何失败都不会修改图。
    pub fn add_edge(&mut self, source: &str, target: &str, weight: i64) -> Result<Edge> {
        let source = NodeId::parse(source)?;
        let target = NodeId::parse(target)?;
        let weight = validate_weight(weight)?;

        for id in [&source, &target] {
            if !self.nodes.contains_key(id) {
                return Err(Error::NotFound(id.to_string()));
            }
        }

        let key = EdgeKey::new(source, target);
        if let Some(existing) = self.edges.get_mut(&key) {
            let previous = existing.weight();
            existing.set_weight(weight);
            debug!(edge = %key, previous, weight, "边权重已更新");
            return Ok(existing.clone());
        }

        let position = self.edges.len();
        self.index.add_edge(position, &key.source, &key.target);
        let edge = Edge::new(key.source.clone(), key.target.clone(), weight);
        debug!(edge = %key, weight, "边已添加");
        self.edges.insert(key, edge.clone());
        Ok(edge)
    }

    /// 获取两点之间的边
    pub fn edge(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        self.edges
            .get(&EdgeKey::new(source.clone(), target.clone()))
    }

    /// 获取边权重
    pub fn weight(&self, source: &NodeId, target: &NodeId) -> Option<Weight> {
        self.edge(source, target).map(Edge::weight)
    }

    /// 按插入顺序遍历边
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// 获取节点的所有出边（按插入顺序）
    pub fn outgoing_edges<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.index
            .outgoing(id)
            .iter()
            .filter_map(move |&pos| self.edges.get_index(pos).map(|(_, edge)| edge))
    }

    /// 获取节点的所有入边（按插入顺序）
    pub fn incoming_edges<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.index
            .incoming(id)
            .iter()
            .filter_map(move |&pos| self.edges.get_index(pos).map(|(_, edge)| edge))
    }

    /// 获取节点的出度
    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.index.out_degree(id)
    }

    /// 获取节点的入度
    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.index.in_degree(id)
    }

    /// 获取边数量
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ==================== 整体操作 ====================

    /// 清空图，总是成功
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index.clear();
        debug!("图已清空");
    }

    /// 图是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 生成快照
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.keys().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }
}
