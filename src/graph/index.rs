//! 邻接索引
//!
//! 记录每个节点的出边和入边在边表中的位置，支持快速查找

use crate::types::NodeId;
use std::collections::HashMap;

/// 边索引
///
/// 位置指向 `GraphStore` 的边表。边只追加、不删除（`clear` 时整体重置），
/// 所以位置一经分配便保持有效。
#[derive(Debug, Default, Clone)]
pub struct EdgeIndex {
    /// 源节点到出边位置的映射
    outgoing: HashMap<NodeId, Vec<usize>>,
    /// 目标节点到入边位置的映射
    incoming: HashMap<NodeId, Vec<usize>>,
}

impl EdgeIndex {
    /// 创建新索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条新边
    pub fn add_edge(&mut self, position: usize, source: &NodeId, target: &NodeId) {
        self.outgoing
            .entry(source.clone())
            .or_default()
            .push(position);
        self.incoming
            .entry(target.clone())
            .or_default()
            .push(position);
    }

    /// 获取节点的出边位置
    pub fn outgoing(&self, id: &NodeId) -> &[usize] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取节点的入边位置
    pub fn incoming(&self, id: &NodeId) -> &[usize] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取节点的出度
    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.outgoing(id).len()
    }

    /// 获取节点的入度
    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.incoming(id).len()
    }

    /// 清空索引
    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.incoming.clear();
    }
}
