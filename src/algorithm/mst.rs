//! 最小生成树算法
//!
//! Prim 算法：从插入顺序中的第一个节点出发，把边视为无向，
//! 逐步选取跨越已访问集合边界的最小权重边。

use crate::graph::{Edge, GraphStore};
use crate::types::{NodeId, Weight};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// 最小生成树结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumSpanningTree {
    /// 起始节点（空图时为 None）
    pub root: Option<NodeId>,
    /// 按选取顺序排列的树边
    pub edges: Vec<Edge>,
    /// 树边权重之和
    pub total_cost: Weight,
    /// 树覆盖的节点（按访问顺序）
    pub spanned: Vec<NodeId>,
    /// 是否覆盖了图中所有节点
    pub complete: bool,
}

impl MinimumSpanningTree {
    fn empty() -> Self {
        Self {
            root: None,
            edges: Vec::new(),
            total_cost: 0,
            spanned: Vec::new(),
            complete: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Prim 最小生成树
pub struct Prim<'a> {
    store: &'a GraphStore,
}

impl<'a> Prim<'a> {
    /// 创建算法实例
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// 计算第一个节点所在连通分量的最小生成树
    ///
    /// 权重相同时先枚举到的边优先。图不连通时只覆盖可达分量，这不是错误。
    #[tracing::instrument(skip(self), fields(nodes = self.store.node_count(), edges = self.store.edge_count()))]
    pub fn run(&self) -> MinimumSpanningTree {
        let store: &'a GraphStore = self.store;
        let root = match store.first_node() {
            Some(node) => node.id(),
            None => return MinimumSpanningTree::empty(),
        };

        let edges: Vec<&'a Edge> = store.edges().collect();

        // 无向关联表：节点 -> 关联边的位置
        let mut incident: HashMap<&'a NodeId, Vec<usize>> = HashMap::new();
        for (pos, edge) in edges.iter().enumerate() {
            if edge.is_loop() {
                continue;
            }
            incident.entry(edge.source()).or_default().push(pos);
            incident.entry(edge.target()).or_default().push(pos);
        }

        let node_count = store.node_count();
        let mut visited: HashSet<&NodeId> = HashSet::with_capacity(node_count);
        let mut spanned = Vec::with_capacity(node_count);
        let mut heap: BinaryHeap<Reverse<(Weight, usize)>> = BinaryHeap::new();

        let mut visit = |id: &'a NodeId,
                         visited: &mut HashSet<&'a NodeId>,
                         heap: &mut BinaryHeap<Reverse<(Weight, usize)>>| {
            visited.insert(id);
            spanned.push(id.clone());
            for &pos in incident.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                heap.push(Reverse((edges[pos].weight(), pos)));
            }
        };

        visit(root, &mut visited, &mut heap);

        let mut selected = Vec::new();
        let mut total_cost: Weight = 0;

        while visited.len() < node_count {
            let Some(Reverse((weight, pos))) = heap.pop() else {
                break;
            };

            let edge = edges[pos];
            let fresh = match (
                visited.contains(edge.source()),
                visited.contains(edge.target()),
            ) {
                (true, false) => edge.target(),
                (false, true) => edge.source(),
                // 两端都已访问：堆中的过期条目
                _ => continue,
            };

            visit(fresh, &mut visited, &mut heap);
            selected.push(edge.clone());
            total_cost = total_cost.saturating_add(weight);
        }

        let complete = visited.len() == node_count;
        tracing::debug!(
            tree_edges = selected.len(),
            total_cost,
            complete,
            "最小生成树计算完成"
        );

        MinimumSpanningTree {
            root: Some(root.clone()),
            edges: selected,
            total_cost,
            spanned,
            complete,
        }
    }
}
