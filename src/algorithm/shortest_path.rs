//! 最短路径算法
//!
//! Dijkstra 算法，沿边的方向在非负权重上求两点间的最小代价路径

use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::types::{EdgeKey, NodeId, Weight};
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// 路径结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// 路径上的节点序列（起点 -> 终点）
    pub nodes: Vec<NodeId>,
    /// 路径总代价
    pub cost: Weight,
}

impl PathResult {
    /// 路径跳数
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// 路径经过的边
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.nodes
            .windows(2)
            .map(|pair| EdgeKey::new(pair[0].clone(), pair[1].clone()))
            .collect()
    }

    /// 以 "A -> B -> C" 形式展示
    pub fn display_route(&self) -> String {
        self.nodes
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// 路径查找器
pub struct PathFinder<'a> {
    store: &'a GraphStore,
}

impl<'a> PathFinder<'a> {
    /// 创建路径查找器
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Dijkstra 最短路径
    ///
    /// 存在多条等价最短路径时，返回哪一条取决于出队顺序。
    #[tracing::instrument(skip(self))]
    pub fn shortest_path(&self, start: &str, end: &str) -> Result<PathResult> {
        let start = self.store.resolve(start)?;
        let end = self.store.resolve(end)?;

        // 不在表中即为尚未到达
        let mut distances: HashMap<NodeId, Weight> = HashMap::new();
        let mut predecessors: HashMap<NodeId, NodeId> = HashMap::new();
        let mut settled: HashSet<NodeId> = HashSet::new();
        let mut queue: PriorityQueue<NodeId, Reverse<Weight>> = PriorityQueue::new();

        distances.insert(start.clone(), 0);
        queue.push(start.clone(), Reverse(0));

        while let Some((current, Reverse(distance))) = queue.pop() {
            if current == end {
                break;
            }

            for edge in self.store.outgoing_edges(&current) {
                let neighbor = edge.target();
                if settled.contains(neighbor) || neighbor == &current {
                    continue;
                }

                let candidate = distance.saturating_add(edge.weight());
                let improves = distances
                    .get(neighbor)
                    .map_or(true, |&known| candidate < known);
                if improves {
                    distances.insert(neighbor.clone(), candidate);
                    predecessors.insert(neighbor.clone(), current.clone());
                    queue.push_increase(neighbor.clone(), Reverse(candidate));
                }
            }

            settled.insert(current);
        }

        let cost = match distances.get(&end) {
            Some(&cost) => cost,
            None => {
                return Err(Error::NoPath {
                    from: start.into_string(),
                    to: end.into_string(),
                })
            }
        };

        let path = Self::reconstruct_path(&end, &predecessors);
        tracing::debug!(hops = path.len().saturating_sub(1), cost, "最短路径计算完成");

        Ok(PathResult { nodes: path, cost })
    }

    /// 沿前驱链从终点回溯到起点
    fn reconstruct_path(end: &NodeId, predecessors: &HashMap<NodeId, NodeId>) -> Vec<NodeId> {
        let mut nodes = vec![end.clone()];
        let mut current = end;
        while let Some(prev) = predecessors.get(current) {
            nodes.push(prev.clone());
            current = prev;
        }
        nodes.reverse();
        nodes
    }
}
