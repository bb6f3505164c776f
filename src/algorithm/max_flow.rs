//! 最大流算法
//!
//! 实现 Edmonds-Karp 算法（基于 BFS 的 Ford-Fulkerson），
//! 以边权重作为容量计算源点到汇点的最大流

use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::types::{NodeId, Weight};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// 单条边上的流量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFlow {
    pub source: NodeId,
    pub target: NodeId,
    /// 容量（边权重）
    pub capacity: Weight,
    /// 分配到的流量
    pub flow: Weight,
}

impl EdgeFlow {
    /// 流量是否占满容量
    pub fn is_saturated(&self) -> bool {
        self.capacity > 0 && self.flow == self.capacity
    }

    /// 利用率，取值 [0, 1]
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.flow as f64 / self.capacity as f64
        }
    }
}

/// 最大流结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxFlow {
    pub source: NodeId,
    pub sink: NodeId,
    /// 最大流量值
    pub value: Weight,
    /// 流量分配（按边的枚举顺序，包含流量为 0 的边）
    pub edge_flows: Vec<EdgeFlow>,
    /// 最小割的源侧节点集（按插入顺序）
    pub source_side: Vec<NodeId>,
}

impl MaxFlow {
    /// 查询某条边上的流量，节点名按 `NodeId` 规则归一化
    pub fn flow_on(&self, source: &str, target: &str) -> Option<Weight> {
        let (Ok(source), Ok(target)) = (NodeId::parse(source), NodeId::parse(target)) else {
            return None;
        };
        self.edge_flows
            .iter()
            .find(|f| f.source == source && f.target == target)
            .map(|f| f.flow)
    }

    /// 流量占满容量的边，即限制流量的瓶颈边
    pub fn saturated_edges(&self) -> Vec<&EdgeFlow> {
        self.edge_flows.iter().filter(|f| f.is_saturated()).collect()
    }

    /// 节点的流入总量
    pub fn inflow(&self, id: &NodeId) -> Weight {
        self.edge_flows
            .iter()
            .filter(|f| &f.target == id)
            .map(|f| f.flow)
            .sum()
    }

    /// 节点的流出总量
    pub fn outflow(&self, id: &NodeId) -> Weight {
        self.edge_flows
            .iter()
            .filter(|f| &f.source == id)
            .map(|f| f.flow)
            .sum()
    }
}

/// 残余图
///
/// 节点以在图中的插入位置编号。`residual[(u, v)]` 为 u 到 v 的剩余容量，
/// 原始边初始化为其容量，反向边初始化为 0。
struct ResidualGraph {
    residual: HashMap<(usize, usize), Weight>,
    adj: Vec<Vec<usize>>,
}

impl ResidualGraph {
    fn build(store: &GraphStore) -> Self {
        let mut residual: HashMap<(usize, usize), Weight> = HashMap::new();
        let mut adj = vec![Vec::new(); store.node_count()];

        for edge in store.edges() {
            if edge.is_loop() {
                continue;
            }
            let (Some(u), Some(v)) = (
                store.position_of(edge.source().as_str()),
                store.position_of(edge.target().as_str()),
            ) else {
                continue;
            };

            // 邻接表按边的枚举顺序登记正向和反向残余边
            for (a, b) in [(u, v), (v, u)] {
                if !residual.contains_key(&(a, b)) {
                    residual.insert((a, b), 0);
                    adj[a].push(b);
                }
            }
            if let Some(capacity) = residual.get_mut(&(u, v)) {
                *capacity = capacity.saturating_add(edge.weight());
            }
        }

        Self { residual, adj }
    }

    fn capacity(&self, u: usize, v: usize) -> Weight {
        self.residual.get(&(u, v)).copied().unwrap_or(0)
    }

    /// BFS 找增广路径，返回路径上的节点序列
    fn augmenting_path(&self, source: usize, sink: usize) -> Option<Vec<usize>> {
        let mut parent: Vec<Option<usize>> = vec![None; self.adj.len()];
        let mut visited = vec![false; self.adj.len()];
        let mut queue = VecDeque::new();

        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }
            for &v in &self.adj[u] {
                if !visited[v] && self.capacity(u, v) > 0 {
                    visited[v] = true;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }

        if !visited[sink] {
            return None;
        }

        let mut path = vec![sink];
        let mut current = sink;
        while current != source {
            current = parent[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// 路径的瓶颈容量
    fn bottleneck(&self, path: &[usize]) -> Weight {
        path.windows(2)
            .map(|hop| self.capacity(hop[0], hop[1]))
            .min()
            .unwrap_or(0)
    }

    /// 沿路径推送流量：正向扣减，反向增加
    fn augment(&mut self, path: &[usize], amount: Weight) {
        for hop in path.windows(2) {
            let (u, v) = (hop[0], hop[1]);
            if let Some(forward) = self.residual.get_mut(&(u, v)) {
                *forward -= amount;
            }
            let backward = self.residual.entry((v, u)).or_insert(0);
            *backward = backward.saturating_add(amount);
        }
    }

    /// 残余图中源点可达的节点，即最小割的源侧
    fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut visited = vec![false; self.adj.len()];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &v in &self.adj[u] {
                if !visited[v] && self.capacity(u, v) > 0 {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        visited
    }
}

/// Edmonds-Karp 最大流算法
pub struct EdmondsKarp<'a> {
    store: &'a GraphStore,
}

impl<'a> EdmondsKarp<'a> {
    /// 创建算法实例
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// 计算从 source 到 sink 的最大流
    #[tracing::instrument(skip(self))]
    pub fn max_flow(&self, source: &str, sink: &str) -> Result<MaxFlow> {
        let source = self.store.resolve(source)?;
        let sink = self.store.resolve(sink)?;
        if source == sink {
            return Err(Error::Validation(format!(
                "源点与汇点不能相同: {}",
                source
            )));
        }

        let s = self.position(&source)?;
        let t = self.position(&sink)?;

        let mut residual = ResidualGraph::build(self.store);
        let mut value: Weight = 0;
        let mut rounds = 0usize;

        // Edmonds-Karp: 重复 BFS 找增广路径
        while let Some(path) = residual.augmenting_path(s, t) {
            let bottleneck = residual.bottleneck(&path);
            residual.augment(&path, bottleneck);
            value = value.saturating_add(bottleneck);
            rounds += 1;
            tracing::trace!(round = rounds, hops = path.len() - 1, bottleneck, "增广");
        }

        // 原始边上的流量 = 容量 - 最终正向残余容量
        let edge_flows = self
            .store
            .edges()
            .map(|edge| {
                let flow = if edge.is_loop() {
                    0
                } else {
                    match (
                        self.store.position_of(edge.source().as_str()),
                        self.store.position_of(edge.target().as_str()),
                    ) {
                        (Some(u), Some(v)) => edge.weight().saturating_sub(residual.capacity(u, v)),
                        _ => 0,
                    }
                };
                EdgeFlow {
                    source: edge.source().clone(),
                    target: edge.target().clone(),
                    capacity: edge.weight(),
                    flow,
                }
            })
            .collect();

        let reachable = residual.reachable_from(s);
        let source_side = self
            .store
            .nodes()
            .zip(reachable)
            .filter(|(_, reached)| *reached)
            .map(|(node, _)| node.id().clone())
            .collect();

        tracing::debug!(value, rounds, "最大流计算完成");

        Ok(MaxFlow {
            source,
            sink,
            value,
            edge_flows,
            source_side,
        })
    }

    fn position(&self, id: &NodeId) -> Result<usize> {
        self.store
            .position_of(id.as_str())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn id(s: &str) -> NodeId {
        NodeId::parse(s).unwrap()
    }

    fn assert_conservation(store: &GraphStore, result: &MaxFlow) {
        for node in store.nodes() {
            let node = node.id();
            if node == &result.source || node == &result.sink {
                continue;
            }
            assert_eq!(
                result.inflow(node),
                result.outflow(node),
                "flow is not conserved at {}",
                node
            );
        }
        for f in &result.edge_flows {
            assert!(f.flow <= f.capacity);
        }
        assert_eq!(
            result.outflow(&result.source) - result.inflow(&result.source),
            result.value
        );
        assert_eq!(
            result.inflow(&result.sink) - result.outflow(&result.sink),
            result.value
        );
    }

    #[test]
    fn test_max_flow_four_node_network() {
        let store = GraphStore::with_initial(
            ["s", "a", "b", "t"],
            [
                ("s", "a", 3),
                ("s", "b", 2),
                ("a", "t", 2),
                ("b", "t", 3),
                ("a", "b", 1),
            ],
        )
        .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("s", "t").unwrap();

        // 割 {S} 的容量为 3 + 2，两条源边都饱和
        assert_eq!(result.value, 5);
        assert_eq!(result.outflow(&id("S")), 5);
        assert_eq!(result.inflow(&id("T")), 5);
        assert_eq!(result.flow_on("S", "A"), Some(3));
        assert_eq!(result.flow_on("S", "B"), Some(2));
        assert_eq!(result.flow_on("A", "T"), Some(2));
        assert_eq!(result.flow_on("B", "T"), Some(3));
        assert_eq!(result.flow_on("A", "B"), Some(1));
        assert_eq!(result.source_side, vec![id("S")]);
        assert_conservation(&store, &result);
    }

    #[test]
    fn test_max_flow_classic() {
        //     10       10
        // S -----> A -----> T
        // |        ^        ^
        // |5       |5       |
        // v        |        |
        // B -----> C ------>|
        //     10       10
        let store = GraphStore::with_initial(
            ["s", "a", "b", "c", "t"],
            [
                ("s", "a", 10),
                ("s", "b", 5),
                ("a", "t", 10),
                ("b", "c", 10),
                ("c", "a", 5),
                ("c", "t", 10),
            ],
        )
        .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("S", "T").unwrap();

        assert_eq!(result.value, 15);
        assert_conservation(&store, &result);
    }

    #[test]
    fn test_simple_chain_bottleneck() {
        let store = GraphStore::with_initial(["v1", "v2", "v3"], [("v1", "v2", 10), ("v2", "v3", 5)])
            .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("v1", "v3").unwrap();

        assert_eq!(result.value, 5);
        assert_eq!(result.flow_on("V1", "V2"), Some(5));
        assert_eq!(result.flow_on("V2", "V3"), Some(5));

        let saturated: Vec<_> = result
            .saturated_edges()
            .iter()
            .map(|f| (f.source.to_string(), f.target.to_string()))
            .collect();
        assert_eq!(saturated, vec![("V2".to_string(), "V3".to_string())]);
        assert_eq!(result.source_side, vec![id("V1"), id("V2")]);
    }

    #[test]
    fn test_parallel_paths() {
        let store = GraphStore::with_initial(
            ["s", "a", "b", "t"],
            [("s", "a", 5), ("a", "t", 5), ("s", "b", 10), ("b", "t", 10)],
        )
        .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("s", "t").unwrap();

        assert_eq!(result.value, 15);
        assert_eq!(result.source_side, vec![id("S")]);
    }

    #[test]
    fn test_flow_requires_reverse_residual() {
        // 第一条增广路径 S-A-B-T 占用了 A->B，必须经反向边撤销才能达到最优
        let store = GraphStore::with_initial(
            ["s", "a", "b", "t", "x", "c", "d"],
            [
                ("s", "a", 1),
                ("a", "b", 1),
                ("b", "t", 1),
                ("a", "x", 1),
                ("x", "t", 1),
                ("s", "c", 1),
                ("c", "d", 1),
                ("d", "b", 1),
            ],
        )
        .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("s", "t").unwrap();

        assert_eq!(result.value, 2);
        assert_eq!(result.flow_on("A", "B"), Some(0));
        assert_eq!(result.flow_on("A", "X"), Some(1));
        assert_eq!(result.flow_on("D", "B"), Some(1));
        assert_eq!(result.source_side, vec![id("S")]);
        assert_conservation(&store, &result);
    }

    #[test]
    fn test_unreachable_sink_has_zero_flow() {
        let store = GraphStore::demo().unwrap();
        let result = EdmondsKarp::new(&store).max_flow("C", "A").unwrap();

        assert_eq!(result.value, 0);
        assert!(result.edge_flows.iter().all(|f| f.flow == 0));
        assert_eq!(result.source_side, vec![id("C")]);
    }

    #[test]
    fn test_edge_flows_cover_every_edge() {
        let mut store = GraphStore::demo().unwrap();
        store.add_node("d").unwrap();
        store.add_edge("d", "d", 4).unwrap();
        store.add_edge("c", "b", 2).unwrap();
        let result = EdmondsKarp::new(&store).max_flow("a", "c").unwrap();

        assert_eq!(result.value, 5);
        assert_eq!(result.edge_flows.len(), store.edge_count());
        assert_eq!(result.flow_on("D", "D"), Some(0));
        assert_eq!(result.flow_on("C", "B"), Some(0));
        assert_eq!(result.flow_on("A", "C"), None);
    }

    #[test]
    fn test_flow_value_with_max_capacities() {
        let max = crate::types::MAX_WEIGHT as i64;
        let store = GraphStore::with_initial(
            ["s", "x", "y", "z", "t"],
            [
                ("s", "x", max),
                ("s", "y", max),
                ("s", "z", max),
                ("x", "t", max),
                ("y", "t", max),
                ("z", "t", max),
            ],
        )
        .unwrap();
        let result = EdmondsKarp::new(&store).max_flow("s", "t").unwrap();

        assert_eq!(result.value, 12_884_901_885);
        assert_eq!(result.outflow(&id("S")), 12_884_901_885);
        assert_eq!(result.inflow(&id("T")), 12_884_901_885);
    }

    #[test]
    fn test_flow_on_normalizes_names() {
        let store = GraphStore::demo().unwrap();
        let result = EdmondsKarp::new(&store).max_flow("a", "c").unwrap();

        assert_eq!(result.flow_on("a", "b"), Some(5));
        assert_eq!(result.flow_on(" b ", "c"), Some(5));
        assert_eq!(result.flow_on("A", "b"), result.flow_on("A", "B"));
        assert_eq!(result.flow_on("", "b"), None);
    }

    #[test]
    fn test_invalid_endpoints() {
        let store = GraphStore::demo().unwrap();
        let algo = EdmondsKarp::new(&store);

        assert!(matches!(algo.max_flow("A", "a"), Err(Error::Validation(_))));
        assert!(matches!(algo.max_flow("A", "Z"), Err(Error::NotFound(_))));
        assert!(matches!(algo.max_flow("Z", "A"), Err(Error::NotFound(_))));
        assert!(matches!(algo.max_flow(" ", "A"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_graph() {
        let store = GraphStore::new();
        let result = EdmondsKarp::new(&store).max_flow("S", "T");

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_utilization() {
        let f = EdgeFlow {
            source: id("a"),
            target: id("b"),
            capacity: 4,
            flow: 1,
        };
        assert!((f.utilization() - 0.25).abs() < 1e-9);
        assert!(!f.is_saturated());

        let zero = EdgeFlow {
            capacity: 0,
            flow: 0,
            ..f
        };
        assert_eq!(zero.utilization(), 0.0);
        assert!(!zero.is_saturated());
    }

    #[test]
    fn test_conservation_on_random_networks() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let n = rng.gen_range(2..8);
            let names: Vec<String> = (0..n).map(|i| format!("N{}", i)).collect();
            let mut store = GraphStore::new();
            for name in &names {
                store.add_node(name).unwrap();
            }
            for _ in 0..rng.gen_range(0..20) {
                let s = &names[rng.gen_range(0..n)];
                let t = &names[rng.gen_range(0..n)];
                store.add_edge(s, t, rng.gen_range(0..8)).unwrap();
            }

            let result = EdmondsKarp::new(&store)
                .max_flow(&names[0], &names[n - 1])
                .unwrap();
            assert_conservation(&store, &result);

            // 最大流等于最小割容量
            let side: std::collections::HashSet<_> = result.source_side.iter().collect();
            assert!(side.contains(&result.source));
            assert!(!side.contains(&result.sink));
            let cut: u64 = store
                .edges()
                .filter(|e| side.contains(e.source()) && !side.contains(e.target()))
                .map(|e| e.weight())
                .sum();
            assert_eq!(cut, result.value);
        }
    }
}
