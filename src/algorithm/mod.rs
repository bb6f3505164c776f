//! 图算法模块
//!
//! 包含最小生成树、最短路径和最大流算法。所有算法只读访问图存储。

mod max_flow;
mod mst;
mod shortest_path;

pub use max_flow::{EdgeFlow, EdmondsKarp, MaxFlow};
pub use mst::{MinimumSpanningTree, Prim};
pub use shortest_path::{PathFinder, PathResult};
