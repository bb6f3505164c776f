//! graphlab - 带权有向图算法工作台
//!
//! 逐步构建一个小型带权有向图，并在其上运行经典图算法：
//! - 最小生成树（Prim）
//! - 最短路径（Dijkstra）
//! - 最大流（Edmonds-Karp）
//!
//! 所有修改都经过校验，算法结果通过 `report` 模块转换为日志条目和边高亮，
//! 由交互式命令行和 HTTP API 展示。

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod server;
pub mod session;
pub mod types;

// 重导出常用类型
pub use algorithm::{EdgeFlow, EdmondsKarp, MaxFlow, MinimumSpanningTree, PathFinder, PathResult, Prim};
pub use config::{Config, EngineConfig, Seed, ServerConfig};
pub use error::{Error, ErrorKind, Result};
pub use graph::{Edge, GraphSnapshot, GraphStore, Node};
pub use report::{EdgeHighlight, HighlightStyle, LogHistory, LogLevel, Report, ReportSink, Reporter};
pub use session::Session;
pub use types::{EdgeKey, NodeId, Weight, MAX_WEIGHT};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
