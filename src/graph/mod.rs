//! 图核心模块
//!
//! 定义节点、边和图存储的核心数据结构

mod edge;
mod index;
mod node;
mod store;

pub use edge::Edge;
pub use index::EdgeIndex;
pub use node::Node;
pub use store::{GraphSnapshot, GraphStore, DEMO_EDGES, DEMO_NODES};
