//! 节点定义

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// 节点
///
/// 节点只有一个标识，标识即身份。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
}

impl Node {
    /// 创建新节点
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }

    /// 获取节点 ID
    pub fn id(&self) -> &NodeId {
        &self.id
    }
}
