//! 结果报告
//!
//! 把图操作和算法结果转换为展示层消费的数据：带时间戳的日志条目和边高亮。
//! `Reporter` 把每条 `Report` 分发给所有注册的 `ReportSink`。

use crate::algorithm::{MaxFlow, MinimumSpanningTree, PathResult};
use crate::error::{Error, ErrorKind};
use crate::graph::Edge;
use crate::types::NodeId;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生报告的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddNode,
    AddEdge,
    Clear,
    Mst,
    ShortestPath,
    MaxFlow,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AddNode => "add_node",
            Operation::AddEdge => "add_edge",
            Operation::Clear => "clear",
            Operation::Mst => "mst",
            Operation::ShortestPath => "shortest_path",
            Operation::MaxFlow => "max_flow",
        }
    }
}

/// 边高亮样式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HighlightStyle {
    /// 最小生成树的边
    Tree,
    /// 最短路径经过的边
    Route,
    /// 承载流量的边，intensity = flow / capacity
    Flow { intensity: f64 },
}

/// 一条边的高亮
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeHighlight {
    pub source: NodeId,
    pub target: NodeId,
    pub style: HighlightStyle,
}

impl EdgeHighlight {
    fn new(source: &NodeId, target: &NodeId, style: HighlightStyle) -> Self {
        Self {
            source: source.clone(),
            target: target.clone(),
            style,
        }
    }
}

/// 日志条目
///
/// 算法报告携带完整的高亮集合，展示层应以它替换之前的高亮。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub operation: Operation,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<EdgeHighlight>,
}

impl Report {
    fn new(level: LogLevel, operation: Operation, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            operation,
            message: message.into(),
            error_kind: None,
            highlights: Vec::new(),
        }
    }

    pub fn info(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, operation, message)
    }

    pub fn success(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, operation, message)
    }

    /// 失败报告，附带错误类别
    pub fn failure(operation: Operation, error: &Error) -> Self {
        let mut report = Self::new(LogLevel::Error, operation, error.to_string());
        report.error_kind = Some(error.kind());
        report
    }

    pub fn with_highlights(mut self, highlights: Vec<EdgeHighlight>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn node_added(id: &NodeId) -> Self {
        Self::success(Operation::AddNode, format!("节点 [{}] 已创建", id))
    }

    pub fn edge_upserted(edge: &Edge) -> Self {
        Self::success(
            Operation::AddEdge,
            format!(
                "连接 [{}] -> [{}] (权重: {}) 已建立",
                edge.source(),
                edge.target(),
                edge.weight()
            ),
        )
    }

    pub fn cleared() -> Self {
        Self::info(Operation::Clear, "图已清空")
    }

    /// 最小生成树报告：树边以 tree 样式高亮
    pub fn mst(tree: &MinimumSpanningTree) -> Self {
        let message = match &tree.root {
            None => "图为空，最小生成树为空".to_string(),
            Some(root) if tree.complete => format!(
                "最小生成树完成 (起点 {}): {} 条边，总代价 {}",
                root,
                tree.edges.len(),
                tree.total_cost
            ),
            Some(root) => format!(
                "最小生成树完成 (起点 {}): {} 条边，总代价 {}，覆盖 {} 个节点（图不连通）",
                root,
                tree.edges.len(),
                tree.total_cost,
                tree.spanned.len()
            ),
        };

        let highlights = tree
            .edges
            .iter()
            .map(|e| EdgeHighlight::new(e.source(), e.target(), HighlightStyle::Tree))
            .collect();

        Self::success(Operation::Mst, message).with_highlights(highlights)
    }

    /// 最短路径报告：路径上的边以 route 样式高亮
    pub fn shortest_path(path: &PathResult) -> Self {
        let message = format!("最短路径: {} (代价: {})", path.display_route(), path.cost);
        let highlights = path
            .edge_keys()
            .iter()
            .map(|k| EdgeHighlight::new(&k.source, &k.target, HighlightStyle::Route))
            .collect();

        Self::success(Operation::ShortestPath, message).with_highlights(highlights)
    }

    /// 最大流报告：承载流量的边按利用率高亮
    pub fn max_flow(flow: &MaxFlow) -> Self {
        let saturated = flow.saturated_edges().len();
        let message = format!(
            "最大流 {} -> {}: {}（饱和边 {} 条）",
            flow.source, flow.sink, flow.value, saturated
        );
        let highlights = flow
            .edge_flows
            .iter()
            .filter(|f| f.flow > 0)
            .map(|f| {
                EdgeHighlight::new(
                    &f.source,
                    &f.target,
                    HighlightStyle::Flow {
                        intensity: f.utilization(),
                    },
                )
            })
            .collect();

        Self::success(Operation::MaxFlow, message).with_highlights(highlights)
    }
}

/// 报告接收者
pub trait ReportSink: Send + Sync {
    fn publish(&self, report: &Report);
}

impl<F> ReportSink for F
where
    F: Fn(&Report) + Send + Sync,
{
    fn publish(&self, report: &Report) {
        self(report)
    }
}

/// 把报告写入 tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn publish(&self, report: &Report) {
        let op = report.operation.as_str();
        match report.level {
            LogLevel::Error => tracing::warn!(
                operation = op,
                kind = report.error_kind.map(|k| k.as_str()),
                "{}",
                report.message
            ),
            _ => tracing::info!(
                operation = op,
                highlights = report.highlights.len(),
                "{}",
                report.message
            ),
        }
    }
}

/// 保留最近若干条报告的日志历史
#[derive(Debug, Clone)]
pub struct LogHistory {
    entries: Arc<Mutex<VecDeque<Report>>>,
    capacity: usize,
}

impl LogHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// 最近的 n 条，按时间先后排列
    pub fn recent(&self, n: usize) -> Vec<Report> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// 最新一条
    pub fn last(&self) -> Option<Report> {
        self.entries.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ReportSink for LogHistory {
    fn publish(&self, report: &Report) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(report.clone());
    }
}

/// 报告分发器
#[derive(Default)]
pub struct Reporter {
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册接收者
    pub fn subscribe(&mut self, sink: Arc<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn publish(&self, report: Report) -> Report {
        for sink in &self.sinks {
            sink.publish(&report);
        }
        report
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
