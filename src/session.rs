//! 会话
//!
//! 面向用户命令的门面：修改图存储、调用算法、发布报告并记录指标。
//! CLI 和 HTTP 服务都只通过 `Session` 访问引擎。

use crate::algorithm::{EdmondsKarp, MaxFlow, MinimumSpanningTree, PathFinder, PathResult, Prim};
use crate::config::{EngineConfig, Seed};
use crate::error::Result;
use crate::graph::{Edge, GraphSnapshot, GraphStore};
use crate::metrics::{self, Algorithm, Metrics};
use crate::report::{LogHistory, Operation, Report, ReportSink, Reporter, TracingSink};
use crate::types::NodeId;
use std::sync::Arc;

/// 会话
#[derive(Debug)]
pub struct Session {
    store: GraphStore,
    reporter: Reporter,
    history: LogHistory,
    metrics: Arc<Metrics>,
}

impl Session {
    /// 用给定的图创建会话，注册 tracing 和日志历史两个接收者
    pub fn new(store: GraphStore, log_capacity: usize) -> Self {
        let history = LogHistory::new(log_capacity);
        let mut reporter = Reporter::new();
        reporter.subscribe(Arc::new(TracingSink));
        reporter.subscribe(Arc::new(history.clone()));

        Self {
            store,
            reporter,
            history,
            metrics: metrics::global_metrics(),
        }
    }

    /// 按配置创建会话
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let store = match config.seed {
            Seed::Demo => GraphStore::demo()?,
            Seed::Empty => GraphStore::new(),
        };
        Ok(Self::new(store, config.log_capacity))
    }

    /// 使用独立的指标收集器，而不是全局实例
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// 注册额外的报告接收者
    pub fn subscribe(&mut self, sink: Arc<dyn ReportSink>) {
        self.reporter.subscribe(sink);
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn history(&self) -> &LogHistory {
        &self.history
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    /// 节点 ID 列表（插入顺序），供补全等使用
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.store.nodes().map(|n| n.id().clone()).collect()
    }

    // ==================== 修改 ====================

    pub fn add_node(&mut self, name: &str) -> Result<NodeId> {
        match self.store.add_node(name) {
            Ok(id) => {
                self.metrics.record_node_added();
                self.reporter.publish(Report::node_added(&id));
                Ok(id)
            }
            Err(e) => {
                self.metrics.record_rejected_mutation();
                self.reporter.publish(Report::failure(Operation::AddNode, &e));
                Err(e)
            }
        }
    }

    pub fn add_edge(&mut self, source: &str, target: &str, weight: i64) -> Result<Edge> {
        match self.store.add_edge(source, target, weight) {
            Ok(edge) => {
                self.metrics.record_edge_upserted();
                self.reporter.publish(Report::edge_upserted(&edge));
                Ok(edge)
            }
            Err(e) => {
                self.metrics.record_rejected_mutation();
                self.reporter.publish(Report::failure(Operation::AddEdge, &e));
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.metrics.record_clear();
        self.reporter.publish(Report::cleared());
    }

    // ==================== 算法 ====================

    /// 最小生成树，从不失败
    pub fn run_mst(&self) -> (MinimumSpanningTree, Report) {
        if let Some(root) = self.store.first_node() {
            self.reporter.publish(Report::info(
                Operation::Mst,
                format!("计算最小生成树 (Prim)，起点 {}", root.id()),
            ));
        }

        let timer = self.metrics.record_run_start(Algorithm::Mst);
        let tree = Prim::new(&self.store).run();
        self.metrics.record_run_complete(timer, true);

        let report = self.reporter.publish(Report::mst(&tree));
        (tree, report)
    }

    pub fn run_shortest_path(&self, start: &str, end: &str) -> Result<(PathResult, Report)> {
        let timer = self.metrics.record_run_start(Algorithm::ShortestPath);
        let result = PathFinder::new(&self.store).shortest_path(start, end);
        self.metrics.record_run_complete(timer, result.is_ok());

        self.finish(Operation::ShortestPath, result, Report::shortest_path)
    }

    pub fn run_max_flow(&self, source: &str, sink: &str) -> Result<(MaxFlow, Report)> {
        self.reporter.publish(Report::info(
            Operation::MaxFlow,
            format!("计算最大流 {} -> {}", source.trim(), sink.trim()),
        ));

        let timer = self.metrics.record_run_start(Algorithm::MaxFlow);
        let result = EdmondsKarp::new(&self.store).max_flow(source, sink);
        self.metrics.record_run_complete(timer, result.is_ok());

        self.finish(Operation::MaxFlow, result, Report::max_flow)
    }

    fn finish<T>(
        &self,
        operation: Operation,
        result: Result<T>,
        describe: impl FnOnce(&T) -> Report,
    ) -> Result<(T, Report)> {
        match result {
            Ok(value) => {
                let report = self.reporter.publish(describe(&value));
                Ok((value, report))
            }
            Err(e) => {
                self.reporter.publish(Report::failure(operation, &e));
                Err(e)
            }
        }
    }
}
