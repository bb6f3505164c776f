//! 性能指标收集模块
//!
//! 提供图操作与算法运行指标的收集和导出功能

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 可统计的算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Mst,
    ShortestPath,
    MaxFlow,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Mst, Algorithm::ShortestPath, Algorithm::MaxFlow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Mst => "mst",
            Algorithm::ShortestPath => "shortest_path",
            Algorithm::MaxFlow => "max_flow",
        }
    }
}

/// 系统全局指标
#[derive(Debug)]
pub struct Metrics {
    /// 图操作统计
    graph_stats: GraphStats,
    /// 各算法的运行统计，按 `Algorithm::ALL` 的顺序
    algorithm_stats: [AlgorithmStats; 3],
    /// 启动时间
    start_time: Instant,
}

/// 图操作统计
#[derive(Debug, Default)]
struct GraphStats {
    /// 节点添加数
    nodes_added: AtomicU64,
    /// 边添加或更新数
    edges_upserted: AtomicU64,
    /// 清空次数
    clears: AtomicU64,
    /// 被拒绝的修改数
    rejected_mutations: AtomicU64,
}

/// 单个算法的运行统计
#[derive(Debug, Default)]
struct AlgorithmStats {
    /// 运行次数
    runs: AtomicU64,
    /// 失败次数
    failures: AtomicU64,
    /// 总耗时（微秒）
    total_duration_us: AtomicU64,
}

/// 单个算法的指标快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSnapshot {
    pub algorithm: Algorithm,
    pub runs: u64,
    pub failures: u64,
    pub avg_duration_ms: f64,
}

/// 可导出的指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    // 图操作指标
    pub nodes_added: u64,
    pub edges_upserted: u64,
    pub clears: u64,
    pub rejected_mutations: u64,

    // 算法指标
    pub algorithms: Vec<AlgorithmSnapshot>,
    pub total_solver_duration_ms: f64,

    // 系统指标
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// 查询某个算法的快照
    pub fn algorithm(&self, algorithm: Algorithm) -> Option<&AlgorithmSnapshot> {
        self.algorithms.iter().find(|a| a.algorithm == algorithm)
    }
}

/// Prometheus 格式指标
#[derive(Debug, Clone)]
pub struct PrometheusMetrics {
    pub content: String,
}

impl Metrics {
    /// 创建新的指标收集器
    pub fn new() -> Self {
        Self {
            graph_stats: GraphStats::default(),
            algorithm_stats: Default::default(),
            start_time: Instant::now(),
        }
    }

    fn stats(&self, algorithm: Algorithm) -> &AlgorithmStats {
        match algorithm {
            Algorithm::Mst => &self.algorithm_stats[0],
            Algorithm::ShortestPath => &self.algorithm_stats[1],
            Algorithm::MaxFlow => &self.algorithm_stats[2],
        }
    }

    /// 记录算法开始运行
    pub fn record_run_start(&self, algorithm: Algorithm) -> SolverTimer {
        self.stats(algorithm).runs.fetch_add(1, Ordering::Relaxed);
        SolverTimer::new(algorithm)
    }

    /// 记录算法运行结束
    pub fn record_run_complete(&self, timer: SolverTimer, success: bool) {
        let stats = self.stats(timer.algorithm);
        if !success {
            stats.failures.fetch_add(1, Ordering::Relaxed);
        }
        stats
            .total_duration_us
            .fetch_add(timer.elapsed().as_micros() as u64, Ordering::Relaxed);
    }

    /// 记录节点添加
    pub fn record_node_added(&self) {
        self.graph_stats.nodes_added.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录边添加或更新
    pub fn record_edge_upserted(&self) {
        self.graph_stats.edges_upserted.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录清空
    pub fn record_clear(&self) {
        self.graph_stats.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录被拒绝的修改
    pub fn record_rejected_mutation(&self) {
        self.graph_stats
            .rejected_mutations
            .fetch_add(1, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut total_duration_us = 0u64;
        let algorithms = Algorithm::ALL
            .iter()
            .map(|&algorithm| {
                let stats = self.stats(algorithm);
                let runs = stats.runs.load(Ordering::Relaxed);
                let duration_us = stats.total_duration_us.load(Ordering::Relaxed);
                total_duration_us += duration_us;

                let avg_duration_ms = if runs > 0 {
                    (duration_us as f64) / (runs as f64) / 1000.0
                } else {
                    0.0
                };

                AlgorithmSnapshot {
                    algorithm,
                    runs,
                    failures: stats.failures.load(Ordering::Relaxed),
                    avg_duration_ms,
                }
            })
            .collect();

        MetricsSnapshot {
            nodes_added: self.graph_stats.nodes_added.load(Ordering::Relaxed),
            edges_upserted: self.graph_stats.edges_upserted.load(Ordering::Relaxed),
            clears: self.graph_stats.clears.load(Ordering::Relaxed),
            rejected_mutations: self.graph_stats.rejected_mutations.load(Ordering::Relaxed),
            algorithms,
            total_solver_duration_ms: (total_duration_us as f64) / 1000.0,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// 导出为 Prometheus 格式
    pub fn to_prometheus(&self) -> PrometheusMetrics {
        let snapshot = self.snapshot();
        let mut content = String::new();

        let counters = [
            ("graphlab_nodes_added_total", "Total nodes added", snapshot.nodes_added),
            (
                "graphlab_edges_upserted_total",
                "Total edges added or reweighted",
                snapshot.edges_upserted,
            ),
            ("graphlab_clears_total", "Number of graph clears", snapshot.clears),
            (
                "graphlab_rejected_mutations_total",
                "Mutations rejected by validation",
                snapshot.rejected_mutations,
            ),
        ];
        for (name, help, value) in counters {
            let _ = writeln!(content, "# HELP {} {}", name, help);
            let _ = writeln!(content, "# TYPE {} counter", name);
            let _ = writeln!(content, "{} {}", name, value);
        }

        // 算法指标
        content.push_str("# HELP graphlab_algorithm_runs_total Algorithm invocations\n");
        content.push_str("# TYPE graphlab_algorithm_runs_total counter\n");
        for a in &snapshot.algorithms {
            let _ = writeln!(
                content,
                "graphlab_algorithm_runs_total{{algorithm=\"{}\"}} {}",
                a.algorithm.as_str(),
                a.runs
            );
        }

        content.push_str("# HELP graphlab_algorithm_failures_total Failed algorithm invocations\n");
        content.push_str("# TYPE graphlab_algorithm_failures_total counter\n");
        for a in &snapshot.algorithms {
            let _ = writeln!(
                content,
                "graphlab_algorithm_failures_total{{algorithm=\"{}\"}} {}",
                a.algorithm.as_str(),
                a.failures
            );
        }

        content.push_str(
            "# HELP graphlab_algorithm_duration_avg_ms Average algorithm duration in milliseconds\n",
        );
        content.push_str("# TYPE graphlab_algorithm_duration_avg_ms gauge\n");
        for a in &snapshot.algorithms {
            let _ = writeln!(
                content,
                "graphlab_algorithm_duration_avg_ms{{algorithm=\"{}\"}} {:.3}",
                a.algorithm.as_str(),
                a.avg_duration_ms
            );
        }

        content.push_str("# HELP graphlab_solver_duration_ms_total Total time spent in solvers\n");
        content.push_str("# TYPE graphlab_solver_duration_ms_total counter\n");
        let _ = writeln!(
            content,
            "graphlab_solver_duration_ms_total {:.3}",
            snapshot.total_solver_duration_ms
        );

        // 系统指标
        content.push_str("# HELP graphlab_uptime_seconds System uptime in seconds\n");
        content.push_str("# TYPE graphlab_uptime_seconds counter\n");
        let _ = writeln!(content, "graphlab_uptime_seconds {}", snapshot.uptime_seconds);

        PrometheusMetrics { content }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 算法计时器
pub struct SolverTimer {
    algorithm: Algorithm,
    start: Instant,
}

impl SolverTimer {
    fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// 全局指标实例
static METRICS: once_cell::sync::Lazy<Arc<Metrics>> =
    once_cell::sync::Lazy::new(|| Arc::new(Metrics::new()));

/// 获取全局指标实例
pub fn global_metrics() -> Arc<Metrics> {
    METRICS.clone()
}
