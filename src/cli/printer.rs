//! 结果打印器
//!
//! 用表格展示图和算法结果，日志行按级别着色

use crate::algorithm::{MaxFlow, MinimumSpanningTree, PathResult};
use crate::graph::GraphStore;
use crate::metrics::MetricsSnapshot;
use crate::report::{LogLevel, Report};
use colored::Colorize;
use prettytable::{format, row, Cell, Row, Table};

/// 结果打印器
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn table(titles: Row) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(titles);
        table
    }

    /// 节点表
    pub fn format_nodes(&self, store: &GraphStore) -> String {
        if store.is_empty() {
            return "图中没有节点\n".to_string();
        }

        let mut table = Self::table(row!["#", "Node", "Out", "In"]);
        for (i, node) in store.nodes().enumerate() {
            table.add_row(Row::new(vec![
                Cell::new(&(i + 1).to_string()),
                Cell::new(node.id().as_str()),
                Cell::new(&store.out_degree(node.id()).to_string()),
                Cell::new(&store.in_degree(node.id()).to_string()),
            ]));
        }
        format!("{}{} 个节点\n", table, store.node_count())
    }

    /// 边表
    pub fn format_edges(&self, store: &GraphStore) -> String {
        if store.edge_count() == 0 {
            return "图中没有边\n".to_string();
        }

        let mut table = Self::table(row!["Source", "Target", "Weight"]);
        for edge in store.edges() {
            table.add_row(row![edge.source(), edge.target(), edge.weight()]);
        }
        format!("{}{} 条边\n", table, store.edge_count())
    }

    /// 最小生成树
    pub fn format_mst(&self, tree: &MinimumSpanningTree) -> String {
        let Some(root) = &tree.root else {
            return "图为空，最小生成树为空\n".to_string();
        };

        let mut output = String::new();
        if !tree.edges.is_empty() {
            let mut table = Self::table(row!["#", "Edge", "Weight"]);
            for (i, edge) in tree.edges.iter().enumerate() {
                table.add_row(row![i + 1, edge.key(), edge.weight()]);
            }
            output.push_str(&table.to_string());
        }

        output.push_str(&format!(
            "起点 {}，{} 条边，总代价 {}\n",
            root,
            tree.edges.len(),
            tree.total_cost
        ));
        if !tree.complete {
            output.push_str(&format!(
                "图不连通：只覆盖了 {} 个节点\n",
                tree.spanned.len()
            ));
        }
        output
    }

    /// 最短路径
    pub fn format_path(&self, path: &PathResult) -> String {
        format!(
            "最短路径: {}\n代价: {}，{} 跳\n",
            path.display_route(),
            path.cost,
            path.hops()
        )
    }

    /// 最大流
    pub fn format_flow(&self, flow: &MaxFlow) -> String {
        let mut table = Self::table(row!["Edge", "Flow", "Capacity", ""]);
        for f in &flow.edge_flows {
            let mark = if f.is_saturated() { "饱和" } else { "" };
            table.add_row(row![
                format!("{} -> {}", f.source, f.target),
                f.flow,
                f.capacity,
                mark
            ]);
        }

        let cut: Vec<&str> = flow.source_side.iter().map(|id| id.as_str()).collect();
        format!(
            "{}最大流 {} -> {}: {}\n最小割源侧: {{{}}}\n",
            table,
            flow.source,
            flow.sink,
            flow.value,
            cut.join(", ")
        )
    }

    /// 统计信息
    pub fn format_stats(&self, store: &GraphStore, metrics: &MetricsSnapshot) -> String {
        let mut table = Self::table(row!["Property", "Value"]);
        table.add_row(row!["Node Count", store.node_count()]);
        table.add_row(row!["Edge Count", store.edge_count()]);
        table.add_row(row!["Nodes Added", metrics.nodes_added]);
        table.add_row(row!["Edges Upserted", metrics.edges_upserted]);
        table.add_row(row!["Clears", metrics.clears]);
        table.add_row(row!["Rejected Mutations", metrics.rejected_mutations]);
        for a in &metrics.algorithms {
            table.add_row(Row::new(vec![
                Cell::new(&format!("{} runs/failures", a.algorithm.as_str())),
                Cell::new(&format!(
                    "{}/{} (avg {:.3} ms)",
                    a.runs, a.failures, a.avg_duration_ms
                )),
            ]));
        }
        table.add_row(row!["Uptime (s)", metrics.uptime_seconds]);
        table.to_string()
    }

    /// 单条日志
    pub fn format_report(&self, report: &Report) -> String {
        let time = report.timestamp.format("%H:%M:%S").to_string();
        let level = format!("{:<7}", report.level.as_str());
        if !self.color {
            return format!("[{}] {} {}", time, level, report.message);
        }

        let level = match report.level {
            LogLevel::Info => level.cyan(),
            LogLevel::Success => level.green(),
            LogLevel::Error => level.red().bold(),
        };
        format!("[{}] {} {}", time.dimmed(), level, report.message)
    }

    /// 日志历史
    pub fn format_log(&self, reports: &[Report]) -> String {
        if reports.is_empty() {
            return "暂无日志\n".to_string();
        }
        let mut output = String::new();
        for report in reports {
            output.push_str(&self.format_report(report));
            output.push('\n');
        }
        output
    }

    /// 帮助信息
    pub fn help_text() -> String {
        r#"
═══════════════════════════════════════════════════════════════
                     graphlab 命令帮助
═══════════════════════════════════════════════════════════════

图编辑:
  node, n <名称>                 添加节点（名称会转为大写）
  edge, e <起点> <终点> <权重>   添加有向边，已存在时更新权重
  clear, reset                   清空图

算法:
  mst, prim                      最小生成树（从第一个节点开始）
  path, dijkstra <起点> <终点>   最短路径
  flow, maxflow <源点> <汇点>    最大流（边权重作为容量）

查看:
  nodes                          列出节点
  edges                          列出边
  stats, info                    显示统计信息
  log [条数]                     显示最近的日志（默认 20 条）

其他:
  help, h, ?                     显示帮助
  quit, exit, q                  退出程序

═══════════════════════════════════════════════════════════════
"#
        .to_string()
    }
}
