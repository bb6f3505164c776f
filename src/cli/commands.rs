//! 控制台命令处理
//!
//! 把一行输入解析为 `Command` 并在会话上执行

use super::printer::Printer;
use crate::error::Error;
use crate::session::Session;

/// 默认显示的日志条数
const DEFAULT_LOG_LINES: usize = 20;

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Node(String),
    Edge {
        source: String,
        target: String,
        weight: i64,
    },
    Clear,
    Mst,
    Path {
        start: String,
        end: String,
    },
    Flow {
        source: String,
        sink: String,
    },
    Nodes,
    Edges,
    Stats,
    Log(usize),
    Help,
    Quit,
}

/// 命令名称，供补全使用
pub const COMMAND_NAMES: &[&str] = &[
    "node", "edge", "clear", "mst", "path", "flow", "nodes", "edges", "stats", "log", "help",
    "quit",
];

/// 需要节点参数的命令
pub const NODE_ARG_COMMANDS: &[&str] = &["edge", "path", "flow"];

impl Command {
    /// 解析一行输入，失败时返回用法提示
    pub fn parse(input: &str) -> std::result::Result<Command, String> {
        let mut parts = input.split_whitespace();
        let cmd = match parts.next() {
            Some(cmd) => cmd.to_lowercase(),
            None => return Err("请输入命令，输入 'help' 查看帮助".to_string()),
        };
        let args: Vec<&str> = parts.collect();

        let command = match cmd.as_str() {
            "node" | "n" => match args.as_slice() {
                [name] => Command::Node(name.to_string()),
                _ => return Err("用法: node <名称>".to_string()),
            },
            "edge" | "e" => match args.as_slice() {
                [source, target, weight] => {
                    let weight = weight
                        .parse::<i64>()
                        .map_err(|_| format!("权重必须是整数: {}", weight))?;
                    Command::Edge {
                        source: source.to_string(),
                        target: target.to_string(),
                        weight,
                    }
                }
                _ => return Err("用法: edge <起点> <终点> <权重>".to_string()),
            },
            "clear" | "reset" => Command::Clear,
            "mst" | "prim" => Command::Mst,
            "path" | "dijkstra" => match args.as_slice() {
                [start, end] => Command::Path {
                    start: start.to_string(),
                    end: end.to_string(),
                },
                _ => return Err("用法: path <起点> <终点>".to_string()),
            },
            "flow" | "maxflow" => match args.as_slice() {
                [source, sink] => Command::Flow {
                    source: source.to_string(),
                    sink: sink.to_string(),
                },
                _ => return Err("用法: flow <源点> <汇点>".to_string()),
            },
            "nodes" => Command::Nodes,
            "edges" => Command::Edges,
            "stats" | "info" => Command::Stats,
            "log" => match args.as_slice() {
                [] => Command::Log(DEFAULT_LOG_LINES),
                [n] => Command::Log(
                    n.parse()
                        .map_err(|_| format!("条数必须是非负整数: {}", n))?,
                ),
                _ => return Err("用法: log [条数]".to_string()),
            },
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("未知命令: {}。输入 'help' 查看帮助。", other)),
        };

        Ok(command)
    }
}

/// 控制台命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 解析并执行一行输入
pub fn execute_command(input: &str, session: &mut Session, printer: &Printer) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::Continue;
    }

    match Command::parse(input) {
        Ok(command) => execute(command, session, printer),
        Err(usage) => CommandResult::Error(usage),
    }
}

/// 执行已解析的命令
pub fn execute(command: Command, session: &mut Session, printer: &Printer) -> CommandResult {
    let outcome = match command {
        Command::Quit => return CommandResult::Exit,
        Command::Help => return CommandResult::Message(Printer::help_text()),
        Command::Node(name) => session.add_node(&name).map(|id| format!("节点 [{}] 已创建", id)),
        Command::Edge {
            source,
            target,
            weight,
        } => session.add_edge(&source, &target, weight).map(|edge| {
            format!(
                "连接 [{}] -> [{}] (权重: {}) 已建立",
                edge.source(),
                edge.target(),
                edge.weight()
            )
        }),
        Command::Clear => {
            session.clear();
            Ok("图已清空".to_string())
        }
        Command::Mst => {
            let (tree, _) = session.run_mst();
            Ok(printer.format_mst(&tree))
        }
        Command::Path { start, end } => session
            .run_shortest_path(&start, &end)
            .map(|(path, _)| printer.format_path(&path)),
        Command::Flow { source, sink } => session
            .run_max_flow(&source, &sink)
            .map(|(flow, _)| printer.format_flow(&flow)),
        Command::Nodes => Ok(printer.format_nodes(session.store())),
        Command::Edges => Ok(printer.format_edges(session.store())),
        Command::Stats => Ok(printer.format_stats(
            session.store(),
            &session.metrics().snapshot(),
        )),
        Command::Log(n) => Ok(printer.format_log(&session.history().recent(n))),
    };

    match outcome {
        Ok(message) => CommandResult::Message(message),
        Err(e) => CommandResult::Error(describe_error(&e)),
    }
}

/// 按错误类别给出不同的提示
pub fn describe_error(error: &Error) -> String {
    match error {
        Error::Validation(msg) => format!("输入无效: {}", msg),
        Error::Duplicate(id) => format!("节点 [{}] 已存在", id),
        Error::NotFound(id) => format!("节点 [{}] 不存在，先用 'node {}' 创建", id, id),
        Error::NoPath { from, to } => format!("[{}] 无法到达 [{}]", from, to),
        other => other.to_string(),
    }
}
