//! graphlab CLI 工具
//!
//! 交互式命令行界面

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use graphlab::cli::{execute_command, CommandResult, GraphCompleter, Printer};
use graphlab::config::{Config, Seed};
use graphlab::logging::init_tracing;
use graphlab::session::Session;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graphlab-cli")]
#[command(about = "graphlab 命令行工具")]
struct Args {
    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 执行单个命令后退出
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// 从空图开始，不加载演示图
    #[arg(long)]
    empty: bool,

    /// 关闭彩色输出
    #[arg(long)]
    no_color: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 日志级别或过滤表达式
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { None } else { Some(args.log_level.as_str()) };
    init_tracing(args.verbose, level)?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("加载配置 {} 失败", path.display()))?,
        None => Config::default(),
    };
    if args.empty {
        config.engine.seed = Seed::Empty;
    }
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut session = Session::from_config(&config.engine)?;
    let printer = Printer::new(!args.no_color);

    // 单个命令模式
    if let Some(command) = args.execute {
        let ok = handle(&command, &mut session, &printer);
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("graphlab CLI - 带权有向图算法工作台");
    println!("=====================================");
    println!(
        "  节点数: {}  边数: {}",
        session.store().node_count(),
        session.store().edge_count()
    );
    println!("\n输入 'help' 查看命令列表，'quit' 退出\n");

    let mut editor: Editor<GraphCompleter, DefaultHistory> = Editor::new()?;
    let mut completer = GraphCompleter::new();
    completer.set_nodes(&session.node_ids());
    editor.set_helper(Some(completer));

    let history = history_path();
    if let Some(path) = &history {
        // 首次运行时历史文件不存在
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline("graphlab> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                match execute_command(line, &mut session, &printer) {
                    CommandResult::Exit => break,
                    result => print_result(result),
                }

                if let Some(helper) = editor.helper_mut() {
                    helper.set_nodes(&session.node_ids());
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            tracing::warn!(error = %e, "保存命令历史失败");
        }
    }

    println!("再见！");
    Ok(())
}

/// 执行命令并打印，返回是否成功
fn handle(command: &str, session: &mut Session, printer: &Printer) -> bool {
    match execute_command(command, session, printer) {
        CommandResult::Error(msg) => {
            eprintln!("{} {}", "错误:".red().bold(), msg);
            false
        }
        CommandResult::Exit => true,
        result => {
            print_result(result);
            true
        }
    }
}

fn print_result(result: CommandResult) {
    match result {
        CommandResult::Message(msg) => {
            print!("{}", msg);
            if !msg.ends_with('\n') {
                println!();
            }
        }
        CommandResult::Error(msg) => {
            println!("{} {}", "错误:".red().bold(), msg);
        }
        CommandResult::Continue | CommandResult::Exit => {}
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".graphlab_history"))
}
