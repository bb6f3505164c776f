//! graphlab 服务器入口
//!
//! 启动 HTTP API 服务器

use anyhow::Context;
use clap::Parser;
use graphlab::config::{Config, Seed};
use graphlab::logging::init_tracing;
use graphlab::server::start_server;
use graphlab::session::Session;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graphlab-server")]
#[command(about = "graphlab HTTP API 服务器")]
struct Args {
    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 监听地址
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 从空图开始，不加载演示图
    #[arg(long)]
    empty: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 日志级别或过滤表达式
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_level.as_deref())?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("加载配置 {} 失败", path.display()))?,
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.empty {
        config.engine.seed = Seed::Empty;
    }

    let session = Session::from_config(&config.engine)?;
    tracing::info!(
        nodes = session.store().node_count(),
        edges = session.store().edge_count(),
        seed = ?config.engine.seed,
        "会话已创建"
    );

    start_server(config.server, session).await?;

    Ok(())
}
