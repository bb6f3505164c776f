//! 交互式命令行
//!
//! 命令解析与执行、结果打印和 Tab 补全

mod commands;
mod completer;
mod printer;

pub use commands::{describe_error, execute, execute_command, Command, CommandResult, COMMAND_NAMES};
pub use completer::GraphCompleter;
pub use printer::Printer;
