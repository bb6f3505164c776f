//! 命令补全器
//!
//! 基于 rustyline 实现 Tab 补全：第一个词补全命令名，之后补全当前图中的节点 ID

use super::commands::{COMMAND_NAMES, NODE_ARG_COMMANDS};
use crate::types::NodeId;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// graphlab CLI 补全器
#[derive(Default)]
pub struct GraphCompleter {
    nodes: Vec<String>,
}

impl GraphCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新可补全的节点
    pub fn set_nodes(&mut self, nodes: &[NodeId]) {
        self.nodes = nodes.iter().map(|id| id.to_string()).collect();
    }

    fn candidates<'a>(
        pool: impl Iterator<Item = &'a str>,
        prefix: &str,
        case_insensitive: bool,
    ) -> Vec<Pair> {
        let prefix = if case_insensitive {
            prefix.to_uppercase()
        } else {
            prefix.to_lowercase()
        };
        pool.filter(|item| item.starts_with(&prefix))
            .map(|item| Pair {
                display: item.to_string(),
                replacement: item.to_string(),
            })
            .collect()
    }
}

impl Completer for GraphCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let words: Vec<&str> = line_to_cursor.split_whitespace().collect();
        let at_word_end = !line_to_cursor.is_empty() && !line_to_cursor.ends_with(' ');

        // 正在输入的词及其起始位置
        let (current, index) = match (words.last(), at_word_end) {
            (Some(word), true) => (*word, words.len() - 1),
            _ => ("", words.len()),
        };
        let start = pos - current.len();

        if index == 0 {
            let pool = COMMAND_NAMES.iter().copied();
            return Ok((start, Self::candidates(pool, current, false)));
        }

        let command = words[0].to_lowercase();
        // edge 的第三个参数是权重
        let wants_node = NODE_ARG_COMMANDS.contains(&command.as_str()) && index <= 2;
        if !wants_node {
            return Ok((start, vec![]));
        }

        let pool = self.nodes.iter().map(String::as_str);
        Ok((start, Self::candidates(pool, current, true)))
    }
}

impl Hinter for GraphCompleter {
    type Hint = String;
}

impl Highlighter for GraphCompleter {}

impl Validator for GraphCompleter {}

impl Helper for GraphCompleter {}
