//! 错误类型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("输入无效: {0}")]
    Validation(String),

    #[error("节点已存在: {0}")]
    Duplicate(String),

    #[error("节点不存在: {0}")]
    NotFound(String),

    #[error("不存在从 {from} 到 {to} 的路径")]
    NoPath { from: String, to: String },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("服务器错误: {0}")]
    Server(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// 错误类别，供展示层区分提示信息
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Duplicate(_) => ErrorKind::Duplicate,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NoPath { .. } => ErrorKind::NoPath,
            Error::Config(_) | Error::Server(_) | Error::Io(_) | Error::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    NoPath,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NoPath => "no_path",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
