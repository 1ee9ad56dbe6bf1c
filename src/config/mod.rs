pub mod cli;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("配置文件读写失败 {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("命令行参数错误: {0}")]
    Args(#[from] pico_args::Error),
    #[error("无法识别的参数: {0}")]
    UnexpectedArgs(String),
}
