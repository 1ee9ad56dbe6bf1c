pub mod bitmap;
pub mod mode;

use std::path::PathBuf;

use thiserror::Error;

/// 图片加载失败的原因。加载失败后控制器进入 `LoadState::Failed`，不再重绘。
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("读取图片失败 {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("图片解码失败: {0}")]
    Decode(#[from] image::ImageError),
    #[error("图片尺寸为空 ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("不支持的图片来源: {0}")]
    UnsupportedSource(String),
    #[error("解码线程启动失败: {0}")]
    Worker(std::io::Error),
}
