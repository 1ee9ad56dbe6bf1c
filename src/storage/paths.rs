//! # 应用路径管理
//!
//! 应用数据目录为平台数据目录下的 `lzv/`（Linux 上即 `~/.local/share/lzv/`），
//! 首次使用时自动创建。

use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 获取应用数据根目录，首次调用时初始化。
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        let dir = resolve_data_dir();
        if let Err(error) = std::fs::create_dir_all(&dir) {
            log::warn!("无法创建数据目录 {}: {error}", dir.display());
        }
        dir
    })
}

/// runtime.json 的完整路径
pub fn runtime_json_path() -> PathBuf {
    data_dir().join("runtime.json")
}

fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("lzv");
    }
    // 没有数据目录时放在可执行文件旁边
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
