//! # runtime.json 通用读写
//!
//! 所有持久化设置都放在同一个 JSON 对象里，按顶层 key 分区读写。
//! 读取容错（文件不存在 / 损坏都视为空对象），写入失败返回 `ConfigError`。

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::paths;
use crate::config::ConfigError;

#[derive(Debug, Clone)]
pub struct RuntimeStore {
    path: PathBuf,
}

impl RuntimeStore {
    /// 默认位置：应用数据目录下的 runtime.json
    pub fn open_default() -> Self {
        Self::at(paths::runtime_json_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取完整内容，文件不存在 / 解析失败返回空对象。
    pub fn load(&self) -> Value {
        let empty = || Value::Object(Default::default());
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return empty(),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(value) if value.is_object() => value,
            Ok(_) | Err(_) => {
                log::warn!("{} 内容无效，按空配置处理", self.path.display());
                empty()
            }
        }
    }

    pub fn load_field(&self, key: &str) -> Option<Value> {
        self.load().get(key).cloned()
    }

    pub fn save(&self, value: &Value) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(value)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// 读取 → 插入/替换 key → 写回，其他 key 原样保留。
    pub fn merge_field(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut root = self.load();
        if let Some(obj) = root.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
        self.save(&root)
    }
}
