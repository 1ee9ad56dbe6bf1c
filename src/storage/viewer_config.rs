//! # 查看器配置（ViewerConfig）
//!
//! 持久化到 runtime.json 的 `"viewer"` 字段。缺失字段取默认值，
//! 整体解析失败时回退到默认配置并记录警告。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::runtime::RuntimeStore;
use crate::config::ConfigError;
use crate::core::mode::{InteractionMode, MAX_ZOOM, MIN_ZOOM, ModeProfile, ZoomLimits};
use crate::viewer::ControllerSettings;

const FIELD: &str = "viewer";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub mode: InteractionMode,
    pub center_on_click: ModeProfile,
    pub drag_pan: ModeProfile,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// 定心模式下松开指针后仍保持按下状态
    pub sticky_engage: bool,
    pub log_level: LogLevel,
    /// 上次打开的图片，启动时没有指定图片就重新打开它
    pub last_image: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mode: InteractionMode::default(),
            center_on_click: InteractionMode::CenterOnClick.default_profile(),
            drag_pan: InteractionMode::DragPan.default_profile(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            sticky_engage: false,
            log_level: LogLevel::default(),
            last_image: None,
        }
    }
}

impl ViewerConfig {
    pub fn load(store: &RuntimeStore) -> Self {
        let Some(value) = store.load_field(FIELD) else {
            return Self::default();
        };
        match serde_json::from_value(value) {
            Ok(config) => config,
            Err(error) => {
                log::warn!("viewer 配置无效，使用默认值: {error}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &RuntimeStore) -> Result<(), ConfigError> {
        store.merge_field(FIELD, serde_json::to_value(self)?)
    }

    /// 指定模式的参数；非有限或非正的值换成该模式的默认值。
    pub fn profile(&self, mode: InteractionMode) -> ModeProfile {
        let configured = match mode {
            InteractionMode::CenterOnClick => self.center_on_click,
            InteractionMode::DragPan => self.drag_pan,
        };
        let fallback = mode.default_profile();
        let valid = |v: f32| v.is_finite() && v > 0.0;
        ModeProfile {
            default_zoom: if valid(configured.default_zoom) {
                configured.default_zoom
            } else {
                fallback.default_zoom
            },
            scroll_sensitivity: if valid(configured.scroll_sensitivity) {
                configured.scroll_sensitivity
            } else {
                fallback.scroll_sensitivity
            },
        }
    }

    pub fn limits(&self) -> ZoomLimits {
        ZoomLimits::new(self.min_zoom, self.max_zoom)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            mode: self.mode,
            profile: self.profile(self.mode),
            limits: self.limits(),
            sticky_engage: self.sticky_engage,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_interaction_constants() {
        let config = ViewerConfig::default();
        let settings = config.controller_settings();
        assert_eq!(settings, ControllerSettings::for_mode(InteractionMode::CenterOnClick));
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let config: ViewerConfig =
            serde_json::from_value(json!({"mode": "drag_pan", "sticky_engage": true})).unwrap();
        assert_eq!(config.mode, InteractionMode::DragPan);
        assert!(config.sticky_engage);
        assert_eq!(config.max_zoom, MAX_ZOOM);
        assert_eq!(config.profile(InteractionMode::DragPan).scroll_sensitivity, 0.0005);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = ViewerConfig {
            min_zoom: 9.0,
            max_zoom: 1.0,
            drag_pan: ModeProfile {
                default_zoom: -1.0,
                scroll_sensitivity: 0.002,
            },
            ..ViewerConfig::default()
        };
        assert_eq!(config.limits(), ZoomLimits::default());

        let profile = config.profile(InteractionMode::DragPan);
        assert_eq!(profile.default_zoom, 1.0);
        assert_eq!(profile.scroll_sensitivity, 0.002);
    }

    #[test]
    fn save_and_load_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStore::at(dir.path().join("runtime.json"));
        assert_eq!(ViewerConfig::load(&store), ViewerConfig::default());

        let config = ViewerConfig {
            mode: InteractionMode::DragPan,
            log_level: LogLevel::Debug,
            last_image: Some(PathBuf::from("/tmp/cat.png")),
            ..ViewerConfig::default()
        };
        config.save(&store).unwrap();
        assert_eq!(ViewerConfig::load(&store), config);
    }

    #[test]
    fn unreadable_section_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStore::at(dir.path().join("runtime.json"));
        store.merge_field(FIELD, json!({"mode": "sideways"})).unwrap();
        assert_eq!(ViewerConfig::load(&store), ViewerConfig::default());
    }
}
