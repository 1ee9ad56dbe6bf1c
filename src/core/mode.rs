use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

/// 两种交互方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// 按下 / 按住移动时以指针为中心重新定位；只有按住时滚轮才缩放。
    #[default]
    CenterOnClick,
    /// 拖拽平移；拖拽过程中滚轮不缩放。
    DragPan,
}

impl InteractionMode {
    pub fn all() -> &'static [InteractionMode] {
        &[InteractionMode::CenterOnClick, InteractionMode::DragPan]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CenterOnClick => "点击定心缩放",
            Self::DragPan => "拖拽平移",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::CenterOnClick => "按住鼠标移动定位中心，按住时滚轮缩放",
            Self::DragPan => "拖拽平移，松开后滚轮缩放",
        }
    }

    pub fn default_profile(self) -> ModeProfile {
        match self {
            Self::CenterOnClick => ModeProfile {
                default_zoom: 2.0,
                scroll_sensitivity: 0.005,
            },
            Self::DragPan => ModeProfile {
                default_zoom: 1.0,
                scroll_sensitivity: 0.0005,
            },
        }
    }

    /// 滚轮是否生效：定心模式要求已按下，拖拽模式要求未在拖拽。
    pub fn wheel_enabled(self, engaged: bool) -> bool {
        match self {
            Self::CenterOnClick => engaged,
            Self::DragPan => !engaged,
        }
    }
}

impl Display for InteractionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::CenterOnClick => "center",
            Self::DragPan => "pan",
        })
    }
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "center_on_click" | "v2" => Ok(Self::CenterOnClick),
            "pan" | "drag_pan" | "v1" => Ok(Self::DragPan),
            other => Err(format!("未知交互模式 `{other}`（可选: center, pan）")),
        }
    }
}

/// 单个模式的调优参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub default_zoom: f32,
    pub scroll_sensitivity: f32,
}

/// 缩放上下限
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    min: f32,
    max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

impl ZoomLimits {
    /// 非法组合（非有限值、非正、min > max）退回默认上下限，
    /// 保证 `clamp` 永远不会 panic。
    pub fn new(min: f32, max: f32) -> Self {
        if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
            Self { min, max }
        } else {
            Self::default()
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}
