use egui::{Pos2, Vec2};

use crate::core::mode::ZoomLimits;

/// 视口交互状态。所有修改方法返回状态是否真的发生了变化。
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub offset: Vec2,
    /// 定心模式下表示“已按下”，拖拽模式下表示“正在拖拽”
    pub engaged: bool,
}

impl ViewportState {
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom,
            offset: Vec2::ZERO,
            engaged: false,
        }
    }

    /// 滚轮缩放：deltaY 为正（向下滚）时缩小。
    pub fn apply_wheel(&mut self, delta_y: f32, sensitivity: f32, limits: &ZoomLimits) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        let zoom = limits.clamp(self.zoom + delta_y * -sensitivity);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    /// 让 `point` 成为变换后的视觉中心：offset = surface/2 - point * zoom
    pub fn center_on(&mut self, point: Pos2, surface_size: Vec2) -> bool {
        let offset = surface_size * 0.5 - point.to_vec2() * self.zoom;
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    pub fn pan(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.offset += delta;
        true
    }

    pub fn set_engaged(&mut self, engaged: bool) -> bool {
        let changed = self.engaged != engaged;
        self.engaged = engaged;
        changed
    }

    pub fn reset(&mut self, zoom: f32) {
        *self = Self::new(zoom);
    }
}
