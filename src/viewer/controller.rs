//! # 视口变换控制器
//!
//! 持有交互状态（缩放、平移、按下标志），把指针 / 滚轮事件转换为状态更新，
//! 并在每次状态变化后把缓存的源图按当前变换重绘到绘图表面上。
//!
//! 所有事件处理都在 UI 线程上同步执行；返回值表示状态是否变化（调用方据此请求重绘界面）。

use egui::{Pos2, Vec2};

use crate::core::bitmap::SourceBitmap;
use crate::core::mode::{InteractionMode, ModeProfile, ZoomLimits};
use crate::rendering::surface::{DrawTransform, DrawingSurface};
use crate::rendering::viewport::ViewportState;
use crate::viewer::loader::LoadOutcome;

/// 控制器的调优参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub mode: InteractionMode,
    pub profile: ModeProfile,
    pub limits: ZoomLimits,
    /// 定心模式下松开指针不解除按下状态
    pub sticky_engage: bool,
}

impl ControllerSettings {
    pub fn for_mode(mode: InteractionMode) -> Self {
        Self {
            mode,
            profile: mode.default_profile(),
            limits: ZoomLimits::default(),
            sticky_engage: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Empty,
    Loading { request_id: u64, source: String },
    Ready { source: String },
    Failed { source: String, error: String },
}

pub struct ViewportController<S: DrawingSurface> {
    settings: ControllerSettings,
    state: ViewportState,
    /// 拖拽模式下上一次的指针位置，只在拖拽期间存在
    last_pointer: Option<Pos2>,
    bitmap: Option<SourceBitmap>,
    load_state: LoadState,
    /// 当前表面上的画面所用的变换，未绘制过为 None
    drawn: Option<DrawTransform>,
    surface: S,
}

impl<S: DrawingSurface> ViewportController<S> {
    pub fn new(settings: ControllerSettings, surface: S) -> Self {
        let zoom = settings.limits.clamp(settings.profile.default_zoom);
        Self {
            settings,
            state: ViewportState::new(zoom),
            last_pointer: None,
            bitmap: None,
            load_state: LoadState::Empty,
            drawn: None,
            surface,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.settings.mode
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn bitmap(&self) -> Option<&SourceBitmap> {
        self.bitmap.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn drawn_transform(&self) -> Option<DrawTransform> {
        self.drawn
    }

    /// 表面坐标对应的源图像素，落在图外返回 None
    pub fn bitmap_pixel_at(&self, surface_point: Pos2) -> Option<[u32; 2]> {
        let bitmap = self.bitmap.as_ref()?;
        let p = self.drawn?.to_bitmap(surface_point);
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let (x, y) = (p.x.floor() as u32, p.y.floor() as u32);
        (x < bitmap.width() && y < bitmap.height()).then_some([x, y])
    }

    // ── 加载 ─────────────────────────────────────────────────

    /// 图片输入变化：记录在途请求。旧图保持可用，直到新图解码完成。
    pub fn begin_load(&mut self, request_id: u64, source: String) {
        self.load_state = LoadState::Loading { request_id, source };
    }

    /// 解码完成回调。返回 false 表示结果已过期被丢弃。
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> bool {
        let current = match &self.load_state {
            LoadState::Loading { request_id, .. } => *request_id,
            _ => 0,
        };
        let source = outcome.source.display_name();
        if outcome.request_id != current {
            log::debug!("丢弃过期的加载结果 #{} ({source})", outcome.request_id);
            return false;
        }

        match outcome.result {
            Ok(bitmap) => {
                log::info!(
                    "图片加载完成 #{}: {source} ({}x{})",
                    outcome.request_id,
                    bitmap.width(),
                    bitmap.height()
                );
                self.install_bitmap(bitmap);
                self.load_state = LoadState::Ready { source };
            }
            Err(error) => {
                log::warn!("图片加载失败 #{}: {error}", outcome.request_id);
                // 旧图随输入一起作废，失败状态下不再有可重绘的内容
                self.drawn = None;
                if self.bitmap.take().is_some() {
                    self.surface.resize(0, 0);
                }
                self.load_state = LoadState::Failed {
                    source,
                    error: error.to_string(),
                };
            }
        }
        true
    }

    /// 表面尺寸设为源图原始尺寸，并做一次不带变换的初始绘制。
    pub fn install_bitmap(&mut self, bitmap: SourceBitmap) {
        let [w, h] = bitmap.size();
        self.surface.resize(w, h);
        self.surface.draw_bitmap(&bitmap, 0.0, 0.0);
        self.drawn = Some(DrawTransform::IDENTITY);
        self.bitmap = Some(bitmap);
    }

    // ── 输入事件 ─────────────────────────────────────────────

    pub fn on_wheel(&mut self, delta_y: f32) -> bool {
        if !self.settings.mode.wheel_enabled(self.state.engaged) {
            return false;
        }
        let changed = self.state.apply_wheel(
            delta_y,
            self.settings.profile.scroll_sensitivity,
            &self.settings.limits,
        );
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn on_pointer_down(&mut self, point: Pos2) -> bool {
        let mut changed = self.state.set_engaged(true);
        match self.settings.mode {
            InteractionMode::CenterOnClick => {
                let size = self.surface.size_vec();
                changed |= self.state.center_on(point, size);
            }
            InteractionMode::DragPan => {
                self.last_pointer = Some(point);
            }
        }
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn on_pointer_move(&mut self, point: Pos2) -> bool {
        if !self.state.engaged {
            return false;
        }
        let changed = match self.settings.mode {
            // 每次移动都重新定心，而不是累加位移
            InteractionMode::CenterOnClick => {
                let size = self.surface.size_vec();
                self.state.center_on(point, size)
            }
            InteractionMode::DragPan => {
                let last = self.last_pointer.replace(point).unwrap_or(point);
                self.state.pan(last - point)
            }
        };
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn on_pointer_up(&mut self) -> bool {
        self.last_pointer = None;
        if self.settings.mode == InteractionMode::CenterOnClick && self.settings.sticky_engage {
            return false;
        }
        self.state.set_engaged(false)
    }

    // ── 视图操作 ─────────────────────────────────────────────

    /// 切换模式 / 参数：状态回到新模式的默认值并重绘。
    pub fn apply_settings(&mut self, settings: ControllerSettings) {
        if settings.mode != self.settings.mode {
            log::info!("交互模式切换: {} -> {}", self.settings.mode, settings.mode);
        }
        self.settings = settings;
        self.reset_view();
    }

    /// 只改松开行为，保留当前缩放和偏移
    pub fn set_sticky_engage(&mut self, sticky: bool) {
        self.settings.sticky_engage = sticky;
    }

    /// 回到默认缩放 / 零偏移，并恢复未变换的画面。
    pub fn reset_view(&mut self) {
        let zoom = self.settings.limits.clamp(self.settings.profile.default_zoom);
        self.state.reset(zoom);
        self.last_pointer = None;
        if let Some(bitmap) = self.bitmap.take() {
            self.install_bitmap(bitmap);
        }
    }

    /// 按当前状态重绘：重置表面 → 平移 → 缩放 → 清空可见区域 → 绘制源图。
    ///
    /// 定心模式只在按下期间重绘，松开后保留最后一帧；加载失败后不再重绘。
    /// 相同状态下重复调用得到完全相同的像素。
    pub fn redraw(&mut self) {
        if matches!(self.load_state, LoadState::Failed { .. }) {
            return;
        }
        let [w, h] = self.surface.size();
        let zoom = self.state.zoom;
        let translation = match self.settings.mode {
            InteractionMode::CenterOnClick => {
                if !self.state.engaged {
                    return;
                }
                self.state.offset
            }
            InteractionMode::DragPan => -self.state.offset,
        };

        self.surface.resize(w, h);
        self.surface.translate(translation.x, translation.y);
        self.surface.scale(zoom);
        self.surface.clear_rect(0.0, 0.0, w as f32, h as f32);

        let Some(bitmap) = &self.bitmap else {
            self.drawn = None;
            return;
        };
        let origin = match self.settings.mode {
            InteractionMode::CenterOnClick => Vec2::ZERO,
            // 让图片在表面中居中
            InteractionMode::DragPan => {
                let bitmap_size = Vec2::new(bitmap.width() as f32, bitmap.height() as f32);
                (Vec2::new(w as f32, h as f32) / zoom - bitmap_size) / 2.0
            }
        };
        self.surface.draw_bitmap(bitmap, origin.x, origin.y);
        self.drawn = Some(DrawTransform {
            translation,
            scale: zoom,
            origin,
        });
    }
}
