use egui::{Pos2, Rect, Vec2};

use crate::core::bitmap::SourceBitmap;
use crate::rendering::surface::DrawingSurface;

/// 一次 `draw_bitmap` 的结果：源图及其在表面坐标中占据的矩形
#[derive(Debug, Clone)]
pub struct PlacedBitmap {
    pub bitmap: SourceBitmap,
    pub rect: Rect,
}

/// 由 egui painter 呈现的表面：不做光栅化，只记录每张位图经变换后的位置。
///
/// 平移 / 缩放最终变成 `painter.image` 的目标矩形，像素采样交给 GPU，
/// 所以每次重绘的开销与图片尺寸无关。
#[derive(Debug, Clone)]
pub struct PaintedSurface {
    width: u32,
    height: u32,
    scale: f32,
    translation: Vec2,
    layers: Vec<PlacedBitmap>,
    revision: u64,
}

impl Default for PaintedSurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PaintedSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            translation: Vec2::ZERO,
            layers: Vec::new(),
            revision: 0,
        }
    }

    /// 自下而上的绘制顺序
    pub fn layers(&self) -> &[PlacedBitmap] {
        &self.layers
    }

    fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size_vec())
    }

    /// 用户坐标矩形 → 表面坐标矩形
    fn device_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return None;
        }
        let a = self.translation + Vec2::new(x, y) * self.scale;
        let b = self.translation + Vec2::new(x + width, y + height) * self.scale;
        let rect = Rect::from_two_pos(a.to_pos2(), b.to_pos2());
        (rect.min.is_finite() && rect.max.is_finite()).then_some(rect)
    }
}

impl DrawingSurface for PaintedSurface {
    fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.layers.clear();
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
        self.revision += 1;
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.translation += Vec2::new(dx, dy) * self.scale;
    }

    fn scale(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// 只能整张去掉位图：可见部分完全落在清除区域内的层被移除，部分覆盖的层保留。
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(cleared) = self.device_rect(x, y, width, height) else {
            return;
        };
        let bounds = self.bounds();
        let before = self.layers.len();
        self.layers.retain(|layer| {
            let visible = layer.rect.intersect(bounds);
            visible.is_positive() && !cleared.contains_rect(visible)
        });
        if self.layers.len() != before {
            self.revision += 1;
        }
    }

    fn draw_bitmap(&mut self, bitmap: &SourceBitmap, x: f32, y: f32) {
        let Some(rect) = self.device_rect(x, y, bitmap.width() as f32, bitmap.height() as f32) else {
            return;
        };
        if !rect.intersects(self.bounds()) {
            return;
        }
        self.layers.push(PlacedBitmap {
            bitmap: bitmap.clone(),
            rect,
        });
        self.revision += 1;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};

    use super::*;
    use crate::core::bitmap::ImageSource;
    use crate::core::bitmap::tests::split_image;
    use crate::core::mode::InteractionMode;
    use crate::viewer::loader::LoadOutcome;
    use crate::viewer::{ControllerSettings, ViewportController};

    fn bitmap(width: u32, height: u32) -> SourceBitmap {
        SourceBitmap::from_rgba(&split_image(width, height)).unwrap()
    }

    #[test]
    fn draw_records_transformed_rect() {
        let bmp = bitmap(10, 4);
        let mut surface = PaintedSurface::new(10, 4);
        surface.translate(-2.0, 1.0);
        surface.scale(2.0);
        surface.draw_bitmap(&bmp, 1.0, 0.0);

        let layers = surface.layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].rect, Rect::from_min_max(pos2(0.0, 1.0), pos2(20.0, 9.0)));
        assert!(layers[0].bitmap.shares_pixels(&bmp));
    }

    #[test]
    fn resize_drops_layers_and_resets_transform() {
        let bmp = bitmap(4, 4);
        let mut surface = PaintedSurface::new(4, 4);
        surface.scale(3.0);
        surface.draw_bitmap(&bmp, 0.0, 0.0);
        let before = surface.revision();

        surface.resize(4, 4);
        assert!(surface.layers().is_empty());
        assert!(surface.revision() > before);

        surface.draw_bitmap(&bmp, 0.0, 0.0);
        assert_eq!(surface.layers()[0].rect, Rect::from_min_size(Pos2::ZERO, vec2(4.0, 4.0)));
    }

    #[test]
    fn clear_rect_removes_only_fully_covered_layers() {
        let bmp = bitmap(4, 4);
        let mut surface = PaintedSurface::new(8, 8);
        surface.draw_bitmap(&bmp, 0.0, 0.0);
        surface.draw_bitmap(&bmp, 4.0, 4.0);

        surface.clear_rect(0.0, 0.0, 4.0, 4.0);
        assert_eq!(surface.layers().len(), 1);
        assert_eq!(surface.layers()[0].rect.min, pos2(4.0, 4.0));

        // 可见部分全被覆盖即可，超出表面的部分不计
        surface.translate(2.0, 0.0);
        surface.clear_rect(0.0, 0.0, 6.0, 8.0);
        assert!(surface.layers().is_empty());
    }

    #[test]
    fn offscreen_or_degenerate_draws_are_skipped() {
        let bmp = bitmap(4, 4);
        let mut surface = PaintedSurface::new(4, 4);
        surface.translate(100.0, 0.0);
        surface.draw_bitmap(&bmp, 0.0, 0.0);
        assert!(surface.layers().is_empty());

        surface.resize(4, 4);
        surface.scale(0.0);
        surface.draw_bitmap(&bmp, 0.0, 0.0);
        assert!(surface.layers().is_empty());
    }

    #[test]
    fn large_image_interaction_never_copies_pixels() {
        let bmp = bitmap(2400, 1600);
        let mut controller = ViewportController::new(
            ControllerSettings::for_mode(InteractionMode::DragPan),
            PaintedSurface::default(),
        );
        controller.begin_load(1, "large.png".to_string());
        controller.finish_load(LoadOutcome {
            request_id: 1,
            source: ImageSource::parse("large.png").unwrap(),
            result: Ok(bmp.clone()),
        });

        controller.on_pointer_down(pos2(100.0, 100.0));
        for i in 0..200 {
            controller.on_pointer_move(pos2(100.0 + i as f32, 100.0));
        }
        controller.on_pointer_up();
        for _ in 0..50 {
            controller.on_wheel(-10.0);
        }

        // 每次事件只替换一个绘制层，层里引用的始终是同一份像素
        let layers = controller.surface().layers();
        assert_eq!(layers.len(), 1);
        assert!(layers[0].bitmap.shares_pixels(&bmp));
        assert_eq!(controller.surface().size(), [2400, 1600]);
    }

    #[test]
    fn drag_pan_layer_matches_drawn_transform() {
        let mut controller = ViewportController::new(
            ControllerSettings::for_mode(InteractionMode::DragPan),
            PaintedSurface::default(),
        );
        controller.install_bitmap(bitmap(20, 10));
        controller.on_pointer_down(pos2(10.0, 5.0));
        controller.on_pointer_move(pos2(15.0, 5.0));

        // 向右拖 5 像素，图片矩形跟着右移
        let rect = controller.surface().layers()[0].rect;
        assert_eq!(rect, Rect::from_min_size(pos2(5.0, 0.0), vec2(20.0, 10.0)));
        assert_eq!(controller.bitmap_pixel_at(pos2(5.5, 0.5)), Some([0, 0]));
    }
}
