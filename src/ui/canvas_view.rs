use egui::{Color32, ColorImage, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Ui};

use crate::core::bitmap::SourceBitmap;
use crate::rendering::painted::PaintedSurface;
use crate::rendering::raster::RasterSurface;
use crate::rendering::surface::DrawingSurface;
use crate::viewer::{LoadState, ViewportController};

/// 源图对应的 GPU 纹理，换图时才上传一次；平移缩放只改绘制矩形
#[derive(Default)]
pub struct CanvasTexture {
    handle: Option<TextureHandle>,
    uploaded: Option<SourceBitmap>,
}

impl CanvasTexture {
    pub fn sync(&mut self, ctx: &egui::Context, bitmap: &SourceBitmap) -> Option<&TextureHandle> {
        let current = self
            .uploaded
            .as_ref()
            .is_some_and(|uploaded| uploaded.shares_pixels(bitmap));

        if !current || self.handle.is_none() {
            let max_side = ctx.input(|i| i.max_texture_side);
            let image = texture_image(bitmap, max_side);
            match &mut self.handle {
                Some(handle) => handle.set(image, TextureOptions::NEAREST),
                None => {
                    self.handle = Some(ctx.load_texture("viewer_bitmap", image, TextureOptions::NEAREST));
                }
            }
            self.uploaded = Some(bitmap.clone());
        }

        self.handle.as_ref()
    }
}

/// 超出纹理边长上限的图先用 CPU 画布按最近邻缩小，纹理始终对应整张源图
fn texture_image(bitmap: &SourceBitmap, max_side: usize) -> ColorImage {
    let [w, h] = bitmap.size();
    let longest = w.max(h) as usize;
    if max_side == 0 || longest <= max_side {
        return ColorImage {
            size: [w as usize, h as usize],
            pixels: bitmap.pixels().to_vec(),
        };
    }

    let factor = max_side as f32 / longest as f32;
    let side = |len: u32| ((len as f32 * factor).round() as u32).clamp(1, max_side as u32);
    let mut raster = RasterSurface::new(side(w), side(h));
    raster.scale(factor);
    raster.draw_bitmap(bitmap, 0.0, 0.0);
    log::debug!(
        "图片 {w}x{h} 超出纹理上限 {max_side}，缩小为 {}x{}",
        side(w),
        side(h)
    );
    raster.to_color_image()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasResponse {
    /// 指针下方的源图像素
    pub hover: Option<[u32; 2]>,
}

pub fn show_canvas(
    ui: &mut Ui,
    controller: &mut ViewportController<PaintedSurface>,
    texture: &mut CanvasTexture,
) -> CanvasResponse {
    let available = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());

    // ── background checkerboard ──────────────────────────────
    let painter = ui.painter_at(rect);
    let tile = 48.0;
    let c0 = Color32::from_gray(28);
    let c1 = Color32::from_gray(35);
    let cols = (rect.width() / tile).ceil() as i32;
    let rows = (rect.height() / tile).ceil() as i32;
    for r in 0..rows {
        for c in 0..cols {
            let min = Pos2::new(rect.left() + c as f32 * tile, rect.top() + r as f32 * tile);
            let max = Pos2::new(
                (min.x + tile).min(rect.right()),
                (min.y + tile).min(rect.bottom()),
            );
            let color = if (r + c) % 2 == 0 { c0 } else { c1 };
            painter.rect_filled(Rect::from_min_max(min, max), 0.0, color);
        }
    }

    let surface_size = controller.surface().size_vec();
    if surface_size.x <= 0.0 || surface_size.y <= 0.0 {
        let hint = match controller.load_state() {
            LoadState::Failed { .. } => "图片加载失败，请换一张",
            LoadState::Loading { .. } => "加载中…",
            _ => "打开或拖入一张图片",
        };
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            hint,
            egui::FontId::proportional(16.0),
            Color32::from_gray(160),
        );
        return CanvasResponse::default();
    }

    // 表面按原始尺寸显示，放不下时等比缩小
    let fit = (rect.width() / surface_size.x)
        .min(rect.height() / surface_size.y)
        .min(1.0);
    let image_rect = Rect::from_center_size(rect.center(), surface_size * fit);
    let to_surface = |p: Pos2| ((p - image_rect.min) / fit).to_pos2();

    // ── pointer / wheel → controller ─────────────────────────
    let (pressed, released, moving, latest, scroll) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.is_moving(),
            i.pointer.latest_pos(),
            i.raw_scroll_delta,
        )
    });

    let mut changed = false;
    if let Some(pos) = latest.filter(|p| image_rect.contains(*p)) {
        if pressed && response.hovered() {
            changed |= controller.on_pointer_down(to_surface(pos));
        } else if moving {
            changed |= controller.on_pointer_move(to_surface(pos));
        }
    }
    if released {
        changed |= controller.on_pointer_up();
    }
    if response.hovered() && scroll.y != 0.0 {
        // egui 向上滚为正，浏览器 deltaY 向下滚为正
        changed |= controller.on_wheel(-scroll.y);
    }

    // ── surface layers → textured rects ──────────────────────
    let surface_painter = painter.with_clip_rect(image_rect);
    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    for layer in controller.surface().layers() {
        let Some(handle) = texture.sync(ui.ctx(), &layer.bitmap) else {
            continue;
        };
        let target = Rect::from_min_max(
            image_rect.min + layer.rect.min.to_vec2() * fit,
            image_rect.min + layer.rect.max.to_vec2() * fit,
        );
        surface_painter.image(handle.id(), target, uv, Color32::WHITE);
    }
    painter.rect_stroke(image_rect, 0.0, Stroke::new(1.0, Color32::from_gray(120)));

    let hover = response
        .hover_pos()
        .filter(|p| image_rect.contains(*p))
        .and_then(|p| controller.bitmap_pixel_at(to_surface(p)));

    if changed {
        ui.ctx().request_repaint();
    }

    CanvasResponse { hover }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bitmap::tests::split_image;

    #[test]
    fn small_bitmap_uploads_as_is() {
        let bitmap = SourceBitmap::from_rgba(&split_image(10, 4)).unwrap();
        let image = texture_image(&bitmap, 2048);
        assert_eq!(image.size, [10, 4]);
        assert_eq!(image.pixels, bitmap.pixels());
    }

    #[test]
    fn oversized_bitmap_is_downscaled_to_texture_limit() {
        let bitmap = SourceBitmap::from_rgba(&split_image(10, 4)).unwrap();
        let image = texture_image(&bitmap, 5);
        assert_eq!(image.size, [5, 2]);
        assert_eq!(image.pixels[0], Color32::from_rgb(255, 0, 0));
        assert_eq!(image.pixels[9], Color32::from_rgb(0, 0, 255));
    }
}
