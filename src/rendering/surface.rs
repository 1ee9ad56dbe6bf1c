use egui::{Pos2, Vec2};

use crate::core::bitmap::SourceBitmap;

/// 2D 绘图表面需要提供的原语，语义对齐 canvas 2D context：
/// 变换在当前用户坐标系中累积，`resize` 会清空内容并重置变换。
pub trait DrawingSurface {
    fn size(&self) -> [u32; 2];

    /// 重新设定尺寸（尺寸不变也会清空并重置变换）
    fn resize(&mut self, width: u32, height: u32);

    fn translate(&mut self, dx: f32, dy: f32);

    fn scale(&mut self, factor: f32);

    /// 用户坐标系下的矩形区域清为透明
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// 在用户坐标 (x, y) 处按原始尺寸绘制位图
    fn draw_bitmap(&mut self, bitmap: &SourceBitmap, x: f32, y: f32);

    /// 内容每变化一次递增
    fn revision(&self) -> u64;

    fn size_vec(&self) -> Vec2 {
        let [w, h] = self.size();
        Vec2::new(w as f32, h as f32)
    }
}

/// 最近一次绘制时使用的变换：表面坐标 = translation + scale * (origin + 位图坐标)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransform {
    pub translation: Vec2,
    pub scale: f32,
    pub origin: Vec2,
}

impl DrawTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: 1.0,
        origin: Vec2::ZERO,
    };

    /// 表面坐标 → 位图坐标
    pub fn to_bitmap(&self, surface_point: Pos2) -> Pos2 {
        ((surface_point.to_vec2() - self.translation) / self.scale - self.origin).to_pos2()
    }

    /// 位图坐标 → 表面坐标
    #[cfg(test)]
    pub fn to_surface(&self, bitmap_point: Pos2) -> Pos2 {
        (self.translation + (self.origin + bitmap_point.to_vec2()) * self.scale).to_pos2()
    }
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};

    use super::*;

    #[test]
    fn transform_round_trips_a_point() {
        let transform = DrawTransform {
            translation: vec2(-40.0, 10.0),
            scale: 2.5,
            origin: vec2(8.0, -4.0),
        };
        let bitmap_point = pos2(12.0, 6.0);
        let surface = transform.to_surface(bitmap_point);
        assert_eq!(surface, pos2(-40.0 + 20.0 * 2.5, 10.0 + 2.0 * 2.5));
        assert_eq!(transform.to_bitmap(surface), bitmap_point);
    }
}
