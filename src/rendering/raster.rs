use egui::{Color32, ColorImage, Vec2};
use rayon::prelude::*;

use crate::core::bitmap::SourceBitmap;
use crate::rendering::surface::DrawingSurface;

/// CPU 画布：预乘 alpha 像素 + 均匀缩放的仿射变换。
///
/// 采样用最近邻（与纹理 `TextureOptions::NEAREST` 一致），合成为 source-over。
/// 行与行之间互不依赖，按行用 rayon 并行。
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<Color32>,
    scale: f32,
    translation: Vec2,
    /// 每次像素发生写入都会递增，用于判断纹理是否需要重新上传
    revision: u64,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color32::TRANSPARENT; width as usize * height as usize],
            scale: 1.0,
            translation: Vec2::ZERO,
            revision: 0,
        }
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage {
            size: [self.width as usize, self.height as usize],
            pixels: self.pixels.clone(),
        }
    }

    /// 用户坐标区间 [start, start + len) 经变换后覆盖的设备像素范围（像素中心落在区间内）。
    fn device_span(&self, start: f32, len: f32, translation: f32, limit: u32) -> Option<(usize, usize)> {
        let a = translation + self.scale * start;
        let b = translation + self.scale * (start + len);
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let first = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().min(limit as f32);
        if first < end {
            Some((first as usize, end as usize))
        } else {
            None
        }
    }

    fn transform_usable(&self) -> bool {
        self.scale.is_finite() && self.scale != 0.0 && self.translation.x.is_finite() && self.translation.y.is_finite()
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    fn resize(&mut self, width: u32, height: u32) {
        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(len, Color32::TRANSPARENT);
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

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !self.transform_usable() {
            return;
        }
        let Some((x0, x1)) = self.device_span(x, width, self.translation.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = self.device_span(y, height, self.translation.y, self.height) else {
            return;
        };

        let w = self.width as usize;
        self.pixels[y0 * w..y1 * w]
            .par_chunks_mut(w)
            .for_each(|row| row[x0..x1].fill(Color32::TRANSPARENT));
        self.revision += 1;
    }

    fn draw_bitmap(&mut self, bitmap: &SourceBitmap, x: f32, y: f32) {
        if !self.transform_usable() {
            return;
        }
        let bw = bitmap.width() as usize;
        let bh = bitmap.height() as usize;
        let Some((x0, x1)) = self.device_span(x, bw as f32, self.translation.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = self.device_span(y, bh as f32, self.translation.y, self.height) else {
            return;
        };

        let w = self.width as usize;
        let (scale, tx, ty) = (self.scale, self.translation.x, self.translation.y);
        let src = bitmap.pixels();

        // 逆变换求源像素，向下取整即最近邻
        self.pixels[y0 * w..y1 * w]
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(ri, row)| {
                let py = (y0 + ri) as f32 + 0.5;
                let sy = (((py - ty) / scale - y).floor().max(0.0) as usize).min(bh - 1);
                let src_row = &src[sy * bw..(sy + 1) * bw];
                for px in x0..x1 {
                    let fx = px as f32 + 0.5;
                    let sx = (((fx - tx) / scale - x).floor().max(0.0) as usize).min(bw - 1);
                    row[px] = blend_over(src_row[sx], row[px]);
                }
            });
        self.revision += 1;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// 预乘 alpha 的 source-over
fn blend_over(src: Color32, dst: Color32) -> Color32 {
    match src.a() {
        255 => src,
        0 => dst,
        a => {
            let inv = 255 - a as u16;
            let channel = |s: u8, d: u8| (s as u16 + (d as u16 * inv + 127) / 255).min(255) as u8;
            Color32::from_rgba_premultiplied(
                channel(src.r(), dst.r()),
                channel(src.g(), dst.g()),
                channel(src.b(), dst.b()),
                channel(a, dst.a()),
            )
        }
    }
}
