use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::Color32;
use image::RgbaImage;

use crate::core::LoadError;

/// 图片输入：磁盘路径或内存中的字节（例如拖放进窗口的文件）。
#[derive(Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl ImageSource {
    /// 解析用户给出的图片引用。网络地址不支持，直接报错。
    pub fn parse(reference: &str) -> Result<Self, LoadError> {
        let trimmed = reference.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(LoadError::UnsupportedSource(trimmed.to_string()));
        }
        if trimmed.is_empty() {
            return Err(LoadError::UnsupportedSource("<空路径>".to_string()));
        }
        Ok(Self::Path(PathBuf::from(trimmed)))
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Bytes { .. } => None,
        }
    }

    /// 同步读取并解码。由加载线程调用，UI 线程不应直接调用。
    pub fn read(&self) -> Result<SourceBitmap, LoadError> {
        match self {
            Self::Path(path) => {
                let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                SourceBitmap::decode(&bytes)
            }
            Self::Bytes { bytes, .. } => SourceBitmap::decode(bytes),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes { name, bytes } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// 解码后的源图（预乘 alpha），创建后不可变，克隆只复制引用计数。
#[derive(Debug, Clone)]
pub struct SourceBitmap {
    width: u32,
    height: u32,
    pixels: Arc<[Color32]>,
}

impl SourceBitmap {
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_rgba(&image.to_rgba8())
    }

    pub fn from_rgba(image: &RgbaImage) -> Result<Self, LoadError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(LoadError::EmptyImage { width, height });
        }

        let pixels: Vec<Color32> = image
            .pixels()
            .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// 越界返回 None
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    /// 两者是否引用同一份像素数据（克隆出来的位图返回 true）
    pub fn shares_pixels(&self, other: &SourceBitmap) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba};

    use super::*;

    /// 左半红、右半蓝的测试图
    pub(crate) fn split_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    pub(crate) fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image.clone())
            .write_to(&mut out, ImageFormat::Png)
            .expect("png encode");
        out.into_inner()
    }

    #[test]
    fn decode_png_keeps_natural_size() {
        let bytes = png_bytes(&split_image(100, 50));
        let bitmap = SourceBitmap::decode(&bytes).unwrap();

        assert_eq!(bitmap.size(), [100, 50]);
        assert_eq!(bitmap.pixel(0, 0), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(bitmap.pixel(99, 49), Some(Color32::from_rgb(0, 0, 255)));
        assert_eq!(bitmap.pixel(100, 0), None);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = SourceBitmap::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = SourceBitmap::from_rgba(&RgbaImage::new(0, 4)).unwrap_err();
        assert!(matches!(err, LoadError::EmptyImage { width: 0, height: 4 }));
    }

    #[test]
    fn web_urls_are_unsupported() {
        assert!(matches!(
            ImageSource::parse("https://example.com/cat.png"),
            Err(LoadError::UnsupportedSource(_))
        ));
        assert!(matches!(
            ImageSource::parse("HTTP://example.com/cat.png"),
            Err(LoadError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn local_path_parses_and_missing_file_is_io_error() {
        let source = ImageSource::parse("  /nonexistent/lzv/cat.png ").unwrap();
        assert_eq!(source.display_name(), "cat.png");

        let err = source.read().unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn bytes_source_reads_in_memory() {
        let source = ImageSource::Bytes {
            name: "dropped.png".to_string(),
            bytes: png_bytes(&split_image(8, 4)).into(),
        };
        assert_eq!(source.display_name(), "dropped.png");
        assert!(source.path().is_none());
        assert_eq!(source.read().unwrap().size(), [8, 4]);
    }
}
