use std::path::Path;

use image::{ImageResult, RgbaImage};

/// 렌더러가 결과를 넘겨주는 곳. 픽셀 하나당 R, G, B, A 순서로 4바이트.
pub trait ImageSink {
    fn resize(&mut self, width: u32, height: u32);
    fn load_image(&mut self, rgba: &[u8]);
    fn size(&self) -> (u32, u32);
}

// 메모리 위에만 있는 이미지. 필요하면 파일로 저장함
pub struct Image {
    buffer: RgbaImage,
    pub name: String,
}

impl Image {
    pub fn new(width: u32, height: u32, label: &str) -> Self {
        Self {
            buffer: RgbaImage::new(width, height),
            name: label.to_string(),
        }
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    // 확장자로 포맷 결정 (png, jpg)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.buffer.save(path)
    }
}

impl ImageSink for Image {
    fn resize(&mut self, width: u32, height: u32) {
        if self.buffer.width() == width && self.buffer.height() == height {
            return;
        }

        self.buffer = RgbaImage::new(width, height);
    }

    fn load_image(&mut self, rgba: &[u8]) {
        let pixel_count = {
            let (width, height) = self.size();
            width as usize * height as usize
        };
        assert_eq!(
            pixel_count,
            rgba.len() / 4,
            "{}: pixel data does not match image size",
            self.name
        );

        self.buffer.copy_from_slice(rgba);
    }

    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}
