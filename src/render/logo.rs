use std::fs;
use std::path::Path;

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};

use super::refs::{ObjectReferences, RefType};
use crate::run::RunError;

enum Encoding {
    /// RGB JPEG files go into the PDF untouched
    Jpeg(Vec<u8>),
    Decoded(DynamicImage),
}

/// Company logo shown at the top left of every page
pub struct Logo {
    encoding: Encoding,
    pub width: u32,
    pub height: u32,
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Logo {
    pub fn load(path: &Path) -> Result<Logo, RunError> {
        let data = fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Logo, RunError> {
        let format = image::guess_format(&data)?;
        let image = image::load_from_memory_with_format(&data, format)?;
        let (width, height) = image.dimensions();

        let encoding = match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => Encoding::Jpeg(data),
            _ => Encoding::Decoded(image),
        };

        Ok(Logo {
            encoding,
            width,
            height,
        })
    }

    /// Height of the logo when drawn `width` wide
    pub fn scaled_height(&self, width: f32) -> f32 {
        width * self.height as f32 / self.width.max(1) as f32
    }

    fn encode(&self) -> EncodeOutput {
        match &self.encoding {
            Encoding::Jpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            Encoding::Decoded(image) => {
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });

                let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes,
                    mask,
                }
            }
        }
    }

    pub fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.get(RefType::Logo);
        let encoded = self.encode();

        let mask_id = encoded.mask.as_ref().map(|_| refs.get(RefType::LogoMask));

        let mut image = writer.image_xobject(id, &encoded.bytes);
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(mask)) = (mask_id, &encoded.mask) {
            let mut s_mask = writer.image_xobject(mask_id, mask);
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    pub fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_pixel(8, 4, Rgba([200, 30, 30, 128]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(6, 6, Rgb([10, 90, 160]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Jpeg)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn png_with_alpha_gets_mask() {
        let logo = Logo::from_bytes(png_bytes()).unwrap();
        assert_eq!((logo.width, logo.height), (8, 4));
        assert_eq!(logo.scaled_height(15.0), 7.5);

        let encoded = logo.encode();
        assert_eq!(encoded.filter, Filter::FlateDecode);
        assert!(encoded.mask.is_some());
    }

    #[test]
    fn rgb_jpeg_embedded_directly() {
        let data = jpeg_bytes();
        let logo = Logo::from_bytes(data.clone()).unwrap();
        let encoded = logo.encode();
        assert_eq!(encoded.filter, Filter::DctDecode);
        assert_eq!(encoded.bytes, data);
        assert!(encoded.mask.is_none());
    }

    #[test]
    fn writes_mask_object() {
        let logo = Logo::from_bytes(png_bytes()).unwrap();
        let mut refs = ObjectReferences::new();
        let mut pdf = Pdf::new();
        logo.write(&mut refs, &mut pdf);
        let bytes = pdf.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/SMask"));
        assert!(text.contains("/DeviceGray"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Logo::from_bytes(b"not an image".to_vec()).is_err());
    }
}
