//! Boundary to the external descriptor extractor.
//!
//! Face detection and embedding live outside this crate. Whatever produces
//! descriptors plugs in through [`DescriptorExtractor`]; two adapters are
//! provided: [`ImageExtractor`] decodes the image and delegates the neural
//! part to a [`FaceEncoder`], and [`FaceReportExtractor`] reads the JSON
//! report of an out-of-process extractor.

use crate::types::Descriptor;
use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("image could not be decoded: {0}")]
    DecodeFailed(String),
    #[error("no face found in image")]
    NoFaceFound,
    #[error("expected exactly one face, found {0}")]
    MultipleFacesFound(usize),
    #[error("face encoder failed: {0}")]
    Backend(String),
}

/// Turns raw image bytes into exactly one face descriptor.
pub trait DescriptorExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<Descriptor, ExtractError>;
}

/// Detects faces in a decoded RGB image and encodes each one.
///
/// Returns one raw descriptor per detected face, in any order.
pub trait FaceEncoder: Send + Sync {
    fn encode_faces(&self, image: &RgbImage) -> Result<Vec<Vec<f32>>, ExtractError>;
}

/// Enforce the one-face policy and validate the surviving descriptor.
fn single_face(mut faces: Vec<Vec<f32>>) -> Result<Descriptor, ExtractError> {
    match faces.len() {
        0 => Err(ExtractError::NoFaceFound),
        1 => {
            let values = faces.pop().unwrap_or_default();
            Descriptor::new(values).map_err(|e| ExtractError::DecodeFailed(format!("invalid descriptor: {e}")))
        }
        n => Err(ExtractError::MultipleFacesFound(n)),
    }
}

/// Decodes encoded image bytes (PNG, JPEG, ...) and runs a [`FaceEncoder`].
pub struct ImageExtractor<F> {
    encoder: F,
}

impl<F: FaceEncoder> ImageExtractor<F> {
    pub fn new(encoder: F) -> Self {
        Self { encoder }
    }
}

impl<F: FaceEncoder> DescriptorExtractor for ImageExtractor<F> {
    fn extract(&self, image: &[u8]) -> Result<Descriptor, ExtractError> {
        let decoded = image::load_from_memory(image).map_err(|e| ExtractError::DecodeFailed(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        tracing::debug!(width = rgb.width(), height = rgb.height(), "decoded image");

        let faces = self.encoder.encode_faces(&rgb)?;
        tracing::debug!(faces = faces.len(), "encoder returned");
        single_face(faces)
    }
}

#[derive(Deserialize)]
struct FaceReport {
    faces: Vec<Vec<f32>>,
}

/// Reads a detection report written by an external extractor:
/// `{"faces": [[f32, ...], ...]}`, one array per detected face.
#[derive(Debug, Default, Clone, Copy)]
pub struct FaceReportExtractor;

impl DescriptorExtractor for FaceReportExtractor {
    fn extract(&self, image: &[u8]) -> Result<Descriptor, ExtractError> {
        let report: FaceReport =
            serde_json::from_slice(image).map_err(|e| ExtractError::DecodeFailed(format!("face report: {e}")))?;
        single_face(report.faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    /// Reports one face per red pixel in the top row; descriptor is the pixel position.
    struct RedPixelEncoder;

    impl FaceEncoder for RedPixelEncoder {
        fn encode_faces(&self, image: &RgbImage) -> Result<Vec<Vec<f32>>, ExtractError> {
            Ok((0..image.width())
                .filter(|&x| image.get_pixel(x, 0).0 == [255, 0, 0])
                .map(|x| vec![x as f32, 0.0])
                .collect())
        }
    }

    struct FailingEncoder;

    impl FaceEncoder for FailingEncoder {
        fn encode_faces(&self, _image: &RgbImage) -> Result<Vec<Vec<f32>>, ExtractError> {
            Err(ExtractError::Backend("model not loaded".into()))
        }
    }

    fn png_with_red_pixels(xs: &[u32]) -> Vec<u8> {
        let mut img = RgbImage::new(8, 2);
        for &x in xs {
            img.put_pixel(x, 0, image::Rgb([255, 0, 0]));
        }
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_image_extractor_single_face() {
        let extractor = ImageExtractor::new(RedPixelEncoder);
        let descriptor = extractor.extract(&png_with_red_pixels(&[3])).unwrap();
        assert_eq!(descriptor.values(), &[3.0, 0.0]);
    }

    #[test]
    fn test_image_extractor_no_face() {
        let extractor = ImageExtractor::new(RedPixelEncoder);
        assert_eq!(extractor.extract(&png_with_red_pixels(&[])), Err(ExtractError::NoFaceFound));
    }

    #[test]
    fn test_image_extractor_multiple_faces() {
        let extractor = ImageExtractor::new(RedPixelEncoder);
        assert_eq!(
            extractor.extract(&png_with_red_pixels(&[1, 5])),
            Err(ExtractError::MultipleFacesFound(2))
        );
    }

    #[test]
    fn test_image_extractor_undecodable_bytes() {
        let extractor = ImageExtractor::new(RedPixelEncoder);
        let err = extractor.extract(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ExtractError::DecodeFailed(_)));
    }

    #[test]
    fn test_image_extractor_propagates_encoder_failure() {
        let extractor = ImageExtractor::new(FailingEncoder);
        let err = extractor.extract(&png_with_red_pixels(&[0])).unwrap_err();
        assert!(matches!(err, ExtractError::Backend(_)));
    }

    #[test]
    fn test_face_report_single_face() {
        let descriptor = FaceReportExtractor.extract(br#"{"faces": [[0.1, 0.2, 0.3]]}"#).unwrap();
        assert_eq!(descriptor.dim(), 3);
    }

    #[test]
    fn test_face_report_face_count_policy() {
        assert_eq!(FaceReportExtractor.extract(br#"{"faces": []}"#), Err(ExtractError::NoFaceFound));
        assert_eq!(
            FaceReportExtractor.extract(br#"{"faces": [[0.1], [0.2], [0.3]]}"#),
            Err(ExtractError::MultipleFacesFound(3))
        );
    }

    #[test]
    fn test_face_report_malformed() {
        assert!(matches!(FaceReportExtractor.extract(b"{"), Err(ExtractError::DecodeFailed(_))));
        assert!(matches!(
            FaceReportExtractor.extract(br#"{"faces": [[]]}"#),
            Err(ExtractError::DecodeFailed(_))
        ));
    }
}
