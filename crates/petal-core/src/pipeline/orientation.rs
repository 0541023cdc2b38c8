//! EXIF orientation handling.
//!
//! Phone cameras store pixels in sensor order and record the intended
//! rotation in the EXIF `Orientation` tag. The classifier must see the
//! upright image.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::io::Cursor;

/// Read the EXIF orientation (1-8) from an encoded image.
///
/// Returns `None` if the data has no EXIF block or the tag is absent.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Short(v) => v.first().map(|&x| x as u32),
            Value::Long(v) => v.first().copied(),
            _ => None,
        })
}

/// Transform an image so that an EXIF orientation value becomes 1 (upright).
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::GenericImageView;

    /// A JPEG of the given size whose APP1 block carries `orientation`.
    pub(crate) fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let mut jpeg = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        // Big-endian TIFF header, one IFD with a single SHORT Orientation entry
        let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&tiff);
        let len = (app1.len() + 2) as u16;

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_reads_orientation_tag() {
        assert_eq!(read_orientation(&jpeg_with_orientation(8, 4, 6)), Some(6));
        assert_eq!(read_orientation(&jpeg_with_orientation(8, 4, 3)), Some(3));
    }

    #[test]
    fn test_jpeg_without_exif() {
        let mut jpeg = Vec::new();
        DynamicImage::new_rgb8(8, 4)
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();
        assert!(read_orientation(&jpeg).is_none());
    }

    #[test]
    fn test_no_exif_in_plain_bytes() {
        assert!(read_orientation(b"not an image").is_none());
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let img = DynamicImage::new_rgb8(40, 20);
        assert_eq!(apply_orientation(img.clone(), 6).dimensions(), (20, 40));
        assert_eq!(apply_orientation(img.clone(), 8).dimensions(), (20, 40));
        assert_eq!(apply_orientation(img.clone(), 3).dimensions(), (40, 20));
        assert_eq!(apply_orientation(img, 1).dimensions(), (40, 20));
    }

    #[test]
    fn test_mirror_moves_pixel() {
        let mut rgb = image::RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let flipped = apply_orientation(DynamicImage::ImageRgb8(rgb), 2).to_rgb8();
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_unknown_orientation_is_identity() {
        let img = DynamicImage::new_rgb8(3, 5);
        assert_eq!(apply_orientation(img, 42).dimensions(), (3, 5));
    }
}
