//! Source image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation, SourceImage};

/// Decode selected file bytes into an upright RGBA [`SourceImage`].
///
/// The format is sniffed from the bytes, not the declared MIME type.
/// EXIF orientation is applied so the natural dimensions match what an
/// `<img>` element shows.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if decoding fails part way.
pub fn decode_source(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let upright = apply_orientation(img, orientation);
    log::debug!(
        "decoded source image {}x{} (orientation {:?})",
        upright.width(),
        upright.height(),
        orientation
    );

    SourceImage::from_rgba(upright.into_rgba8())
}

/// Read the EXIF orientation tag, if the container carries one.
///
/// Files without EXIF (PNG, WebP from most tools, screenshots) are upright.
pub fn extract_orientation(bytes: &[u8]) -> Orientation {
    let Ok(exif) = Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return Orientation::Upright;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map_or(Orientation::Upright, Orientation::from_exif)
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    use Orientation::*;

    match orientation {
        Upright => img,
        Mirrored => img.fliph(),
        UpsideDown => img.rotate180(),
        MirroredUpsideDown => img.flipv(),
        MirroredLeft => img.rotate90().fliph(),
        Right => img.rotate90(),
        MirroredRight => img.rotate270().fliph(),
        Left => img.rotate270(),
    }
}
