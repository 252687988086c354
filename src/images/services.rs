use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::AppError;

/// Upper bound on the uploaded file, before any resizing.
pub const MAX_AVATAR_BYTES: usize = 1_000_000;
/// Stored avatars are square PNGs of this edge length.
pub const AVATAR_EDGE: u32 = 250;

pub fn check_avatar_filename(filename: &str) -> Result<(), AppError> {
    lazy_static! {
        static ref IMAGE_EXT_RE: Regex = Regex::new(r"\.(jpg|jpeg|png)$").unwrap();
    }
    if IMAGE_EXT_RE.is_match(filename) {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType)
    }
}

pub fn check_avatar_size(len: usize) -> Result<(), AppError> {
    if len > MAX_AVATAR_BYTES {
        Err(AppError::PayloadTooLarge)
    } else {
        Ok(())
    }
}

/// Decodes an uploaded image, cover-crops it to 250x250 and re-encodes as PNG.
pub fn render_avatar(raw: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(raw).map_err(|e| {
        debug!(error = %e, "avatar decode failed");
        AppError::UnsupportedMediaType
    })?;
    let resized = img.resize_to_fill(AVATAR_EDGE, AVATAR_EDGE, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| anyhow::anyhow!(e).context("encode avatar png"))?;
    Ok(out.into_inner())
}
