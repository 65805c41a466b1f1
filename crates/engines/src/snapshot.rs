//! PNG output of a rendered [`Framebuffer`].
//!
//! Feature-gated behind `png` (default on) so the registry and rasterizer
//! can be used without pulling in the `image` crate.

use gravity_points_core::error::EngineError;
use std::path::{Path, PathBuf};

use crate::raster::Framebuffer;

/// Writes a framebuffer as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(frame: &Framebuffer, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(frame.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(frame.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, frame.data().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}

/// Path for frame `index` of a sequence: `out.png` becomes `out_0042.png`.
pub fn sequence_path(base: &Path, index: u64) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".into());
    base.with_file_name(format!("{stem}_{index:04}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravity_points_core::Srgb;

    #[test]
    fn write_png_round_trip() {
        let mut fb = Framebuffer::new(16, 8).unwrap();
        fb.clear(Srgb::from_rgb8(8, 12, 20));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");

        write_png(&fb, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
        assert_eq!(img.get_pixel(3, 3).0, [8, 12, 20, 255]);
    }

    #[test]
    fn write_png_into_missing_directory_is_io_error() {
        let fb = Framebuffer::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("x.png");
        assert!(matches!(write_png(&fb, &path), Err(EngineError::Io(_))));
    }

    #[test]
    fn sequence_path_numbers_frames() {
        let p = sequence_path(Path::new("/tmp/run/out.png"), 42);
        assert_eq!(p, PathBuf::from("/tmp/run/out_0042.png"));
        let bare = sequence_path(Path::new("shot"), 7);
        assert_eq!(bare, PathBuf::from("shot_0007.png"));
    }
}
