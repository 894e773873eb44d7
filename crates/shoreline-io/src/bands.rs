//! Loading input bands from disk.
//!
//! TIFF files are decoded with the `tiff` crate so sample values arrive
//! unscaled (reflectance or digital numbers as stored). Other formats go
//! through `image`, which normalises integer samples to `[0, 1]`. The
//! index formulas are ratios, so either scale works for NDWI.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use shoreline_pipeline::{BandStack, IndexImage};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

use crate::error::ProductError;

/// Load one single-band raster as f32 samples.
///
/// # Errors
///
/// Returns [`ProductError`] if the file cannot be opened or decoded, or
/// if a TIFF holds more than one channel.
pub fn load_band(path: &Path) -> Result<IndexImage, ProductError> {
    if is_tiff(path) {
        return read_tiff(path);
    }
    Ok(image::open(path)?.to_luma32f())
}

/// Load every band and stack them in the given order.
///
/// # Errors
///
/// Returns [`ProductError::NoBands`] for an empty list, any
/// [`load_band`] error, or a mismatched-dimensions configuration error.
pub fn load_bands<P: AsRef<Path>>(paths: &[P]) -> Result<BandStack, ProductError> {
    if paths.is_empty() {
        return Err(ProductError::NoBands);
    }
    let bands = paths
        .iter()
        .map(|p| {
            let band = load_band(p.as_ref())?;
            debug!(
                "loaded band <{}>: {}x{}",
                p.as_ref().display(),
                band.width(),
                band.height()
            );
            Ok(band)
        })
        .collect::<Result<Vec<_>, ProductError>>()?;
    BandStack::new(bands).map_err(|e| ProductError::Pipeline(e.into()))
}

/// Read a single-channel TIFF into f32 samples.
///
/// # Errors
///
/// Returns [`ProductError`] if the file cannot be opened or decoded, or
/// its samples are not single-channel numbers.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn read_tiff(path: &Path) -> Result<IndexImage, ProductError> {
    let file = File::open(path).map_err(|e| ProductError::io(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;
    let colortype = decoder.colortype()?;
    if !matches!(colortype, ColorType::Gray(_)) {
        return Err(ProductError::UnsupportedSamples {
            path: path.to_path_buf(),
            detail: format!("{colortype:?}, expected one gray channel"),
        });
    }

    let samples: Vec<f32> = match decoder.read_image()? {
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        _ => {
            return Err(ProductError::UnsupportedSamples {
                path: path.to_path_buf(),
                detail: "64-bit integer samples".to_string(),
            });
        }
    };

    IndexImage::from_raw(width, height, samples).ok_or_else(|| ProductError::UnsupportedSamples {
        path: path.to_path_buf(),
        detail: format!("sample count does not match {width}x{height}"),
    })
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use image::GrayImage;
    use shoreline_pipeline::PixelSource;

    use super::*;

    #[test]
    fn png_bands_are_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("green.png");
        GrayImage::from_pixel(3, 2, image::Luma([255])).save(&path).unwrap();
        let band = load_band(&path).unwrap();
        assert_eq!(band.dimensions(), (3, 2));
        assert_eq!(band.get_pixel(0, 0).0[0], 1.0);
    }

    #[test]
    fn stack_keeps_band_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        GrayImage::from_pixel(2, 2, image::Luma([0])).save(&a).unwrap();
        GrayImage::from_pixel(2, 2, image::Luma([255])).save(&b).unwrap();
        let stack = load_bands(&[&a, &b]).unwrap();
        assert_eq!(stack.band_count(), 2);
        let rect = shoreline_pipeline::PixelRect::new(0, 0, 1, 1);
        assert_eq!(stack.read_band(1, rect).unwrap().get_pixel(0, 0).0[0], 1.0);
    }

    #[test]
    fn mismatched_sizes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        GrayImage::new(2, 2).save(&a).unwrap();
        GrayImage::new(3, 2).save(&b).unwrap();
        assert!(matches!(
            load_bands(&[a, b]),
            Err(ProductError::Pipeline(_))
        ));
    }

    #[test]
    fn empty_list_rejected() {
        let none: [&Path; 0] = [];
        assert!(matches!(load_bands(&none), Err(ProductError::NoBands)));
    }

    #[test]
    fn missing_file_reported() {
        assert!(load_band(Path::new("/nonexistent/band.tif")).is_err());
    }
}
