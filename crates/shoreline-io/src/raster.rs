//! Writing the raster product as a single-band TIFF.
//!
//! Classified products are stored as 8-bit levels, unthresholded index
//! products as 32-bit floats. When the geometry is north-up, the
//! GeoTIFF pixel-scale and tie-point tags are written so GIS tools place
//! the product correctly.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use log::info;
use shoreline_pipeline::{AffineGeometry, IndexImage, SampleFormat};
use tiff::encoder::colortype::{ColorType, Gray8, Gray32Float};
use tiff::encoder::{ImageEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;

use crate::error::ProductError;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

/// Write `image` to `path` in the given sample format.
///
/// 8-bit output rounds and clamps each sample to `0..=255`.
///
/// # Errors
///
/// Returns [`ProductError`] if the file cannot be created or encoding
/// fails.
pub fn write_product(
    path: &Path,
    image: &IndexImage,
    format: SampleFormat,
    geometry: Option<&AffineGeometry>,
) -> Result<(), ProductError> {
    let file = File::create(path).map_err(|e| ProductError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, image, format, geometry)?;
    writer.flush().map_err(|e| ProductError::io(path, e))?;
    info!(
        "wrote {}x{} {format:?} raster product to <{}>",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

fn encode<W: Write + Seek>(
    writer: W,
    image: &IndexImage,
    format: SampleFormat,
    geometry: Option<&AffineGeometry>,
) -> Result<(), ProductError> {
    let mut encoder = TiffEncoder::new(writer)?;
    match format {
        SampleFormat::U8 => {
            let data = to_levels(image);
            let mut tiff = encoder.new_image::<Gray8>(image.width(), image.height())?;
            write_geo_tags(&mut tiff, geometry)?;
            tiff.write_data(&data)?;
        }
        SampleFormat::F32 => {
            let mut tiff = encoder.new_image::<Gray32Float>(image.width(), image.height())?;
            write_geo_tags(&mut tiff, geometry)?;
            tiff.write_data(image.as_raw())?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_levels(image: &IndexImage) -> Vec<u8> {
    image
        .as_raw()
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Tag a north-up product with its pixel scale and origin. Rotated
/// transforms cannot be expressed with these tags and are left untagged.
fn write_geo_tags<W: Write + Seek, C: ColorType, K: TiffKind>(
    tiff: &mut ImageEncoder<'_, W, C, K>,
    geometry: Option<&AffineGeometry>,
) -> Result<(), ProductError> {
    let Some(geometry) = geometry else {
        return Ok(());
    };
    let c = geometry.coefficients();
    if c[2] != 0.0 || c[4] != 0.0 {
        return Ok(());
    }
    let scale = [c[1], -c[5], 0.0];
    let tiepoint = [0.0, 0.0, 0.0, c[0], c[3], 0.0];
    // Version 1.1.0 with one key: GTRasterTypeGeoKey = RasterPixelIsArea.
    let geokeys: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 1];
    let dir = tiff.encoder();
    dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;
    dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;
    dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geokeys[..])?;
    Ok(())
}
