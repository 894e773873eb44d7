//! Error types for raster production and vectorization.

use std::path::PathBuf;

use shoreline_pipeline::PipelineError;

/// Errors that can occur while reading bands or producing the raster
/// product.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Chain assembly or evaluation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Reading or writing a file failed.
    #[error("I/O error on <{path}>: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// TIFF encoding or decoding failed.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// A non-TIFF band file could not be decoded.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The raster holds a sample type the pipeline cannot read.
    #[error("unsupported sample format in <{path}>: {detail}")]
    UnsupportedSamples {
        /// Offending file.
        path: PathBuf,
        /// What was found.
        detail: String,
    },

    /// No band files were given.
    #[error("no input bands given")]
    NoBands,

    /// The product raster has no geometry, so no chip can be located on
    /// the ground.
    #[error("input has no geometry; cannot evaluate chips")]
    NoGeometry,
}

impl ProductError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a vectorizer while it runs.
#[derive(Debug, thiserror::Error)]
pub enum VectorizeError {
    /// The raster product could not be read back.
    #[error("cannot read raster product: {0}")]
    Raster(#[from] ProductError),

    /// Writing the vector product failed.
    #[error("cannot write vector product: {0}")]
    Write(#[from] std::io::Error),

    /// The raster holds raw index values, so there are no water pixels
    /// to trace.
    #[error("raster product <{}> is unclassified (threshold skipped); no water level to vectorize", raster.display())]
    Unclassified {
        /// Raster product that was kept.
        raster: PathBuf,
    },
}
