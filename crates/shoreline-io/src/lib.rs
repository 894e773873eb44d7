//! shoreline-io: Filesystem I/O and product orchestration.
//!
//! Loads band files into a [`shoreline_pipeline::BandStack`], drives the
//! processing chain over the whole raster, writes the classified TIFF
//! product and hands it to a [`Vectorizer`] for the polygon product.

pub mod bands;
pub mod error;
pub mod output;
pub mod product;
pub mod raster;
pub mod vectorize;

pub use bands::{load_band, load_bands};
pub use error::{ProductError, VectorizeError};
pub use output::{ProductPaths, VectorTarget};
pub use product::{Configured, ProductReport, RasterProduced, VectorStatus};
pub use raster::write_product;
pub use vectorize::{
    CONTOUR_VECTORIZER, ContourVectorizer, VectorMode, VectorSummary, VectorizeRequest,
    Vectorizer, VectorizerRegistry,
};
