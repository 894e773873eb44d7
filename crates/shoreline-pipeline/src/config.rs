//! Run configuration: algorithm, sensor, threshold, tolerance,
//! smoothing, edge mode and output colour coding.
//!
//! Every option has a keyword string form (`FromStr`) matching the
//! command-line and keyword-list surface, e.g. `threshold = X` to skip
//! thresholding or `color_coding = "255 128 0"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ConfigError;

/// Water index formula applied to the input bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Normalized Difference Water Index, `b0 / (b0 + b1)`.
    ///
    /// Landsat 8 inputs: band 3 (green) and band 5 or 6.
    #[default]
    Ndwi,
    /// Automated Water Extraction Index,
    /// `4*(b0+b1) - 0.25*b2 - 2.75*b3`.
    ///
    /// Landsat 8 inputs: bands 3, 6, 5 and 7.
    Awei,
}

impl Algorithm {
    /// Number of input bands the formula consumes.
    #[must_use]
    pub const fn required_bands(self) -> usize {
        match self {
            Self::Ndwi => 2,
            Self::Awei => 4,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ndwi => f.write_str("NDWI"),
            Self::Awei => f.write_str("AWEI"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndwi" => Ok(Self::Ndwi),
            "awei" => Ok(Self::Awei),
            _ => Err(ConfigError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Sensor band profile. Only Landsat 8 is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    /// Landsat 8 OLI (`ls8`).
    Landsat8,
}

impl Sensor {
    /// Keyword identifier for the sensor.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Landsat8 => "ls8",
        }
    }
}

impl FromStr for Sensor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ls8" => Ok(Self::Landsat8),
            _ => Err(ConfigError::UnsupportedSensor(s.to_string())),
        }
    }
}

/// Threshold applied to the normalized index, or `Skip` to pass the
/// continuous index through unclassified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Threshold level in `[0, 1]`.
    Level(f64),
    /// Thresholding disabled (keyword `X`).
    Skip,
}

impl Threshold {
    /// Keyword that disables thresholding.
    pub const SKIP_KEYWORD: &'static str = "X";

    /// Check that a level lies within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Threshold`] for a level outside the range
    /// or a NaN level.
    pub fn validate(self) -> Result<Self, ConfigError> {
        match self {
            Self::Level(t) if !(0.0..=1.0).contains(&t) => {
                Err(ConfigError::Threshold(t.to_string()))
            }
            other => Ok(other),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(t) => write!(f, "{t}"),
            Self::Skip => f.write_str(Self::SKIP_KEYWORD),
        }
    }
}

impl FromStr for Threshold {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::SKIP_KEYWORD) || s.eq_ignore_ascii_case("skip") {
            return Ok(Self::Skip);
        }
        let level: f64 = s
            .parse()
            .map_err(|_| ConfigError::Threshold(s.to_string()))?;
        Self::Level(level).validate()
    }
}

/// Serde form: a number for a level, `"X"` for skip.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdRepr {
    Level(f64),
    Keyword(String),
}

impl Serialize for Threshold {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Level(t) => ThresholdRepr::Level(t),
            Self::Skip => ThresholdRepr::Keyword(Self::SKIP_KEYWORD.to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ThresholdRepr::deserialize(deserializer)? {
            ThresholdRepr::Level(t) => Self::Level(t).validate(),
            ThresholdRepr::Keyword(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// Output pixel values for the three classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCoding {
    /// Value written for water pixels.
    pub water: u8,
    /// Value written for marginal pixels.
    pub marginal: u8,
    /// Value written for land pixels.
    pub land: u8,
}

impl Default for ColorCoding {
    fn default() -> Self {
        Self {
            water: 255,
            marginal: 128,
            land: 0,
        }
    }
}

impl fmt::Display for ColorCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.water, self.marginal, self.land)
    }
}

impl FromStr for ColorCoding {
    type Err = ConfigError;

    /// Parse `"<water> <marginal> <land>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::ColorCoding(s.to_string());
        let values = s
            .split_whitespace()
            .map(|v| v.parse::<u8>().map_err(|_| bad()))
            .collect::<Result<Vec<_>, _>>()?;
        match values.as_slice() {
            &[water, marginal, land] => Ok(Self {
                water,
                marginal,
                land,
            }),
            _ => Err(bad()),
        }
    }
}

/// Configuration for a shoreline run.
///
/// Missing fields deserialize to their defaults, so a JSON document
/// only needs the options it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorelineConfig {
    /// Index formula.
    pub algorithm: Algorithm,
    /// Sensor identifier. Validated when the chain is assembled.
    pub sensor: String,
    /// Classification threshold or skip.
    pub threshold: Threshold,
    /// Half-width of the marginal band around the threshold.
    pub tolerance: f64,
    /// Gaussian sigma applied after classification; 0 disables it.
    pub smoothing: f32,
    /// Produce an edge raster instead of a vector product.
    pub do_edge_detect: bool,
    /// Output pixel values for water, marginal and land.
    pub color_coding: ColorCoding,
}

impl ShorelineConfig {
    /// Default sensor identifier.
    pub const DEFAULT_SENSOR: &'static str = "ls8";
    /// Default classification threshold.
    pub const DEFAULT_THRESHOLD: f64 = 0.55;
    /// Default tolerance around the threshold.
    pub const DEFAULT_TOLERANCE: f64 = 0.01;
    /// Default smoothing sigma.
    pub const DEFAULT_SMOOTHING: f32 = 0.2;

    /// Check the numeric options.
    ///
    /// Sensor and band cardinality are checked later, when the chain is
    /// assembled against an actual band set.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.threshold.validate()?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Tolerance(self.tolerance));
        }
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        Ok(())
    }
}

impl Default for ShorelineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            sensor: Self::DEFAULT_SENSOR.to_string(),
            threshold: Threshold::Level(Self::DEFAULT_THRESHOLD),
            tolerance: Self::DEFAULT_TOLERANCE,
            smoothing: Self::DEFAULT_SMOOTHING,
            do_edge_detect: false,
            color_coding: ColorCoding::default(),
        }
    }
}
