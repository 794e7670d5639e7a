//! Configuration for contour generation.

use crate::error::{ContourError, Result};
use crate::levels::MAX_LEVEL_COUNT;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How masked corners affect the cells around them.
///
/// Accepts `true`, `false` or `"legacy"` when deserialized, the same values
/// the host library takes for its `corner_mask` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerMask {
    /// Quads with one masked corner are traced as triangles.
    Enabled,
    /// Any masked corner removes the quad.
    Disabled,
    /// The legacy engine; removes the quad like `Disabled`.
    #[default]
    Legacy,
}

impl CornerMask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "true",
            Self::Disabled => "false",
            Self::Legacy => "legacy",
        }
    }
}

impl FromStr for CornerMask {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Self::Enabled),
            "false" | "0" => Ok(Self::Disabled),
            "legacy" => Ok(Self::Legacy),
            other => Err(ContourError::invalid_config(format!(
                "corner_mask must be true, false or \"legacy\", got {:?}",
                other
            ))),
        }
    }
}

impl From<bool> for CornerMask {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Display for CornerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CornerMaskRepr {
    Flag(bool),
    Name(String),
}

impl Serialize for CornerMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Enabled => serializer.serialize_bool(true),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Legacy => serializer.serialize_str("legacy"),
        }
    }
}

impl<'de> Deserialize<'de> for CornerMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match CornerMaskRepr::deserialize(deserializer)? {
            CornerMaskRepr::Flag(flag) => Ok(flag.into()),
            CornerMaskRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Which ends of the level range get an open-ended band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    /// Whether a band below the first level is added.
    pub fn extends_min(&self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    /// Whether a band above the last level is added.
    pub fn extends_max(&self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }
}

impl FromStr for Extend {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "neither" => Ok(Self::Neither),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "both" => Ok(Self::Both),
            other => Err(ContourError::invalid_config(format!(
                "extend must be neither, min, max or both, got {:?}",
                other
            ))),
        }
    }
}

/// How contour levels are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelSpec {
    /// Pick nice levels for the data range.
    #[default]
    Auto,
    /// Pick at most `n + 1` nice levels for the data range.
    Count(usize),
    /// Use these levels as given.
    Explicit(Vec<f64>),
}

/// Configuration for a [`ContourSet`](crate::ContourSet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Masking strategy.
    pub corner_mask: CornerMask,

    /// Filled bands instead of lines.
    pub filled: bool,

    /// Level selection.
    pub levels: LevelSpec,

    /// Open-ended bands for filled contours.
    pub extend: Extend,

    /// Cells per chunk side for filled contours, 0 for no chunking.
    pub nchunk: usize,

    /// Mask NaN/Inf samples instead of rejecting the grid.
    pub mask_non_finite: bool,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            corner_mask: CornerMask::Legacy,
            filled: false,
            levels: LevelSpec::Auto,
            extend: Extend::Neither,
            nchunk: 0,
            mask_non_finite: false,
        }
    }
}

impl ContourConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply `CONTOUR_CORNER_MASK`, `CONTOUR_NCHUNK` and `CONTOUR_EXTEND`.
    ///
    /// Unparseable values are ignored and logged.
    pub fn with_env(mut self) -> Self {
        if let Ok(val) = std::env::var("CONTOUR_CORNER_MASK") {
            match val.parse() {
                Ok(mask) => self.corner_mask = mask,
                Err(e) => tracing::warn!(error = %e, "ignoring CONTOUR_CORNER_MASK"),
            }
        }

        if let Ok(val) = std::env::var("CONTOUR_NCHUNK") {
            match val.trim().parse() {
                Ok(n) => self.nchunk = n,
                Err(e) => tracing::warn!(error = %e, value = %val, "ignoring CONTOUR_NCHUNK"),
            }
        }

        if let Ok(val) = std::env::var("CONTOUR_EXTEND") {
            match val.parse() {
                Ok(extend) => self.extend = extend,
                Err(e) => tracing::warn!(error = %e, "ignoring CONTOUR_EXTEND"),
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        match &self.levels {
            LevelSpec::Auto => {}
            LevelSpec::Count(0) => {
                return Err(ContourError::invalid_config("level count must be > 0"));
            }
            LevelSpec::Count(n) if *n > MAX_LEVEL_COUNT => {
                return Err(ContourError::invalid_config(format!(
                    "level count {} exceeds {}",
                    n, MAX_LEVEL_COUNT
                )));
            }
            LevelSpec::Count(_) => {}
            LevelSpec::Explicit(levels) => {
                if levels.is_empty() {
                    return Err(ContourError::invalid_levels("no contour levels given"));
                }
                if let Some(bad) = levels.iter().find(|v| !v.is_finite()) {
                    return Err(ContourError::invalid_levels(format!(
                        "contour levels must be finite, got {}",
                        bad
                    )));
                }
                if levels.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ContourError::invalid_levels(
                        "contour levels must be increasing",
                    ));
                }
                if self.filled && levels.len() < 2 {
                    return Err(ContourError::invalid_levels(
                        "filled contours require at least 2 levels",
                    ));
                }
            }
        }

        if !self.filled && self.extend != Extend::Neither {
            tracing::debug!(extend = ?self.extend, "extend has no effect on line contours");
        }

        Ok(())
    }
}
