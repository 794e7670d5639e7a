//! # legacy-contour
//!
//! Marching-squares contour tracing for 2D scalar fields on rectangular,
//! possibly curvilinear grids, with the legacy whole-cell corner masking.
//!
//! The library produces **contour lines** (polylines at one level) and
//! **filled contours** (closed boundary loops of the region between two
//! levels, each with path kind codes `1` move-to, `2` line-to, `79` close).
//!
//! ## Examples
//!
//! ### Single level
//!
//! ```rust,ignore
//! use legacy_contour::{ContourGenerator, CornerMask, Grid};
//!
//! let z = vec![
//!     vec![0.0, 0.0, 0.0],
//!     vec![0.0, 1.0, 0.0],
//!     vec![0.0, 0.0, 0.0],
//! ];
//! let grid = Grid::from_values(z, None)?;
//! let generator = ContourGenerator::new(&grid, CornerMask::Legacy);
//!
//! // one closed diamond around the peak
//! let segments = generator.trace_lines(0.5)?;
//!
//! // filled band 0.5 < z <= 1.0, no chunking
//! let polygons = generator.trace_filled(0.5, 1.0, 0)?;
//! for polygon in &polygons {
//!     println!("{} vertices, kinds {:?}", polygon.vertices.len(), polygon.kinds);
//! }
//! ```
//!
//! ### Every level in parallel
//!
//! ```rust,ignore
//! use legacy_contour::{ContourConfig, ContourSet, Grid, LevelSpec};
//!
//! let config = ContourConfig {
//!     filled: true,
//!     levels: LevelSpec::Explicit(vec![0.0, 10.0, 20.0, 30.0]),
//!     nchunk: 64,
//!     ..Default::default()
//! };
//! let set = ContourSet::new(load_grid()?, config)?;
//!
//! // bands 0-10, 10-20, 20-30, traced with rayon, returned in order
//! let output = set.allsegs_and_allkinds()?;
//! let collection = legacy_contour::geojson_export::output_to_collection(&output);
//! ```
//!
//! ## Masking
//!
//! | `corner_mask` | Cell with one masked corner | Cell with 2+ masked corners |
//! |---------------|-----------------------------|-----------------------------|
//! | `"legacy"`    | skipped                     | skipped                     |
//! | `false`       | skipped                     | skipped                     |
//! | `true`        | traced as a triangle        | skipped                     |
//!
//! ## Conventions
//!
//! - Filled bands are `lower < z <= upper`; the band whose lower bound is at
//!   or below the data minimum also contains `z == lower`.
//! - Higher values lie to the left of every line segment.
//! - Outer loops wind counter-clockwise and holes clockwise in index space.
//! - Saddles are resolved from the mean of the four corner values, the same
//!   way for lines and bands.

pub mod algorithm;
pub mod chunk;
pub mod classify;
pub mod config;
pub mod contour_set;
pub mod edge;
pub mod error;
pub mod geojson_export;
pub mod grid;
pub mod levels;
mod point;
pub mod tracer;

pub use algorithm::{CellShape, ContourAlgorithm, LegacyMasking, StandardMasking};
pub use chunk::ChunkWindows;
pub use config::{ContourConfig, CornerMask, Extend, LevelSpec};
pub use contour_set::{ContourOutput, ContourSet};
pub use error::{ContourError, Result};
pub use grid::{Corner, Grid, GridBuilder, Quad};
pub use levels::{LevelLocator, LevelPlan, MaxNLocator};
pub use point::{PathCode, Point};
pub use tracer::{trace_filled, trace_lines, ContourGenerator, FilledPolygon, Segment};
