//! All levels of one contour plot, traced in parallel

use crate::algorithm::{self, ContourAlgorithm};
use crate::config::ContourConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::levels::LevelPlan;
use crate::tracer::{self, FilledPolygon, Segment};
use rayon::prelude::*;

/// Traced geometry for every level or band, in level order
#[derive(Debug, Clone, PartialEq)]
pub enum ContourOutput {
    /// Segments per level
    Lines(Vec<(f64, Vec<Segment>)>),
    /// Polygons per `(lower, upper)` band
    Filled(Vec<((f64, f64), Vec<FilledPolygon>)>),
}

impl ContourOutput {
    /// Number of levels (lines) or bands (filled)
    pub fn len(&self) -> usize {
        match self {
            Self::Lines(levels) => levels.len(),
            Self::Filled(bands) => bands.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vertices of every segment or polygon, grouped per level
    pub fn allsegs(&self) -> Vec<Vec<Vec<[f64; 2]>>> {
        match self {
            Self::Lines(levels) => levels
                .iter()
                .map(|(_, segs)| segs.iter().map(|s| points_to_arrays(&s.points)).collect())
                .collect(),
            Self::Filled(bands) => bands
                .iter()
                .map(|(_, polys)| polys.iter().map(|p| points_to_arrays(&p.vertices)).collect())
                .collect(),
        }
    }

    /// Kind codes parallel to [`allsegs`](Self::allsegs); `None` for lines
    pub fn allkinds(&self) -> Option<Vec<Vec<Vec<u8>>>> {
        match self {
            Self::Lines(_) => None,
            Self::Filled(bands) => Some(
                bands
                    .iter()
                    .map(|(_, polys)| polys.iter().map(|p| p.kinds.clone()).collect())
                    .collect(),
            ),
        }
    }
}

fn points_to_arrays(points: &[crate::point::Point]) -> Vec<[f64; 2]> {
    points.iter().map(|p| p.to_array()).collect()
}

/// A grid, a configuration and the levels resolved from them
#[derive(Debug)]
pub struct ContourSet {
    grid: Grid,
    config: ContourConfig,
    algorithm: Box<dyn ContourAlgorithm>,
    plan: LevelPlan,
}

impl ContourSet {
    /// Validate `config`, pick the masking strategy and resolve levels
    pub fn new(grid: Grid, config: ContourConfig) -> Result<Self> {
        config.validate()?;
        let algorithm = algorithm::select(config.corner_mask);
        let plan = LevelPlan::resolve(&config.levels, config.filled, config.extend, grid.z_range())?;

        tracing::debug!(
            algorithm = algorithm.name(),
            filled = config.filled,
            levels = plan.levels.len(),
            bands = plan.bands.len(),
            z_range = ?grid.z_range(),
            "resolved contour levels"
        );

        Ok(Self {
            grid,
            config,
            algorithm,
            plan,
        })
    }

    /// Build the grid from raw arrays, folding non-finite samples into the
    /// mask when the config asks for it
    pub fn from_values(
        z: Vec<Vec<f64>>,
        mask: Option<Vec<Vec<bool>>>,
        config: ContourConfig,
    ) -> Result<Self> {
        let mut builder = Grid::builder(z).mask_non_finite(config.mask_non_finite);
        if let Some(m) = mask {
            builder = builder.mask(m);
        }
        Self::new(builder.build()?, config)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    pub fn levels(&self) -> &[f64] {
        &self.plan.levels
    }

    /// Filled band bounds, including extension bands; empty for lines
    pub fn bands(&self) -> &[(f64, f64)] {
        &self.plan.bands
    }

    /// Representative value of each level or band
    pub fn layers(&self) -> &[f64] {
        &self.plan.layers
    }

    pub fn is_filled(&self) -> bool {
        self.config.filled
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Trace every level or band, one rayon task each
    ///
    /// Output keeps level order. The first failing level aborts the whole
    /// call.
    pub fn allsegs_and_allkinds(&self) -> Result<ContourOutput> {
        let grid = &self.grid;
        let algorithm = self.algorithm.as_ref();

        if self.config.filled {
            let nchunk = self.config.nchunk;
            let bands = self
                .plan
                .bands
                .par_iter()
                .map(|&(lower, upper)| {
                    tracer::trace_filled(grid, algorithm, lower, upper, nchunk)
                        .map(|polygons| ((lower, upper), polygons))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ContourOutput::Filled(bands))
        } else {
            let levels = self
                .plan
                .levels
                .par_iter()
                .map(|&level| {
                    tracer::trace_lines(grid, algorithm, level).map(|segments| (level, segments))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ContourOutput::Lines(levels))
        }
    }
}
