//! Contour level selection and band planning

use crate::config::{Extend, LevelSpec};
use crate::error::{ContourError, Result};

/// Number of intervals asked for when no level count is given
pub const DEFAULT_LEVEL_COUNT: usize = 7;

/// Largest level count [`LevelSpec::Count`] may ask for
pub const MAX_LEVEL_COUNT: usize = 10_000;

/// Chooses level values spanning a data range
pub trait LevelLocator {
    /// Levels covering `[vmin, vmax]`, increasing
    fn tick_values(&self, vmin: f64, vmax: f64) -> Vec<f64>;
}

/// At most `nbins` intervals with a "nice" step
///
/// Steps are 1, 2, 2.5, 5 or 10 times a power of ten. The first and last
/// levels are multiples of the step enclosing the range.
#[derive(Debug, Clone)]
pub struct MaxNLocator {
    pub nbins: usize,
    steps: Vec<f64>,
}

impl MaxNLocator {
    pub fn new(nbins: usize) -> Self {
        Self {
            nbins: nbins.max(1),
            steps: vec![1.0, 2.0, 2.5, 5.0, 10.0],
        }
    }
}

impl Default for MaxNLocator {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_COUNT + 1)
    }
}

/// Widen a zero-width range so a step can be chosen
fn nonsingular(vmin: f64, vmax: f64) -> (f64, f64) {
    let (vmin, vmax) = if vmin <= vmax { (vmin, vmax) } else { (vmax, vmin) };
    let max_abs = vmin.abs().max(vmax.abs());
    if vmax - vmin <= max_abs * 1e-14 {
        if vmax == 0.0 {
            return (-1e-13, 1e-13);
        }
        return (vmin - vmin.abs() * 1e-13, vmax + vmax.abs() * 1e-13);
    }
    (vmin, vmax)
}

/// Power-of-ten scale for the raw step, plus an offset for ranges far from zero
fn scale_range(vmin: f64, vmax: f64, n: usize) -> (f64, f64) {
    let dv = (vmax - vmin).abs();
    let meanv = (vmax + vmin) / 2.0;
    let offset = if meanv.abs() / dv < 100.0 {
        0.0
    } else {
        10f64.powf(meanv.abs().log10().floor()).copysign(meanv)
    };
    let scale = 10f64.powf((dv / n as f64).log10().floor());
    (scale, offset)
}

fn close_to(ms: f64, edge: f64) -> bool {
    (ms - edge).abs() < 1e-10
}

impl LevelLocator for MaxNLocator {
    fn tick_values(&self, vmin: f64, vmax: f64) -> Vec<f64> {
        let (vmin, vmax) = nonsingular(vmin, vmax);
        let (scale, offset) = scale_range(vmin, vmax, self.nbins);
        let lo = vmin - offset;
        let hi = vmax - offset;
        let raw_step = (hi - lo) / self.nbins as f64;

        let steps: Vec<f64> = self.steps.iter().map(|s| s * scale).collect();
        let istep = steps
            .iter()
            .position(|&s| s >= raw_step)
            .unwrap_or(steps.len() - 1);

        let mut ticks = Vec::new();
        // smallest step at least the raw step first, then smaller ones until
        // at least one level falls inside the range
        for &step in steps[..=istep].iter().rev() {
            let best_vmin = (lo / step).floor() * step;

            let low_rem = (lo - best_vmin) / step;
            let low = if close_to(low_rem.fract(), 1.0) {
                low_rem.floor() + 1.0
            } else {
                low_rem.floor()
            };
            let high_rem = (hi - best_vmin) / step;
            let high = if close_to(high_rem.fract(), 0.0) {
                high_rem.floor()
            } else {
                high_rem.floor() + 1.0
            };

            ticks = (low as i64..=high as i64)
                .map(|k| k as f64 * step + best_vmin)
                .collect();
            let inside = ticks.iter().filter(|&&t| t >= lo && t <= hi).count();
            if inside >= 1 {
                break;
            }
        }

        ticks.into_iter().map(|t| t + offset).collect()
    }
}

/// Levels, filled band bounds and layer values for one contour set
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    pub levels: Vec<f64>,
    pub bands: Vec<(f64, f64)>,
    pub layers: Vec<f64>,
}

impl LevelPlan {
    /// Resolve `requested` against the data range
    ///
    /// Line contours keep only automatic levels strictly inside
    /// `(zmin, zmax)`, falling back to `[zmin]`. Filled contours need at least
    /// two levels; `extend` adds bands reaching to -inf or +inf.
    pub fn resolve(
        requested: &LevelSpec,
        filled: bool,
        extend: Extend,
        z_range: Option<(f64, f64)>,
    ) -> Result<Self> {
        let levels = match requested {
            LevelSpec::Explicit(levels) => {
                validate_levels(levels)?;
                levels.clone()
            }
            LevelSpec::Auto => auto_levels(&MaxNLocator::default(), filled, z_range)?,
            LevelSpec::Count(n) => {
                if *n > MAX_LEVEL_COUNT {
                    return Err(ContourError::invalid_levels(format!(
                        "level count {} exceeds {}",
                        n, MAX_LEVEL_COUNT
                    )));
                }
                auto_levels(&MaxNLocator::new(n.saturating_add(1)), filled, z_range)?
            }
        };

        if !filled {
            return Ok(Self {
                layers: levels.clone(),
                bands: Vec::new(),
                levels,
            });
        }

        if levels.len() < 2 {
            return Err(ContourError::invalid_levels(
                "filled contours require at least 2 levels",
            ));
        }

        let mut bands = Vec::with_capacity(levels.len() + 1);
        let mut layers = Vec::with_capacity(levels.len() + 1);
        if extend.extends_min() {
            bands.push((f64::NEG_INFINITY, levels[0]));
            layers.push(levels[0]);
        }
        for w in levels.windows(2) {
            bands.push((w[0], w[1]));
            layers.push(0.5 * (w[0] + w[1]));
        }
        if extend.extends_max() {
            let last = levels[levels.len() - 1];
            bands.push((last, f64::INFINITY));
            layers.push(last);
        }

        Ok(Self {
            levels,
            bands,
            layers,
        })
    }
}

fn validate_levels(levels: &[f64]) -> Result<()> {
    if levels.is_empty() {
        return Err(ContourError::invalid_levels("no contour levels given"));
    }
    if levels.iter().any(|v| !v.is_finite()) {
        return Err(ContourError::invalid_levels("contour levels must be finite"));
    }
    if levels.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ContourError::invalid_levels(
            "contour levels must be increasing",
        ));
    }
    Ok(())
}

fn auto_levels(
    locator: &dyn LevelLocator,
    filled: bool,
    z_range: Option<(f64, f64)>,
) -> Result<Vec<f64>> {
    let (zmin, zmax) = z_range.ok_or_else(|| {
        ContourError::invalid_levels("cannot choose levels: every sample is masked")
    })?;
    let ticks = locator.tick_values(zmin, zmax);
    if filled {
        return Ok(ticks);
    }

    let inside: Vec<f64> = ticks.into_iter().filter(|&t| t > zmin && t < zmax).collect();
    if inside.is_empty() {
        tracing::warn!(zmin, zmax, "no contour levels were found within the data range");
        return Ok(vec![zmin]);
    }
    Ok(inside)
}
