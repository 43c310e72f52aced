//! Stratified sampling over a non-increasing weight array.
//!
//! The cumulative mass of the weights is cut into `n` buckets of equal
//! mass. Each bucket covers a contiguous range of positions and exactly one
//! position is drawn from every bucket, uniformly among the positions of
//! the range. This has lower variance than drawing `n` independent samples
//! proportional to the weights.
use crate::{
    base::UniformSource,
    error::{HistoryError, Result},
};
use std::ops::Range;

/// Draws one position per equal-mass bucket of a weight array.
pub struct StratifiedSampler;

/// Normalized cumulative sum of `weights`.
///
/// Negative weights carry no mass. If the total mass is zero, every entry
/// gets the same mass. The last element is exactly `1.0`.
fn normalized_cumsum(weights: &[f32]) -> Vec<f64> {
    let mut acc = 0f64;
    let mut c = weights
        .iter()
        .map(|&w| {
            acc += (w as f64).max(0.0);
            acc
        })
        .collect::<Vec<_>>();

    let total = acc;
    let size = c.len() as f64;
    if total > 0.0 {
        c.iter_mut().for_each(|v| *v = (*v / total).min(1.0));
    } else {
        c.iter_mut()
            .enumerate()
            .for_each(|(i, v)| *v = (i + 1) as f64 / size);
    }
    if let Some(last) = c.last_mut() {
        *last = 1.0;
    }
    c
}

impl StratifiedSampler {
    fn check(size: usize, n: usize) -> Result<()> {
        if n == 0 {
            return Err(HistoryError::InvalidConfiguration(
                "sample size must be positive".to_string(),
            ));
        }
        if n > size {
            return Err(HistoryError::InvalidConfiguration(format!(
                "sample size {} exceeds the number of entries {}",
                n, size
            )));
        }
        Ok(())
    }

    /// Returns the range of positions covered by each of the `n` buckets.
    ///
    /// The ranges are contiguous, ordered and together cover
    /// `0..weights.len()`. A bucket whose mass is swallowed by a single
    /// heavy entry is empty and starts at a valid position.
    pub fn bucket_bounds(weights: &[f32], n: usize) -> Result<Vec<Range<usize>>> {
        let size = weights.len();
        Self::check(size, n)?;

        let c = normalized_cumsum(weights);
        // Number of entries whose cumulative mass exceeds the right border of bucket k.
        let above = |k: usize| {
            let right = (k + 1) as f64 / n as f64;
            size - c.partition_point(|&x| x <= right)
        };

        let mut cum = size;
        let bounds = (0..n)
            .map(|k| {
                let next = above(k);
                let begin = size - cum;
                let range = begin..begin + (cum - next);
                cum = next;
                range
            })
            .collect();

        Ok(bounds)
    }

    /// Draws `n` positions, one per bucket, in bucket order.
    ///
    /// Requires `0 < n <= weights.len()`. Empty buckets yield their start
    /// position.
    pub fn sample<R>(weights: &[f32], n: usize, rng: &mut R) -> Result<Vec<usize>>
    where
        R: UniformSource + ?Sized,
    {
        let bounds = Self::bucket_bounds(weights, n)?;
        Ok(bounds
            .into_iter()
            .map(|r| rng.uniform_int(r.start, r.end))
            .collect())
    }
}
