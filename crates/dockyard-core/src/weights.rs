//! Weight arithmetic for split containers.
//!
//! Weights are relative shares of a main-axis extent. Their sum is arbitrary;
//! sizing normalizes against the sum at the point of use.

/// Min/max pixel bounds along one axis. `max` is `f64::INFINITY` when
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub min: f64,
    pub max: f64,
}

impl SizeBounds {
    /// No constraint at all.
    pub const UNBOUNDED: Self = Self {
        min: 0.0,
        max: f64::INFINITY,
    };

    /// Build bounds where a non-positive `max` means unbounded.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        let min = min.max(0.0);
        let max = if max > 0.0 { max.max(min) } else { f64::INFINITY };
        Self { min, max }
    }

    /// Clamp a size into the bounds.
    #[must_use]
    pub fn clamp(self, size: f64) -> f64 {
        size.max(self.min).min(self.max)
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Sum of a weight slice.
#[must_use]
pub fn sum(weights: &[f64]) -> f64 {
    weights.iter().sum()
}

/// Whether every weight is finite and strictly positive.
#[must_use]
pub fn all_positive(weights: &[f64]) -> bool {
    weights.iter().all(|w| w.is_finite() && *w > 0.0)
}

/// `count` uniform weights of `1.0`.
#[must_use]
pub fn uniform(count: usize) -> Vec<f64> {
    vec![1.0; count]
}

/// Rescale `weights` proportionally so they sum to `target`.
///
/// Falls back to an even split when the current sum is not positive.
#[must_use]
pub fn scale_to_sum(weights: &[f64], target: f64) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let current = sum(weights);
    if current <= 0.0 || !current.is_finite() {
        let share = target / weights.len() as f64;
        return vec![share; weights.len()];
    }
    let factor = target / current;
    weights.iter().map(|w| w * factor).collect()
}

/// Divide a combined weight between two children in proportion to their
/// pixel sizes.
///
/// Returns `None` when the combined pixel size is not positive.
#[must_use]
pub fn split_pair(combined_weight: f64, first_px: f64, second_px: f64) -> Option<(f64, f64)> {
    let total = first_px + second_px;
    if total <= 0.0 {
        return None;
    }
    let first = combined_weight * (first_px / total);
    Some((first, combined_weight - first))
}

/// Distribute `extent` pixels over children in proportion to `weights`,
/// clamping each child into its bounds and handing the surplus or deficit to
/// the children that are still unclamped.
///
/// Complexity: `O(n^2)` worst case, `O(n)` when nothing clamps.
#[must_use]
pub fn distribute(extent: f64, weights: &[f64], bounds: &[SizeBounds]) -> Vec<f64> {
    debug_assert_eq!(weights.len(), bounds.len());
    let count = weights.len();
    let mut sizes = vec![0.0; count];
    let mut fixed = vec![false; count];
    let extent = extent.max(0.0);

    for _ in 0..=count {
        let fixed_total: f64 = (0..count).filter(|i| fixed[*i]).map(|i| sizes[i]).sum();
        let remaining = (extent - fixed_total).max(0.0);
        let free_weight: f64 = (0..count).filter(|i| !fixed[*i]).map(|i| weights[i]).sum();
        if free_weight <= 0.0 {
            break;
        }

        let mut clamped_any = false;
        for i in 0..count {
            if fixed[i] {
                continue;
            }
            let share = remaining * weights[i] / free_weight;
            let clamped = bounds[i].clamp(share);
            if clamped != share {
                sizes[i] = clamped;
                fixed[i] = true;
                clamped_any = true;
            } else {
                sizes[i] = share;
            }
        }
        if !clamped_any {
            break;
        }
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn distribute_proportional() {
        let sizes = distribute(800.0, &[50.0, 50.0], &[SizeBounds::UNBOUNDED; 2]);
        assert!(close(sizes[0], 400.0));
        assert!(close(sizes[1], 400.0));
    }

    #[test]
    fn distribute_respects_min() {
        let bounds = [SizeBounds::new(300.0, 0.0), SizeBounds::UNBOUNDED];
        let sizes = distribute(800.0, &[10.0, 90.0], &bounds);
        assert!(close(sizes[0], 300.0));
        assert!(close(sizes[1], 500.0));
    }

    #[test]
    fn distribute_respects_max() {
        let bounds = [SizeBounds::new(0.0, 100.0), SizeBounds::UNBOUNDED, SizeBounds::UNBOUNDED];
        let sizes = distribute(700.0, &[1.0, 1.0, 1.0], &bounds);
        assert!(close(sizes[0], 100.0));
        assert!(close(sizes[1], 300.0));
        assert!(close(sizes[2], 300.0));
    }

    #[test]
    fn split_pair_preserves_combined_weight() {
        let (a, b) = split_pair(100.0, 300.0, 500.0).expect("positive total");
        assert!(close(a, 37.5));
        assert!(close(b, 62.5));
        assert_eq!(split_pair(10.0, 0.0, 0.0), None);
    }

    #[test]
    fn scale_to_sum_keeps_ratios() {
        let scaled = scale_to_sum(&[1.0, 3.0], 8.0);
        assert!(close(scaled[0], 2.0));
        assert!(close(scaled[1], 6.0));
        assert_eq!(scale_to_sum(&[0.0, 0.0], 4.0), vec![2.0, 2.0]);
    }

    #[test]
    fn bounds_treat_non_positive_max_as_unbounded() {
        let bounds = SizeBounds::new(10.0, 0.0);
        assert_eq!(bounds.max, f64::INFINITY);
        assert_eq!(bounds.clamp(5.0), 10.0);
        let inverted = SizeBounds::new(50.0, 20.0);
        assert_eq!(inverted.max, 50.0);
    }

    proptest! {
        #[test]
        fn distribute_fills_extent_without_bounds(
            weights in prop::collection::vec(0.1f64..100.0, 1..8),
            extent in 1.0f64..5000.0,
        ) {
            let bounds = vec![SizeBounds::UNBOUNDED; weights.len()];
            let sizes = distribute(extent, &weights, &bounds);
            prop_assert!((sizes.iter().sum::<f64>() - extent).abs() < 1e-6);
            prop_assert!(sizes.iter().all(|s| *s >= 0.0));
        }

        #[test]
        fn split_pair_sums_to_combined(
            combined in 0.1f64..1000.0,
            a in 0.0f64..2000.0,
            b in 0.1f64..2000.0,
        ) {
            let (wa, wb) = split_pair(combined, a, b).expect("b > 0");
            prop_assert!((wa + wb - combined).abs() < 1e-9);
        }
    }
}
