//! Operations on weight vectors.
//!
//! Weights stay in `[0.0, max_weight]` through crossover and mutation and are
//! L1-normalized afterwards, so two vectors that differ only by a constant
//! factor (and therefore rank moves identically) collapse into one.

use rand::Rng;
use rand_distr::{Distribution as _, Normal};

/// Builds a weight vector from a function of the index.
///
/// ```
/// use text2048_training::weights;
///
/// let w = weights::from_fn(|i| 1.0 / (i as f32 + 1.0), 3);
/// assert_eq!(w, vec![1.0, 0.5, 1.0 / 3.0]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Uniform random weights in `[0.0, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f32, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(0.0..=max_weight), len)
}

/// BLX-α crossover.
///
/// Each child weight is drawn uniformly from the parents' interval widened by
/// `alpha` times its length on both sides, then clamped to
/// `[0.0, max_weight]`.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blx_alpha<R>(p1: &[f32], p2: &[f32], alpha: f32, max_weight: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    p1.iter()
        .zip(p2)
        .map(|(&x1, &x2)| {
            let (lo, hi) = (x1.min(x2), x1.max(x2));
            let d = hi - lo;
            rng.random_range((lo - alpha * d)..=(hi + alpha * d))
                .clamp(0.0, max_weight)
        })
        .collect()
}

/// Gaussian mutation in place.
///
/// Each weight is perturbed by `N(0, sigma)` with probability `rate` and
/// clamped to `[0.0, max_weight]`. A `sigma` that is not finite and
/// positive leaves the weights untouched.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, max_weight: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    // `Normal::new` accepts negative deviations, so check the sign here.
    let Some(normal) = (sigma.is_finite() && sigma > 0.0)
        .then(|| Normal::new(0.0, sigma).ok())
        .flatten()
    else {
        tracing::warn!(sigma, "invalid mutation sigma, skipping mutation");
        return;
    };
    let rate = f64::from(rate.clamp(0.0, 1.0));
    for w in weights {
        if rng.random_bool(rate) {
            *w = (*w + normal.sample(rng)).clamp(0.0, max_weight);
        }
    }
}

/// Scales `weights` to sum to `1.0`. All-zero vectors are left unchanged.
pub fn normalize_l1(weights: &mut [f32]) {
    let sum: f32 = weights.iter().map(|w| w.abs()).sum();
    if sum > 0.0 {
        for w in weights {
            *w /= sum;
        }
    }
}
