//! Plain RGB k-means (Lloyd's algorithm) used to find the dominant colors of
//! an image.
//!
//! Distances are squared Euclidean in 0-255 RGB space, centroids are seeded by
//! sampling input pixels with replacement, and a run stops as soon as no
//! centroid channel moves by more than [`CONVERGENCE_TOLERANCE`].

use palette::Srgb;
use rand::Rng;
use tracing::{debug, trace};

use crate::error::{PaletteError, Result};

/// One input sample, 8 bits per channel.
pub type Pixel = Srgb<u8>;

/// Running cluster mean, channels in 0.0..=255.0.
pub type Centroid = Srgb<f64>;

pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Largest per-channel movement still considered "not moving".
pub const CONVERGENCE_TOLERANCE: f64 = 0.001;

/// Output of a clustering run.
///
/// `labels` come from the last assignment step while `centroids` come from the
/// update that followed it, so on the final pass the centroids can be one step
/// ahead of the labels.
#[derive(Clone, Debug, PartialEq)]
pub struct Clustering {
    pub centroids: Vec<Centroid>,
    pub labels: Vec<usize>,
    /// Number of assignment/update passes performed.
    pub iterations: usize,
    pub converged: bool,
}

/// Check the preconditions of [`cluster`] without running it.
pub fn validate(pixel_count: usize, k: usize) -> Result<()> {
    if pixel_count == 0 {
        return Err(PaletteError::EmptyInput);
    }
    if k == 0 {
        return Err(PaletteError::InvalidColorCount);
    }
    if k > pixel_count {
        return Err(PaletteError::TooManyColors {
            k,
            pixels: pixel_count,
        });
    }
    Ok(())
}

/// Cluster `pixels` into `k` colors.
///
/// With `max_iterations == 0` the random seeds are returned untouched and the
/// labels come from a single assignment pass against them.
pub fn cluster<R: Rng>(
    pixels: &[Pixel],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Clustering> {
    validate(pixels.len(), k)?;

    let mut centroids: Vec<Centroid> = (0..k)
        .map(|_| to_centroid(pixels[rng.random_range(0..pixels.len())]))
        .collect();
    let mut labels = vec![0usize; pixels.len()];
    let mut iterations = 0;
    let mut converged = false;

    if max_iterations == 0 {
        assign(pixels, &centroids, &mut labels);
    }

    while iterations < max_iterations {
        assign(pixels, &centroids, &mut labels);
        let updated = update(pixels, &labels, &centroids);
        iterations += 1;

        trace!(iteration = iterations, shift = max_shift(&centroids, &updated), "k-means pass");
        let settled = has_converged(&centroids, &updated);
        centroids = updated;

        if settled {
            converged = true;
            break;
        }
    }

    debug!(
        pixels = pixels.len(),
        k, iterations, converged, "k-means finished"
    );

    Ok(Clustering {
        centroids,
        labels,
        iterations,
        converged,
    })
}

#[inline]
fn to_centroid(pixel: Pixel) -> Centroid {
    Srgb::new(pixel.red as f64, pixel.green as f64, pixel.blue as f64)
}

#[inline(always)]
pub(crate) fn distance_sq(pixel: Pixel, centroid: &Centroid) -> f64 {
    let dr = pixel.red as f64 - centroid.red;
    let dg = pixel.green as f64 - centroid.green;
    let db = pixel.blue as f64 - centroid.blue;
    dr * dr + dg * dg + db * db
}

/// Index of the nearest centroid. Ties keep the lowest index.
pub(crate) fn nearest(pixel: Pixel, centroids: &[Centroid]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = distance_sq(pixel, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }
    best_idx
}

fn assign(pixels: &[Pixel], centroids: &[Centroid], labels: &mut [usize]) {
    for (label, &pixel) in labels.iter_mut().zip(pixels) {
        *label = nearest(pixel, centroids);
    }
}

/// Per-channel mean of each cluster. Empty clusters keep their previous
/// centroid.
fn update(pixels: &[Pixel], labels: &[usize], previous: &[Centroid]) -> Vec<Centroid> {
    let mut sums = vec![[0.0f64; 3]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (&pixel, &label) in pixels.iter().zip(labels) {
        let sum = &mut sums[label];
        sum[0] += pixel.red as f64;
        sum[1] += pixel.green as f64;
        sum[2] += pixel.blue as f64;
        counts[label] += 1;
    }

    sums.iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                *prev
            } else {
                let n = count as f64;
                Srgb::new(sum[0] / n, sum[1] / n, sum[2] / n)
            }
        })
        .collect()
}

/// True when no channel of any centroid moved by more than
/// [`CONVERGENCE_TOLERANCE`].
fn has_converged(old: &[Centroid], new: &[Centroid]) -> bool {
    max_shift(old, new) <= CONVERGENCE_TOLERANCE
}

fn max_shift(old: &[Centroid], new: &[Centroid]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| {
            (a.red - b.red)
                .abs()
                .max((a.green - b.green).abs())
                .max((a.blue - b.blue).abs())
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn red_blue() -> Vec<Pixel> {
        let mut pixels = vec![Srgb::new(255, 0, 0); 60];
        pixels.extend(std::iter::repeat_n(Srgb::new(0, 0, 255), 40));
        pixels
    }

    #[test]
    fn test_single_cluster_is_mean() {
        let pixels: Vec<Pixel> = vec![
            Srgb::new(0, 0, 0),
            Srgb::new(10, 20, 30),
            Srgb::new(20, 40, 60),
            Srgb::new(30, 60, 90),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let result = cluster(&pixels, 1, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();

        assert_eq!(result.centroids, vec![Srgb::new(15.0, 30.0, 45.0)]);
        assert!(result.labels.iter().all(|&l| l == 0));
        assert!(result.converged);
    }

    #[test]
    fn test_two_flat_clusters_separate_exactly() {
        let pixels = red_blue();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = cluster(&pixels, 2, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();

            let mut centroids = result.centroids.clone();
            centroids.sort_by(|a, b| a.red.total_cmp(&b.red));
            assert_eq!(
                centroids,
                vec![Srgb::new(0.0, 0.0, 255.0), Srgb::new(255.0, 0.0, 0.0)],
                "seed {seed}"
            );
            assert!(result.converged, "seed {seed}");
        }
    }

    #[test]
    fn test_zero_iterations_returns_seeds() {
        let pixels = red_blue();
        let mut rng = StdRng::seed_from_u64(3);
        let result = cluster(&pixels, 3, 0, &mut rng).unwrap();

        assert_eq!(result.iterations, 0);
        assert!(!result.converged);
        assert_eq!(result.labels.len(), pixels.len());
        for centroid in &result.centroids {
            let seeded = *centroid == Srgb::new(255.0, 0.0, 0.0)
                || *centroid == Srgb::new(0.0, 0.0, 255.0);
            assert!(seeded, "centroid {centroid:?} is not an input pixel");
        }
        for (&pixel, &label) in pixels.iter().zip(&result.labels) {
            assert_eq!(label, nearest(pixel, &result.centroids));
        }
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let pixels: Vec<Pixel> = (0..=255u8).map(|v| Srgb::new(v, 255 - v, v / 2)).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let result = cluster(&pixels, 8, 1, &mut rng).unwrap();
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_same_seed_same_result() {
        let pixels: Vec<Pixel> = (0..200u32)
            .map(|i| Srgb::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8))
            .collect();
        let a = cluster(&pixels, 5, 50, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = cluster(&pixels, 5, 50, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_index() {
        let centroids = vec![Srgb::new(0.0, 0.0, 0.0), Srgb::new(20.0, 0.0, 0.0)];
        assert_eq!(nearest(Srgb::new(10, 0, 0), &centroids), 0);

        let duplicate = vec![Srgb::new(5.0, 5.0, 5.0); 3];
        assert_eq!(nearest(Srgb::new(200, 1, 9), &duplicate), 0);
    }

    #[test]
    fn test_empty_cluster_keeps_previous_centroid() {
        let pixels: Vec<Pixel> = vec![Srgb::new(10, 10, 10), Srgb::new(30, 30, 30)];
        let labels = vec![0, 0];
        let previous: Vec<Centroid> = vec![Srgb::new(0.0, 0.0, 0.0), Srgb::new(99.5, 1.0, 2.0)];

        let updated = update(&pixels, &labels, &previous);
        assert_eq!(updated[0], Srgb::new(20.0, 20.0, 20.0));
        assert_eq!(updated[1], Srgb::new(99.5, 1.0, 2.0));
    }

    #[test]
    fn test_max_shift_uses_largest_channel_delta() {
        let old = vec![Srgb::new(1.0, 2.0, 3.0), Srgb::new(0.0, 0.0, 0.0)];
        let new = vec![Srgb::new(1.0, 2.0005, 3.0), Srgb::new(0.0, 0.0, 0.25)];
        assert_eq!(max_shift(&old, &new), 0.25);
    }

    #[test]
    fn test_convergence_boundary_is_inclusive() {
        let old: Vec<Centroid> = vec![Srgb::new(0.0, 10.0, 20.0), Srgb::new(5.0, 5.0, 5.0)];

        let at_tolerance = vec![Srgb::new(0.001, 10.0, 20.0), Srgb::new(5.0, 5.0, 5.0)];
        assert!(has_converged(&old, &at_tolerance));

        let past_tolerance = vec![Srgb::new(0.0011, 10.0, 20.0), Srgb::new(5.0, 5.0, 5.0)];
        assert!(!has_converged(&old, &past_tolerance));

        assert!(has_converged(&old, &old));
    }

    #[test]
    fn test_labels_trail_final_centroids() {
        let pixels: Vec<Pixel> = (0..=255u8).map(|v| Srgb::new(v, 255 - v, v / 2)).collect();

        // Same draws as the seeding inside `cluster`.
        let mut seed_rng = StdRng::seed_from_u64(11);
        let seeds: Vec<Centroid> = (0..8)
            .map(|_| to_centroid(pixels[seed_rng.random_range(0..pixels.len())]))
            .collect();

        let result = cluster(&pixels, 8, 1, &mut StdRng::seed_from_u64(11)).unwrap();
        assert!(!result.converged);

        let against_seeds: Vec<usize> = pixels.iter().map(|&p| nearest(p, &seeds)).collect();
        let against_final: Vec<usize> = pixels
            .iter()
            .map(|&p| nearest(p, &result.centroids))
            .collect();

        assert_eq!(result.labels, against_seeds);
        assert_ne!(result.labels, against_final);
    }

    #[test]
    fn test_precondition_errors() {
        let mut rng = StdRng::seed_from_u64(0);
        let pixels: Vec<Pixel> = vec![Srgb::new(1, 2, 3); 2];

        assert!(matches!(
            cluster(&[], 1, 10, &mut rng),
            Err(PaletteError::EmptyInput)
        ));
        assert!(matches!(
            cluster(&pixels, 0, 10, &mut rng),
            Err(PaletteError::InvalidColorCount)
        ));
        assert!(matches!(
            cluster(&pixels, 3, 10, &mut rng),
            Err(PaletteError::TooManyColors { k: 3, pixels: 2 })
        ));
    }
}
