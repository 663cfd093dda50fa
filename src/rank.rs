//! Turns a clustering into a palette ordered by pixel share.

use palette::Srgb;
use serde::Serialize;

use crate::kmeans::Centroid;

/// One palette entry, most common color first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorResult {
    /// 1-based position by pixel count.
    pub rank: usize,
    /// `#rrggbb`, lowercase.
    pub hex: String,
    pub rgb: [u8; 3],
    /// Share of all pixels in percent, unrounded.
    pub percentage: f64,
}

/// Format a color as `#rrggbb`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Round a centroid to the nearest 8-bit color, halves away from zero.
pub fn round_centroid(centroid: &Centroid) -> Srgb<u8> {
    Srgb::new(
        centroid.red.round() as u8,
        centroid.green.round() as u8,
        centroid.blue.round() as u8,
    )
}

/// Number of labels pointing at each of the `k` clusters.
///
/// # Panics
///
/// Panics if a label is `>= k`.
pub fn histogram(labels: &[usize], k: usize) -> Vec<usize> {
    let mut counts = vec![0usize; k];
    for &label in labels {
        counts[label] += 1;
    }
    counts
}

/// Rank the `k` clusters by membership, largest first.
///
/// Equal counts keep centroid order. Clusters nobody was assigned to are
/// still listed, with a percentage of zero.
///
/// # Panics
///
/// Panics if a label is `>= k` or if there are fewer than `k` centroids.
/// Output of [`crate::kmeans::cluster`] always satisfies both.
pub fn rank(centroids: &[Centroid], labels: &[usize], k: usize) -> Vec<ColorResult> {
    debug_assert!(centroids.len() >= k, "{} centroids for k = {k}", centroids.len());
    let counts = histogram(labels, k);
    let total = labels.len();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    order
        .into_iter()
        .enumerate()
        .map(|(position, idx)| {
            let color = round_centroid(&centroids[idx]);
            let percentage = if total == 0 {
                0.0
            } else {
                counts[idx] as f64 * 100.0 / total as f64
            };
            ColorResult {
                rank: position + 1,
                hex: to_hex(color),
                rgb: [color.red, color.green, color.blue],
                percentage,
            }
        })
        .collect()
}
