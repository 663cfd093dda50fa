//! The full pipeline: pixels → k-means → ranked palette → text color.

use image::DynamicImage;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::contrast::{self, TextColor};
use crate::error::{PaletteError, Result};
use crate::extract;
use crate::kmeans::{self, DEFAULT_MAX_ITERATIONS, Pixel};
use crate::rank::{self, ColorResult};

/// Palette size used for offline/batch analysis.
pub const DEFAULT_NUM_COLORS: usize = 18;
/// Palette size used when a user is waiting on the result.
pub const INTERACTIVE_NUM_COLORS: usize = 8;
/// Longest side images are shrunk to in interactive mode.
pub const INTERACTIVE_MAX_DIMENSION: u32 = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub num_colors: usize,
    pub max_iterations: usize,
    /// Downscale images whose longest side exceeds this. `None` keeps every
    /// pixel.
    pub max_dimension: Option<u32>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            num_colors: DEFAULT_NUM_COLORS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_dimension: None,
        }
    }
}

impl AnalyzeOptions {
    /// Smaller palette and a downscaled image, for responsive use.
    pub fn interactive() -> Self {
        Self {
            num_colors: INTERACTIVE_NUM_COLORS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_dimension: Some(INTERACTIVE_MAX_DIMENSION),
        }
    }

    pub fn with_num_colors(mut self, num_colors: usize) -> Self {
        self.num_colors = num_colors;
        self
    }
}

/// Dominant color, the text color to put on it, and the whole ranked
/// palette.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub dominant_color: String,
    pub text_color: TextColor,
    #[serde(rename = "allColors")]
    pub colors: Vec<ColorResult>,
}

impl Analysis {
    pub fn dominant(&self) -> Option<&ColorResult> {
        self.colors.first()
    }
}

pub fn analyze_pixels<R: Rng>(
    pixels: &[Pixel],
    options: &AnalyzeOptions,
    rng: &mut R,
) -> Result<Analysis> {
    let clustering = kmeans::cluster(pixels, options.num_colors, options.max_iterations, rng)?;
    let colors = rank::rank(&clustering.centroids, &clustering.labels, options.num_colors);

    let dominant = colors.first().ok_or(PaletteError::InvalidColorCount)?;
    let dominant_color = dominant.hex.clone();
    let text_color = contrast::text_color_for(&dominant_color)?;

    debug!(%dominant_color, %text_color, colors = colors.len(), "palette ready");

    Ok(Analysis {
        dominant_color,
        text_color,
        colors,
    })
}

pub fn analyze_image<R: Rng>(
    img: &DynamicImage,
    options: &AnalyzeOptions,
    rng: &mut R,
) -> Result<Analysis> {
    let pixels = extract::pixels_from_image(img, options.max_dimension);
    analyze_pixels(&pixels, options, rng)
}

/// Decode `input` and analyze it.
pub fn analyze_bytes<R: Rng>(
    input: &[u8],
    options: &AnalyzeOptions,
    rng: &mut R,
) -> Result<Analysis> {
    let img = extract::decode(input)?;
    analyze_image(&img, options, rng)
}
