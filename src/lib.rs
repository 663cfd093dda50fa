//! Dominant-color palette extraction.
//!
//! Pixels are clustered with k-means in RGB space, the clusters are ranked by
//! how many pixels they hold, and the top color gets a readable black or white
//! text color.
//!
//! ```
//! use image_palette_wasm::{AnalyzeOptions, Pixel, analyze_pixels};
//! use palette::Srgb;
//! use rand::SeedableRng;
//!
//! let mut pixels: Vec<Pixel> = vec![Srgb::new(255, 0, 0); 60];
//! pixels.extend(vec![Srgb::new(0, 0, 255); 40]);
//!
//! let options = AnalyzeOptions::default().with_num_colors(2);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let analysis = analyze_pixels(&pixels, &options, &mut rng).unwrap();
//!
//! assert_eq!(analysis.dominant_color, "#ff0000");
//! assert_eq!(analysis.text_color.as_str(), "white");
//! ```

pub mod analysis;
pub mod contrast;
pub mod error;
pub mod extract;
pub mod kmeans;
pub mod rank;
pub mod wasm;
pub mod worker;

pub use analysis::{Analysis, AnalyzeOptions, analyze_bytes, analyze_image, analyze_pixels};
pub use contrast::{TextColor, text_color_for};
pub use error::{PaletteError, Result};
pub use kmeans::{Centroid, Clustering, Pixel, cluster};
pub use rank::{ColorResult, rank};
pub use worker::{PaletteWorker, WorkerRequest, WorkerResponse};
