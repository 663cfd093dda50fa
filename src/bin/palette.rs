use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use image_palette_wasm::{Analysis, AnalyzeOptions, analyze_bytes};
use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Extract the dominant colors of images with k-means.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long = "colors", default_value_t = 8)]
    n_colors: usize,

    /// Maximum k-means iterations
    #[arg(short = 'i', long, default_value_t = 50)]
    max_iterations: usize,

    /// Downscale so the longest side is at most this many pixels (0 keeps the full image)
    #[arg(short = 'm', long, default_value_t = 200)]
    max_dimension: u32,

    /// Seed for centroid initialisation; omit for a random palette every run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log clustering progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    path: String,
    #[serde(flatten)]
    analysis: &'a Analysis,
}

fn analyze_path(path: &Path, options: &AnalyzeOptions, seed: Option<u64>) -> Result<Analysis> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    analyze_bytes(&bytes, options, &mut rng).with_context(|| format!("analyzing {}", path.display()))
}

fn print_text(path: &Path, analysis: &Analysis) {
    println!("{}", path.display());
    for color in &analysis.colors {
        println!("{}. {} - {:.2}%", color.rank, color.hex, color.percentage);
    }
    println!("Dominant color: {}", analysis.dominant_color);
    println!(
        "Text should be {} on this background for best readability",
        analysis.text_color
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "image_palette_wasm=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let options = AnalyzeOptions {
        num_colors: args.n_colors,
        max_iterations: args.max_iterations,
        max_dimension: (args.max_dimension > 0).then_some(args.max_dimension),
    };

    // Independent runs, one RNG each.
    let results: Vec<Result<Analysis>> = args
        .inputs
        .par_iter()
        .enumerate()
        .map(|(i, path)| {
            let seed = args.seed.map(|s| s.wrapping_add(i as u64));
            analyze_path(path, &options, seed)
        })
        .collect();

    let mut reports = Vec::new();
    let mut failed = 0;
    for (path, result) in args.inputs.iter().zip(&results) {
        match result {
            Ok(analysis) => match args.format {
                Format::Text => print_text(path, analysis),
                Format::Json => reports.push(Report {
                    path: path.display().to_string(),
                    analysis,
                }),
            },
            Err(e) => {
                tracing::error!("{e:#}");
                failed += 1;
            }
        }
    }

    if args.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if failed > 0 {
        bail!("{failed} of {} images failed", args.inputs.len());
    }
    Ok(())
}
