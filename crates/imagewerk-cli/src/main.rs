// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Imagewerk command-line front end.
//
// Entry point. Loads the engine configuration, initialises logging, and runs
// one engine operation per invocation.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use imagewerk_core::error::Result;
use imagewerk_core::{DistortMethod, EngineConfig, ErrorMetric, Percentage};

#[derive(Debug, Parser)]
#[command(name = "imagewerk")]
#[command(about = "Run Imagewerk engine operations on image files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Settings record for the operation (JSON)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Measure the distortion between two images
    Compare {
        input: PathBuf,
        reference: PathBuf,

        /// Error metric (ae, mae, mse, rmse, pae, psnr, ncc)
        #[arg(short, long)]
        metric: Option<ErrorMetric>,

        /// Write the difference image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Edge-preserving smoothing
    MeanShift {
        input: PathBuf,
        output: PathBuf,

        /// Window diameter in pixels
        #[arg(long, default_value = "3")]
        size: u32,

        /// Colour distance as a percentage of full range
        #[arg(long, default_value = "10%")]
        color_distance: Percentage,
    },

    /// Reduce the image to a few colours
    Kmeans { input: PathBuf, output: PathBuf },

    /// Straighten skewed text
    Deskew { input: PathBuf, output: PathBuf },

    /// Scale-rotate-translate or affine resampling
    Distort {
        input: PathBuf,
        output: PathBuf,

        /// Transform family (srt, affine)
        #[arg(short, long, default_value = "srt")]
        method: DistortMethod,

        /// Transform arguments, comma separated
        #[arg(required = true, value_delimiter = ',', allow_negative_numbers = true)]
        args: Vec<f64>,
    },

    /// Convolve, erode, dilate, open or close with a kernel
    Morphology { input: PathBuf, output: PathBuf },

    /// Label regions and print their measurements
    ConnectedComponents {
        input: PathBuf,

        /// Write the label map (or mean-colour image) here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(command = ?cli.command, "Imagewerk starting");

    let report = commands::run(cli.command, cli.settings.as_deref(), &config)?;
    if let Some(report) = report {
        println!("{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distort_arguments_split_on_commas() {
        let cli = Cli::try_parse_from([
            "imagewerk", "distort", "in.png", "out.png", "10,-5,30",
        ])
        .unwrap();
        let Command::Distort { method, args, .. } = cli.command else {
            panic!("expected distort, got {:?}", cli.command);
        };
        assert_eq!(method, DistortMethod::ScaleRotateTranslate);
        assert_eq!(args, vec![10.0, -5.0, 30.0]);
    }

    #[test]
    fn compare_metric_parses_short_names() {
        let cli = Cli::try_parse_from([
            "imagewerk", "compare", "a.png", "b.png", "--metric", "psnr",
        ])
        .unwrap();
        let Command::Compare { metric, .. } = cli.command else {
            panic!("expected compare, got {:?}", cli.command);
        };
        assert_eq!(metric, Some(ErrorMetric::PeakSignalToNoiseRatio));
    }

    #[test]
    fn settings_flag_is_global() {
        let cli = Cli::try_parse_from([
            "imagewerk", "kmeans", "in.png", "out.png", "--settings", "k.json",
        ])
        .unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("k.json")));
    }

    #[test]
    fn unknown_metric_is_a_usage_error() {
        assert!(
            Cli::try_parse_from(["imagewerk", "compare", "a.png", "b.png", "-m", "bogus"])
                .is_err()
        );
    }
}
