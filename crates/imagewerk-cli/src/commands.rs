// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers. Each opens its input, applies the settings record
// (from `--settings`, else the factory default), runs the engine operation,
// and returns an optional JSON report for stdout.

use std::path::Path;

use imagewerk_core::error::Result;
use imagewerk_core::{EngineConfig, SettingsFactory};
use imagewerk_image::ImageHandle;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::Command;

/// Run `command` and return the text to print, if any.
pub(crate) fn run(
    command: Command,
    settings: Option<&Path>,
    config: &EngineConfig,
) -> Result<Option<String>> {
    let factory = SettingsFactory::new();
    let open = |path: &Path| -> Result<ImageHandle> {
        Ok(ImageHandle::open(path)?.with_config(config.clone()))
    };

    match command {
        Command::Compare {
            input,
            reference,
            metric,
            output,
        } => {
            let mut record = load_settings(settings, || factory.create_compare_settings())?;
            if let Some(metric) = metric {
                record.metric = metric;
            }
            let mut image = open(input.as_path())?;
            let reference = open(reference.as_path())?;

            let distortion = match output {
                Some(output) => {
                    let result = image.compare_with_settings(&reference, &record)?;
                    result.difference.save(&output)?;
                    result.distortion
                }
                None => image.compare(&reference, record.metric)?,
            };
            info!(distortion, "Comparison finished");
            report(&json!({ "metric": record.metric, "distortion": distortion }))
        }

        Command::MeanShift {
            input,
            output,
            size,
            color_distance,
        } => {
            let mut image = open(input.as_path())?;
            image.mean_shift_with(size, color_distance)?;
            image.save(&output)?;
            Ok(None)
        }

        Command::Kmeans { input, output } => {
            let record = load_settings(settings, || factory.create_kmeans_settings())?;
            let mut image = open(input.as_path())?;
            let colors = image.kmeans(&record)?;
            image.save(&output)?;
            report(&json!({ "colors": colors }))
        }

        Command::Deskew { input, output } => {
            let record = load_settings(settings, || factory.create_deskew_settings())?;
            let mut image = open(input.as_path())?;
            let angle = image.deskew(&record)?;
            image.save(&output)?;
            report(&json!({ "angle": angle }))
        }

        Command::Distort {
            input,
            output,
            method,
            args,
        } => {
            let record = load_settings(settings, || factory.create_distort_settings())?;
            let mut image = open(input.as_path())?;
            image.distort(method, &args, &record)?;
            image.save(&output)?;
            Ok(None)
        }

        Command::Morphology { input, output } => {
            let record = load_settings(settings, || factory.create_morphology_settings())?;
            let mut image = open(input.as_path())?;
            image.morphology(&record)?;
            image.save(&output)?;
            Ok(None)
        }

        Command::ConnectedComponents { input, output } => {
            let record =
                load_settings(settings, || factory.create_connected_components_settings())?;
            let mut image = open(input.as_path())?;
            let components = image.connected_components(&record)?;
            if let Some(output) = output {
                image.save(&output)?;
            }
            report(&json!({ "components": components }))
        }
    }
}

/// Read a settings record from `path`, or fall back to `default`.
fn load_settings<T: DeserializeOwned>(
    path: Option<&Path>,
    default: impl FnOnce() -> T,
) -> Result<T> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let record = serde_json::from_str(&text)?;
            debug!(path = %path.display(), "Settings record loaded");
            Ok(record)
        }
        None => Ok(default()),
    }
}

fn report(value: &serde_json::Value) -> Result<Option<String>> {
    Ok(Some(serde_json::to_string_pretty(value)?))
}

// -- Tests --------------------------------------------------------------------
