// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Imagewerk.

use thiserror::Error;

/// Top-level error type for all Imagewerk operations.
#[derive(Debug, Error)]
pub enum ImagewerkError {
    // -- Value parsing --
    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    #[error("invalid value for artifact {key}: {value}")]
    InvalidArtifact { key: String, value: String },

    #[error("unknown {kind}: {value}")]
    UnknownKeyword { kind: &'static str, value: String },

    // -- Engine errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("image dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ImagewerkError>;
