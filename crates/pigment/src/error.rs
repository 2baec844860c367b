// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

/// Failure to convert pixels between two color spaces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("source buffer holds {actual} bytes, {expected} required")]
    SourceTooSmall { expected: usize, actual: usize },
    #[error("destination buffer holds {actual} bytes, {expected} required")]
    DestinationTooSmall { expected: usize, actual: usize },
}

/// A color space lookup that could not be satisfied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown color space `{model}`/`{depth}`")]
    UnknownColorSpace { model: String, depth: String },
    #[error("unknown color space id `{0}`")]
    UnknownId(String),
}

/// Errors produced while parsing or editing gradients.
#[derive(Debug, Error)]
pub enum GradientError {
    #[error("missing `GIMP Gradient` header")]
    MissingHeader,
    #[error("invalid segment count `{0}`")]
    InvalidSegmentCount(String),
    #[error("line {line}: {reason}")]
    InvalidSegment { line: usize, reason: String },
    #[error("gradient declares {expected} segments but contains {actual}")]
    TruncatedSegments { expected: usize, actual: usize },
    #[error("gradient has no stops")]
    NoStops,
    #[error("no gradient element in document")]
    NoGradientElement,
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("segment index {0} out of range")]
    SegmentOutOfRange(usize),
    #[error("cannot remove the last segment")]
    LastSegment,
    /// Segment boundary `index` lies at `found` instead of `expected`. Boundary `0` is
    /// the start of the first segment, boundary `n` the end of the last one.
    #[error("segment boundary {index} is at {found}, expected {expected}")]
    Discontinuous {
        index: usize,
        expected: f64,
        found: f64,
    },
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
}

/// Errors produced while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration root must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors produced while streaming pixel data.
#[derive(Debug, Error)]
pub enum PixmapError {
    #[error("stream does not start with a pixmap header")]
    BadMagic,
    #[error("pixmap data truncated")]
    Truncated,
    #[error("color space id in pixmap header is not valid")]
    InvalidId,
    #[error("pixmap of {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
