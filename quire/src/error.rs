// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Contract violations reported by the paragraph remeasurer.
///
/// These always point at a bug in the calling pipeline stage; they are
/// never degraded into an approximate result.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RemeasureError {
    #[error("max width must be a positive finite number, got {0}")]
    InvalidMaxWidth(f32),
    #[error("first line indent must be finite, got {0}")]
    InvalidFirstLineIndent(f32),
    #[error("block `{id}` is a {kind}, only paragraphs can be remeasured")]
    NotAParagraph { id: String, kind: &'static str },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to parse layout configuration")]
    Parse(#[from] toml::de::Error),
    #[error("invalid layout configuration: {0}")]
    Invalid(String),
}
