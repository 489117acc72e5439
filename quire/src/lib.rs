// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Incremental layout core for paginated rich-text documents.
//!
//! A host pipeline hands over a new block sequence after every edit. The
//! [`diff`] module finds where it starts to differ from the previous one,
//! the [`cache`] answers every block whose fingerprint and layout box are
//! unchanged, and the [`remeasure`] module re-breaks the paragraphs that
//! are left. [`LayoutSession`] wires the three together.

pub mod cache;
pub mod config;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod remeasure;
mod session;

pub use crate::cache::{CacheStats, MeasureCache, SharedMeasureCache};
pub use crate::config::LayoutConfig;
pub use crate::diff::{compute_dirty_region, DirtyRegion};
pub use crate::error::{ConfigError, RemeasureError};
pub use crate::fingerprint::fingerprint;
pub use crate::remeasure::{
    remeasure_paragraph, HeuristicMeasurer, Line, MarkerMetrics, Measure, MeasureFont,
    Remeasurer, TextMeasurer,
};
pub use crate::session::{LayoutSession, RelayoutOutcome};
