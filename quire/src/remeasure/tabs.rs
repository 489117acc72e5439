// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::TWIPS_PER_PX;
use crate::model::{TabAlignment, TabStop};
use smallvec::SmallVec;

/// Tab stops of one paragraph in line coordinates, where x = 0 is the left
/// indent. Explicit stops are consumed in order; past the last one tabs
/// snap to the default interval grid, which is anchored at the content-box
/// start edge like the explicit stops.
#[derive(Clone, Debug)]
pub struct TabStops {
    stops: SmallVec<[f32; 8]>,
    interval: f32,
    left_indent: f32,
}

impl TabStops {
    pub fn new(tabs: &[TabStop], interval_px: f32, left_indent: f32) -> Self {
        let mut stops: SmallVec<[f32; 8]> = tabs
            .iter()
            .filter(|stop| stop.alignment != TabAlignment::Clear)
            .map(|stop| stop.pos / TWIPS_PER_PX - left_indent)
            .filter(|pos| pos.is_finite())
            .collect();
        stops.sort_by(f32::total_cmp);
        stops.dedup();

        Self {
            stops,
            interval: interval_px,
            left_indent,
        }
    }

    #[inline]
    pub fn explicit(&self) -> &[f32] {
        &self.stops
    }

    /// Position of the next stop strictly after `x`. `cursor` tracks the
    /// explicit stops already consumed on the current line.
    pub fn next_stop(&self, x: f32, cursor: &mut usize) -> f32 {
        while *cursor < self.stops.len() {
            let stop = self.stops[*cursor];
            *cursor += 1;
            if stop > x {
                return stop;
            }
        }

        let absolute = x + self.left_indent;
        let next = ((absolute / self.interval).floor() + 1.) * self.interval;
        next - self.left_indent
    }
}
