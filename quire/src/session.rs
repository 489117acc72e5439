// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::MeasureCache;
use crate::config::LayoutConfig;
use crate::diff::{compute_dirty_region, DirtyRegion};
use crate::model::FlowBlock;
use crate::remeasure::{HeuristicMeasurer, Measure, Remeasurer, TextMeasurer};
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelayoutOutcome {
    pub region: DirtyRegion,
    /// One entry per block of the new sequence. `None` for blocks this
    /// crate cannot measure, or whose measurement failed.
    pub measures: Vec<Option<Measure>>,
    pub remeasured: usize,
    pub reused: usize,
}

/// Incremental layout state of one open document.
///
/// Holds the last laid-out block sequence and the measurement cache, and
/// re-measures only what the cache cannot answer.
pub struct LayoutSession<M = HeuristicMeasurer> {
    cache: MeasureCache<Measure>,
    remeasurer: Remeasurer<M>,
    previous: Vec<FlowBlock>,
    previous_measures: Vec<Option<Measure>>,
    previous_box: Option<(f32, f32)>,
}

impl LayoutSession<HeuristicMeasurer> {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            cache: MeasureCache::from_config(&config),
            remeasurer: Remeasurer::new(config),
            previous: Vec::new(),
            previous_measures: Vec::new(),
            previous_box: None,
        }
    }
}

impl Default for LayoutSession<HeuristicMeasurer> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<M: TextMeasurer> LayoutSession<M> {
    pub fn with_measurer(measurer: M, config: LayoutConfig) -> Self {
        Self {
            cache: MeasureCache::from_config(&config),
            remeasurer: Remeasurer::with_measurer(measurer, config),
            previous: Vec::new(),
            previous_measures: Vec::new(),
            previous_box: None,
        }
    }

    /// Lays out `next` in a `width` x `height` box and makes it the new
    /// baseline for the following call.
    pub fn relayout(
        &mut self,
        next: Vec<FlowBlock>,
        width: f32,
        height: f32,
    ) -> RelayoutOutcome {
        let region = compute_dirty_region(&self.previous, &next);
        if !region.deleted_block_ids.is_empty() {
            self.cache.invalidate(&region.deleted_block_ids);
        }

        let mut measures = Vec::with_capacity(next.len());
        let mut remeasured = 0;
        let mut reused = 0;

        // Blocks before the first dirty index are unchanged, so in the same
        // box their last measures still hold.
        let clean_prefix = if self.previous_box == Some((width, height)) {
            region.first_dirty_index.min(self.previous_measures.len())
        } else {
            0
        };

        for (index, block) in next.iter().enumerate() {
            if index < clean_prefix {
                if let Some(measure) = &self.previous_measures[index] {
                    measures.push(Some(measure.clone()));
                    reused += 1;
                    continue;
                }
            }

            if let Some(measure) = self.cache.get(block, width, height) {
                measures.push(Some(measure.clone()));
                reused += 1;
                continue;
            }

            let FlowBlock::Paragraph(paragraph) = block else {
                measures.push(None);
                continue;
            };

            match self.remeasurer.remeasure_paragraph(paragraph, width, None) {
                Ok(measure) => {
                    self.cache.set(block, width, height, measure.clone());
                    measures.push(Some(measure));
                    remeasured += 1;
                }
                Err(err) => {
                    warn!("layout of block {} aborted: {err}", paragraph.id);
                    measures.push(None);
                }
            }
        }

        debug!(
            "relayout of {} blocks: first dirty {}, {remeasured} remeasured, {reused} reused",
            next.len(),
            region.first_dirty_index
        );

        self.previous = next;
        self.previous_measures = measures.clone();
        self.previous_box = Some((width, height));
        RelayoutOutcome {
            region,
            measures,
            remeasured,
            reused,
        }
    }

    /// Forgets the previous sequence and every cached measurement.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.previous.clear();
        self.previous_measures.clear();
        self.previous_box = None;
    }

    #[inline]
    pub fn previous(&self) -> &[FlowBlock] {
        &self.previous
    }

    #[inline]
    pub fn cache(&self) -> &MeasureCache<Measure> {
        &self.cache
    }

    /// Direct cache access, used by hosts that measure non-paragraph blocks
    /// themselves.
    #[inline]
    pub fn cache_mut(&mut self) -> &mut MeasureCache<Measure> {
        &mut self.cache
    }

    #[inline]
    pub fn remeasurer(&self) -> &Remeasurer<M> {
        &self.remeasurer
    }

    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        self.remeasurer.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageBlock, ParagraphBlock, Run};

    fn paragraph(id: &str, text: &str) -> FlowBlock {
        FlowBlock::Paragraph(ParagraphBlock::new(id, vec![Run::text(text)]))
    }

    #[test]
    fn test_second_pass_reuses_everything() {
        let mut session = LayoutSession::default();
        let blocks = vec![paragraph("a", "one"), paragraph("b", "two")];

        let first = session.relayout(blocks.clone(), 600., 800.);
        assert_eq!(first.remeasured, 2);
        assert_eq!(first.reused, 0);

        let second = session.relayout(blocks, 600., 800.);
        assert_eq!(second.remeasured, 0);
        assert_eq!(second.reused, 2);
        assert!(second.region.is_clean(2));
        assert_eq!(second.measures, first.measures);
    }

    #[test]
    fn test_edit_remeasures_only_changed_block() {
        let mut session = LayoutSession::default();
        session.relayout(vec![paragraph("a", "one"), paragraph("b", "two")], 600., 800.);

        let outcome =
            session.relayout(vec![paragraph("a", "one"), paragraph("b", "two!")], 600., 800.);
        assert_eq!(outcome.region.first_dirty_index, 1);
        assert_eq!(outcome.remeasured, 1);
        assert_eq!(outcome.reused, 1);
    }

    #[test]
    fn test_clean_prefix_skips_the_cache() {
        let mut session = LayoutSession::default();
        let blocks = vec![
            paragraph("a", "one"),
            paragraph("b", "two"),
            paragraph("c", "three"),
        ];
        session.relayout(blocks.clone(), 600., 800.);
        session.cache_mut().reset_stats();

        let mut edited = blocks.clone();
        edited[2] = paragraph("c", "three!");
        let outcome = session.relayout(edited, 600., 800.);
        assert_eq!(outcome.region.first_dirty_index, 2);
        assert_eq!(outcome.reused, 2);
        assert_eq!(outcome.remeasured, 1);
        assert!(outcome.measures.iter().all(Option::is_some));
        let stats = session.cache().stats();
        assert_eq!((stats.hits, stats.misses), (0, 1));

        // A different box cannot reuse the previous pass.
        session.cache_mut().reset_stats();
        let outcome = session.relayout(blocks, 300., 800.);
        assert_eq!(outcome.remeasured, 3);
        assert_eq!(session.cache().stats().misses, 3);
    }

    #[test]
    fn test_deleted_blocks_are_invalidated() {
        let mut session = LayoutSession::default();
        session.relayout(vec![paragraph("a", "one"), paragraph("b", "two")], 600., 800.);
        assert_eq!(session.cache().len(), 2);

        let outcome = session.relayout(vec![paragraph("a", "one")], 600., 800.);
        assert_eq!(outcome.region.deleted_block_ids, vec!["b".to_string()]);
        assert_eq!(session.cache().len(), 1);
        assert_eq!(session.cache().stats().invalidations, 1);
    }

    #[test]
    fn test_invalid_width_aborts_only_paragraphs() {
        let mut session = LayoutSession::default();
        let outcome = session.relayout(vec![paragraph("a", "one")], 0., 800.);
        assert_eq!(outcome.measures, vec![None]);
        assert_eq!(outcome.remeasured, 0);
        assert!(session.cache().is_empty());
    }

    #[test]
    fn test_host_measured_blocks_are_served_from_cache() {
        let mut session = LayoutSession::default();
        let image = FlowBlock::Image(ImageBlock {
            id: "img".to_string(),
            width: 100.,
            height: 50.,
            ..Default::default()
        });

        let outcome = session.relayout(vec![image.clone()], 600., 800.);
        assert_eq!(outcome.measures, vec![None]);

        let measure = Measure {
            total_height: 50.,
            ..Default::default()
        };
        session.cache_mut().set(&image, 600., 800., measure.clone());

        let outcome = session.relayout(vec![image], 600., 800.);
        assert_eq!(outcome.measures, vec![Some(measure)]);
        assert_eq!(outcome.reused, 1);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut session = LayoutSession::default();
        session.relayout(vec![paragraph("a", "one")], 600., 800.);
        session.reset();

        assert!(session.previous().is_empty());
        assert!(session.cache().is_empty());
        assert_eq!(session.cache().stats().clears, 1);

        let outcome = session.relayout(vec![paragraph("a", "one")], 600., 800.);
        assert_eq!(outcome.region.first_dirty_index, 0);
        assert_eq!(outcome.remeasured, 1);
    }
}
