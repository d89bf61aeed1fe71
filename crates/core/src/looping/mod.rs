//! Loop construction: expanding a [`SlideSet`] into the sequence that is
//! actually mounted so that wraparound never shows a gap.
//!
//! The expansion is index based. A [`RenderBuffer`] maps each render position
//! back to a source index with a modulo, so no slide item is ever duplicated
//! and stale positions are detected by generation instead of by identity.

use serde::{Deserialize, Serialize};

use crate::{SlideItem, SlideSet};

/// Number of full copies mounted while looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingStrategy {
    /// Two copies: the strip only ever runs ahead into the second copy.
    #[default]
    BufferAhead,
    /// Three copies with the baseline in the middle one, so the strip can
    /// move backward through a leading copy as well.
    BackwardPadded,
}

impl PaddingStrategy {
    pub fn copies(self) -> usize {
        match self {
            Self::BufferAhead => 2,
            Self::BackwardPadded => 3,
        }
    }

    fn baseline_copy(self) -> usize {
        match self {
            Self::BufferAhead => 0,
            Self::BackwardPadded => 1,
        }
    }
}

/// Position inside a specific build of a [`RenderBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRef {
    pub generation: u64,
    pub position: usize,
}

/// The mounted slide sequence for one breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderBuffer {
    generation: u64,
    source_len: usize,
    visible_count: usize,
    strategy: Option<PaddingStrategy>,
}

impl RenderBuffer {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Whether the buffer was padded for seamless wraparound.
    pub fn is_looping(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn strategy(&self) -> Option<PaddingStrategy> {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.source_len * self.strategy.map_or(1, PaddingStrategy::copies)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source_index(&self, position: usize) -> Option<usize> {
        (position < self.len()).then(|| position % self.source_len)
    }

    /// Source index for every render position, in mount order.
    pub fn source_indices(&self) -> Vec<usize> {
        (0..self.len()).map(|position| position % self.source_len).collect()
    }

    /// Render position the strip rests on when the animation is at zero.
    pub fn baseline_position(&self) -> usize {
        self.strategy
            .map_or(0, |strategy| strategy.baseline_copy() * self.source_len)
    }

    /// Width of a single slide as a percentage of the visible window.
    pub fn slide_width_percent(&self) -> f64 {
        100.0 / self.visible_count as f64
    }

    /// Translation, in percent of the window, that parks the baseline slide
    /// at the left edge.
    pub fn baseline_offset_percent(&self) -> f64 {
        self.baseline_position() as f64 * self.slide_width_percent()
    }

    pub fn slide_ref(&self, position: usize) -> Option<SlideRef> {
        (position < self.len()).then_some(SlideRef {
            generation: self.generation,
            position,
        })
    }

    /// Resolves a reference issued by this build. References from an
    /// earlier build are stale and resolve to `None`.
    pub fn resolve<'a>(&self, slides: &'a SlideSet, slide: SlideRef) -> Option<&'a SlideItem> {
        if slide.generation != self.generation || slides.len() != self.source_len {
            return None;
        }
        self.source_index(slide.position)
            .and_then(|index| slides.get(index))
    }
}

/// Produces [`RenderBuffer`]s and hands out a fresh generation for each one.
#[derive(Debug, Default)]
pub struct LoopBuilder {
    strategy: PaddingStrategy,
    generation: u64,
}

impl LoopBuilder {
    pub fn new(strategy: PaddingStrategy) -> Self {
        Self {
            strategy,
            generation: 0,
        }
    }

    pub fn strategy(&self) -> PaddingStrategy {
        self.strategy
    }

    /// Builds the buffer for `visible_count` slides in view. Every call
    /// invalidates the references handed out by earlier builds.
    pub fn build(&mut self, slides: &SlideSet, visible_count: usize) -> RenderBuffer {
        self.generation += 1;
        let visible_count = visible_count.max(1);
        let strategy = (slides.len() > visible_count).then_some(self.strategy);

        let buffer = RenderBuffer {
            generation: self.generation,
            source_len: slides.len(),
            visible_count,
            strategy,
        };

        tracing::debug!(
            generation = buffer.generation,
            slides = slides.len(),
            visible_count,
            len = buffer.len(),
            looping = buffer.is_looping(),
            "built render buffer"
        );

        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sets_are_not_padded() {
        let mut builder = LoopBuilder::new(PaddingStrategy::BackwardPadded);
        for (count, visible) in [(1, 1), (2, 4), (4, 4), (3, 5)] {
            let slides = SlideSet::placeholders(count);
            let buffer = builder.build(&slides, visible);
            assert!(!buffer.is_looping());
            assert_eq!(buffer.source_indices(), (0..count).collect::<Vec<_>>());
            assert_eq!(buffer.baseline_position(), 0);
        }
    }

    #[test]
    fn padding_repeats_whole_copies() {
        let slides = SlideSet::placeholders(5);

        let ahead = LoopBuilder::new(PaddingStrategy::BufferAhead).build(&slides, 2);
        assert_eq!(ahead.len(), 10);
        assert_eq!(ahead.source_indices(), vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);

        let padded = LoopBuilder::new(PaddingStrategy::BackwardPadded).build(&slides, 2);
        assert_eq!(padded.len(), 15);
        assert_eq!(padded.baseline_position(), 5);
        assert_eq!(padded.source_index(7), Some(2));
        assert_eq!(padded.source_index(15), None);
    }

    #[test]
    fn looping_buffers_cover_two_windows() {
        let mut builder = LoopBuilder::default();
        for count in 2..12 {
            for visible in 1..count {
                let buffer = builder.build(&SlideSet::placeholders(count), visible);
                assert!(buffer.is_looping());
                assert!(buffer.len() >= visible * 2);
                assert!(buffer.len() >= count * 2);
            }
        }
    }

    #[test]
    fn rebuild_is_idempotent_in_layout() {
        let slides = SlideSet::placeholders(6);
        let mut builder = LoopBuilder::new(PaddingStrategy::BackwardPadded);
        let first = builder.build(&slides, 3);
        let second = builder.build(&slides, 3);

        assert_eq!(first.len(), second.len());
        assert_eq!(first.source_indices(), second.source_indices());
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn references_go_stale_after_rebuild() {
        let slides = SlideSet::placeholders(4);
        let mut builder = LoopBuilder::default();
        let first = builder.build(&slides, 2);
        let slide = first.slide_ref(5).unwrap();
        assert_eq!(first.resolve(&slides, slide), slides.get(1));

        let second = builder.build(&slides, 2);
        assert_eq!(second.resolve(&slides, slide), None);
    }
}
