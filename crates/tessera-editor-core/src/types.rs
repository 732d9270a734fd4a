//! Small value types shared by the synchronizer and the editor binding.

/// Where the caret sits in terms of the surface's node structure.
///
/// `node` is whatever handle the surface uses for its nodes; `offset` is
/// measured with [`Surface::measure`](crate::surface::Surface::measure)
/// inside a text node, or is a child index inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretAnchor<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> CaretAnchor<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Summary of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of text leaves that were re-rendered and swapped in.
    pub leaves_rendered: usize,
    /// Number of leaves skipped because they were blank.
    pub leaves_skipped: usize,
    /// Number of leaves whose replacement failed and were left in place.
    pub leaves_failed: usize,
    /// Surface text length after minus before.
    pub length_delta: isize,
    /// Absolute caret offset restored after the pass, if any.
    pub caret: Option<usize>,
    /// Whether a caret placeholder was appended after the caret's leaf.
    pub placeholder_inserted: bool,
}

/// What an input notification led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// No surface is attached.
    Detached,
    /// Markdown editing is turned off for this editor.
    Disabled,
    /// Notifications are suspended until the next frame.
    Suspended,
    /// An IME composition is in progress.
    Composing,
    /// The tree did not change; nothing was rendered.
    Unchanged,
    /// The surface was re-rendered.
    Rendered(SyncReport),
}

impl InputOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, InputOutcome::Rendered(_))
    }
}

/// IME composition state.
///
/// While a composition session is open, input notifications are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing,
}

impl CompositionState {
    pub fn is_composing(self) -> bool {
        self == CompositionState::Composing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_state() {
        assert!(!CompositionState::default().is_composing());
        assert!(CompositionState::Composing.is_composing());
    }

    #[test]
    fn test_outcome_is_rendered() {
        assert!(InputOutcome::Rendered(SyncReport::default()).is_rendered());
        assert!(!InputOutcome::Composing.is_rendered());
    }
}
