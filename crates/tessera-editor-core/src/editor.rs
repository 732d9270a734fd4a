//! Editor binding: wires input notifications to parse and synchronize.
//!
//! Owns the parser, composition state, and history for one surface. The
//! host calls [`MarkdownEditor::handle_input`] on every content change and
//! the composition hooks around IME sessions; everything else follows.

use crate::ast::Document;
use crate::config::EditorConfig;
use crate::history::SnapshotHistory;
use crate::parser::MarkdownParser;
use crate::surface::Surface;
use crate::sync::synchronize;
use crate::types::{CompositionState, InputOutcome, SyncReport};

pub struct MarkdownEditor<S: Surface> {
    surface: Option<S>,
    parser: MarkdownParser,
    composition: CompositionState,
    history: SnapshotHistory,
    config: EditorConfig,
}

impl<S: Surface> MarkdownEditor<S> {
    /// Editor with no surface attached. Every operation is a no-op until
    /// [`attach`](Self::attach) is called.
    pub fn detached(config: EditorConfig) -> Self {
        Self {
            surface: None,
            parser: MarkdownParser::new(),
            composition: CompositionState::Idle,
            history: SnapshotHistory::new(config.history_depth),
            config,
        }
    }

    pub fn new(config: EditorConfig, surface: S) -> Self {
        let mut editor = Self::detached(config);
        editor.attach(surface);
        editor
    }

    /// Attach a surface, making it editable when markdown is enabled.
    pub fn attach(&mut self, mut surface: S) {
        if self.config.markdown {
            surface.set_editable(true);
        }
        self.history.reset(&surface.source_text());
        self.surface = Some(surface);
        tracing::debug!(markdown = self.config.markdown, "attached surface");
    }

    /// Detach and hand back the surface.
    pub fn detach(&mut self) -> Option<S> {
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The last accepted tree.
    pub fn document(&self) -> &Document {
        self.parser.tree()
    }

    pub fn composition(&self) -> CompositionState {
        self.composition
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Content-changed notification.
    pub fn handle_input(&mut self) -> InputOutcome {
        self.input_pass(false)
    }

    pub fn composition_start(&mut self) {
        tracing::trace!("composition started");
        self.composition = CompositionState::Composing;
    }

    /// End the composition session and run exactly one input pass.
    ///
    /// The pass runs even if notifications are suspended by an earlier pass
    /// in the same frame.
    pub fn composition_end(&mut self) -> InputOutcome {
        tracing::trace!("composition ended");
        self.composition = CompositionState::Idle;
        self.input_pass(true)
    }

    fn input_pass(&mut self, ignore_suspension: bool) -> InputOutcome {
        let Some(surface) = self.surface.as_mut() else {
            return InputOutcome::Detached;
        };
        if !self.config.markdown {
            return InputOutcome::Disabled;
        }
        if !ignore_suspension && surface.notifications_suspended() {
            tracing::trace!("input while suspended, ignoring");
            return InputOutcome::Suspended;
        }
        if self.composition.is_composing() {
            tracing::trace!("input during composition, ignoring");
            return InputOutcome::Composing;
        }

        let text = surface.source_text();
        self.history.record(&text);

        let (_, changed) = self.parser.parse(&text);
        if !changed {
            return InputOutcome::Unchanged;
        }

        InputOutcome::Rendered(render_pass(surface, &self.config))
    }

    /// Restore the previous snapshot. Returns `None` if there is nothing to
    /// undo or no surface.
    pub fn undo(&mut self) -> Option<SyncReport> {
        self.surface.as_ref()?;
        let snapshot = self.history.undo()?;
        Some(self.restore(&snapshot))
    }

    pub fn redo(&mut self) -> Option<SyncReport> {
        self.surface.as_ref()?;
        let snapshot = self.history.redo()?;
        Some(self.restore(&snapshot))
    }

    fn restore(&mut self, snapshot: &str) -> SyncReport {
        let Some(surface) = self.surface.as_mut() else {
            return SyncReport::default();
        };
        tracing::debug!(len = snapshot.len(), "restoring snapshot");
        surface.set_text_content(snapshot);
        self.parser.parse(snapshot);
        render_pass(surface, &self.config)
    }
}

fn render_pass<S: Surface>(surface: &mut S, config: &EditorConfig) -> SyncReport {
    surface.suspend_notifications();
    synchronize(surface, config)
}
