//! DOM event wiring for the editor.
//!
//! `input` drives the parse/synchronize pass, `compositionstart` and
//! `compositionend` drive the IME guard, and `beforeinput` history events
//! are routed to the editor's own undo stack instead of the browser's.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use tessera_editor_core::{EditorConfig, InputOutcome, MarkdownEditor};
use wasm_bindgen::JsCast;

use crate::surface::BrowserSurface;

pub type SharedEditor = Rc<RefCell<MarkdownEditor<BrowserSurface>>>;

/// History request carried by a `beforeinput` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryInput {
    Undo,
    Redo,
}

/// Parse a `beforeinput` `inputType` string into a history request.
pub fn parse_history_input(input_type: &str) -> Option<HistoryInput> {
    match input_type {
        "historyUndo" => Some(HistoryInput::Undo),
        "historyRedo" => Some(HistoryInput::Redo),
        _ => None,
    }
}

/// An editor bound to a live contenteditable element.
///
/// Listeners are removed when this is dropped.
pub struct BrowserEditor {
    editor: SharedEditor,
    _listeners: Vec<EventListener>,
}

impl BrowserEditor {
    pub fn attach(element: web_sys::HtmlElement, config: EditorConfig) -> Self {
        let surface = BrowserSurface::new(element.clone());
        let editor: SharedEditor = Rc::new(RefCell::new(MarkdownEditor::new(config, surface)));

        let target: &web_sys::EventTarget = element.as_ref();
        let mut listeners = Vec::with_capacity(4);

        let ed = editor.clone();
        listeners.push(EventListener::new(target, "input", move |_| {
            let Ok(mut editor) = ed.try_borrow_mut() else {
                tracing::debug!("input during an active pass, ignoring");
                return;
            };
            log_outcome("input", &editor.handle_input());
        }));

        let ed = editor.clone();
        listeners.push(EventListener::new(target, "compositionstart", move |_| {
            if let Ok(mut editor) = ed.try_borrow_mut() {
                editor.composition_start();
            }
        }));

        let ed = editor.clone();
        listeners.push(EventListener::new(target, "compositionend", move |_| {
            if let Ok(mut editor) = ed.try_borrow_mut() {
                log_outcome("compositionend", &editor.composition_end());
            }
        }));

        let ed = editor.clone();
        listeners.push(EventListener::new_with_options(
            target,
            "beforeinput",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(input) = event.dyn_ref::<web_sys::InputEvent>() else {
                    return;
                };
                let Some(history) = parse_history_input(&input.input_type()) else {
                    return;
                };
                let Ok(mut editor) = ed.try_borrow_mut() else {
                    return;
                };
                let report = match history {
                    HistoryInput::Undo => editor.undo(),
                    HistoryInput::Redo => editor.redo(),
                };
                // Leave the native action alone when there was nothing to restore.
                if report.is_some() {
                    event.prevent_default();
                }
                tracing::debug!(?history, restored = report.is_some(), "history input");
            },
        ));

        tracing::debug!("editor attached to element");
        Self {
            editor,
            _listeners: listeners,
        }
    }

    /// Attach to the element with the given id.
    pub fn attach_by_id(id: &str, config: EditorConfig) -> Option<Self> {
        let surface = BrowserSurface::from_id(id)?;
        Some(Self::attach(surface.element().clone(), config))
    }

    pub fn editor(&self) -> &SharedEditor {
        &self.editor
    }

    /// Drop the listeners and hand back the surface.
    pub fn detach(self) -> Option<BrowserSurface> {
        let Self { editor, _listeners } = self;
        drop(_listeners);
        editor.borrow_mut().detach()
    }
}

fn log_outcome(event: &str, outcome: &InputOutcome) {
    match outcome {
        InputOutcome::Rendered(report) => tracing::debug!(
            event,
            rendered = report.leaves_rendered,
            caret = ?report.caret,
            "surface re-rendered"
        ),
        other => tracing::trace!(event, ?other, "no render"),
    }
}
