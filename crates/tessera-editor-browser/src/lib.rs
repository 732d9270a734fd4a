//! Browser DOM layer for the tessera inline markdown editor.
//!
//! This crate implements the core `Surface` capability over a
//! contenteditable element and wires DOM events to `MarkdownEditor`. It
//! assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `surface`: `BrowserSurface`, the contenteditable `Surface`
//! - `cursor`: Selection API handling and caret restoration
//! - `frame`: next-frame resumption of suspended notifications
//! - `events`: input, composition and history event wiring
//!
//! # Re-exports
//!
//! This crate re-exports `tessera-editor-core` for convenience, so consumers
//! only need to depend on `tessera-editor-browser`.

// Re-export core crate
pub use tessera_editor_core;
pub use tessera_editor_core::*;

pub mod cursor;
pub mod events;
pub mod frame;
pub mod surface;

pub use events::{BrowserEditor, HistoryInput, SharedEditor, parse_history_input};
pub use surface::BrowserSurface;
