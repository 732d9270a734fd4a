//! tessera-editor-core: inline markdown for a live editable surface.
//!
//! This crate provides:
//! - An inline tokenizer for `**bold**`, `*italic*` and `~~strike~~` that
//!   builds a spanned tree and degrades unterminated markers to text
//! - `MarkdownParser`, which keeps the last tree that carried formatting
//! - The `Surface` capability and a synchronizer that re-renders text
//!   leaves to `<b>`/`<i>`/`<s>` markup while keeping the caret in place
//! - `MarkdownEditor`, binding input and composition notifications to it
//! - `HeadlessSurface`, an in-memory surface for tests and tooling

pub mod ast;
pub mod config;
pub mod editor;
pub mod error;
pub mod headless;
pub mod history;
pub mod inline;
pub mod parser;
pub mod render;
pub mod surface;
pub mod sync;
pub mod types;

pub use ast::{Block, Document, Format, FormatKind, Inline, Paragraph, Span, Text};
pub use config::EditorConfig;
pub use editor::MarkdownEditor;
pub use error::{ConfigError, SurfaceError};
pub use headless::{HeadlessSurface, NodeId};
pub use history::SnapshotHistory;
pub use inline::parse_inline;
pub use parser::{MarkdownParser, parse_blocks};
pub use render::{Fragment, MarkupNode, escape_html, render_inline, render_leaf, render_markup};
pub use smol_str::SmolStr;
pub use surface::Surface;
pub use sync::{ambient_format, synchronize};
pub use types::{CaretAnchor, CompositionState, InputOutcome, SyncReport};
