//! The editable-surface capability.
//!
//! The synchronizer and editor never reach into a display toolkit directly.
//! Everything they need from the live surface (text, text leaves, caret,
//! structural replacement, notification suspension) goes through this
//! trait. The browser crate implements it over the DOM; [`HeadlessSurface`]
//! implements it in memory.
//!
//! [`HeadlessSurface`]: crate::headless::HeadlessSurface

use crate::error::SurfaceError;
use crate::render::Fragment;
use crate::types::CaretAnchor;

/// A live, user-editable text surface.
pub trait Surface {
    /// Handle to a node in the surface.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Make the surface user-editable (or not).
    fn set_editable(&mut self, editable: bool);

    /// Plain-text content of every text node, concatenated. Lengths and
    /// caret offsets are measured against this.
    fn text_content(&self) -> String;

    /// Text handed to the parser, with line breaks as `\n`.
    ///
    /// Surfaces that lay lines out as block elements differ from
    /// [`text_content`](Self::text_content) here.
    fn source_text(&self) -> String {
        self.text_content()
    }

    /// Replace the whole content with plain text. Caret moves to the end.
    fn set_text_content(&mut self, text: &str);

    /// Length of the flattened text content, in the surface's offset unit.
    fn text_len(&self) -> usize;

    /// Length of `text` in the surface's offset unit.
    ///
    /// Defaults to chars; DOM surfaces measure in UTF-16 code units.
    fn measure(&self, text: &str) -> usize {
        text.chars().count()
    }

    /// Every text node in document order.
    fn text_leaves(&self) -> Vec<Self::Node>;

    /// Text held by a text node.
    fn leaf_text(&self, leaf: &Self::Node) -> Option<String>;

    /// Tag names of the node's element ancestors, innermost first, stopping
    /// at the surface root.
    fn ancestor_tags(&self, node: &Self::Node) -> Vec<String>;

    /// Swap `leaf` for the nodes of `fragment` in one structural operation.
    fn replace_leaf(&mut self, leaf: &Self::Node, fragment: &Fragment) -> Result<(), SurfaceError>;

    /// Node and in-node offset of the current selection anchor, if any.
    fn selection_anchor(&self) -> Option<CaretAnchor<Self::Node>>;

    /// Absolute caret offset within the flattened text, if there is a caret.
    fn caret_offset(&self) -> Option<usize>;

    /// Place a collapsed caret at an absolute offset.
    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError>;

    /// Stop delivering input notifications until the next frame.
    ///
    /// Used around the synchronizer's own writes so they never trigger
    /// another pass; at most one pass is in flight at any time.
    fn suspend_notifications(&mut self);

    /// Whether input notifications are currently suspended.
    fn notifications_suspended(&self) -> bool;
}
