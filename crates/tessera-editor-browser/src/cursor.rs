//! Caret handling over the DOM Selection API.
//!
//! Absolute offsets are UTF-16 code units into the editor element's
//! flattened text, which is what `Range::toString().length` reports.

use tessera_editor_core::{CaretAnchor, SurfaceError};
use wasm_bindgen::JsValue;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

pub(crate) fn js_err(context: &str, e: JsValue) -> SurfaceError {
    SurfaceError::Host(format!("{context} failed: {e:?}"))
}

/// Every text node under `container`, in document order.
pub fn text_nodes(container: &web_sys::Node) -> Result<Vec<web_sys::Node>, SurfaceError> {
    let document = container.owner_document().ok_or("no document")?;
    let walker = document
        .create_tree_walker_with_what_to_show(container, SHOW_TEXT)
        .map_err(|e| js_err("create_tree_walker", e))?;

    let mut nodes = Vec::new();
    while let Ok(Some(node)) = walker.next_node() {
        nodes.push(node);
    }
    Ok(nodes)
}

/// Find the text node holding a UTF-16 offset within `container`.
///
/// An offset on a node boundary resolves to the end of the earlier node.
pub fn find_text_node_at_offset(
    container: &web_sys::Node,
    target_utf16_offset: usize,
) -> Result<(web_sys::Node, usize), SurfaceError> {
    let mut accumulated_utf16 = 0;

    for node in text_nodes(container)? {
        let text_len = node
            .text_content()
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0);

        if accumulated_utf16 + text_len >= target_utf16_offset {
            return Ok((node, target_utf16_offset - accumulated_utf16));
        }
        accumulated_utf16 += text_len;
    }

    Err(SurfaceError::CaretOutOfRange {
        offset: target_utf16_offset,
        len: accumulated_utf16,
    })
}

fn selection() -> Option<web_sys::Selection> {
    web_sys::window()?.get_selection().ok().flatten()
}

/// Selection anchor, if it lies inside `container`.
pub fn selection_anchor(container: &web_sys::Node) -> Option<CaretAnchor<web_sys::Node>> {
    let selection = selection()?;
    let node = selection.anchor_node()?;
    if !container.contains(Some(&node)) {
        return None;
    }
    Some(CaretAnchor::new(node, selection.anchor_offset() as usize))
}

/// Absolute UTF-16 offset of the selection anchor within `container`.
pub fn caret_offset(container: &web_sys::Node) -> Option<usize> {
    let anchor = selection_anchor(container)?;
    let document = container.owner_document()?;

    let range = document.create_range().ok()?;
    range.select_node_contents(container).ok()?;
    range.set_end(&anchor.node, anchor.offset as u32).ok()?;

    let preceding: js_sys::JsString = range.to_string();
    Some(preceding.length() as usize)
}

/// Place a collapsed caret at an absolute UTF-16 offset within `container`.
pub fn restore_caret(container: &web_sys::Node, offset: usize) -> Result<(), SurfaceError> {
    let document = container.owner_document().ok_or("no document")?;
    let selection = selection().ok_or("no selection object")?;
    let range = document
        .create_range()
        .map_err(|e| js_err("create_range", e))?;

    match find_text_node_at_offset(container, offset) {
        Ok((text_node, node_offset)) => {
            tracing::trace!(
                target: "tessera::cursor",
                offset,
                node_offset,
                "restoring caret"
            );
            range
                .set_start(&text_node, node_offset as u32)
                .map_err(|e| js_err("set_start", e))?;
        }
        // No text at all: park the caret inside the empty container.
        Err(SurfaceError::CaretOutOfRange { len: 0, .. }) if offset == 0 => {
            range
                .set_start(container, 0)
                .map_err(|e| js_err("set_start", e))?;
        }
        Err(e) => return Err(e),
    }

    range.collapse_with_to_start(true);
    selection
        .remove_all_ranges()
        .map_err(|e| js_err("remove_all_ranges", e))?;
    selection
        .add_range(&range)
        .map_err(|e| js_err("add_range", e))?;
    Ok(())
}
