//! Surface synchronization.
//!
//! Walks the surface's text leaves, re-tokenizes each one on its own and
//! swaps it for rendered markup, then puts the caret back at the same text
//! position, shifted by however much the text length changed.

use crate::ast::FormatKind;
use crate::config::EditorConfig;
use crate::render::render_leaf;
use crate::surface::Surface;
use crate::types::SyncReport;

/// Innermost formatting tag enclosing `leaf`, if any.
pub fn ambient_format<S: Surface>(surface: &S, leaf: &S::Node) -> Option<FormatKind> {
    surface
        .ancestor_tags(leaf)
        .iter()
        .find_map(|tag| FormatKind::from_tag(tag))
}

/// Run one synchronization pass over `surface`.
///
/// Per-leaf failures are logged and leave that leaf untouched. A missing
/// caret skips caret restoration.
pub fn synchronize<S: Surface>(surface: &mut S, config: &EditorConfig) -> SyncReport {
    let mut report = SyncReport::default();

    let anchor = surface.selection_anchor();
    let caret = surface.caret_offset();
    let original_len = surface.text_len();

    for leaf in surface.text_leaves() {
        let Some(text) = surface.leaf_text(&leaf) else {
            continue;
        };
        if text.is_empty() || (config.skip_blank_leaves && text.trim().is_empty()) {
            report.leaves_skipped += 1;
            continue;
        }

        let ambient = ambient_format(surface, &leaf);
        let mut fragment = render_leaf(&text, ambient, config.wrap_ambient);

        let caret_at_leaf_end = anchor
            .as_ref()
            .is_some_and(|a| a.node == leaf && a.offset == surface.measure(&text));
        if caret_at_leaf_end {
            fragment.push_text(config.caret_placeholder.to_string());
            report.placeholder_inserted = true;
        }

        tracing::trace!(?leaf, ?ambient, markup = %fragment, "rendering leaf");
        match surface.replace_leaf(&leaf, &fragment) {
            Ok(()) => report.leaves_rendered += 1,
            Err(e) => {
                tracing::warn!(?leaf, "failed to replace text leaf: {e}");
                report.leaves_failed += 1;
            }
        }
    }

    let new_len = surface.text_len();
    report.length_delta = new_len as isize - original_len as isize;

    match (caret, anchor) {
        (Some(offset), Some(_)) => {
            let restored = offset
                .saturating_add_signed(report.length_delta)
                .min(new_len);
            match surface.set_caret_offset(restored) {
                Ok(()) => report.caret = Some(restored),
                Err(e) => tracing::warn!(offset = restored, "failed to restore caret: {e}"),
            }
        }
        _ => tracing::debug!("no caret captured, skipping restoration"),
    }

    tracing::debug!(
        rendered = report.leaves_rendered,
        skipped = report.leaves_skipped,
        failed = report.leaves_failed,
        delta = report.length_delta,
        caret = ?report.caret,
        "synchronized surface"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;
    use crate::render::Fragment;

    fn config() -> EditorConfig {
        EditorConfig::default()
    }

    #[test]
    fn test_caret_lands_after_rendered_emphasis() {
        let mut surface = HeadlessSurface::with_text("hello world*emph*");
        assert_eq!(surface.caret_offset(), Some(17));

        let report = synchronize(&mut surface, &config());

        assert_eq!(surface.markup(), "hello world<i>emph</i>\u{200B}");
        assert_eq!(surface.text_content(), "hello worldemph\u{200B}");
        assert_eq!(report.length_delta, -1);
        assert!(report.placeholder_inserted);
        assert_eq!(report.caret, Some(16));
        assert_eq!(surface.caret_offset(), Some(16));
    }

    #[test]
    fn test_caret_mid_leaf_gets_no_placeholder() {
        let mut surface = HeadlessSurface::with_text("**a** tail");
        surface.set_caret_offset(7).unwrap();

        let report = synchronize(&mut surface, &config());

        assert_eq!(surface.markup(), "<b>a</b> tail");
        assert!(!report.placeholder_inserted);
        // Four marker chars removed before the caret position.
        assert_eq!(surface.caret_offset(), Some(3));
    }

    #[test]
    fn test_self_wrap_elision_inside_bold() {
        let mut fragment = Fragment::new();
        let mut inner = Fragment::new();
        inner.push_text("**x**");
        fragment.push_element(FormatKind::Bold, inner);
        let mut surface = HeadlessSurface::with_fragment(&fragment);

        synchronize(&mut surface, &config());
        assert_eq!(surface.markup(), "<b><b>x</b>\u{200B}</b>");
    }

    #[test]
    fn test_escaping_leaf() {
        let mut surface = HeadlessSurface::with_text("<a&b>");
        surface.set_caret_offset(0).unwrap();
        let report = synchronize(&mut surface, &config());
        assert_eq!(surface.markup(), "&lt;a&amp;b&gt;");
        assert_eq!(surface.text_content(), "<a&b>");
        assert_eq!(report.length_delta, 0);
    }

    #[test]
    fn test_blank_leaves_untouched() {
        let mut fragment = Fragment::new();
        fragment.push_text("  ");
        let mut inner = Fragment::new();
        inner.push_text("*y*");
        fragment.push_element(FormatKind::Strikethrough, inner);
        let mut surface = HeadlessSurface::with_fragment(&fragment);
        surface.set_caret_offset(0).unwrap();

        let blank = surface.text_leaves()[0];
        let report = synchronize(&mut surface, &config());

        assert_eq!(report.leaves_skipped, 1);
        assert_eq!(report.leaves_rendered, 1);
        assert_eq!(surface.text_leaves()[0], blank);
        assert_eq!(surface.markup(), "  <s><s><i>y</i></s></s>");
    }

    #[test]
    fn test_no_caret_skips_restoration() {
        let mut surface = HeadlessSurface::with_text("~~x~~");
        surface.clear_caret();

        let report = synchronize(&mut surface, &config());
        assert_eq!(surface.markup(), "<s>x</s>");
        assert!(!report.placeholder_inserted);
        assert_eq!(report.caret, None);
        assert_eq!(surface.caret_offset(), None);
    }

    #[test]
    fn test_unwrapped_ambient() {
        let mut fragment = Fragment::new();
        let mut inner = Fragment::new();
        inner.push_text("a *b*");
        fragment.push_element(FormatKind::Bold, inner);
        let mut surface = HeadlessSurface::with_fragment(&fragment);
        surface.set_caret_offset(0).unwrap();

        let config = EditorConfig {
            wrap_ambient: false,
            ..Default::default()
        };
        synchronize(&mut surface, &config);
        assert_eq!(surface.markup(), "<b>a <i>b</i></b>");
    }
}
