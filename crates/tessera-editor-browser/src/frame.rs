//! Deferred work on the next animation frame.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Clear `suspended` once the browser has painted the next frame.
///
/// Without a window the flag is cleared immediately.
pub fn resume_next_frame(suspended: Rc<Cell<bool>>) {
    let Some(window) = web_sys::window() else {
        suspended.set(false);
        return;
    };

    let flag = suspended.clone();
    let closure = Closure::once(move || {
        tracing::trace!("next frame, resuming notifications");
        flag.set(false);
    });

    if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        tracing::warn!("request_animation_frame failed: {:?}", e);
        suspended.set(false);
        return;
    }
    closure.forget();
}
