//! Thread-local diagnostic tags (mapped diagnostic context)
//!
//! Each thread owns its own tag map. The map is *absent* until the first
//! `put` and becomes absent again after `clear`, which lets a captured
//! snapshot distinguish "no tags" from "an empty tag set".

use std::cell::RefCell;
use std::collections::HashMap;

/// Diagnostic tag map as captured and installed by context propagation
pub type TagMap = HashMap<String, String>;

thread_local! {
    static CONTEXT_MAP: RefCell<Option<TagMap>> = const { RefCell::new(None) };
}

/// Put a tag on the current thread
pub fn put(key: impl Into<String>, value: impl Into<String>) {
    CONTEXT_MAP.with(|map| {
        map.borrow_mut()
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    });
}

/// Read a tag from the current thread
pub fn get(key: &str) -> Option<String> {
    CONTEXT_MAP.with(|map| map.borrow().as_ref().and_then(|tags| tags.get(key).cloned()))
}

/// Remove a tag from the current thread, returning its previous value
pub fn remove(key: &str) -> Option<String> {
    CONTEXT_MAP.with(|map| map.borrow_mut().as_mut().and_then(|tags| tags.remove(key)))
}

/// Drop every tag on the current thread
pub fn clear() {
    CONTEXT_MAP.with(|map| {
        map.borrow_mut().take();
    });
}

/// Copy of the current thread's tags, `None` when no tags exist
pub fn copy_of_context_map() -> Option<TagMap> {
    CONTEXT_MAP.with(|map| map.borrow().clone())
}

/// Replace the current thread's tags. `None` leaves the thread without tags.
pub fn set_context_map(tags: Option<TagMap>) {
    CONTEXT_MAP.with(|map| {
        *map.borrow_mut() = tags;
    });
}
