// src/watcher/change.rs
use crate::backends::BackendDescriptor;

/// Exact sequence comparison: length, order and every field, backup flag included.
pub fn has_changed(previous: &[BackendDescriptor], current: &[BackendDescriptor]) -> bool {
    previous != current
}
