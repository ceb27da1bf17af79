//! Small helpers shared across modules: dev narration capture, checked integer conversion, JSON.
pub mod devlog;
pub mod json;
pub mod num;
