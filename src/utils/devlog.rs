//! Developer narration with a thread-local capture sink.
//!
//! The executor narrates each scan ("matched #3", "deleted #3") through [`devlog!`]. Messages go
//! to the global logger at TRACE under target `docexec::devlog`, and, when a test has enabled
//! the sink on its thread, into a buffer that test can assert on without racing other tests.

use std::cell::RefCell;

pub const TARGET: &str = "docexec::devlog";

thread_local! {
    // One buffer per active capture; innermost last.
    static CAPTURES: RefCell<Vec<Vec<String>>> = const { RefCell::new(Vec::new()) };
}

/// Ends the capture it was returned for. Messages it never drained are discarded.
#[must_use = "capture stops when the guard is dropped"]
pub struct DevSinkGuard {
    depth: usize,
}

impl Drop for DevSinkGuard {
    fn drop(&mut self) {
        CAPTURES.with(|c| c.borrow_mut().truncate(self.depth));
    }
}

/// Starts capturing `devlog!` output on this thread. Nested captures shadow outer ones until
/// their guard drops.
pub fn enable_thread_sink() -> DevSinkGuard {
    CAPTURES.with(|c| {
        let mut stack = c.borrow_mut();
        let depth = stack.len();
        stack.push(Vec::new());
        DevSinkGuard { depth }
    })
}

pub fn write_str(msg: &str) {
    CAPTURES.with(|c| {
        if let Some(top) = c.borrow_mut().last_mut() {
            top.push(msg.to_owned());
        }
    });
}

/// Takes what the innermost capture has collected so far.
pub fn drain() -> Vec<String> {
    CAPTURES.with(|c| c.borrow_mut().last_mut().map(std::mem::take).unwrap_or_default())
}

#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {{
        let __s = ::std::format!($($arg)*);
        $crate::utils::devlog::write_str(&__s);
        ::log::log!(target: $crate::utils::devlog::TARGET, ::log::Level::Trace, "{}", __s);
    }};
}
