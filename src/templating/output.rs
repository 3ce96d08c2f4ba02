//! Ambient output channel for template bodies.
//!
//! A body produces text by writing to an ambient channel rather than through an
//! explicit parameter. Rendering captures that channel for the duration of one
//! evaluation:
//!
//! - [`write`] (or the [`echo!`](crate::echo) macro) appends to the innermost
//!   active [`Capture`] on the current thread, or to stdout when nothing is
//!   capturing.
//! - Captures nest: a template rendered from inside another template's
//!   function gets its own level, and its text never reaches the outer level
//!   unless the caller writes it there.
//! - Capture buffers are thread-local, so concurrent renders on different
//!   threads never see each other's output.
//!
//! A [`Capture`] releases its level when it is dropped. Dropping without
//! calling [`Capture::finish`] discards whatever was written, which is how
//! failed renders guarantee that no partial output escapes.

use std::cell::RefCell;
use std::fmt;
use std::io::Write as _;
use std::marker::PhantomData;

thread_local! {
    static CAPTURE_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Append `text` to the active capture, or to stdout if none is active.
pub fn write(text: &str) {
    let captured = CAPTURE_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.last_mut() {
            Some(buffer) => {
                buffer.push_str(text);
                true
            }
            None => false,
        }
    });

    if !captured {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()) {
            tracing::warn!("Failed to write template output to stdout: {}", e);
        }
    }
}

/// Formatted variant of [`write`], used by [`echo!`](crate::echo).
pub fn write_fmt(args: fmt::Arguments<'_>) {
    match args.as_str() {
        Some(text) => write(text),
        None => write(&args.to_string()),
    }
}

/// Number of captures active on the current thread.
pub fn depth() -> usize {
    CAPTURE_STACK.with(|stack| stack.borrow().len())
}

/// A scoped capture of the ambient output channel.
///
/// Not `Send`: a capture belongs to the thread that began it.
#[must_use = "dropping a capture immediately discards everything written to it"]
pub struct Capture {
    level: usize,
    _not_send: PhantomData<*const ()>,
}

impl Capture {
    /// Start capturing output on the current thread.
    pub fn begin() -> Self {
        let level = CAPTURE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(String::new());
            stack.len()
        });
        tracing::trace!("Output capture started at level {}", level);
        Self {
            level,
            _not_send: PhantomData,
        }
    }

    /// Stop capturing and return everything written at this level.
    pub fn finish(self) -> String {
        let output = self.release();
        std::mem::forget(self);
        output
    }

    /// Text written so far, without ending the capture.
    pub fn peek(&self) -> String {
        CAPTURE_STACK
            .with(|stack| stack.borrow().get(self.level - 1).cloned())
            .unwrap_or_default()
    }

    fn release(&self) -> String {
        CAPTURE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() > self.level {
                // Inner captures still active; their owners were leaked.
                tracing::warn!(
                    "Discarding {} unreleased nested output capture(s)",
                    stack.len() - self.level
                );
                stack.truncate(self.level);
            }
            let output = if stack.len() == self.level {
                stack.pop().unwrap_or_default()
            } else {
                String::new()
            };
            tracing::trace!("Output capture at level {} released", self.level);
            output
        })
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        let discarded = self.release();
        if !discarded.is_empty() {
            tracing::debug!("Discarded {} bytes of captured output", discarded.len());
        }
    }
}

/// Write formatted text to the ambient output channel.
///
/// ```
/// use isotemplate::echo;
/// use isotemplate::templating::output::Capture;
///
/// let capture = Capture::begin();
/// echo!("Hello, {}!", "world");
/// assert_eq!(capture.finish(), "Hello, world!");
/// ```
#[macro_export]
macro_rules! echo {
    ($($arg:tt)*) => {
        $crate::templating::output::write_fmt(::std::format_args!($($arg)*))
    };
}
