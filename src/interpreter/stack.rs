//! Active-context stack
//!
//! Every `execute`, `call`, `construct` and `eval` pushes the frame of the
//! context it creates and pops it when that context is left, whichever way it
//! is left. The stack belongs to one runtime, so it is task-local: runtimes on
//! different threads never share it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{JsError, StackElement};

/// Frame shared between a context and the stack. The context moves the line
/// number as it executes; stack walks observe the current position.
pub type SharedFrame = Rc<RefCell<StackElement>>;

#[derive(Debug, Default)]
pub struct ContextStack {
    frames: RefCell<Vec<SharedFrame>>,
    max_depth: usize,
}

impl ContextStack {
    /// `max_depth` of 0 means unbounded
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
            max_depth,
        }
    }

    /// Push a frame. The frame is popped when the returned entry is dropped.
    pub fn enter(&self, frame: &SharedFrame) -> Result<ContextEntry<'_>, JsError> {
        let mut frames = self.frames.borrow_mut();
        if self.max_depth > 0 && frames.len() >= self.max_depth {
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }
        log::trace!(
            "enter context {} (depth {})",
            frame.borrow().debug_context,
            frames.len() + 1
        );
        frames.push(Rc::clone(frame));
        Ok(ContextEntry { stack: self })
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Snapshot of the active frames, innermost first
    pub fn elements(&self) -> Vec<StackElement> {
        self.frames
            .borrow()
            .iter()
            .rev()
            .map(|frame| frame.borrow().clone())
            .collect()
    }

    fn leave(&self) {
        if let Some(frame) = self.frames.borrow_mut().pop() {
            log::trace!("leave context {}", frame.borrow().debug_context);
        }
    }
}

/// Scoped membership of a frame in the stack
#[must_use = "the frame is popped as soon as the entry is dropped"]
pub struct ContextEntry<'a> {
    stack: &'a ContextStack,
}

impl Drop for ContextEntry<'_> {
    fn drop(&mut self) {
        self.stack.leave();
    }
}
