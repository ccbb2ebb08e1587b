//! FIFO queue of declarations reached through references.
//!
//! The synthesizer drains it after the file scan, so declarations that are
//! only referenced still get a definition.

use crate::declaration::SchemaDecl;
use log::debug;
use std::collections::VecDeque;

/// Declarations discovered through references and not yet synthesized.
///
/// Entries are never deduplicated on the way in; the synthesizer decides
/// what to do with a declaration it has already seen when draining.
#[derive(Debug, Default)]
pub struct Worklist<'p> {
    queue: VecDeque<SchemaDecl<'p>>,
}

impl<'p> Worklist<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: SchemaDecl<'p>) {
        debug!("Queueing {} for synthesis", decl.name());
        self.queue.push_back(decl);
    }

    pub fn pop(&mut self) -> Option<SchemaDecl<'p>> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
