//! Namespace stack tracking.

use crate::events::{ParseEvent, ParseObserver};
use crate::model::NamespaceEntry;

/// Stack of the namespaces currently in scope.
///
/// Scope pushes and pops adjust a local depth counter; every pop removes the
/// entries whose stored depth has fallen out of scope. The enum and class
/// drivers each embed one of these and snapshot it when a declaration opens.
#[derive(Debug, Default)]
pub struct NamespaceTracker {
    scope_depth: u32,
    stack: Vec<NamespaceEntry>,
}

impl NamespaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active namespace names, outermost first.
    pub fn names(&self) -> Vec<String> {
        self.stack.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn entries(&self) -> &[NamespaceEntry] {
        &self.stack
    }

    pub fn depth(&self) -> u32 {
        self.scope_depth
    }

    pub fn clear(&mut self) {
        self.scope_depth = 0;
        self.stack.clear();
    }

    /// Feed one parse event through the tracker.
    pub fn observe(&mut self, event: &ParseEvent<'_>) {
        match event {
            ParseEvent::ScopePush => self.scope_depth += 1,
            ParseEvent::ScopePop => {
                self.scope_depth = self.scope_depth.saturating_sub(1);
                self.close_dead_namespaces();
            }
            ParseEvent::NamespacePush { name, depth } => {
                // The namespace's brace has not been scope-pushed yet at
                // event time, so the entry is owned by depth + 1.
                self.stack.push(NamespaceEntry {
                    name: (*name).to_string(),
                    scope_depth: depth + 1,
                });
            }
            _ => {}
        }
    }

    fn close_dead_namespaces(&mut self) {
        while self
            .stack
            .last()
            .is_some_and(|entry| entry.scope_depth > self.scope_depth)
        {
            self.stack.pop();
        }
    }
}

impl ParseObserver for NamespaceTracker {
    fn on_event(&mut self, event: &ParseEvent<'_>) {
        self.observe(event);
    }
}
