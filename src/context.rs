//! In-flight resolution stack.
//!
//! Each top-level `make`/`execute` call owns one [`ResolutionContext`] and
//! hands it by `&mut` to every nested resolution. A type is entered before
//! its constructor is reflected and left once it has been built; entering a
//! type that is already on the stack is a cycle.
//!
//! Failed resolutions are not unwound entry by entry: the error carries the
//! stack as it stood, and the context is discarded with the top-level call.
//! Callers that absorb a nested failure restore the depth they saved before
//! the attempt with [`ResolutionContext::truncate`].

use std::collections::HashSet;

use crate::error::InjectorError;

/// Normalized names of the types currently under construction, outermost
/// first.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    stack: Vec<String>,
    in_flight: HashSet<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `normalized` onto the stack.
    ///
    /// Fails with [`InjectorError::CyclicDependency`] if it is already being
    /// built; the error's chain is the stack before the repeat.
    pub fn enter(&mut self, normalized: &str) -> Result<(), InjectorError> {
        if !self.in_flight.insert(normalized.to_string()) {
            return Err(InjectorError::CyclicDependency {
                class: normalized.to_string(),
                chain: self.chain(),
            });
        }
        self.stack.push(normalized.to_string());
        Ok(())
    }

    /// Pops the innermost type.
    pub fn leave(&mut self) {
        if let Some(name) = self.stack.pop() {
            self.in_flight.remove(&name);
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drops every entry above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.leave();
        }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.in_flight.contains(normalized)
    }

    /// Copy of the stack, outermost first.
    pub fn chain(&self) -> Vec<String> {
        self.stack.clone()
    }
}
