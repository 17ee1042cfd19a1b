//! Scoped variable environment for the MediScript evaluator.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A single frame of bindings.
struct Frame {
    bindings: BTreeMap<String, Value>,
    parent: Option<Scope>,
}

/// A shared handle to a frame and, through its parent links, to every
/// enclosing frame.
///
/// Variables are looked up from the innermost frame outward.
/// `define` always binds in the receiving frame. Cloning the handle shares
/// the frame, which is how closures keep their defining scope alive.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<Frame>>);

impl Scope {
    /// Create a new global frame.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Scope>) -> Self {
        Scope(Rc::new(RefCell::new(Frame {
            bindings: BTreeMap::new(),
            parent,
        })))
    }

    /// A fresh frame whose parent is this one.
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Bind (or rebind) `name` in this frame.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look up a variable, searching from this frame outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let frame = scope.0.borrow();
                if let Some(value) = frame.bindings.get(name) {
                    return Some(value.clone());
                }
                frame.parent.clone()
            };
            scope = parent?;
        }
    }

    /// Returns `true` if `name` is visible from this frame.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names bound directly in this frame, sorted.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().collect()
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }

    /// Returns `true` if both handles point at the same frame.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    // Frames can be reachable from their own bindings through closures, so
    // only this frame's names are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("names", &self.names())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}
