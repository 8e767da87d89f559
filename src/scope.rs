//! Parent-linked scope chain.
//!
//! Generalizes the teacher crate's `TypeScope` (a flat `Vec<Rc<RefCell<ScopeFrame>>>`
//! frame stack) into a proper parent-pointer chain: every frame points at the
//! frame it was opened in, rather than living in one shared stack. A frame's
//! own bindings (`get_current`/`set_current`) and its full walk-the-parents
//! view (`get`/`set`) are exposed separately, since object member scopes need
//! the former for nominal member resolution while still chaining to their
//! enclosing scope for everything else.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

struct ScopeInner<V> {
    bindings: HashMap<String, V>,
    parent: Option<Scope<V>>,
}

/// A mapping `name -> V` with an optional parent. Cloning a `Scope` clones the
/// handle, not the frame — all clones see the same bindings, the same way the
/// teacher's `Rc<RefCell<ScopeFrame>>` frames are shared.
pub struct Scope<V>(Rc<RefCell<ScopeInner<V>>>);

/// Alias used where a scope is standing in for a nominal object signature
/// rather than a lookup chain (`Type::Object`, `RuntimeValue::ObjectValue`).
pub type ScopeHandle<V> = Scope<V>;

impl<V> Clone for Scope<V> {
    fn clone(&self) -> Self {
        Scope(Rc::clone(&self.0))
    }
}

impl<V> PartialEq for Scope<V> {
    /// Two scopes are equal iff they are the same frame. Nominal object types
    /// compare by scope identity, not by structural member comparison.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V> Eq for Scope<V> {}

impl<V> Debug for Scope<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({:p})", Rc::as_ptr(&self.0))
    }
}

impl<V: Clone> Scope<V> {
    pub fn root() -> Self {
        Scope(Rc::new(RefCell::new(ScopeInner {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    /// A fresh, empty frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(RefCell::new(ScopeInner {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Defines `name` in the current frame only. Errors on a duplicate
    /// definition within that same frame.
    pub fn define(&self, name: impl Into<String>, value: V) -> Result<(), String> {
        let name = name.into();
        let mut inner = self.0.borrow_mut();
        if inner.bindings.contains_key(&name) {
            return Err(format!("'{name}' is already defined in this scope"));
        }
        inner.bindings.insert(name, value);
        Ok(())
    }

    /// Looks up `name`, walking parent frames.
    pub fn get(&self, name: &str) -> Option<V> {
        let inner = self.0.borrow();
        if let Some(value) = inner.bindings.get(name) {
            return Some(value.clone());
        }
        let parent = inner.parent.clone();
        drop(inner);
        parent.and_then(|parent| parent.get(name))
    }

    /// Looks up `name` in the current frame only, ignoring parents.
    pub fn get_current(&self, name: &str) -> Option<V> {
        self.0.borrow().bindings.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains_current(&self, name: &str) -> bool {
        self.get_current(name).is_some()
    }

    /// Updates `name` in the nearest enclosing frame that defines it. Errors
    /// if no frame in the chain defines it.
    pub fn set(&self, name: &str, value: V) -> Result<(), String> {
        let mut inner = self.0.borrow_mut();
        if inner.bindings.contains_key(name) {
            inner.bindings.insert(name.to_string(), value);
            return Ok(());
        }
        let parent = inner.parent.clone();
        drop(inner);
        match parent {
            Some(parent) => parent.set(name, value),
            None => Err(format!("'{name}' is not defined")),
        }
    }

    /// Updates `name` in the current frame only. Errors if this frame doesn't
    /// define it, even if an enclosing frame does.
    pub fn set_current(&self, name: &str, value: V) -> Result<(), String> {
        let mut inner = self.0.borrow_mut();
        if inner.bindings.contains_key(name) {
            inner.bindings.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(format!("'{name}' is not defined in this scope"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get_in_same_frame() {
        let scope = Scope::root();
        scope.define("x", 1).unwrap();
        assert_eq!(scope.get("x"), Some(1));
    }

    #[test]
    fn duplicate_define_in_same_frame_errors() {
        let scope = Scope::root();
        scope.define("x", 1).unwrap();
        assert!(scope.define("x", 2).is_err());
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Scope::root();
        parent.define("x", 1).unwrap();
        let child = parent.child();
        assert_eq!(child.get("x"), Some(1));
    }

    #[test]
    fn child_can_shadow_without_affecting_parent() {
        let parent = Scope::root();
        parent.define("x", 1).unwrap();
        let child = parent.child();
        child.define("x", 2).unwrap();
        assert_eq!(child.get("x"), Some(2));
        assert_eq!(parent.get("x"), Some(1));
    }

    #[test]
    fn set_updates_nearest_enclosing_frame() {
        let parent = Scope::root();
        parent.define("x", 1).unwrap();
        let child = parent.child();
        child.set("x", 9).unwrap();
        assert_eq!(parent.get("x"), Some(9));
        assert_eq!(child.get_current("x"), None);
    }

    #[test]
    fn set_on_undefined_name_errors() {
        let scope = Scope::root();
        assert!(scope.set("missing", 1).is_err());
    }

    #[test]
    fn set_current_ignores_enclosing_frames() {
        let parent = Scope::root();
        parent.define("x", 1).unwrap();
        let child = parent.child();
        assert!(child.set_current("x", 9).is_err());
        assert_eq!(parent.get("x"), Some(1));
    }

    #[test]
    fn set_current_updates_own_frame() {
        let scope = Scope::root();
        scope.define("x", 1).unwrap();
        scope.set_current("x", 2).unwrap();
        assert_eq!(scope.get_current("x"), Some(2));
    }

    #[test]
    fn current_only_lookup_ignores_parent() {
        let parent = Scope::root();
        parent.define("x", 1).unwrap();
        let child = parent.child();
        assert!(!child.contains_current("x"));
        assert!(child.contains("x"));
    }

    #[test]
    fn parentless_root_is_a_closed_scope() {
        let object_scope: Scope<i32> = Scope::root();
        object_scope.define("field", 1).unwrap();
        assert!(!object_scope.contains("nonexistent"));
    }

    #[test]
    fn clones_share_the_same_frame() {
        let scope = Scope::root();
        let clone = scope.clone();
        scope.define("x", 1).unwrap();
        assert_eq!(clone.get("x"), Some(1));
        assert_eq!(scope, clone);
    }
}
