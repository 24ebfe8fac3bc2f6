//! Prototype-chained objects.
//!
//! The same type serves as a plain record and as a lexical scope. The only
//! difference is [`Object::mutable_prototype_fields`]: when set, assigning a
//! name that an ancestor already holds rewrites the ancestor's slot, which is
//! how `x = 5;` in an inner block updates an outer variable.

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub struct Object {
    fields: HashMap<String, Value>,
    prototype: Option<ObjectRef>,
    mutable_prototype_fields: bool,
}

impl Object {
    pub fn mutable_prototype_fields(&self) -> bool {
        self.mutable_prototype_fields
    }
}

/// Shared handle to an [`Object`]. Clones alias.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Plain data object; assignments never write through to the prototype.
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self::with_policy(prototype, false)
    }

    /// Lexical scope whose prototype is the enclosing scope.
    pub fn scope(parent: Option<ObjectRef>) -> Self {
        Self::with_policy(parent, true)
    }

    fn with_policy(prototype: Option<ObjectRef>, mutable_prototype_fields: bool) -> Self {
        Self(Rc::new(RefCell::new(Object {
            fields: HashMap::new(),
            prototype,
            mutable_prototype_fields,
        })))
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    pub fn is_scope(&self) -> bool {
        self.0.borrow().mutable_prototype_fields()
    }

    pub fn try_get_no_prototype(&self, name: &str) -> Option<Value> {
        self.0.borrow().fields.get(name).cloned()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.borrow().fields.contains_key(name)
    }

    /// Look `name` up on this object, then along the prototype chain.
    pub fn try_get(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            let object = object.0.borrow();
            if let Some(value) = object.fields.get(name) {
                return Some(value.clone());
            }
            current = object.prototype.clone();
        }
        None
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.try_get(name)
            .ok_or_else(|| RuntimeError::new(format!("field '{name}' not found")))
    }

    pub fn set_no_prototype(&self, name: &str, value: Value) {
        self.0.borrow_mut().fields.insert(name.to_string(), value);
    }

    pub fn set(&self, name: &str, value: Value) {
        let mut object = self.0.borrow_mut();
        if let Some(slot) = object.fields.get_mut(name) {
            *slot = value;
            return;
        }

        if object.mutable_prototype_fields {
            let mut ancestor = object.prototype.clone();
            while let Some(current) = ancestor {
                let mut current = current.0.borrow_mut();
                if let Some(slot) = current.fields.get_mut(name) {
                    *slot = value;
                    return;
                }
                ancestor = current.prototype.clone();
            }
        }

        object.fields.insert(name.to_string(), value);
    }

    /// Own field names, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.0.borrow().fields.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => f
                .debug_struct("Object")
                .field("fields", &self.field_names())
                .field("has_prototype", &object.prototype.is_some())
                .field("scope", &object.mutable_prototype_fields)
                .finish(),
            Err(_) => f.write_str("Object(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: Option<Value>) -> f32 {
        match value {
            Some(Value::Number(n)) => n,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn lookup_walks_the_chain() {
        let root = ObjectRef::new(None);
        root.set("a", Value::Number(1.0));
        let child = ObjectRef::new(Some(root.clone()));
        assert_eq!(number(child.try_get("a")), 1.0);
        assert!(child.try_get_no_prototype("a").is_none());
        assert_eq!(child.get("b").unwrap_err().message, "field 'b' not found");
    }

    #[test]
    fn scope_assignment_rewrites_outer_slot() {
        let outer = ObjectRef::scope(None);
        outer.set_no_prototype("x", Value::Number(1.0));
        let inner = ObjectRef::scope(Some(outer.clone()));

        inner.set("x", Value::Number(5.0));

        assert_eq!(number(outer.try_get("x")), 5.0);
        assert!(!inner.has_own("x"));
    }

    #[test]
    fn record_assignment_shadows_prototype_field() {
        let proto = ObjectRef::new(None);
        proto.set("x", Value::Number(1.0));
        let record = ObjectRef::new(Some(proto.clone()));

        record.set("x", Value::Number(5.0));

        assert_eq!(number(proto.try_get("x")), 1.0);
        assert_eq!(number(record.try_get("x")), 5.0);
        assert!(record.has_own("x"));
    }

    #[test]
    fn scope_assignment_of_new_name_is_local() {
        let outer = ObjectRef::scope(None);
        let inner = ObjectRef::scope(Some(outer.clone()));
        inner.set("y", Value::Boolean(true));
        assert!(inner.has_own("y"));
        assert!(outer.try_get("y").is_none());
    }

    #[test]
    fn handles_alias() {
        let a = ObjectRef::new(None);
        let b = a.clone();
        b.set("k", Value::Unit);
        assert!(a.has_own("k"));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&ObjectRef::new(None)));
    }
}
