//! Environment records and lexical environments
//!
//! A lexical environment is a node in a singly-linked chain: an environment
//! record plus the outer environment. Chains are shared by every closure that
//! captured them, so nodes are reference counted and only ever grow at the head.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::JsError;
use crate::gc::HeapRef;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::object_ops;
use crate::interpreter::reference::Reference;
use crate::value::{CheapClone, JsObjectRef, JsString, JsValue, PropertyDescriptor, PropertyKey};

/// Variable binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: JsValue,
    pub mutable: bool,
    /// False for an immutable binding created but not yet initialized
    pub initialized: bool,
    /// Bindings introduced by eval code can be deleted
    pub deletable: bool,
}

/// Declarative record: bindings in declaration order
#[derive(Debug, Default)]
pub struct DeclarativeRecord {
    bindings: IndexMap<JsString, Binding, FxBuildHasher>,
}

impl DeclarativeRecord {
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> Vec<JsString> {
        self.bindings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Object record: bindings are the properties of a host object
#[derive(Debug)]
pub struct ObjectRecord {
    object: JsObjectRef,
    /// Only `with` scopes supply their object as `this`
    provide_this: bool,
    global: bool,
}

impl ObjectRecord {
    pub fn binding_object(&self) -> &JsObjectRef {
        &self.object
    }

    pub fn provide_this(&self) -> bool {
        self.provide_this
    }
}

/// A scope's variable-binding table
#[derive(Debug, Clone)]
pub enum EnvironmentRecord {
    Declarative(Rc<RefCell<DeclarativeRecord>>),
    Object(Rc<ObjectRecord>),
}

impl CheapClone for EnvironmentRecord {}

impl EnvironmentRecord {
    pub fn new_declarative() -> Self {
        EnvironmentRecord::Declarative(Rc::new(RefCell::new(DeclarativeRecord::default())))
    }

    pub fn new_object(object: JsObjectRef, provide_this: bool) -> Self {
        EnvironmentRecord::Object(Rc::new(ObjectRecord {
            object,
            provide_this,
            global: false,
        }))
    }

    fn new_global(global: JsObjectRef) -> Self {
        EnvironmentRecord::Object(Rc::new(ObjectRecord {
            object: global,
            provide_this: false,
            global: true,
        }))
    }

    /// True for the object record wrapping the global object
    pub fn is_global(&self) -> bool {
        matches!(self, EnvironmentRecord::Object(rec) if rec.global)
    }

    /// The backing object of an object record
    pub fn binding_object(&self) -> Option<&JsObjectRef> {
        match self {
            EnvironmentRecord::Declarative(_) => None,
            EnvironmentRecord::Object(rec) => Some(&rec.object),
        }
    }

    pub fn ptr_eq(&self, other: &EnvironmentRecord) -> bool {
        match (self, other) {
            (EnvironmentRecord::Declarative(a), EnvironmentRecord::Declarative(b)) => {
                Rc::ptr_eq(a, b)
            }
            (EnvironmentRecord::Object(a), EnvironmentRecord::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn addr(&self) -> usize {
        match self {
            EnvironmentRecord::Declarative(rec) => Rc::as_ptr(rec) as *const () as usize,
            EnvironmentRecord::Object(rec) => Rc::as_ptr(rec) as *const () as usize,
        }
    }

    pub(crate) fn strong_count(&self) -> usize {
        match self {
            EnvironmentRecord::Declarative(rec) => Rc::strong_count(rec),
            EnvironmentRecord::Object(rec) => Rc::strong_count(rec),
        }
    }

    /// Report held values to the collector; false if the record is being written
    pub(crate) fn trace_edges(&self, visitor: &mut dyn FnMut(HeapRef)) -> bool {
        match self {
            EnvironmentRecord::Declarative(rec) => match rec.try_borrow() {
                Ok(rec) => {
                    for binding in rec.bindings.values() {
                        if let JsValue::Object(obj) = &binding.value {
                            visitor(HeapRef::Object(obj.cheap_clone()));
                        }
                    }
                    true
                }
                Err(_) => false,
            },
            EnvironmentRecord::Object(rec) => {
                visitor(HeapRef::Object(rec.object.cheap_clone()));
                true
            }
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        match self {
            EnvironmentRecord::Declarative(rec) => rec.borrow().bindings.contains_key(name),
            EnvironmentRecord::Object(rec) => {
                object_ops::has_property(&rec.object, &PropertyKey::from(name))
            }
        }
    }

    pub fn create_mutable_binding(
        &self,
        ctx: &mut ExecutionContext,
        name: &JsString,
        deletable: bool,
    ) -> Result<(), JsError> {
        match self {
            EnvironmentRecord::Declarative(rec) => {
                rec.borrow_mut().bindings.insert(
                    name.cheap_clone(),
                    Binding {
                        value: JsValue::Undefined,
                        mutable: true,
                        initialized: true,
                        deletable,
                    },
                );
                Ok(())
            }
            EnvironmentRecord::Object(rec) => {
                let desc = PropertyDescriptor::data(JsValue::Undefined, true, true, deletable);
                let key = PropertyKey::from(name);
                object_ops::define_own_property(ctx, &rec.object, key, desc, true).map(|_| ())
            }
        }
    }

    /// Only declarative records hold immutable bindings.
    pub fn create_immutable_binding(&self, name: &JsString) -> Result<(), JsError> {
        match self {
            EnvironmentRecord::Declarative(rec) => {
                rec.borrow_mut().bindings.insert(
                    name.cheap_clone(),
                    Binding {
                        value: JsValue::Undefined,
                        mutable: false,
                        initialized: false,
                        deletable: false,
                    },
                );
                Ok(())
            }
            EnvironmentRecord::Object(_) => Err(JsError::internal_error(format!(
                "object environment cannot hold immutable binding '{}'",
                name
            ))),
        }
    }

    pub fn initialize_immutable_binding(&self, name: &str, value: JsValue) -> Result<(), JsError> {
        let EnvironmentRecord::Declarative(rec) = self else {
            return Err(JsError::internal_error(format!(
                "object environment cannot hold immutable binding '{}'",
                name
            )));
        };
        let mut rec = rec.borrow_mut();
        match rec.bindings.get_mut(name) {
            Some(binding) if !binding.mutable && !binding.initialized => {
                binding.value = value;
                binding.initialized = true;
                Ok(())
            }
            _ => Err(JsError::internal_error(format!(
                "'{}' is not an uninitialized immutable binding",
                name
            ))),
        }
    }

    pub fn set_mutable_binding(
        &self,
        ctx: &mut ExecutionContext,
        name: &JsString,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JsError> {
        match self {
            EnvironmentRecord::Declarative(rec) => {
                let mut rec = rec.borrow_mut();
                let Some(binding) = rec.bindings.get_mut(name.as_str()) else {
                    return Err(JsError::reference_error(name));
                };
                if binding.mutable {
                    binding.value = value;
                } else if strict {
                    return Err(JsError::type_error(format!(
                        "Assignment to constant variable '{}'",
                        name
                    )));
                }
                Ok(())
            }
            EnvironmentRecord::Object(rec) => {
                object_ops::put(ctx, &rec.object, PropertyKey::from(name), value, strict)
            }
        }
    }

    /// Create the binding if it is absent, then set it. Later parameters with a
    /// repeated name overwrite earlier ones.
    pub fn assign_mutable_binding(
        &self,
        ctx: &mut ExecutionContext,
        name: &JsString,
        value: JsValue,
        deletable: bool,
        strict: bool,
    ) -> Result<(), JsError> {
        if !self.has_binding(name) {
            self.create_mutable_binding(ctx, name, deletable)?;
        }
        self.set_mutable_binding(ctx, name, value, strict)
    }

    pub fn get_binding_value(
        &self,
        ctx: &mut ExecutionContext,
        name: &JsString,
        strict: bool,
    ) -> Result<JsValue, JsError> {
        match self {
            EnvironmentRecord::Declarative(rec) => {
                let rec = rec.borrow();
                let Some(binding) = rec.bindings.get(name.as_str()) else {
                    return Err(JsError::reference_error(name));
                };
                if !binding.initialized {
                    if strict {
                        return Err(JsError::reference_error_with_message(format!(
                            "Cannot access '{}' before initialization",
                            name
                        )));
                    }
                    return Ok(JsValue::Undefined);
                }
                Ok(binding.value.clone())
            }
            EnvironmentRecord::Object(rec) => {
                let key = PropertyKey::from(name);
                if !object_ops::has_property(&rec.object, &key) {
                    if strict {
                        return Err(JsError::reference_error(name));
                    }
                    return Ok(JsValue::Undefined);
                }
                object_ops::get(ctx, &rec.object, &key)
            }
        }
    }

    /// Returns false when the binding exists but cannot be deleted.
    pub fn delete_binding(&self, name: &str) -> Result<bool, JsError> {
        match self {
            EnvironmentRecord::Declarative(rec) => {
                let mut rec = rec.borrow_mut();
                match rec.bindings.get(name) {
                    None => Ok(true),
                    Some(binding) if !binding.deletable => Ok(false),
                    Some(_) => {
                        rec.bindings.shift_remove(name);
                        Ok(true)
                    }
                }
            }
            EnvironmentRecord::Object(rec) => {
                object_ops::delete(&rec.object, &PropertyKey::from(name), false)
            }
        }
    }

    /// `this` supplied for calls through a binding of this record
    pub fn implicit_this_value(&self) -> JsValue {
        match self {
            EnvironmentRecord::Object(rec) if rec.provide_this => {
                JsValue::Object(rec.object.cheap_clone())
            }
            _ => JsValue::Undefined,
        }
    }

    /// Names bound by a declarative record, in declaration order
    pub fn binding_names(&self) -> Vec<JsString> {
        match self {
            EnvironmentRecord::Declarative(rec) => rec.borrow().names(),
            EnvironmentRecord::Object(rec) => rec
                .object
                .borrow()
                .own_keys()
                .iter()
                .map(|k| k.to_js_string())
                .collect(),
        }
    }
}

#[derive(Debug)]
struct EnvNode {
    record: EnvironmentRecord,
    outer: Option<LexicalEnvironment>,
}

/// A link in the scope chain
#[derive(Debug, Clone)]
pub struct LexicalEnvironment(Rc<EnvNode>);

impl CheapClone for LexicalEnvironment {}

impl LexicalEnvironment {
    pub fn new_declarative_environment(outer: Option<&LexicalEnvironment>) -> Self {
        LexicalEnvironment(Rc::new(EnvNode {
            record: EnvironmentRecord::new_declarative(),
            outer: outer.map(|o| o.cheap_clone()),
        }))
    }

    pub fn new_object_environment(
        object: JsObjectRef,
        provide_this: bool,
        outer: Option<&LexicalEnvironment>,
    ) -> Self {
        LexicalEnvironment(Rc::new(EnvNode {
            record: EnvironmentRecord::new_object(object, provide_this),
            outer: outer.map(|o| o.cheap_clone()),
        }))
    }

    /// Outermost environment: an object record over the global object
    pub fn new_global_environment(global: JsObjectRef) -> Self {
        LexicalEnvironment(Rc::new(EnvNode {
            record: EnvironmentRecord::new_global(global),
            outer: None,
        }))
    }

    pub fn record(&self) -> &EnvironmentRecord {
        &self.0.record
    }

    pub fn outer(&self) -> Option<&LexicalEnvironment> {
        self.0.outer.as_ref()
    }

    pub fn ptr_eq(&self, other: &LexicalEnvironment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn trace_edges(&self, visitor: &mut dyn FnMut(HeapRef)) -> bool {
        visitor(HeapRef::Record(self.0.record.cheap_clone()));
        if let Some(outer) = &self.0.outer {
            visitor(HeapRef::Scope(outer.cheap_clone()));
        }
        true
    }

    /// Walk the chain outward for the first record binding `name`.
    pub fn get_identifier_reference(&self, name: &JsString, strict: bool) -> Reference {
        let mut current = Some(self);
        while let Some(env) = current {
            if env.record().has_binding(name) {
                return Reference::environment(
                    env.record().cheap_clone(),
                    name.cheap_clone(),
                    strict,
                );
            }
            current = env.outer();
        }
        Reference::unresolvable(name.cheap_clone(), strict)
    }

    /// Number of links from here to the outermost environment, inclusive
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Some(self);
        while let Some(env) = current {
            depth += 1;
            current = env.outer();
        }
        depth
    }
}
