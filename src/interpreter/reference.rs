//! References: resolved-or-unresolved binding handles
//!
//! A reference names a slot without reading it. Identifier lookups produce
//! references based on environment records, member accesses produce references
//! based on values; both are read and written through the same operations.

use crate::error::JsError;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::environment::EnvironmentRecord;
use crate::interpreter::object_ops;
use crate::value::{CheapClone, JsString, JsValue, PropertyKey};

#[derive(Debug, Clone)]
pub enum ReferenceBase {
    /// No environment binds the name
    Unresolvable,
    /// Property access on a value
    Value(JsValue),
    /// Variable binding in an environment record
    Environment(EnvironmentRecord),
}

#[derive(Debug, Clone)]
pub struct Reference {
    base: ReferenceBase,
    name: JsString,
    strict: bool,
}

impl Reference {
    pub fn environment(record: EnvironmentRecord, name: JsString, strict: bool) -> Self {
        Self {
            base: ReferenceBase::Environment(record),
            name,
            strict,
        }
    }

    pub fn property(base: JsValue, name: JsString, strict: bool) -> Self {
        Self {
            base: ReferenceBase::Value(base),
            name,
            strict,
        }
    }

    pub fn unresolvable(name: JsString, strict: bool) -> Self {
        Self {
            base: ReferenceBase::Unresolvable,
            name,
            strict,
        }
    }

    pub fn base(&self) -> &ReferenceBase {
        &self.base
    }

    pub fn referenced_name(&self) -> &JsString {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Value(_))
    }

    /// GetValue
    pub fn get_value(&self, ctx: &mut ExecutionContext) -> Result<JsValue, JsError> {
        match &self.base {
            ReferenceBase::Unresolvable => Err(JsError::reference_error(&self.name)),
            ReferenceBase::Value(JsValue::Object(obj)) => {
                object_ops::get(ctx, obj, &PropertyKey::from(&self.name))
            }
            ReferenceBase::Value(base) if base.is_null_or_undefined() => {
                Err(JsError::type_error(format!(
                    "Cannot read property '{}' of {}",
                    self.name,
                    base.to_js_string()
                )))
            }
            ReferenceBase::Value(base) => {
                let wrapper = object_ops::to_object(ctx, base)?;
                object_ops::get_with_receiver(
                    ctx,
                    &wrapper,
                    &PropertyKey::from(&self.name),
                    base.clone(),
                )
            }
            ReferenceBase::Environment(record) => {
                record.get_binding_value(ctx, &self.name, self.strict)
            }
        }
    }

    /// PutValue. An unresolvable name becomes a global property outside
    /// strict code.
    pub fn put_value(&self, ctx: &mut ExecutionContext, value: JsValue) -> Result<(), JsError> {
        match &self.base {
            ReferenceBase::Unresolvable => {
                if self.strict {
                    return Err(JsError::reference_error(&self.name));
                }
                let global = ctx.global_object().cheap_clone();
                object_ops::put(ctx, &global, PropertyKey::from(&self.name), value, false)
            }
            ReferenceBase::Value(JsValue::Object(obj)) => {
                object_ops::put(ctx, obj, PropertyKey::from(&self.name), value, self.strict)
            }
            ReferenceBase::Value(base) if base.is_null_or_undefined() => {
                Err(JsError::type_error(format!(
                    "Cannot set property '{}' of {}",
                    self.name,
                    base.to_js_string()
                )))
            }
            ReferenceBase::Value(base) => {
                // Writes to a primitive land on a throwaway wrapper
                let wrapper = object_ops::to_object(ctx, base)?;
                object_ops::put(ctx, &wrapper, PropertyKey::from(&self.name), value, self.strict)
            }
            ReferenceBase::Environment(record) => {
                record.set_mutable_binding(ctx, &self.name, value, self.strict)
            }
        }
    }

    /// The `delete` operator applied to this reference
    pub fn delete(&self, ctx: &mut ExecutionContext) -> Result<bool, JsError> {
        match &self.base {
            ReferenceBase::Unresolvable => {
                if self.strict {
                    return Err(JsError::syntax_error(format!(
                        "Delete of an unqualified identifier '{}' in strict mode",
                        self.name
                    )));
                }
                Ok(true)
            }
            ReferenceBase::Value(base) => {
                let obj = object_ops::to_object(ctx, base)?;
                object_ops::delete(&obj, &PropertyKey::from(&self.name), self.strict)
            }
            ReferenceBase::Environment(record) => {
                if self.strict {
                    return Err(JsError::syntax_error(format!(
                        "Delete of an unqualified identifier '{}' in strict mode",
                        self.name
                    )));
                }
                record.delete_binding(&self.name)
            }
        }
    }

    /// `this` for a call made through this reference
    pub fn this_value(&self) -> JsValue {
        match &self.base {
            ReferenceBase::Value(base) => base.clone(),
            ReferenceBase::Environment(record) => record.implicit_this_value(),
            ReferenceBase::Unresolvable => JsValue::Undefined,
        }
    }
}
