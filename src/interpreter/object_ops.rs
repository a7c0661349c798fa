//! Object internal methods
//!
//! [[GetOwnProperty]], [[Get]], [[CanPut]], [[Put]], [[Delete]] and
//! [[DefineOwnProperty]] over the object model, including the arguments
//! object's parameter map. Accessors run through the execution context, so
//! no object is borrowed while user code executes.

use crate::error::JsError;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::environment::EnvironmentRecord;
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, Property,
    PropertyDescriptor, PropertyKey, PropertySlot,
};

/// Environment record and parameter name aliased by a mapped arguments index
fn mapped_binding(obj: &JsObjectRef, key: &PropertyKey) -> Option<(EnvironmentRecord, JsString)> {
    match &obj.borrow().exotic {
        ExoticObject::Arguments {
            parameter_map: Some(map),
        } => map
            .binding(key)
            .map(|name| (map.env.cheap_clone(), name.cheap_clone())),
        _ => None,
    }
}

fn unmap(obj: &JsObjectRef, key: &PropertyKey) {
    if let ExoticObject::Arguments {
        parameter_map: Some(map),
    } = &mut obj.borrow_mut().exotic
    {
        map.unmap(key);
    }
}

/// [[GetOwnProperty]]. Mapped arguments indices report the live parameter value.
pub fn get_own_property(
    ctx: &mut ExecutionContext,
    obj: &JsObjectRef,
    key: &PropertyKey,
) -> Result<Option<Property>, JsError> {
    let Some(mut prop) = obj.borrow().get_own_property(key).cloned() else {
        return Ok(None);
    };
    if let Some((env, name)) = mapped_binding(obj, key) {
        let live = env.get_binding_value(ctx, &name, false)?;
        if let PropertySlot::Data { value, .. } = &mut prop.slot {
            *value = live;
        }
    }
    Ok(Some(prop))
}

/// [[GetProperty]]: own property or the nearest inherited one
pub fn find_property(obj: &JsObjectRef, key: &PropertyKey) -> Option<Property> {
    let mut current = Some(obj.cheap_clone());
    while let Some(o) = current {
        let borrowed = o.borrow();
        if let Some(prop) = borrowed.get_own_property(key) {
            return Some(prop.clone());
        }
        current = borrowed.prototype.as_ref().map(|p| p.cheap_clone());
    }
    None
}

pub fn has_property(obj: &JsObjectRef, key: &PropertyKey) -> bool {
    find_property(obj, key).is_some()
}

/// [[Get]]
pub fn get(
    ctx: &mut ExecutionContext,
    obj: &JsObjectRef,
    key: &PropertyKey,
) -> Result<JsValue, JsError> {
    get_with_receiver(ctx, obj, key, JsValue::Object(obj.cheap_clone()))
}

/// [[Get]] with an explicit `this` for getters, used for primitive bases
pub fn get_with_receiver(
    ctx: &mut ExecutionContext,
    obj: &JsObjectRef,
    key: &PropertyKey,
    receiver: JsValue,
) -> Result<JsValue, JsError> {
    if let Some((env, name)) = mapped_binding(obj, key) {
        return env.get_binding_value(ctx, &name, false);
    }
    match find_property(obj, key).map(|p| p.slot) {
        None => Ok(JsValue::Undefined),
        Some(PropertySlot::Data { value, .. }) => Ok(value),
        Some(PropertySlot::Accessor { getter: Some(getter), .. }) => {
            ctx.call(None, &getter, receiver, &[])
        }
        Some(PropertySlot::Accessor { getter: None, .. }) => Ok(JsValue::Undefined),
    }
}

/// [[CanPut]]
pub fn can_put(obj: &JsObjectRef, key: &PropertyKey) -> bool {
    let (own, prototype, extensible) = {
        let o = obj.borrow();
        (
            o.get_own_property(key).cloned(),
            o.prototype.as_ref().map(|p| p.cheap_clone()),
            o.extensible,
        )
    };
    if let Some(prop) = own {
        return match prop.slot {
            PropertySlot::Accessor { setter, .. } => setter.is_some(),
            PropertySlot::Data { writable, .. } => writable,
        };
    }
    let Some(prototype) = prototype else {
        return extensible;
    };
    match find_property(&prototype, key).map(|p| p.slot) {
        None => extensible,
        Some(PropertySlot::Accessor { setter, .. }) => setter.is_some(),
        Some(PropertySlot::Data { writable, .. }) => extensible && writable,
    }
}

/// [[Put]]
pub fn put(
    ctx: &mut ExecutionContext,
    obj: &JsObjectRef,
    key: PropertyKey,
    value: JsValue,
    throw: bool,
) -> Result<(), JsError> {
    if !can_put(obj, &key) {
        if throw {
            return Err(JsError::type_error(format!(
                "Cannot assign to read only property '{}'",
                key
            )));
        }
        return Ok(());
    }

    let own_is_data = obj
        .borrow()
        .get_own_property(&key)
        .map(|p| !p.is_accessor());
    if own_is_data == Some(true) {
        define_own_property(ctx, obj, key, PropertyDescriptor::value_only(value), throw)?;
        return Ok(());
    }

    if let Some(PropertySlot::Accessor {
        setter: Some(setter),
        ..
    }) = find_property(obj, &key).map(|p| p.slot)
    {
        ctx.call(None, &setter, JsValue::Object(obj.cheap_clone()), &[value])?;
        return Ok(());
    }

    define_own_property(
        ctx,
        obj,
        key,
        PropertyDescriptor::data(value, true, true, true),
        throw,
    )?;
    Ok(())
}

/// [[Delete]]
pub fn delete(
    obj: &JsObjectRef,
    key: &PropertyKey,
    throw: bool,
) -> Result<bool, JsError> {
    let configurable = match obj.borrow().get_own_property(key) {
        None => return Ok(true),
        Some(prop) => prop.configurable,
    };
    if !configurable {
        if throw {
            return Err(JsError::type_error(format!(
                "Cannot delete property '{}'",
                key
            )));
        }
        return Ok(false);
    }
    obj.borrow_mut().remove_property(key);
    unmap(obj, key);
    Ok(true)
}

fn reject(throw: bool, key: &PropertyKey) -> Result<bool, JsError> {
    if throw {
        Err(JsError::type_error(format!(
            "Cannot redefine property: {}",
            key
        )))
    } else {
        Ok(false)
    }
}

fn same_object(a: &Option<JsObjectRef>, b: &Option<JsObjectRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// True when every field present in `desc` already holds in `current`
fn describes(current: &Property, desc: &PropertyDescriptor) -> bool {
    if desc.enumerable.is_some_and(|e| e != current.enumerable) {
        return false;
    }
    if desc.configurable.is_some_and(|c| c != current.configurable) {
        return false;
    }
    match &current.slot {
        PropertySlot::Data { value, writable } => {
            if desc.is_accessor_descriptor() {
                return false;
            }
            desc.writable.is_none_or(|w| w == *writable)
                && desc.value.as_ref().is_none_or(|v| v.same_value(value))
        }
        PropertySlot::Accessor { getter, setter } => {
            if desc.is_data_descriptor() {
                return false;
            }
            desc.getter.as_ref().is_none_or(|g| same_object(g, getter))
                && desc.setter.as_ref().is_none_or(|s| same_object(s, setter))
        }
    }
}

/// [[DefineOwnProperty]]
pub fn define_own_property(
    ctx: &mut ExecutionContext,
    obj: &JsObjectRef,
    key: PropertyKey,
    desc: PropertyDescriptor,
    throw: bool,
) -> Result<bool, JsError> {
    let Some((env, name)) = mapped_binding(obj, &key) else {
        return define_ordinary(obj, key, desc, throw);
    };

    if !define_ordinary(obj, key.clone(), desc.clone(), false)? {
        return reject(throw, &key);
    }
    if desc.is_accessor_descriptor() {
        unmap(obj, &key);
    } else {
        if let Some(value) = desc.value {
            env.set_mutable_binding(ctx, &name, value, throw)?;
        }
        if desc.writable == Some(false) {
            unmap(obj, &key);
        }
    }
    Ok(true)
}

fn define_ordinary(
    obj: &JsObjectRef,
    key: PropertyKey,
    desc: PropertyDescriptor,
    throw: bool,
) -> Result<bool, JsError> {
    let (current, extensible) = {
        let o = obj.borrow();
        (o.get_own_property(&key).cloned(), o.extensible)
    };

    let Some(current) = current else {
        if !extensible {
            return reject(throw, &key);
        }
        obj.borrow_mut().define_property(key, desc.to_property());
        return Ok(true);
    };

    if describes(&current, &desc) {
        return Ok(true);
    }

    if !current.configurable {
        if desc.configurable == Some(true) {
            return reject(throw, &key);
        }
        if desc.enumerable.is_some_and(|e| e != current.enumerable) {
            return reject(throw, &key);
        }
    }

    let mut updated = current.clone();
    if !desc.is_generic_descriptor() {
        match (&current.slot, desc.is_accessor_descriptor()) {
            (PropertySlot::Data { .. }, true) | (PropertySlot::Accessor { .. }, false) => {
                if !current.configurable {
                    return reject(throw, &key);
                }
                updated.slot = if desc.is_accessor_descriptor() {
                    PropertySlot::Accessor {
                        getter: None,
                        setter: None,
                    }
                } else {
                    PropertySlot::Data {
                        value: JsValue::Undefined,
                        writable: false,
                    }
                };
            }
            (PropertySlot::Data { value, writable }, false) => {
                if !current.configurable && !*writable {
                    if desc.writable == Some(true) {
                        return reject(throw, &key);
                    }
                    if desc.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                        return reject(throw, &key);
                    }
                }
            }
            (PropertySlot::Accessor { getter, setter }, true) => {
                if !current.configurable {
                    if desc.getter.as_ref().is_some_and(|g| !same_object(g, getter)) {
                        return reject(throw, &key);
                    }
                    if desc.setter.as_ref().is_some_and(|s| !same_object(s, setter)) {
                        return reject(throw, &key);
                    }
                }
            }
        }
    }

    match &mut updated.slot {
        PropertySlot::Data { value, writable } => {
            if let Some(v) = desc.value {
                *value = v;
            }
            if let Some(w) = desc.writable {
                *writable = w;
            }
        }
        PropertySlot::Accessor { getter, setter } => {
            if let Some(g) = desc.getter {
                *getter = g;
            }
            if let Some(s) = desc.setter {
                *setter = s;
            }
        }
    }
    if let Some(e) = desc.enumerable {
        updated.enumerable = e;
    }
    if let Some(c) = desc.configurable {
        updated.configurable = c;
    }
    obj.borrow_mut().define_property(key, updated);
    Ok(true)
}

/// ToObject
pub fn to_object(ctx: &mut ExecutionContext, value: &JsValue) -> Result<JsObjectRef, JsError> {
    match value {
        JsValue::Object(obj) => Ok(obj.cheap_clone()),
        JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
            "Cannot convert {} to object",
            value.to_js_string()
        ))),
        JsValue::String(s) => {
            let wrapper = new_wrapper(ctx, value.clone());
            let length = ctx.realm().key("length");
            wrapper.borrow_mut().define_property(
                length,
                Property::with_attributes(
                    JsValue::Number(s.as_str().encode_utf16().count() as f64),
                    false,
                    false,
                    false,
                ),
            );
            Ok(wrapper)
        }
        JsValue::Boolean(_) | JsValue::Number(_) => Ok(new_wrapper(ctx, value.clone())),
    }
}

fn new_wrapper(ctx: &ExecutionContext, value: JsValue) -> JsObjectRef {
    let realm = ctx.realm();
    let prototype = match &value {
        JsValue::String(_) => realm.prototype_for("String"),
        JsValue::Number(_) => realm.prototype_for("Number"),
        JsValue::Boolean(_) => realm.prototype_for("Boolean"),
        _ => None,
    }
    .unwrap_or_else(|| realm.object_prototype().cheap_clone());
    realm.alloc(JsObject::with_exotic(
        Some(prototype),
        ExoticObject::Primitive(value),
    ))
}
