//! Built-in objects the engine itself depends on
//!
//! Only the slice the execution engine calls into: the global object's value
//! properties, `Object` and `Function`, the error constructors, `eval` and the
//! strict-mode poison accessor.

use std::rc::Rc;

use crate::interpreter::realm::Realm;
use crate::value::{JsObjectRef, JsValue, Property};

pub mod error;
pub mod global;
pub mod object;

pub(crate) fn install(realm: &Rc<Realm>) {
    object::install(realm);
    error::install(realm);
    global::install(realm);
}

/// Define a global the way built-in constructors are defined: writable,
/// enumerable and configurable.
pub(crate) fn define_global(realm: &Realm, name: &str, value: JsValue) {
    realm
        .global_object()
        .borrow_mut()
        .define_property(realm.key(name), Property::data(value));
}

/// Hidden data property, as used for `prototype`/`constructor` links
pub(crate) fn define_hidden(realm: &Realm, obj: &JsObjectRef, name: &str, value: JsValue) {
    obj.borrow_mut().define_property(
        realm.key(name),
        Property::with_attributes(value, true, false, true),
    );
}

/// Argument at `index`, or `undefined`
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}
