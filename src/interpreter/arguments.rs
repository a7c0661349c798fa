//! Arguments object synthesis

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::JsError;
use crate::interpreter::context::ExecutionContext;
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, ParameterMap, Property,
    PropertyKey,
};

/// Build the arguments object for a function activation.
///
/// Outside strict code, each index covered by a formal parameter is aliased to
/// that parameter's binding in the variable environment through a parameter
/// map. When a name repeats, its first position is the one mapped.
pub fn create_arguments_object(
    ctx: &mut ExecutionContext,
    function: &JsObjectRef,
    formal_parameters: &[JsString],
    strict: bool,
    args: &[JsValue],
) -> Result<JsObjectRef, JsError> {
    let realm = ctx.realm().cheap_clone();
    let obj = realm.alloc(JsObject::with_exotic(
        Some(realm.object_prototype().cheap_clone()),
        ExoticObject::Arguments {
            parameter_map: None,
        },
    ));
    obj.borrow_mut().define_property(
        realm.key("length"),
        Property::with_attributes(JsValue::Number(args.len() as f64), true, false, true),
    );

    let mut names = FxHashMap::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (index, value) in args.iter().enumerate() {
        let key = PropertyKey::from(index);
        obj.borrow_mut().define_property(key, Property::data(value.clone()));

        if strict {
            continue;
        }
        let Some(name) = formal_parameters.get(index) else {
            continue;
        };
        if seen.insert(name.as_str()) {
            names.insert(index as u32, name.cheap_clone());
        }
    }
    let mapped = names.len();

    if mapped > 0 {
        obj.borrow_mut().exotic = ExoticObject::Arguments {
            parameter_map: Some(ParameterMap {
                env: ctx.variable_environment().record().cheap_clone(),
                names,
            }),
        };
    }

    if strict {
        let thrower = realm.throw_type_error();
        for name in ["caller", "callee"] {
            obj.borrow_mut().define_property(
                realm.key(name),
                Property::accessor(
                    Some(thrower.cheap_clone()),
                    Some(thrower.cheap_clone()),
                    false,
                    false,
                ),
            );
        }
    } else {
        obj.borrow_mut().define_property(
            realm.key("callee"),
            Property::with_attributes(JsValue::Object(function.cheap_clone()), true, false, true),
        );
    }

    log::trace!(
        "arguments object: {} values, {} mapped",
        args.len(),
        mapped
    );
    Ok(obj)
}
