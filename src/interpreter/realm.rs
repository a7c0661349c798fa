//! Realm: the per-runtime state every execution context shares
//!
//! Holds the global object and environment, the intrinsic prototypes, the
//! collaborators (compiler, parser, clock), configuration and the active-context
//! stack. Objects are allocated through the realm's heap, which collects
//! unreachable cycles and reclaims the realm's own graph at shutdown.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::config::RuntimeConfig;
use crate::error::JsError;
use crate::gc::{GcStats, Heap, HeapRef};
use crate::interpreter::builtins;
use crate::interpreter::code::{Compiler, ScriptCompiler, SourceParser};
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::environment::LexicalEnvironment;
use crate::interpreter::stack::ContextStack;
use crate::platform::TimeProvider;
use crate::string_dict::StringDict;
use crate::value::{
    CheapClone, ExoticObject, JsFunction, JsObject, JsObjectRef, JsString, JsValue, NativeFn,
    NativeFunction, ObjectPolicy, Property, PropertyKey,
};

pub struct Realm {
    heap: Heap,
    global_object: JsObjectRef,
    global_env: LexicalEnvironment,
    object_prototype: JsObjectRef,
    function_prototype: JsObjectRef,
    throw_type_error: JsObjectRef,
    prototypes: RefCell<FxHashMap<JsString, JsObjectRef>>,
    strings: RefCell<StringDict>,
    compiler: RefCell<Rc<dyn Compiler>>,
    parser: RefCell<Option<Rc<dyn SourceParser>>>,
    config: RuntimeConfig,
    clock: Box<dyn TimeProvider>,
    stack: ContextStack,
}

impl Realm {
    pub fn new(config: RuntimeConfig, clock: Box<dyn TimeProvider>) -> Rc<Self> {
        let heap = Heap::new(config.gc_threshold);
        let mut strings = StringDict::with_common_strings();

        let object_prototype = heap.alloc(JsObject::new());
        let function_prototype = heap.alloc(JsObject::with_exotic(
            Some(object_prototype.cheap_clone()),
            ExoticObject::Function(JsFunction::Native(NativeFunction {
                name: strings.get_or_insert(""),
                func: Rc::new(|_: &mut ExecutionContext, _: JsValue, _: &[JsValue]| {
                    Ok(JsValue::Undefined)
                }),
                arity: 0,
                constructor: false,
                policy: ObjectPolicy::Ordinary,
            })),
        ));
        let throw_type_error = native_function_object(
            &heap,
            &mut strings,
            &function_prototype,
            "__throwTypeError",
            0,
            ObjectPolicy::Ordinary,
            false,
            Rc::new(builtins::global::throw_type_error),
        );
        throw_type_error.borrow_mut().extensible = false;

        let global_object = heap.alloc(JsObject::with_prototype(object_prototype.cheap_clone()));
        let global_env = LexicalEnvironment::new_global_environment(global_object.cheap_clone());
        let stack = ContextStack::new(config.max_call_depth);

        let mut prototypes = FxHashMap::default();
        prototypes.insert(strings.get_or_insert("Object"), object_prototype.cheap_clone());
        prototypes.insert(strings.get_or_insert("Function"), function_prototype.cheap_clone());

        let realm = Rc::new(Realm {
            heap,
            global_object,
            global_env,
            object_prototype,
            function_prototype,
            throw_type_error,
            prototypes: RefCell::new(prototypes),
            strings: RefCell::new(strings),
            compiler: RefCell::new(Rc::new(ScriptCompiler)),
            parser: RefCell::new(None),
            config,
            clock,
            stack,
        });
        builtins::install(&realm);
        realm
    }

    pub fn alloc(&self, object: JsObject) -> JsObjectRef {
        self.heap.alloc(object)
    }

    /// Ordinary object inheriting from `Object.prototype`
    pub fn new_object(&self) -> JsObjectRef {
        self.alloc(JsObject::with_prototype(self.object_prototype.cheap_clone()))
    }

    /// Function object backed by a Rust closure
    pub fn new_native_function(&self, name: &str, arity: usize, func: NativeFn) -> JsObjectRef {
        native_function_object(
            &self.heap,
            &mut self.strings.borrow_mut(),
            &self.function_prototype,
            name,
            arity,
            ObjectPolicy::Ordinary,
            false,
            func,
        )
    }

    /// Native function usable with `new`; `policy` decides what it allocates
    pub fn new_native_constructor(
        &self,
        name: &str,
        arity: usize,
        policy: ObjectPolicy,
        func: NativeFn,
    ) -> JsObjectRef {
        native_function_object(
            &self.heap,
            &mut self.strings.borrow_mut(),
            &self.function_prototype,
            name,
            arity,
            policy,
            true,
            func,
        )
    }

    pub fn intern(&self, s: &str) -> JsString {
        self.strings.borrow_mut().get_or_insert(s)
    }

    pub fn key(&self, s: &str) -> PropertyKey {
        PropertyKey::from(self.intern(s))
    }

    pub fn global_object(&self) -> &JsObjectRef {
        &self.global_object
    }

    pub fn global_env(&self) -> &LexicalEnvironment {
        &self.global_env
    }

    pub fn object_prototype(&self) -> &JsObjectRef {
        &self.object_prototype
    }

    pub fn function_prototype(&self) -> &JsObjectRef {
        &self.function_prototype
    }

    /// Shared poison accessor for strict `callee`/`caller`
    pub fn throw_type_error(&self) -> &JsObjectRef {
        &self.throw_type_error
    }

    pub fn prototype_for(&self, name: &str) -> Option<JsObjectRef> {
        self.prototypes.borrow().get(name).map(|p| p.cheap_clone())
    }

    pub(crate) fn register_prototype(&self, name: &str, prototype: JsObjectRef) {
        let name = self.intern(name);
        self.prototypes.borrow_mut().insert(name, prototype);
    }

    pub fn compiler(&self) -> Rc<dyn Compiler> {
        self.compiler.borrow().clone()
    }

    pub fn set_compiler(&self, compiler: Rc<dyn Compiler>) {
        *self.compiler.borrow_mut() = compiler;
    }

    pub fn parser(&self) -> Option<Rc<dyn SourceParser>> {
        self.parser.borrow().clone()
    }

    pub fn set_parser(&self, parser: Rc<dyn SourceParser>) {
        *self.parser.borrow_mut() = Some(parser);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn TimeProvider {
        self.clock.as_ref()
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Objects not yet freed
    pub fn live_objects(&self) -> usize {
        self.heap.live_objects()
    }

    /// Run the cycle collector now; returns the number of objects reclaimed
    pub fn collect(&self) -> usize {
        self.heap.collect(Vec::new())
    }

    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    /// Allocations between automatic collections; 0 disables them
    pub fn set_gc_threshold(&self, threshold: usize) {
        self.heap.set_threshold(threshold);
    }

    /// Reclaim everything only the realm itself keeps alive. Values the host
    /// still holds, and whatever they reach, stay intact.
    pub(crate) fn teardown(&self) {
        log::debug!("tearing down realm ({} live objects)", self.live_objects());
        self.prototypes.borrow_mut().clear();
        let owned = vec![
            HeapRef::Object(self.global_object.cheap_clone()),
            HeapRef::Scope(self.global_env.cheap_clone()),
            HeapRef::Object(self.object_prototype.cheap_clone()),
            HeapRef::Object(self.function_prototype.cheap_clone()),
            HeapRef::Object(self.throw_type_error.cheap_clone()),
        ];
        self.heap.collect(owned);
    }

    /// Look up a global binding without running accessors
    pub(crate) fn global_function(&self, name: &str) -> Result<JsObjectRef, JsError> {
        match self.global_object.own_data_value(&self.key(name)) {
            Some(JsValue::Object(obj)) if obj.borrow().is_callable() => Ok(obj),
            _ => Err(JsError::type_error(format!("{} is not a function", name))),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn native_function_object(
    heap: &Heap,
    strings: &mut StringDict,
    function_prototype: &JsObjectRef,
    name: &str,
    arity: usize,
    policy: ObjectPolicy,
    constructor: bool,
    func: NativeFn,
) -> JsObjectRef {
    let name = strings.get_or_insert(name);
    let obj = heap.alloc(JsObject::with_exotic(
        Some(function_prototype.cheap_clone()),
        ExoticObject::Function(JsFunction::Native(NativeFunction {
            name: name.cheap_clone(),
            func,
            arity,
            constructor,
            policy,
        })),
    ));
    {
        let mut o = obj.borrow_mut();
        o.define_property(
            PropertyKey::String(strings.get_or_insert("length")),
            Property::with_attributes(JsValue::Number(arity as f64), false, false, false),
        );
        o.define_property(
            PropertyKey::String(strings.get_or_insert("name")),
            Property::with_attributes(JsValue::String(name), false, false, true),
        );
    }
    obj
}
