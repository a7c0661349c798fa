//! Execution contexts
//!
//! An [`ExecutionContext`] is the state of one activation: the lexical and
//! variable environments, the `this` binding, strictness and the frame used
//! for diagnostics. It drives declaration binding instantiation and the call,
//! construct, eval, catch and with protocols.
//!
//! Exceptions travel as `Err(JsError)`. Errors raised by engine code are
//! turned into script error objects at the first call, execute, eval or catch
//! boundary they reach, and every call, execute or eval they unwind through
//! appends its frame to the exception's trace.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::error::{JsError, StackElement, ThrowTrace};
use crate::gc::HeapRef;
use crate::interpreter::arguments;
use crate::interpreter::builtins::error as error_builtins;
use crate::interpreter::code::{Code, Program};
use crate::interpreter::completion::{Block, Completion};
use crate::interpreter::environment::{EnvironmentRecord, LexicalEnvironment};
use crate::interpreter::object_ops;
use crate::interpreter::realm::Realm;
use crate::interpreter::reference::Reference;
use crate::interpreter::stack::SharedFrame;
use crate::platform::TimeProvider;
use crate::value::{
    CheapClone, ErrorData, ExoticObject, JsFunction, JsObject, JsObjectRef, JsString, JsValue,
    NativeFunction, ObjectPolicy, Property, PropertyDescriptor, PropertyKey, ScriptFunction,
};

const GLOBAL_DEBUG_CONTEXT: &str = "<global>";
const EVAL_DEBUG_CONTEXT: &str = "<eval>";

/// Local slot table of code whose bindings were resolved at compile time.
/// Closures see the slots of their defining activation through `parent`.
#[derive(Debug, Clone)]
pub struct VariableValues(Rc<VariableSlots>);

#[derive(Debug)]
struct VariableSlots {
    slots: RefCell<Vec<JsValue>>,
    parent: Option<VariableValues>,
}

impl CheapClone for VariableValues {}

impl VariableValues {
    pub fn new(size: usize, parent: Option<VariableValues>) -> Self {
        VariableValues(Rc::new(VariableSlots {
            slots: RefCell::new(vec![JsValue::Undefined; size]),
            parent,
        }))
    }

    pub fn get(&self, index: usize) -> Option<JsValue> {
        self.0.slots.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: JsValue) -> Result<(), JsError> {
        match self.0.slots.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(JsError::internal_error(format!(
                "local slot {} out of range",
                index
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.0.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self) -> Option<&VariableValues> {
        self.0.parent.as_ref()
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn trace_edges(&self, visitor: &mut dyn FnMut(HeapRef)) -> bool {
        let Ok(slots) = self.0.slots.try_borrow() else {
            return false;
        };
        for value in slots.iter() {
            if let JsValue::Object(obj) = value {
                visitor(HeapRef::Object(obj.cheap_clone()));
            }
        }
        if let Some(parent) = &self.0.parent {
            visitor(HeapRef::Slots(parent.cheap_clone()));
        }
        true
    }
}

pub struct ExecutionContext {
    realm: Rc<Realm>,
    lexical_environment: LexicalEnvironment,
    variable_environment: LexicalEnvironment,
    this_binding: JsValue,
    strict: bool,
    /// File, line and label of this activation, shared with the context stack
    frame: SharedFrame,
    vars: Option<VariableValues>,
    function_parameters: Rc<[JsValue]>,
    function_reference: Option<Reference>,
}

impl ExecutionContext {
    /// Context for top-level program code: a fresh global environment over
    /// the global object, with the global object as `this`.
    pub fn create_global_context(realm: &Rc<Realm>) -> Self {
        let global = realm.global_object().cheap_clone();
        let env = LexicalEnvironment::new_global_environment(global.cheap_clone());
        let frame = StackElement::new(
            realm.config().default_file_name.as_str(),
            0,
            GLOBAL_DEBUG_CONTEXT,
        );
        Self {
            realm: realm.cheap_clone(),
            lexical_environment: env.cheap_clone(),
            variable_environment: env,
            this_binding: JsValue::Object(global),
            strict: false,
            frame: Rc::new(RefCell::new(frame)),
            vars: None,
            function_parameters: Rc::from(Vec::new()),
            function_reference: None,
        }
    }

    /// Run a program in this context.
    pub fn execute(&mut self, program: &Program) -> Result<Completion, JsError> {
        let code = program.code().cheap_clone();
        self.strict = code.is_strict();
        if let Some(file_name) = code.file_name() {
            self.frame.borrow_mut().file_name = file_name.to_string();
        }

        let realm = self.realm.cheap_clone();
        let frame = self.frame.cheap_clone();
        let result = match realm.stack().enter(&frame) {
            Ok(_entry) => self
                .instantiate_declarations(&code, false)
                .and_then(|()| code.body().execute(self))
                .map_err(|e| self.materialize(e)),
            Err(e) => Err(e),
        };
        result.map_err(|e| e.record(self.stack_element()))
    }

    /// Invoke `function` with the given `this` and arguments.
    ///
    /// `reference` is the reference the function was obtained through, if
    /// any; it is kept on the callee context for diagnostics.
    pub fn call(
        &mut self,
        reference: Option<&Reference>,
        function: &JsObjectRef,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let Some(func) = function.function() else {
            let name = reference
                .map(|r| r.referenced_name().to_string())
                .unwrap_or_else(|| "value".to_string());
            let err = JsError::type_error(format!("{} is not a function", name));
            return Err(self.materialize(err));
        };
        let this_binding = self.this_binding_for(&func, this)?;

        match func {
            JsFunction::Script(script) => {
                let env = LexicalEnvironment::new_declarative_environment(Some(&script.scope));
                let frame = StackElement::new(
                    script.file_name.as_str(),
                    0,
                    script.debug_context.as_str(),
                );
                let mut ctx = self.child(env, this_binding, script.strict, frame, reference, args);
                ctx.enter_and_run(|ctx| ctx.run_script_function(&script, function, args))
            }
            JsFunction::Native(native) => {
                let env =
                    LexicalEnvironment::new_declarative_environment(Some(self.realm.global_env()));
                let frame = StackElement::native(native.name.as_str());
                let mut ctx = self.child(env, this_binding.clone(), true, frame, reference, args);
                ctx.enter_and_run(|ctx| run_native_function(ctx, &native, this_binding, args))
            }
        }
    }

    /// `new function(args)`
    pub fn construct(
        &mut self,
        reference: Option<&Reference>,
        function: &JsObjectRef,
        args: &[JsValue],
    ) -> Result<JsObjectRef, JsError> {
        let func = match function.function() {
            Some(func) if func.is_constructor() => func,
            other => {
                let name = other
                    .map(|f| f.debug_context().to_string())
                    .or_else(|| reference.map(|r| r.referenced_name().to_string()))
                    .unwrap_or_else(|| "value".to_string());
                let err = JsError::type_error(format!("{} is not a constructor", name));
                return Err(self.materialize(err));
            }
        };

        let realm = self.realm.cheap_clone();
        let name_key = realm.key("name");
        let ctor_name = match self.materialized(|ctx| object_ops::get(ctx, function, &name_key))? {
            JsValue::Undefined => match reference {
                Some(reference) => reference.referenced_name().cheap_clone(),
                None => func.debug_context(),
            },
            name => name.to_js_string(),
        };

        let prototype = match self
            .materialized(|ctx| object_ops::get(ctx, function, &realm.key("prototype")))?
        {
            JsValue::Object(prototype) => prototype,
            _ => realm.object_prototype().cheap_clone(),
        };
        let allocated = realm.alloc(match func.object_policy() {
            ObjectPolicy::Ordinary => JsObject::with_prototype(prototype),
            ObjectPolicy::Error(kind) => JsObject::with_exotic(
                Some(prototype),
                ExoticObject::Error(ErrorData {
                    kind,
                    message: None,
                    frames: Vec::new(),
                    trace_materialized: false,
                }),
            ),
        });

        let result = self.call(
            reference,
            function,
            JsValue::Object(allocated.cheap_clone()),
            args,
        )?;
        let obj = match result {
            JsValue::Object(returned) => returned,
            _ => allocated,
        };
        obj.borrow_mut().define_property(
            realm.key("__ctor__"),
            Property::with_attributes(JsValue::String(ctor_name), true, false, true),
        );
        Ok(obj)
    }

    /// `new` applied to whatever `reference` resolves to
    pub fn construct_reference(
        &mut self,
        reference: &Reference,
        args: &[JsValue],
    ) -> Result<JsObjectRef, JsError> {
        let value = self.materialized(|ctx| reference.get_value(ctx))?;
        match value {
            JsValue::Object(function) if function.borrow().is_callable() => {
                self.construct(Some(reference), &function, args)
            }
            _ => {
                let err = JsError::type_error(format!(
                    "{} is not a constructor",
                    reference.referenced_name()
                ));
                Err(self.materialize(err))
            }
        }
    }

    /// Call whatever `reference` resolves to, with `this` taken from the
    /// reference.
    pub fn call_reference(
        &mut self,
        reference: &Reference,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let value = self.materialized(|ctx| reference.get_value(ctx))?;
        match value {
            JsValue::Object(function) if function.borrow().is_callable() => {
                self.call(Some(reference), &function, reference.this_value(), args)
            }
            _ => {
                let err = JsError::type_error(format!(
                    "{} is not a function",
                    reference.referenced_name()
                ));
                Err(self.materialize(err))
            }
        }
    }

    /// Evaluate `program`. A direct eval shares the caller's environments and
    /// `this`; an indirect one runs against a fresh global environment. Strict
    /// eval code gets its own declarative environment either way.
    pub fn eval(&mut self, program: &Program, direct: bool) -> Result<JsValue, JsError> {
        let code = program.code().cheap_clone();
        let strict = code.is_strict() || (direct && self.strict);
        let realm = self.realm.cheap_clone();

        let (this_binding, mut lexical, mut variable) = if direct {
            (
                self.this_binding.clone(),
                self.lexical_environment.cheap_clone(),
                self.variable_environment.cheap_clone(),
            )
        } else {
            let global = realm.global_object().cheap_clone();
            let env = LexicalEnvironment::new_global_environment(global.cheap_clone());
            (JsValue::Object(global), env.cheap_clone(), env)
        };
        if strict {
            let env = LexicalEnvironment::new_declarative_environment(Some(&lexical));
            lexical = env.cheap_clone();
            variable = env;
        }
        log::debug!(
            "eval: direct={} strict={} scope depth={}",
            direct,
            strict,
            lexical.depth()
        );

        let file_name = code
            .file_name()
            .unwrap_or(realm.config().default_file_name.as_str())
            .to_string();
        let frame = StackElement::new(file_name, 0, EVAL_DEBUG_CONTEXT);
        let mut ctx = ExecutionContext {
            realm: realm.cheap_clone(),
            lexical_environment: lexical,
            variable_environment: variable,
            this_binding,
            strict,
            frame: Rc::new(RefCell::new(frame)),
            vars: if direct { self.vars.clone() } else { None },
            function_parameters: if direct {
                self.function_parameters.cheap_clone()
            } else {
                Rc::from(Vec::new())
            },
            function_reference: None,
        };
        ctx.enter_and_run(|ctx| {
            ctx.instantiate_declarations(&code, true)?;
            Ok(code.body().execute(ctx)?.into_value())
        })
    }

    /// Run a catch clause. The thrown value is bound to `identifier` in a new
    /// declarative environment that replaces the lexical environment for the
    /// duration of `block`.
    pub fn execute_catch(
        &mut self,
        block: &Block,
        identifier: &JsString,
        thrown: JsError,
    ) -> Result<Completion, JsError> {
        let (value, trace) = self.into_thrown(thrown);
        if !trace.is_empty() {
            self.materialize_trace(&value, trace);
        }

        let previous = self.lexical_environment.cheap_clone();
        let catch_env = LexicalEnvironment::new_declarative_environment(Some(&previous));
        let record = catch_env.record().cheap_clone();
        record.create_mutable_binding(self, identifier, false)?;
        record.set_mutable_binding(self, identifier, value, false)?;

        self.lexical_environment = catch_env;
        let result = block.execute(self);
        self.lexical_environment = previous;
        result.map_err(|e| self.materialize(e))
    }

    /// Run `block` with `object`'s properties in scope ahead of the current
    /// lexical environment.
    pub fn execute_with(
        &mut self,
        object: &JsObjectRef,
        block: &Block,
    ) -> Result<Completion, JsError> {
        let previous = self.lexical_environment.cheap_clone();
        self.lexical_environment = LexicalEnvironment::new_object_environment(
            object.cheap_clone(),
            true,
            Some(&previous),
        );
        let result = block.execute(self);
        self.lexical_environment = previous;
        result
    }

    /// Resolve an identifier against the lexical environment chain
    pub fn resolve(&self, name: &str) -> Reference {
        let name = self.realm.intern(name);
        self.lexical_environment
            .get_identifier_reference(&name, self.strict)
    }

    pub fn create_property_reference(&self, base: JsValue, name: &str) -> Reference {
        Reference::property(base, self.realm.intern(name), self.strict)
    }

    /// Function value for a function expression evaluated in this context
    pub fn create_function(
        &mut self,
        name: Option<&str>,
        formal_parameters: &[&str],
        body: Code,
    ) -> Result<JsObjectRef, JsError> {
        let name = name.map(|n| self.realm.intern(n));
        let parameters: Rc<[JsString]> = formal_parameters
            .iter()
            .map(|p| self.realm.intern(p))
            .collect();
        let strict = self.strict || body.is_strict();
        let compiler = self.realm.compiler();
        compiler.compile_function(self, name.as_ref(), &parameters, &Rc::new(body), strict)
    }

    pub fn create_type_error(&mut self, message: &str) -> JsObjectRef {
        self.create_error("TypeError", Some(message))
    }

    pub fn create_reference_error(&mut self, message: &str) -> JsObjectRef {
        self.create_error("ReferenceError", Some(message))
    }

    pub fn create_range_error(&mut self, message: &str) -> JsObjectRef {
        self.create_error("RangeError", Some(message))
    }

    pub fn create_syntax_error(&mut self, message: &str) -> JsObjectRef {
        self.create_error("SyntaxError", Some(message))
    }

    pub fn create_uri_error(&mut self, message: &str) -> JsObjectRef {
        self.create_error("URIError", Some(message))
    }

    /// Construct an error through the global constructor named `kind`. If
    /// that constructor is gone or fails, the error object is built directly.
    pub fn create_error(&mut self, kind: &str, message: Option<&str>) -> JsObjectRef {
        let args: Vec<JsValue> = message.map(JsValue::from).into_iter().collect();
        match self.realm.global_function(kind) {
            Ok(ctor) => match self.construct(None, &ctor, &args) {
                Ok(error) => return error,
                Err(err) => log::debug!(
                    "{} constructor failed ({}), building the error directly",
                    kind,
                    err
                ),
            },
            Err(_) => log::debug!("no global {} constructor, building the error directly", kind),
        }
        let realm = self.realm.cheap_clone();
        error_builtins::new_error_object(
            &realm,
            kind,
            message.map(JsString::from),
            self.collect_stack_elements(),
        )
    }

    /// Turn an engine error into a thrown script value. Values already thrown
    /// pass through unchanged.
    pub fn materialize(&mut self, err: JsError) -> JsError {
        if err.is_thrown() {
            return err;
        }
        let (value, trace) = self.into_thrown(err);
        JsError::Thrown { value, trace }
    }

    fn into_thrown(&mut self, err: JsError) -> (JsValue, ThrowTrace) {
        match err {
            JsError::Thrown { value, trace } => (value, trace),
            other => {
                let kind = other.constructor_name().unwrap_or("Error");
                let error = self.create_error(kind, other.message());
                (JsValue::Object(error), ThrowTrace::new())
            }
        }
    }

    /// Rewrite a caught error's diagnostic: the native frames at its
    /// innermost end, then the script frames the exception unwound through.
    fn materialize_trace(&mut self, value: &JsValue, trace: ThrowTrace) {
        let JsValue::Object(obj) = value else {
            return;
        };
        let rendered = {
            let mut borrowed = obj.borrow_mut();
            let ExoticObject::Error(data) = &mut borrowed.exotic else {
                return;
            };
            if data.trace_materialized {
                return;
            }
            let mut frames: Vec<StackElement> = data
                .frames
                .iter()
                .take_while(|frame| frame.is_native())
                .cloned()
                .collect();
            frames.extend(trace.into_frames());
            data.frames = frames;
            data.trace_materialized = true;
            error_builtins::render_stack(data)
        };
        obj.borrow_mut().define_property(
            self.realm.key("stack"),
            Property::with_attributes(JsValue::String(JsString::from(rendered)), true, false, true),
        );
    }

    // Declaration binding instantiation

    fn instantiate_declarations(&mut self, code: &Code, configurable: bool) -> Result<(), JsError> {
        self.bind_function_declarations(code, configurable)?;
        self.bind_variable_declarations(code, configurable)?;
        log::debug!(
            "instantiated {} functions, {} vars (configurable={})",
            code.function_declarations().len(),
            code.variable_declarations().len(),
            configurable
        );
        Ok(())
    }

    fn instantiate_function(
        &mut self,
        function: &ScriptFunction,
        function_obj: &JsObjectRef,
        args: &[JsValue],
    ) -> Result<(), JsError> {
        let env = self.variable_environment.record().cheap_clone();
        for (index, name) in function.formal_parameters.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or_default();
            env.assign_mutable_binding(self, name, value, false, function.strict)?;
        }

        self.bind_function_declarations(&function.code, false)?;

        let arguments_name = self.realm.intern("arguments");
        if !env.has_binding(&arguments_name) {
            let arguments = arguments::create_arguments_object(
                self,
                function_obj,
                &function.formal_parameters,
                function.strict,
                args,
            )?;
            if function.strict {
                env.create_immutable_binding(&arguments_name)?;
                env.initialize_immutable_binding(&arguments_name, JsValue::Object(arguments))?;
            } else {
                env.create_mutable_binding(self, &arguments_name, false)?;
                env.set_mutable_binding(self, &arguments_name, JsValue::Object(arguments), false)?;
            }
        }

        self.bind_variable_declarations(&function.code, false)?;
        log::debug!(
            "instantiated {} parameters, {} functions, {} vars for {}",
            function.formal_parameters.len(),
            function.code.function_declarations().len(),
            function.code.variable_declarations().len(),
            function.debug_context
        );
        Ok(())
    }

    fn bind_function_declarations(
        &mut self,
        code: &Code,
        configurable: bool,
    ) -> Result<(), JsError> {
        let env = self.variable_environment.record().cheap_clone();
        let compiler = self.realm.compiler();
        for declaration in code.function_declarations() {
            let name = declaration.identifier();
            if !env.has_binding(name) {
                env.create_mutable_binding(self, name, configurable)?;
            } else if env.is_global() {
                self.rebind_global_function(&env, name, configurable)?;
            }
            let function = compiler.compile_function(
                self,
                Some(name),
                declaration.formal_parameters(),
                declaration.body(),
                declaration.is_strict() || code.is_strict(),
            )?;
            env.set_mutable_binding(self, name, JsValue::Object(function), code.is_strict())?;
        }
        Ok(())
    }

    /// A function declaration may replace an existing global property only
    /// when that property is configurable or a plain writable data property.
    fn rebind_global_function(
        &mut self,
        env: &EnvironmentRecord,
        name: &JsString,
        configurable: bool,
    ) -> Result<(), JsError> {
        let Some(global) = env.binding_object().cloned() else {
            return Ok(());
        };
        let key = PropertyKey::from(name);
        let Some(existing) = object_ops::find_property(&global, &key) else {
            return Ok(());
        };
        if existing.configurable {
            object_ops::define_own_property(
                self,
                &global,
                key,
                PropertyDescriptor::data(JsValue::Undefined, true, true, configurable),
                true,
            )?;
        } else if existing.is_accessor() || (!existing.is_writable() && !existing.enumerable) {
            log::warn!("cannot bind function '{}' over global property", name);
            return Err(JsError::type_error(format!(
                "unable to bind function '{}'",
                name
            )));
        }
        Ok(())
    }

    fn bind_variable_declarations(
        &mut self,
        code: &Code,
        configurable: bool,
    ) -> Result<(), JsError> {
        let env = self.variable_environment.record().cheap_clone();
        for name in code.variable_declarations() {
            if !env.has_binding(name) {
                env.create_mutable_binding(self, name, configurable)?;
                env.set_mutable_binding(self, name, JsValue::Undefined, code.is_strict())?;
            }
        }
        Ok(())
    }

    // Call plumbing

    fn child(
        &self,
        env: LexicalEnvironment,
        this_binding: JsValue,
        strict: bool,
        frame: StackElement,
        reference: Option<&Reference>,
        args: &[JsValue],
    ) -> ExecutionContext {
        ExecutionContext {
            realm: self.realm.cheap_clone(),
            lexical_environment: env.cheap_clone(),
            variable_environment: env,
            this_binding,
            strict,
            frame: Rc::new(RefCell::new(frame)),
            vars: None,
            function_parameters: Rc::from(args),
            function_reference: reference.cloned(),
        }
    }

    /// Push this context's frame, run `body`, and tag any escaping error.
    /// Failing to enter (stack overflow) is returned as is: the caller's own
    /// boundary materializes it.
    fn enter_and_run<T>(
        &mut self,
        body: impl FnOnce(&mut ExecutionContext) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        let realm = self.realm.cheap_clone();
        let frame = self.frame.cheap_clone();
        let result = match realm.stack().enter(&frame) {
            Ok(_entry) => body(self).map_err(|e| self.materialize(e)),
            Err(e) => return Err(e),
        };
        result.map_err(|e| e.record(self.stack_element()))
    }

    /// Run `f`, materializing any engine error it raises
    fn materialized<T>(
        &mut self,
        f: impl FnOnce(&mut ExecutionContext) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        f(self).map_err(|e| self.materialize(e))
    }

    fn run_script_function(
        &mut self,
        function: &ScriptFunction,
        function_obj: &JsObjectRef,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        if let Some(slots) = function.code.local_slots() {
            self.alloc_vars(slots, function.captured_vars.clone());
        }
        if !function.resolved {
            self.instantiate_function(function, function_obj, args)?;
        }
        match function.code.body().execute(self)? {
            Completion::Return(value) => Ok(value),
            _ => Ok(JsValue::Undefined),
        }
    }

    fn this_binding_for(
        &mut self,
        function: &JsFunction,
        this: JsValue,
    ) -> Result<JsValue, JsError> {
        if function.is_strict() {
            return Ok(this);
        }
        match this {
            JsValue::Undefined | JsValue::Null => {
                Ok(JsValue::Object(self.realm.global_object().cheap_clone()))
            }
            JsValue::Object(_) => Ok(this),
            primitive => {
                let wrapper = self.materialized(|ctx| object_ops::to_object(ctx, &primitive))?;
                Ok(JsValue::Object(wrapper))
            }
        }
    }

    fn stack_element(&self) -> StackElement {
        self.frame.borrow().clone()
    }

    // Accessors

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.realm.config()
    }

    pub fn global_object(&self) -> &JsObjectRef {
        self.realm.global_object()
    }

    pub fn prototype_for(&self, name: &str) -> Option<JsObjectRef> {
        self.realm.prototype_for(name)
    }

    pub fn this_binding(&self) -> &JsValue {
        &self.this_binding
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn lexical_environment(&self) -> &LexicalEnvironment {
        &self.lexical_environment
    }

    pub fn variable_environment(&self) -> &LexicalEnvironment {
        &self.variable_environment
    }

    pub fn line_number(&self) -> u32 {
        self.frame.borrow().line
    }

    pub fn set_line_number(&mut self, line: u32) {
        self.frame.borrow_mut().line = line;
    }

    pub fn file_name(&self) -> String {
        self.frame.borrow().file_name.clone()
    }

    pub fn debug_context(&self) -> String {
        self.frame.borrow().debug_context.clone()
    }

    /// Actual arguments of the current function activation
    pub fn function_parameters(&self) -> &[JsValue] {
        &self.function_parameters
    }

    pub fn function_reference(&self) -> Option<&Reference> {
        self.function_reference.as_ref()
    }

    pub fn vars(&self) -> Option<&VariableValues> {
        self.vars.as_ref()
    }

    /// Give this activation a fresh local slot table
    pub fn alloc_vars(&mut self, size: usize, parent: Option<VariableValues>) -> VariableValues {
        let vars = VariableValues::new(size, parent);
        self.vars = Some(vars.cheap_clone());
        vars
    }

    /// Frames of every active context, innermost first
    pub fn collect_stack_elements(&self) -> Vec<StackElement> {
        self.realm.stack().elements()
    }

    pub fn clock(&self) -> &dyn TimeProvider {
        self.realm.clock()
    }

    pub fn time_zone(&self) -> &str {
        &self.realm.config().time_zone
    }

    pub fn locale(&self) -> &str {
        &self.realm.config().locale
    }
}

fn run_native_function(
    ctx: &mut ExecutionContext,
    native: &NativeFunction,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    (native.func)(ctx, this, args)
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.frame.borrow();
        f.debug_struct("ExecutionContext")
            .field("debug_context", &frame.debug_context)
            .field("file_name", &frame.file_name)
            .field("line", &frame.line)
            .field("strict", &self.strict)
            .finish()
    }
}
