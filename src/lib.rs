//! ECMAScript execution engine for embedded script runtimes
//!
//! The crate takes already-compiled code (programs and function bodies made of
//! statements over an [`ExecutionContext`]) and runs it: scopes and hoisting,
//! identifier resolution, `this` binding, the arguments object, call and
//! construct, direct and indirect eval, `catch`/`with` scoping, and exception
//! propagation with script-level stack traces.
//!
//! # Example
//!
//! ```
//! use jsrun::{Block, Code, Completion, Program, Runtime, Statement, JsValue};
//!
//! let runtime = Runtime::new();
//! let program = Program::new(
//!     Code::new(Block::new(vec![Statement::new(|ctx| {
//!         ctx.resolve("answer").put_value(ctx, JsValue::from(42))?;
//!         Ok(Completion::normal(ctx.resolve("answer").get_value(ctx)?))
//!     })]))
//!     .declare_var("answer"),
//! );
//! let completion = runtime.execute(&program).unwrap();
//! assert_eq!(completion.into_value(), JsValue::Number(42.0));
//! ```

pub mod config;
pub mod error;
pub mod gc;
pub mod interpreter;
pub mod platform;
pub mod string_dict;
pub mod value;

pub use config::{CompileMode, RuntimeConfig};
pub use error::{JsError, StackElement, ThrowTrace};
pub use gc::GcStats;
pub use interpreter::{
    Block, Code, Compiler, Completion, ExecutionContext, FunctionDeclaration, Program, Reference,
    ScriptCompiler, SourceParser, Statement,
};
pub use value::CheapClone;
pub use value::JsObjectRef;
pub use value::JsString;
pub use value::JsValue;
pub use value::PropertyKey;

use std::rc::Rc;

use interpreter::Realm;
use platform::{StdTimeProvider, TimeProvider};
use value::Property;

/// An isolated script runtime: one global object and its realm.
///
/// A runtime is single-threaded. Reference cycles between its objects are
/// reclaimed by a collector that runs every `gc_threshold` allocations or on
/// [`Runtime::collect`]. Dropping the runtime reclaims what only the runtime
/// kept alive; values the host still holds stay usable.
pub struct Runtime {
    realm: Rc<Realm>,
}

impl Runtime {
    /// Create a new runtime instance
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_time_provider(config, Box::new(StdTimeProvider::new()))
    }

    pub fn with_time_provider(config: RuntimeConfig, clock: Box<dyn TimeProvider>) -> Self {
        Self {
            realm: Realm::new(config, clock),
        }
    }

    /// Install the parser used by the global `eval` function
    pub fn set_parser(&self, parser: Rc<dyn SourceParser>) {
        self.realm.set_parser(parser);
    }

    /// Replace the compiler used for function declarations and expressions
    pub fn set_compiler(&self, compiler: Rc<dyn Compiler>) {
        self.realm.set_compiler(compiler);
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.realm.config()
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    pub fn global_object(&self) -> &JsObjectRef {
        self.realm.global_object()
    }

    /// Reclaim unreachable object cycles now. Returns the number of objects freed.
    pub fn collect(&self) -> usize {
        self.realm.collect()
    }

    pub fn gc_stats(&self) -> GcStats {
        self.realm.gc_stats()
    }

    /// Set the allocation count between automatic collections (0 disables them)
    pub fn set_gc_threshold(&self, threshold: usize) {
        self.realm.set_gc_threshold(threshold);
    }

    pub fn create_global_context(&self) -> ExecutionContext {
        ExecutionContext::create_global_context(&self.realm)
    }

    /// Run `program` in a fresh global context
    pub fn execute(&self, program: &Program) -> Result<Completion, JsError> {
        self.create_global_context().execute(program)
    }

    /// Install a Rust function as a global. Its frames count as native frames
    /// in stack traces.
    pub fn define_host_function<F>(&self, name: &str, arity: usize, f: F) -> JsObjectRef
    where
        F: Fn(&mut ExecutionContext, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let function = self.realm.new_native_function(name, arity, Rc::new(f));
        self.global_object().borrow_mut().define_property(
            self.realm.key(name),
            Property::data(JsValue::Object(function.cheap_clone())),
        );
        function
    }

    /// Call a global function by name
    ///
    /// If `args` is a JSON array, the elements are spread as individual arguments.
    /// Otherwise, `args` is passed as a single argument.
    pub fn call_function(&self, name: &str, args: &serde_json::Value) -> Result<JsValue, JsError> {
        let mut ctx = self.create_global_context();
        let reference = ctx.resolve(name);
        let js_args = match args {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| self.create_value_from_json(v))
                .collect(),
            other => vec![self.create_value_from_json(other)],
        };
        ctx.call_reference(&reference, &js_args)
    }

    /// Create a JsValue from a JSON value. Arrays become array-like objects.
    pub fn create_value_from_json(&self, json: &serde_json::Value) -> JsValue {
        match json {
            serde_json::Value::Null => JsValue::Null,
            serde_json::Value::Bool(b) => JsValue::Boolean(*b),
            serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => JsValue::from(s.as_str()),
            serde_json::Value::Array(items) => {
                let obj = self.realm.new_object();
                for (index, item) in items.iter().enumerate() {
                    let value = self.create_value_from_json(item);
                    obj.borrow_mut()
                        .define_property(PropertyKey::from(index), Property::data(value));
                }
                obj.borrow_mut().define_property(
                    self.realm.key("length"),
                    Property::with_attributes(
                        JsValue::Number(items.len() as f64),
                        true,
                        false,
                        false,
                    ),
                );
                JsValue::Object(obj)
            }
            serde_json::Value::Object(map) => {
                let obj = self.realm.new_object();
                for (key, item) in map {
                    let value = self.create_value_from_json(item);
                    obj.borrow_mut()
                        .define_property(PropertyKey::from(key.as_str()), Property::data(value));
                }
                JsValue::Object(obj)
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.realm.teardown();
    }
}
