//! Code objects and the compiler collaborator
//!
//! The engine never sees source text. A host (or a test) hands it [`Code`]:
//! the hoisted declarations of one program or function body, its strictness,
//! and the compiled statements. Function values are produced from code by a
//! [`Compiler`]; the default [`ScriptCompiler`] closes them over the defining
//! context's scope.

use std::rc::Rc;

use crate::config::CompileMode;
use crate::error::JsError;
use crate::interpreter::completion::Block;
use crate::interpreter::context::ExecutionContext;
use crate::value::{
    CheapClone, ExoticObject, JsFunction, JsObject, JsObjectRef, JsString, JsValue, Property,
    PropertyKey, ScriptFunction,
};

/// Compiled body of a program, eval or function
#[derive(Debug, Clone, Default)]
pub struct Code {
    file_name: Option<String>,
    strict: bool,
    function_declarations: Vec<FunctionDeclaration>,
    variable_declarations: Vec<JsString>,
    /// Size of the local slot table when bindings were resolved at compile time
    local_slots: Option<usize>,
    body: Block,
}

impl Code {
    pub fn new(body: Block) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Add a top-level function declaration. Declarations bind in the order added.
    pub fn declare_function(mut self, declaration: FunctionDeclaration) -> Self {
        self.function_declarations.push(declaration);
        self
    }

    /// Add a hoisted `var` name
    pub fn declare_var(mut self, name: impl Into<JsString>) -> Self {
        self.variable_declarations.push(name.into());
        self
    }

    pub fn with_local_slots(mut self, slots: usize) -> Self {
        self.local_slots = Some(slots);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn function_declarations(&self) -> &[FunctionDeclaration] {
        &self.function_declarations
    }

    pub fn variable_declarations(&self) -> &[JsString] {
        &self.variable_declarations
    }

    pub fn local_slots(&self) -> Option<usize> {
        self.local_slots
    }

    pub fn body(&self) -> &Block {
        &self.body
    }
}

/// A top-level program or eval body
#[derive(Debug, Clone)]
pub struct Program(Rc<Code>);

impl CheapClone for Program {}

impl Program {
    pub fn new(code: Code) -> Self {
        Program(Rc::new(code))
    }

    pub fn code(&self) -> &Rc<Code> {
        &self.0
    }

    pub fn is_strict(&self) -> bool {
        self.0.is_strict()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()
    }
}

impl From<Code> for Program {
    fn from(code: Code) -> Self {
        Program::new(code)
    }
}

/// `function name(params) { body }` found at the top level of a body
#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    identifier: JsString,
    formal_parameters: Rc<[JsString]>,
    body: Rc<Code>,
    strict: bool,
}

impl FunctionDeclaration {
    pub fn new(identifier: impl Into<JsString>, formal_parameters: &[&str], body: Code) -> Self {
        let strict = body.is_strict();
        Self {
            identifier: identifier.into(),
            formal_parameters: formal_parameters.iter().map(|p| JsString::from(*p)).collect(),
            body: Rc::new(body),
            strict,
        }
    }

    pub fn identifier(&self) -> &JsString {
        &self.identifier
    }

    pub fn formal_parameters(&self) -> &Rc<[JsString]> {
        &self.formal_parameters
    }

    pub fn body(&self) -> &Rc<Code> {
        &self.body
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Produces callable function values from compiled bodies
pub trait Compiler {
    fn compile_function(
        &self,
        ctx: &mut ExecutionContext,
        name: Option<&JsString>,
        formal_parameters: &Rc<[JsString]>,
        body: &Rc<Code>,
        strict: bool,
    ) -> Result<JsObjectRef, JsError>;
}

/// Turns source text into a program. Installed by hosts that embed a parser;
/// the global `eval` function needs one.
pub trait SourceParser {
    fn parse(&self, source: &str, file_name: &str) -> Result<Program, JsError>;
}

/// Default compiler: closes the body over the defining context
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptCompiler;

impl Compiler for ScriptCompiler {
    fn compile_function(
        &self,
        ctx: &mut ExecutionContext,
        name: Option<&JsString>,
        formal_parameters: &Rc<[JsString]>,
        body: &Rc<Code>,
        strict: bool,
    ) -> Result<JsObjectRef, JsError> {
        let realm = ctx.realm().cheap_clone();
        let strict = strict || body.is_strict();
        let resolved =
            realm.config().compile_mode == CompileMode::Resolved && body.local_slots().is_some();
        let file_name = match body.file_name() {
            Some(file) => JsString::from(file),
            None => JsString::from(ctx.file_name()),
        };
        let debug_context = name
            .map(|n| n.cheap_clone())
            .unwrap_or_else(|| realm.intern("<anonymous>"));

        let func = ScriptFunction {
            name: name.map(|n| n.cheap_clone()),
            formal_parameters: formal_parameters.cheap_clone(),
            code: body.cheap_clone(),
            scope: ctx.lexical_environment().cheap_clone(),
            captured_vars: ctx.vars().cloned(),
            strict,
            file_name,
            debug_context,
            resolved,
            constructor: true,
        };
        let func_obj = realm.alloc(JsObject::with_exotic(
            Some(realm.function_prototype().cheap_clone()),
            ExoticObject::Function(JsFunction::Script(func)),
        ));

        let prototype = realm.alloc(JsObject::with_prototype(
            realm.object_prototype().cheap_clone(),
        ));
        prototype.borrow_mut().define_property(
            PropertyKey::String(realm.intern("constructor")),
            Property::with_attributes(JsValue::Object(func_obj.cheap_clone()), true, false, true),
        );

        {
            let mut obj = func_obj.borrow_mut();
            obj.define_property(
                PropertyKey::String(realm.intern("length")),
                Property::with_attributes(
                    JsValue::Number(formal_parameters.len() as f64),
                    false,
                    false,
                    false,
                ),
            );
            if let Some(name) = name {
                obj.define_property(
                    PropertyKey::String(realm.intern("name")),
                    Property::with_attributes(
                        JsValue::String(name.cheap_clone()),
                        false,
                        false,
                        true,
                    ),
                );
            }
            obj.define_property(
                PropertyKey::String(realm.intern("prototype")),
                Property::with_attributes(JsValue::Object(prototype), true, false, false),
            );
            if strict {
                let thrower = realm.throw_type_error().cheap_clone();
                for key in ["caller", "arguments"] {
                    obj.define_property(
                        PropertyKey::String(realm.intern(key)),
                        Property::accessor(
                            Some(thrower.cheap_clone()),
                            Some(thrower.cheap_clone()),
                            false,
                            false,
                        ),
                    );
                }
            }
        }

        Ok(func_obj)
    }
}
