//! Execution engine
//!
//! Scopes, bindings, references and the call/construct/eval protocols that
//! compiled code runs against.

// Builtin objects the engine calls into
pub mod builtins;

pub mod arguments;
pub mod code;
pub mod completion;
pub mod context;
pub mod environment;
pub mod object_ops;
pub mod realm;
pub mod reference;
pub mod stack;

pub use code::{Code, Compiler, FunctionDeclaration, Program, ScriptCompiler, SourceParser};
pub use completion::{Block, Completion, Statement};
pub use context::{ExecutionContext, VariableValues};
pub use environment::{Binding, EnvironmentRecord, LexicalEnvironment};
pub use realm::Realm;
pub use reference::{Reference, ReferenceBase};
pub use stack::{ContextEntry, ContextStack};
