//! JavaScript value representation
//!
//! The core JsValue type and the object model the engine consumes: objects with
//! a prototype link and an ordered property table, property slots and partial
//! descriptors, and the function values the engine invokes.

use std::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::{JsError, StackElement};
use crate::gc::{HeapRef, Traceable};
use crate::interpreter::code::Code;
use crate::interpreter::context::{ExecutionContext, VariableValues};
use crate::interpreter::environment::{EnvironmentRecord, LexicalEnvironment};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// This trait makes it explicit when a clone is cheap (just incrementing a reference count)
/// vs when it might be expensive (copying data). Types implementing this trait should have
/// O(1) clone operations, typically because they use `Rc` or similar reference counting.
///
/// # Examples
/// - `JsObjectRef` (Rc<RefCell<JsObject>>) - cheap clone
/// - `JsString` (Rc<str>) - cheap clone
/// - `LexicalEnvironment` (Rc node) - cheap clone
pub trait CheapClone: Clone {
    /// Create a cheap (reference-counted) clone of this value.
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectRef),
}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Check if this value is callable (a function)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => obj.borrow().is_callable(),
            _ => false,
        }
    }

    /// Get the typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) => {
                if obj.borrow().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// Convert to number (ToNumber) for primitives
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => {
                let trimmed = s.as_str().trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            JsValue::Object(obj) => match &obj.borrow().exotic {
                ExoticObject::Primitive(inner) => inner.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// Convert to string (ToString) for primitives
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => number_to_string(*n),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(obj) => match &obj.borrow().exotic {
                ExoticObject::Primitive(inner) => inner.to_js_string(),
                ExoticObject::Function(_) => JsString::from("function"),
                _ => JsString::from("[object Object]"),
            },
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            // NaN !== NaN falls out of f64 comparison
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// SameValue, used when validating redefinitions of non-configurable properties
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            _ => self.strict_equals(other),
        }
    }
}

fn number_to_string(n: f64) -> JsString {
    if n.is_nan() {
        JsString::from("NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            JsString::from("Infinity")
        } else {
            JsString::from("-Infinity")
        }
    } else if n == 0.0 {
        JsString::from("0")
    } else {
        JsString::from(n.to_string())
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

// Conversions from Rust types

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<JsObjectRef> for JsValue {
    fn from(obj: JsObjectRef) -> Self {
        JsValue::Object(obj)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

// JsString wraps Rc<str>, so clone is cheap (just reference count increment)
impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Deref for JsString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl From<&JsString> for JsString {
    fn from(s: &JsString) -> Self {
        s.cheap_clone()
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a heap object.
///
/// Objects form an arbitrary graph (closures capture environments that hold the
/// closures themselves), so handles are reference counted. The realm's heap keeps
/// a weak registry of every allocation and reclaims cycles nothing outside the
/// heap can reach.
#[derive(Clone)]
pub struct JsObjectRef(Rc<RefCell<JsObject>>);

impl CheapClone for JsObjectRef {}

impl JsObjectRef {
    pub(crate) fn new(object: JsObject) -> Self {
        JsObjectRef(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, JsObject> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, JsObject> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &JsObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<JsObject>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<JsObject>>) -> Self {
        JsObjectRef(rc)
    }

    pub(crate) fn try_borrow(&self) -> Result<Ref<'_, JsObject>, BorrowError> {
        self.0.try_borrow()
    }

    pub(crate) fn try_borrow_mut(&self) -> Result<RefMut<'_, JsObject>, BorrowMutError> {
        self.0.try_borrow_mut()
    }

    /// Identity of the allocation
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn prototype(&self) -> Option<JsObjectRef> {
        self.borrow().prototype.as_ref().map(|p| p.cheap_clone())
    }

    pub fn set_prototype(&self, prototype: Option<JsObjectRef>) {
        self.borrow_mut().prototype = prototype;
    }

    /// Clone out the function payload, if this object is callable
    pub fn function(&self) -> Option<JsFunction> {
        match &self.borrow().exotic {
            ExoticObject::Function(func) => Some(func.clone()),
            _ => None,
        }
    }

    /// Own data value of a property, without running accessors
    pub fn own_data_value(&self, key: &PropertyKey) -> Option<JsValue> {
        match self.borrow().properties.get(key).map(|p| &p.slot) {
            Some(PropertySlot::Data { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for JsObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(obj) = self.0.try_borrow() else {
            return write!(f, "{{<borrowed>}}");
        };
        match &obj.exotic {
            ExoticObject::Ordinary => write!(f, "{{{} properties}}", obj.properties.len()),
            ExoticObject::Function(func) => {
                write!(f, "[Function: {}]", func.name().unwrap_or("anonymous"))
            }
            ExoticObject::Arguments { .. } => write!(f, "[Arguments]"),
            ExoticObject::Error(data) => write!(f, "[{}]", data.kind),
            ExoticObject::Primitive(value) => write!(f, "[Wrapper {:?}]", value),
        }
    }
}

/// Ordered property table
pub type PropertyMap = IndexMap<PropertyKey, Property, FxBuildHasher>;

/// A JavaScript object
#[derive(Debug)]
pub struct JsObject {
    /// Prototype link
    pub prototype: Option<JsObjectRef>,
    /// Whether the object can have properties added
    pub extensible: bool,
    /// Object properties, in insertion order
    pub properties: PropertyMap,
    /// Exotic object behavior
    pub exotic: ExoticObject,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            prototype: None,
            extensible: true,
            properties: PropertyMap::default(),
            exotic: ExoticObject::Ordinary,
        }
    }

    /// Create a new ordinary object with a prototype
    pub fn with_prototype(prototype: JsObjectRef) -> Self {
        Self {
            prototype: Some(prototype),
            ..Self::new()
        }
    }

    pub fn with_exotic(prototype: Option<JsObjectRef>, exotic: ExoticObject) -> Self {
        Self {
            prototype,
            exotic,
            ..Self::new()
        }
    }

    /// Check if this object is callable
    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    /// Get an own property
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Check if object has own property
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Insert or replace a property without validation
    pub fn define_property(&mut self, key: PropertyKey, prop: Property) {
        self.properties.insert(key, prop);
    }

    /// Remove an own property, keeping the order of the remaining ones
    pub fn remove_property(&mut self, key: &PropertyKey) -> Option<Property> {
        self.properties.shift_remove(key)
    }

    /// Get own property keys
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.properties.keys().cloned().collect()
    }

    /// Drop every outgoing reference. The collector does this to unreachable
    /// objects so the cycles they sit on fall apart.
    pub(crate) fn sever(&mut self) {
        self.prototype = None;
        self.properties.clear();
        self.exotic = ExoticObject::Ordinary;
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

fn trace_value(value: &JsValue, visitor: &mut dyn FnMut(HeapRef)) {
    if let JsValue::Object(obj) = value {
        visitor(HeapRef::Object(obj.cheap_clone()));
    }
}

impl Traceable for JsObject {
    fn trace(&self, visitor: &mut dyn FnMut(HeapRef)) {
        if let Some(prototype) = &self.prototype {
            visitor(HeapRef::Object(prototype.cheap_clone()));
        }
        for prop in self.properties.values() {
            match &prop.slot {
                PropertySlot::Data { value, .. } => trace_value(value, visitor),
                PropertySlot::Accessor { getter, setter } => {
                    for accessor in [getter, setter].into_iter().flatten() {
                        visitor(HeapRef::Object(accessor.cheap_clone()));
                    }
                }
            }
        }
        match &self.exotic {
            ExoticObject::Ordinary | ExoticObject::Error(_) => {}
            ExoticObject::Primitive(value) => trace_value(value, visitor),
            ExoticObject::Function(JsFunction::Native(_)) => {}
            ExoticObject::Function(JsFunction::Script(func)) => {
                visitor(HeapRef::Scope(func.scope.cheap_clone()));
                if let Some(vars) = &func.captured_vars {
                    visitor(HeapRef::Slots(vars.cheap_clone()));
                }
            }
            ExoticObject::Arguments { parameter_map } => {
                if let Some(map) = parameter_map {
                    visitor(HeapRef::Record(map.env.cheap_clone()));
                }
            }
        }
    }
}

/// Property key (string or array index)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Index(u32),
}

impl PropertyKey {
    pub fn from_value(value: &JsValue) -> Self {
        match value {
            JsValue::Number(n) => {
                let idx = *n as u32;
                if idx as f64 == *n && *n >= 0.0 {
                    PropertyKey::Index(idx)
                } else {
                    PropertyKey::String(value.to_js_string())
                }
            }
            JsValue::String(s) => PropertyKey::from(s.cheap_clone()),
            _ => PropertyKey::String(value.to_js_string()),
        }
    }

    pub fn to_js_string(&self) -> JsString {
        match self {
            PropertyKey::String(s) => s.cheap_clone(),
            PropertyKey::Index(i) => JsString::from(i.to_string()),
        }
    }

    /// Check if this key equals a string literal (avoids allocation)
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        match self {
            PropertyKey::String(js_str) => js_str.as_str() == s,
            PropertyKey::Index(_) => false,
        }
    }
}

fn canonical_index(s: &str) -> Option<u32> {
    // Fast path: check first char is a digit before parsing
    let first = s.bytes().next()?;
    if !first.is_ascii_digit() {
        return None;
    }
    let idx = s.parse::<u32>().ok()?;
    // Verify it's canonical (no leading zeros except "0")
    (idx.to_string() == s).then_some(idx)
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(s: &str) -> Self {
        match canonical_index(s) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(JsString::from(s)),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(s: JsString) -> Self {
        match canonical_index(s.as_str()) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(s),
        }
    }
}

impl From<&JsString> for PropertyKey {
    fn from(s: &JsString) -> Self {
        PropertyKey::from(s.cheap_clone())
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        PropertyKey::Index(idx)
    }
}

impl From<usize> for PropertyKey {
    fn from(idx: usize) -> Self {
        match u32::try_from(idx) {
            Ok(i) => PropertyKey::Index(i),
            Err(_) => PropertyKey::String(JsString::from(idx.to_string())),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Storage of a property: a value or an accessor pair
#[derive(Debug, Clone)]
pub enum PropertySlot {
    Data {
        value: JsValue,
        writable: bool,
    },
    Accessor {
        getter: Option<JsObjectRef>,
        setter: Option<JsObjectRef>,
    },
}

/// Object property
#[derive(Debug, Clone)]
pub struct Property {
    pub slot: PropertySlot,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    pub fn data(value: JsValue) -> Self {
        Self::with_attributes(value, true, true, true)
    }

    pub fn data_readonly(value: JsValue) -> Self {
        Self::with_attributes(value, false, true, true)
    }

    /// Create a property with custom attributes
    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            slot: PropertySlot::Data { value, writable },
            enumerable,
            configurable,
        }
    }

    /// Create an accessor property with getter and/or setter
    pub fn accessor(
        getter: Option<JsObjectRef>,
        setter: Option<JsObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            slot: PropertySlot::Accessor { getter, setter },
            enumerable,
            configurable,
        }
    }

    /// Check if this is an accessor property
    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, PropertySlot::Accessor { .. })
    }

    /// Writable flag; accessors are never writable
    pub fn is_writable(&self) -> bool {
        matches!(self.slot, PropertySlot::Data { writable: true, .. })
    }

    /// Stored value of a data property
    pub fn value(&self) -> Option<&JsValue> {
        match &self.slot {
            PropertySlot::Data { value, .. } => Some(value),
            PropertySlot::Accessor { .. } => None,
        }
    }
}

/// Partial property descriptor passed to [[DefineOwnProperty]].
///
/// Absent fields leave the existing attribute untouched (or take the default
/// `false`/`undefined` when the property is created).
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub getter: Option<Option<JsObjectRef>>,
    pub setter: Option<Option<JsObjectRef>>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    pub fn accessor(
        getter: Option<JsObjectRef>,
        setter: Option<JsObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            getter: Some(getter),
            setter: Some(setter),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    /// Descriptor carrying only a new value
    pub fn value_only(value: JsValue) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// Build the property created for an absent key
    pub fn to_property(&self) -> Property {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor_descriptor() {
            Property::accessor(
                self.getter.clone().flatten(),
                self.setter.clone().flatten(),
                enumerable,
                configurable,
            )
        } else {
            Property::with_attributes(
                self.value.clone().unwrap_or_default(),
                self.writable.unwrap_or(false),
                enumerable,
                configurable,
            )
        }
    }
}

impl From<&Property> for PropertyDescriptor {
    fn from(prop: &Property) -> Self {
        match &prop.slot {
            PropertySlot::Data { value, writable } => {
                PropertyDescriptor::data(
                    value.clone(),
                    *writable,
                    prop.enumerable,
                    prop.configurable,
                )
            }
            PropertySlot::Accessor { getter, setter } => PropertyDescriptor::accessor(
                getter.clone(),
                setter.clone(),
                prop.enumerable,
                prop.configurable,
            ),
        }
    }
}

/// Internal state of error objects
#[derive(Debug, Clone)]
pub struct ErrorData {
    /// Constructor name, e.g. `TypeError`
    pub kind: JsString,
    pub message: Option<JsString>,
    /// Native diagnostic: active frames when the error was created, innermost first
    pub frames: Vec<StackElement>,
    /// Set once a `catch` clause has rewritten `frames` into the script-level trace
    pub trace_materialized: bool,
}

/// Live link from arguments indices to the parameter bindings they alias
#[derive(Debug, Clone)]
pub struct ParameterMap {
    /// Variable environment record of the activation
    pub env: EnvironmentRecord,
    /// Mapped index to parameter name
    pub names: FxHashMap<u32, JsString>,
}

impl ParameterMap {
    /// Binding aliased by `key`, if it is still mapped
    pub fn binding(&self, key: &PropertyKey) -> Option<&JsString> {
        match key {
            PropertyKey::Index(index) => self.names.get(index),
            PropertyKey::String(_) => None,
        }
    }

    pub fn unmap(&mut self, key: &PropertyKey) {
        if let PropertyKey::Index(index) = key {
            self.names.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Exotic object behavior
#[derive(Debug)]
pub enum ExoticObject {
    /// Ordinary object
    Ordinary,
    /// Function exotic object
    Function(JsFunction),
    /// Arguments object; mapped indices alias live parameter bindings
    Arguments { parameter_map: Option<ParameterMap> },
    /// Error instance
    Error(ErrorData),
    /// Wrapper produced by ToObject for a primitive `this` or property base
    Primitive(JsValue),
}

/// Native function signature
pub type NativeFn =
    Rc<dyn Fn(&mut ExecutionContext, JsValue, &[JsValue]) -> Result<JsValue, JsError>>;

/// How `construct` allocates the object passed as `this`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPolicy {
    Ordinary,
    /// Error instance of the given constructor kind
    Error(JsString),
}

/// Function representation
#[derive(Debug, Clone)]
pub enum JsFunction {
    /// Function compiled from script code
    Script(ScriptFunction),
    /// Function implemented in Rust
    Native(NativeFunction),
}

impl JsFunction {
    pub fn name(&self) -> Option<&str> {
        match self {
            JsFunction::Script(f) => f.name.as_ref().map(|s| s.as_str()),
            JsFunction::Native(f) => Some(f.name.as_str()),
        }
    }

    /// Strict functions receive `this` unchanged. Native functions follow the
    /// built-in rule and are treated as strict.
    pub fn is_strict(&self) -> bool {
        match self {
            JsFunction::Script(f) => f.strict,
            JsFunction::Native(_) => true,
        }
    }

    pub fn is_constructor(&self) -> bool {
        match self {
            JsFunction::Script(f) => f.constructor,
            JsFunction::Native(f) => f.constructor,
        }
    }

    /// Label used for stack frames and as the last-resort constructor name
    pub fn debug_context(&self) -> JsString {
        match self {
            JsFunction::Script(f) => f.debug_context.cheap_clone(),
            JsFunction::Native(f) => f.name.cheap_clone(),
        }
    }

    pub fn object_policy(&self) -> ObjectPolicy {
        match self {
            JsFunction::Script(_) => ObjectPolicy::Ordinary,
            JsFunction::Native(f) => f.policy.clone(),
        }
    }
}

/// User-defined function
#[derive(Clone)]
pub struct ScriptFunction {
    pub name: Option<JsString>,
    pub formal_parameters: Rc<[JsString]>,
    pub code: Rc<Code>,
    /// The captured scope, shared with every invocation
    pub scope: LexicalEnvironment,
    /// Local slot table of the defining context, parent of each call's slots
    pub captured_vars: Option<VariableValues>,
    pub strict: bool,
    pub file_name: JsString,
    pub debug_context: JsString,
    /// Binding instantiation is folded into the compiled code
    pub resolved: bool,
    pub constructor: bool,
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .field("formal_parameters", &self.formal_parameters)
            .field("strict", &self.strict)
            .field("resolved", &self.resolved)
            .finish()
    }
}

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: usize,
    pub constructor: bool,
    pub policy: ObjectPolicy,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
