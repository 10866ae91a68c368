//! Embedder-facing resolution context
//!
//! The parser's only external dependency besides the source text is the
//! [`Context`]: the debugger-side symbol and type resolver. It is created by
//! the embedder before the first parse and passed to every [`Parser`] by
//! shared ownership; the parser performs only read-like queries against it
//! (name lookup, type resolution) plus value construction for literals.
//!
//! Type and value handles are opaque trait objects. The parser never looks
//! inside a [`ValueRef`]; it only needs the handful of [`TypeInfo`] queries
//! used while applying declarators to a cast type.
//!
//! [`Parser`]: crate::parser::parse::Parser

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigUint;

/// Concrete arithmetic types a literal can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
}

impl BasicType {
    /// True for the unsigned integer types.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BasicType::UnsignedInt | BasicType::UnsignedLong | BasicType::UnsignedLongLong
        )
    }
}

/// Integer widths of the debug target, in bits.
///
/// Integer-literal type selection depends on these; they come from the
/// context's target description rather than from the host's C model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub int_width: u32,
    pub long_width: u32,
    pub long_long_width: u32,
}

impl Default for TargetInfo {
    /// The common LP64 model: 32-bit `int`, 64-bit `long` and `long long`.
    fn default() -> Self {
        TargetInfo {
            int_width: 32,
            long_width: 64,
            long_long_width: 64,
        }
    }
}

/// A type handle from the debugger's type system.
pub trait TypeInfo: fmt::Debug {
    /// True if this is a reference type (`T&`).
    fn is_reference(&self) -> bool;

    /// The pointer type for this type, e.g. `int*` for `int`.
    fn pointer_type(&self) -> TypeRef;

    /// The reference type for this type, e.g. `int&` for `int`.
    fn reference_type(&self) -> TypeRef;

    /// The type's display name, e.g. `int *`.
    fn name(&self) -> String;
}

/// Shared handle to an embedder type.
pub type TypeRef = Rc<dyn TypeInfo>;

/// An opaque value handle produced by the context.
///
/// `as_any` lets the embedder downcast handles back to its own value type
/// when it evaluates the AST.
pub trait DebuggerValue: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an embedder value.
pub type ValueRef = Rc<dyn DebuggerValue>;

/// A resolved value plus its value category.
///
/// Literals and `this` are rvalues; named identifiers are lvalues.
#[derive(Debug, Clone)]
pub struct Value {
    inner: ValueRef,
    is_rvalue: bool,
}

impl Value {
    pub fn lvalue(inner: ValueRef) -> Self {
        Value {
            inner,
            is_rvalue: false,
        }
    }

    pub fn rvalue(inner: ValueRef) -> Self {
        Value {
            inner,
            is_rvalue: true,
        }
    }

    pub fn inner(&self) -> &ValueRef {
        &self.inner
    }

    pub fn is_rvalue(&self) -> bool {
        self.is_rvalue
    }
}

/// The debugger-side symbol and type resolver.
pub trait Context {
    /// Resolve a (possibly qualified) name to a value. `this` is looked up
    /// through here as well. `None` means "not found".
    fn lookup_identifier(&self, name: &str) -> Option<ValueRef>;

    /// Resolve a base type name (no declarators) to a type handle. `None`
    /// means the name does not denote a type.
    fn resolve_type_by_name(&self, name: &str) -> Option<TypeRef>;

    /// Integer widths of the debug target.
    fn target_info(&self) -> TargetInfo;

    /// Construct a boolean value.
    fn value_from_bool(&self, value: bool) -> ValueRef;

    /// Construct the null pointer constant (`nullptr`).
    fn value_null_pointer(&self) -> ValueRef;

    /// Construct an integer value of the given basic type.
    fn value_from_integer(&self, value: &BigUint, ty: BasicType, is_unsigned: bool) -> ValueRef;

    /// Construct a floating-point value of the given basic type. For
    /// `BasicType::Float` the value has already been rounded to IEEE single.
    fn value_from_float(&self, value: f64, ty: BasicType) -> ValueRef;
}
