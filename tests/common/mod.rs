//! Shared fixture context for parser tests.
//!
//! `FixtureContext` is a scripted implementation of the embedder-facing
//! `Context`: tests register the identifiers and type names an expression
//! needs, and value constructors record their arguments so assertions can
//! check how a literal was built.

use std::any::Any;
use std::rc::Rc;

use num_bigint::BigUint;
use rustc_hash::{FxHashMap, FxHashSet};

use dexpr::{BasicType, Context, DebuggerValue, TargetInfo, TypeInfo, TypeRef, Value, ValueRef};

/// Value recorded by the fixture context. Tests downcast through
/// `DebuggerValue::as_any` to inspect how a value was constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Bool(bool),
    NullPointer,
    Integer {
        value: BigUint,
        ty: BasicType,
        is_unsigned: bool,
    },
    Float {
        value: f64,
        ty: BasicType,
    },
    Variable(String),
}

impl DebuggerValue for FixtureValue {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Unwrap the fixture value recorded inside a parsed `Value`.
pub fn fixture_value(value: &Value) -> FixtureValue {
    value
        .inner()
        .as_any()
        .downcast_ref::<FixtureValue>()
        .cloned()
        .expect("value was not created by FixtureContext")
}

/// A type handle with debugger-style derived-type naming: `int` becomes
/// `int *`, `int *` becomes `int **`, `int` becomes `int &`.
#[derive(Debug)]
pub struct FixtureType {
    name: String,
    is_reference: bool,
}

fn derived_name(name: &str, op: char) -> String {
    if name.ends_with('*') || name.ends_with('&') {
        format!("{}{}", name, op)
    } else {
        format!("{} {}", name, op)
    }
}

impl TypeInfo for FixtureType {
    fn is_reference(&self) -> bool {
        self.is_reference
    }

    fn pointer_type(&self) -> TypeRef {
        Rc::new(FixtureType {
            name: derived_name(&self.name, '*'),
            is_reference: false,
        })
    }

    fn reference_type(&self) -> TypeRef {
        Rc::new(FixtureType {
            name: derived_name(&self.name, '&'),
            is_reference: true,
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Scripted context: a symbol table, a type table, and target widths.
pub struct FixtureContext {
    values: FxHashMap<String, FixtureValue>,
    types: FxHashSet<String>,
    target: TargetInfo,
}

impl FixtureContext {
    pub fn new() -> Self {
        FixtureContext {
            values: FxHashMap::default(),
            types: FxHashSet::default(),
            target: TargetInfo::default(),
        }
    }

    /// Register an identifier that resolves to a variable.
    pub fn variable(mut self, name: &str) -> Self {
        self.values
            .insert(name.to_string(), FixtureValue::Variable(name.to_string()));
        self
    }

    /// Register a resolvable type name.
    pub fn type_named(mut self, name: &str) -> Self {
        self.types.insert(name.to_string());
        self
    }

    /// Override the target's integer widths.
    pub fn target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }

    pub fn build(self) -> Rc<dyn Context> {
        Rc::new(self)
    }
}

impl Context for FixtureContext {
    fn lookup_identifier(&self, name: &str) -> Option<ValueRef> {
        self.values
            .get(name)
            .map(|value| Rc::new(value.clone()) as ValueRef)
    }

    fn resolve_type_by_name(&self, name: &str) -> Option<TypeRef> {
        if !self.types.contains(name) {
            return None;
        }
        Some(Rc::new(FixtureType {
            name: name.to_string(),
            is_reference: name.ends_with('&'),
        }))
    }

    fn target_info(&self) -> TargetInfo {
        self.target
    }

    fn value_from_bool(&self, value: bool) -> ValueRef {
        Rc::new(FixtureValue::Bool(value))
    }

    fn value_null_pointer(&self) -> ValueRef {
        Rc::new(FixtureValue::NullPointer)
    }

    fn value_from_integer(&self, value: &BigUint, ty: BasicType, is_unsigned: bool) -> ValueRef {
        Rc::new(FixtureValue::Integer {
            value: value.clone(),
            ty,
            is_unsigned,
        })
    }

    fn value_from_float(&self, value: f64, ty: BasicType) -> ValueRef {
        Rc::new(FixtureValue::Float { value, ty })
    }
}

/// A context covering the common test vocabulary: single-letter variables,
/// a few builtin type names, and `this`.
pub fn scenario_context() -> Rc<dyn Context> {
    FixtureContext::new()
        .variable("a")
        .variable("b")
        .variable("c")
        .variable("d")
        .variable("e")
        .variable("f")
        .variable("g")
        .variable("p")
        .variable("x")
        .variable("foo")
        .variable("this")
        .type_named("int")
        .type_named("unsigned int")
        .type_named("long")
        .type_named("unsigned long")
        .type_named("long long")
        .type_named("short")
        .type_named("char")
        .type_named("bool")
        .type_named("float")
        .type_named("double")
        .type_named("void")
        .build()
}
