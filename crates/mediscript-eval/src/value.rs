//! Runtime values.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use mediscript_types::ast::Stmt;
use mediscript_types::ensure_sufficient_stack;

use crate::env::Scope;
use crate::error::EvalResult;

/// Nested arrays and instances are elided past this depth when displayed,
/// which also keeps self-referencing instances printable.
const DISPLAY_DEPTH: usize = 16;

/// A MediScript runtime value.
#[derive(Clone)]
pub enum Value {
    /// Result of a call that ends without `finished`.
    Nil,
    Number(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    /// A user function declared with `diagnose`.
    Function(Rc<Function>),
    /// A function read from an instance member; calling it binds `self`.
    Method {
        receiver: Rc<RefCell<Instance>>,
        function: Rc<Function>,
    },
    /// A built-in supplied by the host.
    Native(Rc<NativeFunction>),
    /// A `patient` definition. Calling it constructs an instance positionally.
    Struct(Rc<StructDef>),
    /// A shared, mutable `patient` instance.
    Instance(Rc<RefCell<Instance>>),
}

impl Value {
    /// The user-facing name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Function(_) | Value::Method { .. } | Value::Native(_) => "function",
            Value::Struct(_) => "patient",
            Value::Instance(_) => "instance",
        }
    }

    /// Wrap a freshly built instance.
    pub fn instance(def: Rc<StructDef>, values: Vec<Value>) -> Value {
        Value::Instance(Rc::new(RefCell::new(Instance { def, values })))
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize, nested: bool) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) if nested => write!(f, "{s:?}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(_) | Value::Instance(_) if depth >= DISPLAY_DEPTH => f.write_str("..."),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write(f, depth + 1, true)?;
                }
                f.write_str("]")
            }
            Value::Function(func) => write!(f, "<diagnose {}>", func.name),
            Value::Method { function, .. } => write!(f, "<diagnose {}>", function.name),
            Value::Native(native) => write!(f, "<builtin {}>", native.name),
            Value::Struct(def) => write!(f, "<patient {}>", def.name),
            Value::Instance(instance) => {
                let instance = instance.borrow();
                write!(f, "{}(", instance.def.name)?;
                for (i, (member, value)) in instance.members().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}: ")?;
                    value.write(f, depth + 1, true)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Value {
    /// Top-level strings print raw; strings nested in arrays or instances
    /// are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0, false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({s:?})"),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

impl PartialEq for Value {
    /// Value equality: scalars and arrays by content, instances member-wise
    /// when they share a definition, callables by identity. Values of
    /// different types are never equal.
    ///
    /// Instances may refer to themselves. A pair of instances already under
    /// comparison further up counts as equal, so cyclic structures compare
    /// in finite time.
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut HashSet::new())
    }
}

/// Instance pairs currently being compared.
type InstancePairs = HashSet<(*const RefCell<Instance>, *const RefCell<Instance>)>;

fn values_equal(a: &Value, b: &Value, comparing: &mut InstancePairs) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y, comparing))
        }
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (
            Value::Method {
                receiver: ra,
                function: fa,
            },
            Value::Method {
                receiver: rb,
                function: fb,
            },
        ) => Rc::ptr_eq(ra, rb) && Rc::ptr_eq(fa, fb),
        (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
        (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => instances_equal(a, b, comparing),
        _ => false,
    }
}

fn instances_equal(
    a: &Rc<RefCell<Instance>>,
    b: &Rc<RefCell<Instance>>,
    comparing: &mut InstancePairs,
) -> bool {
    if Rc::ptr_eq(a, b) {
        return true;
    }
    let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
    let (ia, ib) = (a.borrow(), b.borrow());
    if !Rc::ptr_eq(&ia.def, &ib.def) {
        return false;
    }
    if !comparing.insert(pair) {
        return true;
    }
    let equal = ensure_sufficient_stack(|| {
        ia.values
            .iter()
            .zip(&ib.values)
            .all(|(x, y)| values_equal(x, y, comparing))
    });
    comparing.remove(&pair);
    equal
}

// ══════════════════════════════════════════════════════════════════════════════
// Callables & patients
// ══════════════════════════════════════════════════════════════════════════════

/// A user-defined function and the frame it closes over.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    /// The frame the declaration ran in.
    pub closure: Scope,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

type NativeFn = dyn Fn(Vec<Value>) -> EvalResult<Value>;

/// A host-supplied built-in.
pub struct NativeFunction {
    pub name: String,
    /// Fixed argument count, or `None` for variadic built-ins.
    pub arity: Option<usize>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: Option<usize>,
        func: impl Fn(Vec<Value>) -> EvalResult<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Box::new(func),
        }
    }

    /// Invoke the built-in. Arity is checked by the caller.
    pub fn invoke(&self, args: Vec<Value>) -> EvalResult<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A `patient` definition: its name and member names in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<String>,
}

impl StructDef {
    /// Position of `member` in the declaration.
    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}

/// An instance of a `patient`. `values[i]` belongs to `def.members[i]`.
#[derive(Debug)]
pub struct Instance {
    pub def: Rc<StructDef>,
    pub values: Vec<Value>,
}

impl Instance {
    pub fn get(&self, member: &str) -> Option<&Value> {
        self.def.member_index(member).and_then(|i| self.values.get(i))
    }

    /// Overwrite a declared member. Returns `false` if it is not declared.
    pub fn set(&mut self, member: &str, value: Value) -> bool {
        match self.def.member_index(member).and_then(|i| self.values.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Member names and values in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.def
            .members
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
