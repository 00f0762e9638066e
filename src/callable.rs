use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::binding::Arguments;
use crate::signature::Parameters;
use crate::Value;

/// A reconstructed invocation: the positional values in call order, the variadic values, and the keyword values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    pub args: Vec<Value>,
    pub varargs: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl Call {
    /// The positional value at `index`, if any.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Split off the first `count` positional values into a call of their own.
    /// The remainder keeps the variadic and keyword values.
    pub(crate) fn split_prefix(mut self, count: usize) -> (Vec<Value>, Call) {
        let rest = self.args.split_off(std::cmp::min(count, self.args.len()));
        let prefix = std::mem::replace(&mut self.args, rest);
        (prefix, self)
    }
}

/// The result of an invocation: a single value, or a lazy single-pass sequence of values.
pub enum Output {
    Value(Value),
    Lazy(Box<dyn Iterator<Item = Value>>),
}

impl Default for Output {
    fn default() -> Self {
        Output::Value(Value::Null)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Output::Lazy(_) => f.debug_tuple("Lazy").finish(),
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Output::Value(value)
    }
}

impl Output {
    /// A single value result.
    pub fn value(value: impl Into<Value>) -> Self {
        Output::Value(value.into())
    }

    /// A lazy result, pulled one element at a time.
    pub fn lazy(items: impl Iterator<Item = Value> + 'static) -> Self {
        Output::Lazy(Box::new(items))
    }

    /// Drain a lazy result into a `Value::List`; a single value is returned as is.
    pub fn collect(self) -> Value {
        match self {
            Output::Value(value) => value,
            Output::Lazy(items) => Value::List(items.collect()),
        }
    }

    /// The elements of the result: a list element by element, anything else (including strings) once.
    pub fn into_items(self) -> Box<dyn Iterator<Item = Value>> {
        match self {
            Output::Value(Value::List(items)) => Box::new(items.into_iter()),
            Output::Value(value) => Box::new(std::iter::once(value)),
            Output::Lazy(items) => items,
        }
    }
}

/// Something with a declared parameter list that can be invoked with a [`Call`].
pub trait Callable {
    /// The name of the callable, used in diagnostics.
    fn name(&self) -> &str;

    /// The description shown in the help (and in the command list, for commands).
    fn about(&self) -> Option<String> {
        None
    }

    /// The declared parameters, in call order.
    /// `None` when the callable cannot describe its own shape.
    fn parameters(&self) -> Option<Parameters> {
        None
    }

    fn invoke(&self, call: Call) -> anyhow::Result<Output>;
}

/// The named commands of a multi-command entity.
pub trait Commands {
    /// The command names, in declaration order.
    fn names(&self) -> Vec<String>;

    /// Whether command names are matched exactly, or ignoring case.
    fn case(&self) -> Case;

    /// Spelled before every command name on the command line (ex: `do-` for `do-search`).
    fn prefix(&self) -> &str {
        ""
    }

    /// Whether the commands accept `-h`/`--help`.
    fn help(&self) -> bool {
        true
    }

    fn is_command(&self, name: &str) -> bool {
        self.names().iter().any(|command| command == name)
    }

    /// The callable behind a declared command; `None` for anything else.
    fn resolve(&self, name: &str) -> Option<Rc<dyn Callable>>;
}

/// Case sensitivity of command name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

/// What a dispatcher drives: a single callable, or the head of a set of commands.
pub trait Entity {
    /// The callable whose parameters form the top level of the grammar.
    /// For a set of commands, these are the constructor parameters.
    fn head(&self) -> &dyn Callable;

    fn commands(&self) -> Option<&dyn Commands> {
        None
    }
}

type Body = Box<dyn Fn(Call) -> anyhow::Result<Output>>;

/// A free function (or closure) with its declared parameters.
///
/// ### Example
/// ```
/// use argbind::{Function, Output, Parameters};
///
/// let greet = Function::new("greet", Parameters::new().required("name"), |call| {
///     Ok(Output::value(format!("Hello, {}!", call.args[0])))
/// });
/// ```
pub struct Function {
    name: String,
    about: Option<String>,
    parameters: Parameters,
    body: Body,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        parameters: Parameters,
        body: impl Fn(Call) -> anyhow::Result<Output> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            about: None,
            parameters,
            body: Box::new(body),
        }
    }

    /// A function whose parameters come from an [`Arguments`] struct, bound before the body runs.
    pub fn typed<A: Arguments>(
        name: impl Into<String>,
        body: impl Fn(A) -> anyhow::Result<Output> + 'static,
    ) -> Self {
        Function::new(name, A::parameters(), move |call| body(A::from_call(call)?))
    }

    /// Document the function.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> Option<String> {
        self.about.clone()
    }

    fn parameters(&self) -> Option<Parameters> {
        Some(self.parameters.clone())
    }

    fn invoke(&self, call: Call) -> anyhow::Result<Output> {
        (self.body)(call)
    }
}

impl Entity for Function {
    fn head(&self) -> &dyn Callable {
        self
    }
}
