use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::callable::{Call, Callable, Case, Commands, Entity, Output};
use crate::signature::Parameters;
use crate::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A type exposing a fixed set of named commands, constructed from its own (constructor) parameters.
///
/// ### Example
/// ```
/// use argbind::{Call, Case, CommandSet, Output, Parameters, Registry};
///
/// struct Catalog {
///     root: String,
/// }
///
/// impl CommandSet for Catalog {
///     fn name() -> &'static str {
///         "catalog"
///     }
///
///     fn commands() -> &'static [&'static str] {
///         &["search"]
///     }
///
///     fn case() -> Case {
///         Case::Sensitive
///     }
///
///     fn constructor() -> Parameters {
///         Parameters::new().optional("root", ".")
///     }
///
///     fn construct(call: Call) -> anyhow::Result<Self> {
///         Ok(Catalog { root: call.args[0].to_string() })
///     }
///
///     fn parameters(_command: &str) -> Parameters {
///         Parameters::new().required("term")
///     }
///
///     fn invoke(&mut self, _command: &str, call: Call) -> anyhow::Result<Output> {
///         Ok(Output::value(format!("{}: {}", self.root, call.args[0])))
///     }
/// }
///
/// let registry = Registry::<Catalog>::new();
/// ```
pub trait CommandSet: Sized + 'static {
    fn name() -> &'static str;

    /// The declared command names.
    fn commands() -> &'static [&'static str];

    fn case() -> Case;

    /// Spelled before every command name on the command line.
    fn prefix() -> &'static str {
        ""
    }

    /// Whether the commands accept `-h`/`--help`.
    fn help() -> bool {
        true
    }

    fn about() -> Option<String> {
        None
    }

    /// The constructor parameters; these may not be variadic.
    fn constructor() -> Parameters {
        Parameters::new()
    }

    fn construct(call: Call) -> anyhow::Result<Self>;

    /// The parameters of a declared command.
    fn parameters(command: &str) -> Parameters;

    /// The description of a declared command.
    fn describe(_command: &str) -> Option<String> {
        None
    }

    /// Run a declared command on this instance.
    fn invoke(&mut self, command: &str, call: Call) -> anyhow::Result<Output>;

    /// Acquire the instance before a command runs.
    fn enter(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release the instance after a command has run, whether it succeeded or not.
    fn exit(&mut self) {}

    /// Anything reachable by name that is not a command.
    fn static_member(_name: &str) -> Option<Value> {
        None
    }
}

type Instances<T> = RefCell<HashMap<Vec<Value>, Rc<RefCell<T>>>>;
type Specs = RefCell<HashMap<String, Rc<Parameters>>>;

/// Lazily materializes one instance per distinct constructor-argument tuple, and resolves commands against them.
///
/// Not thread safe: the caches are behind a `RefCell`.
pub struct Registry<T: CommandSet> {
    instances: Rc<Instances<T>>,
    specs: Rc<Specs>,
    head: Constructor<T>,
}

impl<T: CommandSet> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CommandSet> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            instances: self.instances.clone(),
            specs: self.specs.clone(),
            head: Constructor(PhantomData),
        }
    }
}

impl<T: CommandSet> Registry<T> {
    pub fn new() -> Self {
        Self {
            instances: Rc::new(RefCell::new(HashMap::default())),
            specs: Rc::new(RefCell::new(HashMap::default())),
            head: Constructor(PhantomData),
        }
    }

    /// Whether `name` is one of the declared commands (exact match).
    pub fn is_command(&self, name: &str) -> bool {
        T::commands().contains(&name)
    }

    /// The declared command `name`, bound to this registry.
    pub fn resolve(&self, name: &str) -> Option<BoundCommand<T>> {
        if self.is_command(name) {
            let parameters = self
                .specs
                .borrow_mut()
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(T::parameters(name)))
                .clone();

            Some(BoundCommand {
                registry: self.clone(),
                command: name.to_string(),
                parameters,
            })
        } else {
            None
        }
    }

    /// Names that are not commands pass through to the type.
    pub fn static_member(&self, name: &str) -> Option<Value> {
        T::static_member(name)
    }

    /// How many distinct instances have been constructed.
    pub fn instance_count(&self) -> usize {
        self.instances.borrow().len()
    }

    fn instance(&self, key: Vec<Value>) -> anyhow::Result<Rc<RefCell<T>>> {
        if let Some(instance) = self.instances.borrow().get(&key) {
            return Ok(instance.clone());
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Constructing '{}' from {key:?}.", T::name());
        }

        let instance = Rc::new(RefCell::new(T::construct(Call {
            args: key.clone(),
            ..Call::default()
        })?));
        self.instances.borrow_mut().insert(key, instance.clone());
        Ok(instance)
    }

    fn invoke(&self, command: &str, call: Call) -> anyhow::Result<Output> {
        let (key, rest) = call.split_prefix(T::constructor().arity());
        let instance = self.instance(key)?;
        instance.borrow_mut().enter()?;
        let scope = Scope {
            instance: instance.clone(),
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Entered '{}' for '{command}'.", T::name());
        }

        let result = {
            let mut borrowed = instance.borrow_mut();
            borrowed.invoke(command, rest)
        };
        let output = result?;
        Ok(Output::lazy(Scoped {
            items: output.into_items(),
            _scope: scope,
        }))
    }
}

// Exits the instance exactly once, when dropped.
struct Scope<T: CommandSet> {
    instance: Rc<RefCell<T>>,
}

impl<T: CommandSet> Drop for Scope<T> {
    fn drop(&mut self) {
        if let Ok(mut instance) = self.instance.try_borrow_mut() {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Exiting '{}'.", T::name());
            }

            instance.exit();
        }
    }
}

// Holds the instance's scope open until the result is exhausted (or dropped).
struct Scoped<T: CommandSet> {
    items: Box<dyn Iterator<Item = Value>>,
    _scope: Scope<T>,
}

impl<T: CommandSet> Iterator for Scoped<T> {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

/// A declared command bound to its registry.
/// Invoked with the constructor values first, followed by the command's own.
pub struct BoundCommand<T: CommandSet> {
    registry: Registry<T>,
    command: String,
    parameters: Rc<Parameters>,
}

impl<T: CommandSet> Callable for BoundCommand<T> {
    fn name(&self) -> &str {
        &self.command
    }

    fn about(&self) -> Option<String> {
        T::describe(&self.command)
    }

    fn parameters(&self) -> Option<Parameters> {
        Some(self.parameters.as_ref().clone())
    }

    fn invoke(&self, call: Call) -> anyhow::Result<Output> {
        self.registry.invoke(&self.command, call)
    }
}

// The head of a registry: declares the constructor parameters.
struct Constructor<T>(PhantomData<T>);

impl<T: CommandSet> Callable for Constructor<T> {
    fn name(&self) -> &str {
        T::name()
    }

    fn about(&self) -> Option<String> {
        T::about()
    }

    fn parameters(&self) -> Option<Parameters> {
        Some(T::constructor())
    }

    fn invoke(&self, _call: Call) -> anyhow::Result<Output> {
        anyhow::bail!("'{}' can only be invoked through one of its commands.", T::name())
    }
}

impl<T: CommandSet> Commands for Registry<T> {
    fn names(&self) -> Vec<String> {
        T::commands().iter().map(|name| name.to_string()).collect()
    }

    fn case(&self) -> Case {
        T::case()
    }

    fn prefix(&self) -> &str {
        T::prefix()
    }

    fn help(&self) -> bool {
        T::help()
    }

    fn is_command(&self, name: &str) -> bool {
        Registry::is_command(self, name)
    }

    fn resolve(&self, name: &str) -> Option<Rc<dyn Callable>> {
        Registry::resolve(self, name).map(|bound| Rc::new(bound) as Rc<dyn Callable>)
    }
}

impl<T: CommandSet> Entity for Registry<T> {
    fn head(&self) -> &dyn Callable {
        &self.head
    }

    fn commands(&self) -> Option<&dyn Commands> {
        Some(self)
    }
}
