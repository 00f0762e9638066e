use std::rc::Rc;

use crate::callable::{Call, Callable, Case, Commands, Entity, Output};
use crate::signature::Parameters;

/// A set of free functions dispatched by name, with no constructor.
///
/// ### Example
/// ```
/// use argbind::{Case, Function, Module, Output, Parameters};
///
/// let tools = Module::new("tools", Case::Insensitive)
///     .about("Assorted tools.")
///     .command(Function::new("ping", Parameters::new(), |_| Ok(Output::value("pong"))));
/// ```
pub struct Module {
    head: Head,
    case: Case,
    prefix: String,
    help: bool,
    commands: Vec<Rc<dyn Callable>>,
}

impl Module {
    pub fn new(name: impl Into<String>, case: Case) -> Self {
        Self {
            head: Head {
                name: name.into(),
                about: None,
            },
            case,
            prefix: String::default(),
            help: true,
            commands: Vec::default(),
        }
    }

    /// Document the module.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.head.about.replace(description.into());
        self
    }

    /// Spell every command as `<prefix><name>` on the command line.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether the commands accept `-h`/`--help` (the default).
    pub fn help(mut self, enabled: bool) -> Self {
        self.help = enabled;
        self
    }

    /// Add a command, named after the callable.
    pub fn command(mut self, callable: impl Callable + 'static) -> Self {
        self.commands.push(Rc::new(callable));
        self
    }
}

// The module itself takes no parameters.
struct Head {
    name: String,
    about: Option<String>,
}

impl Callable for Head {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> Option<String> {
        self.about.clone()
    }

    fn parameters(&self) -> Option<Parameters> {
        Some(Parameters::new())
    }

    fn invoke(&self, _call: Call) -> anyhow::Result<Output> {
        anyhow::bail!("'{}' can only be invoked through one of its commands.", self.name)
    }
}

impl Commands for Module {
    fn names(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.name().to_string())
            .collect()
    }

    fn case(&self) -> Case {
        self.case
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn help(&self) -> bool {
        self.help
    }

    fn resolve(&self, name: &str) -> Option<Rc<dyn Callable>> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .cloned()
    }
}

impl Entity for Module {
    fn head(&self) -> &dyn Callable {
        &self.head
    }

    fn commands(&self) -> Option<&dyn Commands> {
        Some(self)
    }
}
