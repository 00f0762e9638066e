use std::collections::BTreeSet;
use std::ops::Index;
use std::rc::Rc;

use argbind_engine::{ConsoleInterface, Parsed, Rule, Selection, UserInterface};

use crate::callable::{Call, Case, Entity, Output};
use crate::config::Config;
use crate::error::{DispatchError, Error};
use crate::grammar::Grammar;
use crate::signature::Signature;
use crate::{Value, Values};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The parse result of a dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    /// The values by parameter name, including defaults.
    pub values: Values,
    /// The name of the selected command, without its prefix.
    pub command: Option<String>,
    /// The name of the callable that was invoked.
    pub target: Option<String>,
    /// The parameters actually given on the command line.
    pub supplied: BTreeSet<String>,
    /// Unrecognized tokens (lenient mode).
    pub extras: Vec<String>,
    /// Accumulated error messages (suppressed mode).
    pub errors: Vec<String>,
}

impl Namespace {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn new(parsed: Parsed) -> (Self, Selection) {
        let Parsed {
            values,
            selection,
            supplied,
            extras,
            errors,
        } = parsed;
        let command = match &selection {
            Selection::Command(name) => Some(name.clone()),
            Selection::Nothing | Selection::Unknown(_) => None,
        };
        let namespace = Namespace {
            values,
            command,
            target: None,
            supplied,
            extras,
            errors,
        };
        (namespace, selection)
    }
}

impl Index<&str> for Namespace {
    type Output = Value;

    fn index(&self, name: &str) -> &Self::Output {
        self.values
            .get(name)
            .unwrap_or_else(|| panic!("no value for '{name}'"))
    }
}

type NotFound = Box<dyn Fn(&str) -> anyhow::Result<Output>>;

/// Parses command line tokens against an entity and invokes the selected callable.
///
/// ### Example
/// ```
/// use argbind::{Config, Dispatcher, Function, Output, Parameters, Value};
///
/// let add = Function::new("add", Parameters::new().required("a").required("b"), |call| {
///     Ok(Output::value(format!("{}{}", call.args[0], call.args[1])))
/// });
/// let dispatcher = Dispatcher::new(Config::new("add"));
/// let (_, output) = dispatcher.call(&add, &["1", "2"]).unwrap();
/// assert_eq!(output.collect(), Value::from("12"));
/// ```
pub struct Dispatcher {
    config: Config,
    not_found: Option<NotFound>,
    user_interface: Rc<dyn UserInterface>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(Config::default())
    }
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            not_found: None,
            user_interface: Rc::new(ConsoleInterface::default()),
        }
    }

    /// Handle a command token which names no command.
    /// By default, the dispatch fails with [`DispatchError::NotFound`].
    pub fn not_found(
        mut self,
        handler: impl Fn(&str) -> anyhow::Result<Output> + 'static,
    ) -> Self {
        self.not_found.replace(Box::new(handler));
        self
    }

    /// Replace the console as the destination of help and error output.
    pub fn interface(mut self, user_interface: Rc<dyn UserInterface>) -> Self {
        self.user_interface = user_interface;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse `tokens` against `entity` and invoke the selected callable.
    ///
    /// Lazy results are collected into a list, unless configured as greedy.
    /// Help and parse errors (already reported through the user interface) come back as [`Error::Exit`].
    pub fn call(&self, entity: &dyn Entity, tokens: &[&str]) -> Result<(Namespace, Output), Error> {
        let grammar = self.grammar(entity, &self.config, &[])?;
        self.dispatch(&grammar, tokens)
    }

    /// Dispatch the process's own arguments, exiting the process on any failure.
    pub fn run(&self, entity: &dyn Entity) -> Output {
        let arguments: Vec<String> = std::env::args().skip(1).collect();
        let tokens: Vec<&str> = arguments.iter().map(String::as_str).collect();

        match self.call(entity, &tokens) {
            Ok((_, output)) => output,
            Err(Error::Exit(code)) => std::process::exit(code),
            Err(error) => {
                self.user_interface.print_error(error.to_string());
                std::process::exit(error.exit_code());
            }
        }
    }

    pub(crate) fn grammar<'a>(
        &self,
        entity: &'a dyn Entity,
        config: &Config,
        extra: &[Rule],
    ) -> Result<Grammar<'a>, Error> {
        Grammar::build_with(entity, config, self.user_interface.clone(), extra)
    }

    pub(crate) fn dispatch(
        &self,
        grammar: &Grammar,
        tokens: &[&str],
    ) -> Result<(Namespace, Output), Error> {
        let (namespace, selection) = self.parse(grammar, tokens)?;
        self.execute(grammar, namespace, selection)
    }

    /// Parse without invoking anything.
    pub(crate) fn parse(
        &self,
        grammar: &Grammar,
        tokens: &[&str],
    ) -> Result<(Namespace, Selection), Error> {
        let mut tokens: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();

        if !grammar.commands.is_empty() {
            let names = grammar.command_names();
            extract_command(&mut tokens, &names, grammar.case)?;
        }

        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let parsed = grammar.parser.parse_tokens(&tokens).map_err(Error::Exit)?;
        Ok(Namespace::new(parsed))
    }

    pub(crate) fn execute(
        &self,
        grammar: &Grammar,
        mut namespace: Namespace,
        selection: Selection,
    ) -> Result<(Namespace, Output), Error> {
        let mut call = Call::default();
        seed(&grammar.head, &mut namespace.values);
        reconstruct(&grammar.head, &namespace.values, &mut call);

        let output = match selection {
            Selection::Nothing if grammar.commands.is_empty() => {
                namespace.target.replace(grammar.target.name().to_string());
                invoke_logged(grammar.target.name(), || grammar.target.invoke(call))?
            }
            // Only reachable when suppressing errors.
            Selection::Nothing => Output::default(),
            Selection::Command(name) => {
                let command = grammar
                    .command(&name)
                    .expect("internal error - the parser only selects registered commands");
                seed(&command.signature, &mut namespace.values);
                reconstruct(&command.signature, &namespace.values, &mut call);
                namespace.command.replace(command.name.clone());
                namespace.target.replace(command.name.clone());
                invoke_logged(&command.name, || command.callable.invoke(call))?
            }
            Selection::Unknown(token) => match &self.not_found {
                Some(handler) => handler(&token)?,
                None if self.config.suppress_errors => {
                    namespace
                        .errors
                        .push(format!("Dispatch error: {}", DispatchError::NotFound(token)));
                    Output::default()
                }
                None => return Err(DispatchError::NotFound(token).into()),
            },
        };

        let output = if self.config.greedy {
            output
        } else {
            Output::Value(output.collect())
        };

        Ok((namespace, output))
    }
}

fn invoke_logged(
    name: &str,
    invoke: impl FnOnce() -> anyhow::Result<Output>,
) -> Result<Output, Error> {
    #[cfg(feature = "tracing_debug")]
    {
        debug!("Invoking '{name}'.");
    }
    #[cfg(not(feature = "tracing_debug"))]
    let _ = name;

    Ok(invoke()?)
}

// A named parameter the parse left unset (a failed conversion, when suppressing errors) is `Null`.
fn seed(signature: &Signature, values: &mut Values) {
    for name in signature.names() {
        values.entry(name.clone()).or_insert(Value::Null);
    }
}

/// Append the parsed values for `signature` onto `call`: named in order, then the collected variadics.
/// Keyword entries already on the call are overwritten.
fn reconstruct(signature: &Signature, values: &Values, call: &mut Call) {
    for name in signature.names() {
        call.args
            .push(values.get(name).cloned().unwrap_or(Value::Null));
    }

    if let Some(Value::List(items)) = signature.varargs().and_then(|name| values.get(name)) {
        call.varargs.extend(items.iter().cloned());
    }

    if let Some(Value::Map(entries)) = signature.varkw().and_then(|name| values.get(name)) {
        call.kwargs
            .extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Find the first bare token naming a command, and rewrite it to the canonical name.
///
/// Tokens which name no command are passed over.
pub(crate) fn extract_command(
    tokens: &mut [String],
    names: &[&str],
    case: Case,
) -> Result<Option<String>, DispatchError> {
    for token in tokens.iter_mut().filter(|token| !token.starts_with('-')) {
        if let Some(name) = match_command(token, names, case)? {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Matched command token '{token}' to '{name}'.");
            }

            *token = name.clone();
            return Ok(Some(name));
        }
    }

    Ok(None)
}

/// Match a token to a command: exactly first, then by unique prefix.
pub(crate) fn match_command(
    token: &str,
    names: &[&str],
    case: Case,
) -> Result<Option<String>, DispatchError> {
    let fold = |value: &str| match case {
        Case::Sensitive => value.to_string(),
        Case::Insensitive => value.to_uppercase(),
    };
    let needle = fold(token);

    if let Some(exact) = names.iter().find(|name| fold(**name) == needle) {
        return Ok(Some(exact.to_string()));
    }

    let mut matches: Vec<String> = names
        .iter()
        .filter(|name| fold(**name).starts_with(&needle))
        .map(|name| name.to_string())
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(DispatchError::Ambiguous {
            token: token.to_string(),
            matches,
        }),
    }
}

/// Dispatch `tokens` against `entity`, with the default configuration.
pub fn call(entity: &dyn Entity, tokens: &[&str]) -> Result<(Namespace, Output), Error> {
    Dispatcher::default().call(entity, tokens)
}

/// Dispatch the process's own arguments against `entity`, with the default configuration.
pub fn run(entity: &dyn Entity) -> Output {
    Dispatcher::default().run(entity)
}
