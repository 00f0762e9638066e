use argbind_engine::{Rule, Selection};

use crate::callable::{Entity, Output};
use crate::config::Config;
use crate::dispatch::{Dispatcher, Namespace};
use crate::error::Error;
use crate::metadata::{Kind, Metadata};
use crate::naming::to_cli;
use crate::signature::Signature;
use crate::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const MODE_DEST: &str = "_wizard_";

/// Asks for the value of one parameter.
///
/// Receives the parameter name, its metadata and its effective default.
pub trait Prompt {
    fn ask(&self, name: &str, metadata: &Metadata, default: Option<&Value>) -> anyhow::Result<Value>;
}

impl<F> Prompt for F
where
    F: Fn(&str, &Metadata, Option<&Value>) -> anyhow::Result<Value>,
{
    fn ask(&self, name: &str, metadata: &Metadata, default: Option<&Value>) -> anyhow::Result<Value> {
        self(name, metadata, default)
    }
}

/// A dispatch which may first fill in the parameters through a [`Prompt`].
///
/// In wizard mode every parameter is asked for, except the positionals already supplied on the command line.
/// The answers are serialized back into tokens and dispatched as usual.
///
/// ### Example
/// ```
/// use argbind::{Config, Function, Metadata, Output, Parameters, Value, Wizard};
///
/// let greet = Function::new("greet", Parameters::new().required("name"), |call| {
///     Ok(Output::value(format!("hello {}", call.args[0])))
/// });
/// let prompt = |_: &str, _: &Metadata, _: Option<&Value>| -> anyhow::Result<Value> { Ok(Value::from("world")) };
/// let (_, output) = Wizard::new(Config::new("greet"))
///     .call(&greet, &prompt, &[])
///     .unwrap();
/// assert_eq!(output.collect(), Value::from("hello world"));
/// ```
pub struct Wizard {
    dispatcher: Dispatcher,
    by_default: bool,
    short: Option<char>,
    long: Option<String>,
}

impl Default for Wizard {
    fn default() -> Self {
        Wizard::with(Dispatcher::default())
    }
}

impl Wizard {
    pub fn new(config: Config) -> Self {
        Wizard::with(Dispatcher::new(config))
    }

    /// Wrap a configured dispatcher (interface, not-found handler).
    pub fn with(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            by_default: true,
            short: None,
            long: None,
        }
    }

    /// Whether wizard mode applies unless switched off (the default), or only when switched on.
    pub fn by_default(mut self, wizard: bool) -> Self {
        self.by_default = wizard;
        self
    }

    /// Override the names of the mode switch.
    pub fn switch(mut self, short: char, long: impl Into<String>) -> Self {
        self.short.replace(short);
        self.long.replace(long.into());
        self
    }

    fn switch_rule(&self) -> Rule {
        let (short, long, help) = if self.by_default {
            ('W', "non-wizard", "Skip the wizard, taking the arguments as given.")
        } else {
            ('w', "wizard", "Ask for the arguments through the wizard.")
        };

        Rule::switch(
            MODE_DEST,
            self.long.clone().unwrap_or_else(|| long.to_string()),
            Some(self.short.unwrap_or(short)),
        )
        .help(help)
    }

    /// Dispatch `tokens` against `entity`, asking `prompt` for the parameters in wizard mode.
    pub fn call(
        &self,
        entity: &dyn Entity,
        prompt: &dyn Prompt,
        tokens: &[&str],
    ) -> Result<(Namespace, Output), Error> {
        let switch = [self.switch_rule()];
        let config = self.dispatcher.config();
        let survey_config = config.clone().suppress_errors(true).lenient(true);
        let survey = self.dispatcher.grammar(entity, &survey_config, &switch)?;
        let (namespace, selection) = self.dispatcher.parse(&survey, tokens)?;
        let toggled = namespace
            .get(MODE_DEST)
            .map(Value::is_truthy)
            .unwrap_or(false);
        let grammar = self.dispatcher.grammar(entity, config, &switch)?;

        let result = if self.by_default == toggled {
            self.dispatcher.dispatch(&grammar, tokens)
        } else {
            let mut synthetic = Vec::default();
            serialize(&survey.head, &namespace, prompt, &mut synthetic)?;

            match &selection {
                Selection::Command(name) => {
                    let command = survey
                        .command(name)
                        .expect("internal error - the parser only selects registered commands");
                    synthetic.push(name.clone());
                    serialize(&command.signature, &namespace, prompt, &mut synthetic)?;
                }
                Selection::Unknown(token) => synthetic.push(token.clone()),
                Selection::Nothing => {}
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Replaying wizard answers {synthetic:?}.");
            }

            let synthetic: Vec<&str> = synthetic.iter().map(String::as_str).collect();
            self.dispatcher.dispatch(&grammar, &synthetic)
        };

        result.map(|(mut namespace, output)| {
            namespace.values.remove(MODE_DEST);
            namespace.supplied.remove(MODE_DEST);
            (namespace, output)
        })
    }
}

/// Append the tokens for `signature`: asked or kept named parameters first, then the supplied variadics.
fn serialize(
    signature: &Signature,
    namespace: &Namespace,
    prompt: &dyn Prompt,
    tokens: &mut Vec<String>,
) -> Result<(), Error> {
    for (name, default) in signature.parameters() {
        let metadata = signature.metadata(name);
        let answer = match namespace.get(name) {
            Some(value)
                if metadata.kind() == Kind::Positional && namespace.supplied.contains(name) =>
            {
                value.clone()
            }
            _ => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Asking for '{name}' (default {default:?}).");
                }

                prompt.ask(name, metadata, default)?
            }
        };

        match metadata.kind() {
            Kind::Positional if !answer.is_null() => tokens.push(answer.to_string()),
            Kind::Option if !answer.is_null() => {
                tokens.push(format!("--{}", to_cli(name)));
                tokens.push(answer.to_string());
            }
            Kind::Flag if answer.is_truthy() => tokens.push(format!("--{}", to_cli(name))),
            _ => {}
        }
    }

    if let Some(Value::List(items)) = signature.varargs().and_then(|name| namespace.get(name)) {
        tokens.extend(items.iter().map(Value::to_string));
    }

    if let Some(Value::Map(entries)) = signature.varkw().and_then(|name| namespace.get(name)) {
        tokens.extend(entries.iter().map(|(key, value)| format!("{key}={value}")));
    }

    Ok(())
}

/// Dispatch `tokens` against `entity` in wizard mode, with the default configuration.
pub fn wizard_call(
    entity: &dyn Entity,
    prompt: &dyn Prompt,
    tokens: &[&str],
) -> Result<(Namespace, Output), Error> {
    Wizard::default().call(entity, prompt, tokens)
}
