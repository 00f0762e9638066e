use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use argbind_engine::prelude::Collect;
use argbind_engine::{
    ArgumentParser, ConsoleInterface, GeneralParser, Nargs, Rule, SubCommand, UserInterface,
};

use crate::callable::{Callable, Case, Entity};
use crate::config::Config;
use crate::error::{ConfigError, Error, SignatureError};
use crate::metadata::{Kind, Metadata};
use crate::naming::{split_keyword, to_cli};
use crate::signature::Signature;
use crate::{Converter, Value, Values};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const COMMAND_DISPLAY: &str = "COMMAND";

/// A command of a multi-command grammar.
pub(crate) struct Command {
    /// The name as written on the command line, prefix included.
    pub(crate) spelling: String,
    pub(crate) name: String,
    pub(crate) callable: Rc<dyn Callable>,
    pub(crate) signature: Signature,
}

/// The command line grammar of an entity: one rule per parameter, plus one nested grammar per command.
///
/// Built fresh for every dispatch.
pub struct Grammar<'a> {
    pub(crate) head: Signature,
    pub(crate) target: &'a dyn Callable,
    pub(crate) commands: Vec<Command>,
    pub(crate) case: Case,
    pub(crate) parser: GeneralParser,
}

impl fmt::Debug for Grammar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("head", &self.head)
            .field("target", &self.target.name())
            .field("commands", &self.command_names())
            .field("case", &self.case)
            .finish()
    }
}

impl<'a> Grammar<'a> {
    /// Build the grammar of `entity`, reporting to the console.
    pub fn build(entity: &'a dyn Entity, config: &Config) -> Result<Self, Error> {
        Grammar::build_with(entity, config, Rc::new(ConsoleInterface::default()), &[])
    }

    pub(crate) fn build_with(
        entity: &'a dyn Entity,
        config: &Config,
        user_interface: Rc<dyn UserInterface>,
        extra: &[Rule],
    ) -> Result<Self, Error> {
        let target = entity.head();
        let head = Signature::extract(target)?;
        let mut parser = ArgumentParser::new(config.program.clone())
            .suppress_errors(config.suppress_errors)
            .lenient(config.lenient)
            .interface(user_interface);

        if let Some(about) = config.about.clone().or_else(|| target.about()) {
            parser = parser.about(about);
        }

        for rule in rules(&head)?.into_iter().chain(extra.iter().cloned()) {
            parser = parser.add(rule);
        }

        let (parser, commands, case) = match entity.commands() {
            None => (
                parser.build_parser().map_err(ConfigError::from)?,
                Vec::default(),
                Case::Sensitive,
            ),
            Some(set) => {
                if head.is_variadic() {
                    return Err(ConfigError::VariadicConstructor(target.name().to_string()).into());
                }

                let prefix = set.prefix();

                if prefix.starts_with('-') {
                    return Err(ConfigError::CommandPrefix(prefix.to_string()).into());
                }

                let help = set.help();
                let mut branch = parser.branch(COMMAND_DISPLAY);
                let mut commands = Vec::default();

                for name in set.names() {
                    let callable = set
                        .resolve(&name)
                        .ok_or_else(|| SignatureError::Undetermined(name.clone()))?;
                    let signature = Signature::extract(callable.as_ref())?;
                    let sub_rules = rules(&signature)?;
                    let about = callable.about();
                    let spelling = format!("{prefix}{name}");

                    branch = branch.command(spelling.clone(), move |sub| {
                        let sub = match about {
                            Some(about) => sub.about(about),
                            None => sub,
                        };
                        sub_rules.into_iter().fold(sub.help(help), SubCommand::add)
                    });
                    commands.push(Command {
                        spelling,
                        name,
                        callable,
                        signature,
                    });
                }

                (
                    branch.build_parser().map_err(ConfigError::from)?,
                    commands,
                    set.case(),
                )
            }
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Built grammar for '{}' with {} commands.",
                target.name(),
                commands.len()
            );
        }

        Ok(Self {
            head,
            target,
            commands,
            case,
            parser,
        })
    }

    /// The usage line of the top level.
    pub fn usage(&self) -> String {
        self.parser.usage()
    }

    /// The top level signature.
    pub fn signature(&self) -> &Signature {
        &self.head
    }

    /// The command names as spelled on the command line, in declaration order; empty for a single callable.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.spelling.as_str()).collect()
    }

    pub(crate) fn command(&self, spelling: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.spelling == spelling)
    }
}

/// The parser rules of a signature, in call order, followed by the variadic collectors.
pub(crate) fn rules(signature: &Signature) -> Result<Vec<Rule>, ConfigError> {
    let mut rules = Vec::default();

    for (name, default) in signature.parameters() {
        let metadata = signature.metadata(name);
        let short = metadata.validate(name, default)?;
        let rule = match metadata.kind() {
            Kind::Positional => match default {
                Some(default) => Rule::argument(name)
                    .nargs(Nargs::AtMostOne)
                    .default(default.clone()),
                None => Rule::argument(name),
            },
            Kind::Option => Rule::option(name, to_cli(name), short)
                .default(default.cloned().unwrap_or(Value::Null)),
            Kind::Flag => Rule::switch(name, to_cli(name), short),
        };
        rules.push(decorate(rule, metadata, metadata.describe(default)));
    }

    if let Some(varargs) = signature.varargs() {
        let metadata = signature.metadata(varargs);
        metadata.validate(varargs, None)?;
        let collector = VarArgs {
            varkw: signature.varkw().map(str::to_string),
        };
        let rule = Rule::collector(varargs, collector).default(Value::List(Vec::default()));
        rules.push(decorate(rule, metadata, metadata.describe(None)));
    }

    if let Some(varkw) = signature.varkw() {
        let metadata = signature.metadata(varkw);
        metadata.validate(varkw, None)?;
        let rule = Rule::collector(varkw, VarKw).default(Value::Map(BTreeMap::default()));
        rules.push(decorate(rule, metadata, metadata.describe(None)));
    }

    Ok(rules)
}

fn decorate(mut rule: Rule, metadata: &Metadata, help: Option<String>) -> Rule {
    if let Some(help) = help {
        rule = rule.help(help);
    }

    if let Some(converter) = &metadata.converter {
        rule = rule.convert(converter.clone());
    }

    if !metadata.choices.is_empty() {
        rule = rule.choices(metadata.choices.clone());
    }

    if let Some(display) = &metadata.display {
        rule = rule.display(display.clone());
    }

    rule
}

// Collects bare tokens; `name=value` tokens go to the keyword collector instead, when there is one.
struct VarArgs {
    varkw: Option<String>,
}

impl Collect for VarArgs {
    fn collect(
        &self,
        dest: &str,
        token: &str,
        converter: Option<&Converter>,
        values: &mut Values,
    ) -> Result<(), String> {
        if let Some(varkw) = &self.varkw {
            if let Some((name, value)) = split_keyword(token) {
                insert(values, varkw, name, Value::from(value));
                return Ok(());
            }
        }

        let value = match converter {
            Some(converter) => converter(token)?,
            None => Value::from(token),
        };

        match values
            .entry(dest.to_string())
            .or_insert_with(|| Value::List(Vec::default()))
        {
            Value::List(items) => items.push(value),
            other => *other = Value::List(vec![value]),
        }

        Ok(())
    }
}

// Collects `name=value` tokens; anything else is an error.
struct VarKw;

impl Collect for VarKw {
    fn collect(
        &self,
        dest: &str,
        token: &str,
        converter: Option<&Converter>,
        values: &mut Values,
    ) -> Result<(), String> {
        let (name, raw) = split_keyword(token).ok_or_else(|| "expected name=value".to_string())?;
        let value = match converter {
            Some(converter) => converter(raw)?,
            None => Value::from(raw),
        };
        insert(values, dest, name, value);
        Ok(())
    }
}

fn insert(values: &mut Values, dest: &str, name: &str, value: Value) {
    match values
        .entry(dest.to_string())
        .or_insert_with(|| Value::Map(BTreeMap::default()))
    {
        Value::Map(entries) => {
            entries.insert(name.to_string(), value);
        }
        other => *other = Value::Map(BTreeMap::from([(name.to_string(), value)])),
    }
}
