use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::api::Rule;
use crate::constant::*;
use crate::parser::{
    ConfigError, ConsoleInterface, Entry, GeneralParser, ParseUnit, Parser, Policy, Printer,
    UserInterface,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The base command line parser.
///
/// ### Example
/// ```
/// use argbind_engine::ArgumentParser;
///
/// let parser = ArgumentParser::new("program")
///     // Configure with ArgumentParser::add and ArgumentParser::branch.
///     .build();
/// parser.parse_tokens(&[]).unwrap();
/// ```
pub struct ArgumentParser {
    program: String,
    about: Option<String>,
    rules: Vec<Rule>,
    policy: Policy,
    user_interface: Option<Rc<dyn UserInterface>>,
}

impl ArgumentParser {
    /// Create a command line parser.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            rules: Vec::default(),
            policy: Policy::default(),
            user_interface: None,
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Add a rule to the command line parser.
    ///
    /// The order of argument rules corresponds to their positional order during parsing.
    /// The order of named rules does not affect the parser semantics (only the help).
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Record parse errors on the [`crate::Parsed`] result rather than reporting them and failing.
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.policy.suppress = suppress;
        self
    }

    /// Keep unrecognized tokens on the [`crate::Parsed`] result rather than failing.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.policy.lenient = lenient;
        self
    }

    /// Replace the console as the destination of help and error output.
    pub fn interface(mut self, user_interface: Rc<dyn UserInterface>) -> Self {
        self.user_interface.replace(user_interface);
        self
    }

    /// Branch into a sub-command parser.
    ///
    /// Any rules added before the branch apply to the root parser.
    /// The sub-command is selected by the first token naming one of the sub-commands, or otherwise by the
    /// first bare token that remains once the root's arguments are filled.
    ///
    /// ### Example
    /// ```
    /// use argbind_engine::{ArgumentParser, Rule, Selection, Value};
    ///
    /// let parser = ArgumentParser::new("program")
    ///     .add(Rule::argument("belongs_to_root"))
    ///     .branch("COMMAND")
    ///     .command("the-command", |sub| {
    ///         sub.about("Does the thing.")
    ///             .add(Rule::argument("belongs_to_sub_command"))
    ///     })
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(&["1", "the-command", "2"]).unwrap();
    ///
    /// assert_eq!(parsed.values["belongs_to_root"], Value::from("1"));
    /// assert_eq!(parsed.selection, Selection::Command("the-command".to_string()));
    /// assert_eq!(parsed.values["belongs_to_sub_command"], Value::from("2"));
    /// ```
    pub fn branch(self, display: impl Into<String>) -> SubCommandParser {
        SubCommandParser::new(self, display.into())
    }

    fn user_interface(&self) -> Rc<dyn UserInterface> {
        self.user_interface
            .clone()
            .unwrap_or_else(|| Rc::new(ConsoleInterface::default()))
    }

    fn unit(
        program: String,
        about: Option<String>,
        rules: Vec<Rule>,
        branch: Option<(String, Vec<(String, String)>)>,
        variants: HashSet<String>,
        help: bool,
    ) -> Result<ParseUnit, ConfigError> {
        let mut bindings = Vec::default();
        let mut entries = Vec::default();

        for rule in rules {
            let (binding, entry) = rule.prepare()?;
            bindings.push(binding);
            entries.push(entry);
        }

        let label = branch.as_ref().map(|(display, _)| display.clone());
        let discriminator = match branch {
            Some((display, described)) => {
                let (binding, _) = Rule::argument(BRANCH_DEST).prepare()?;
                bindings.push(binding);
                entries.push(Entry::branch(display, described));
                Some(BRANCH_DEST.to_string())
            }
            None => None,
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Building '{program}' with {} rules.", bindings.len());
        }

        let mut parser = Parser::new(bindings, discriminator, variants)?;

        if let Some(label) = label {
            parser = parser.label_discriminator(label);
        }

        let mut printer = Printer::terminal(about, entries);

        if !help {
            parser = parser.without_help();
            printer = printer.without_help();
        }

        Ok(ParseUnit::new(program, parser, printer))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        let user_interface = self.user_interface();
        let policy = self.policy;
        let command = ArgumentParser::unit(
            self.program,
            self.about,
            self.rules,
            None,
            HashSet::default(),
            true,
        )?;
        Ok(GeneralParser::new(
            command,
            HashMap::default(),
            policy,
            user_interface,
        ))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        exit_on_error(self.build_parser())
    }
}

fn exit_on_error(result: Result<GeneralParser, ConfigError>) -> GeneralParser {
    match result {
        Ok(general_parser) => general_parser,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

/// The sub-command parser.
pub struct SubCommandParser {
    root: ArgumentParser,
    display: String,
    commands: Vec<(String, SubCommand)>,
    deferred_error: Option<ConfigError>,
}

impl SubCommandParser {
    fn new(root: ArgumentParser, display: String) -> Self {
        Self {
            root,
            display,
            commands: Vec::default(),
            deferred_error: None,
        }
    }

    /// Setup a sub-command.
    ///
    /// The sub-command's about message doubles as its description in the root help.
    /// Sub-commands are listed in the order they are added.
    pub fn command(
        mut self,
        name: impl Into<String>,
        setup_fn: impl FnOnce(SubCommand) -> SubCommand,
    ) -> Self {
        let name = name.into();

        if self.commands.iter().any(|(existing, _)| existing == &name) {
            self.deferred_error.get_or_insert(ConfigError(format!(
                "Cannot duplicate the sub-command '{name}'."
            )));
        } else if name.starts_with('-') || name.is_empty() {
            self.deferred_error.get_or_insert(ConfigError(format!(
                "Invalid sub-command name '{name}'."
            )));
        }

        let sub_command = setup_fn(SubCommand::default());
        self.commands.push((name, sub_command));
        self
    }

    /// Build the sub-command based command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        if let Some(error) = self.deferred_error {
            return Err(error);
        }

        let SubCommandParser {
            root,
            display,
            commands,
            ..
        } = self;
        let user_interface = root.user_interface();
        let variants: Vec<(String, String)> = commands
            .iter()
            .map(|(name, sub)| (name.clone(), sub.about.clone().unwrap_or_default()))
            .collect();
        let names: HashSet<String> = commands.iter().map(|(name, _)| name.clone()).collect();
        let mut sub_commands = HashMap::default();

        for (name, sub) in commands {
            let program = format!("{} {name}", root.program);
            let unit = ArgumentParser::unit(
                program,
                sub.about,
                sub.rules,
                None,
                HashSet::default(),
                !sub.no_help,
            )?;
            sub_commands.insert(name, unit);
        }

        let command = ArgumentParser::unit(
            root.program,
            root.about,
            root.rules,
            Some((display, variants)),
            names,
            true,
        )?;

        Ok(GeneralParser::new(
            command,
            sub_commands,
            root.policy,
            user_interface,
        ))
    }

    /// Build the sub-command based command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        exit_on_error(self.build_parser())
    }
}

/// A sub-command line parser.
///
/// Used with [`SubCommandParser::command`].
#[derive(Default)]
pub struct SubCommand {
    about: Option<String>,
    rules: Vec<Rule>,
    no_help: bool,
}

impl SubCommand {
    /// Document the about message for this sub-command.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Add a rule to the sub-command.
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Whether the sub-command accepts `-h`/`--help` (the default).
    pub fn help(mut self, enabled: bool) -> Self {
        self.no_help = !enabled;
        self
    }
}
