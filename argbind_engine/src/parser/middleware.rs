use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::constant::*;
use crate::parser::base::*;
use crate::parser::interface::UserInterface;
use crate::parser::printer::Printer;
use crate::parser::ErrorContext;
use crate::value::Values;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Which sub-command a branching parser selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Not a branching parser, or no selector token was given (only possible when suppressing errors).
    #[default]
    Nothing,
    /// A registered sub-command; its tokens were parsed too.
    Command(String),
    /// The selector token named no registered sub-command.
    /// Nothing after it was parsed; reporting is left to the caller.
    Unknown(String),
}

/// The result of a successful parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    /// The captured values by destination, including the defaults of anything not given.
    pub values: Values,
    #[allow(missing_docs)]
    pub selection: Selection,
    /// The destinations actually given on the command line.
    pub supplied: BTreeSet<String>,
    /// Unrecognized tokens, kept when the parser is lenient.
    pub extras: Vec<String>,
    /// Error messages, kept when the parser suppresses errors.
    pub errors: Vec<String>,
}

impl Parsed {
    fn from_session(session: Session, selection: Selection) -> Self {
        let Session {
            mut values,
            mut supplied,
            extras,
            errors,
        } = session;
        values.remove(BRANCH_DEST);
        supplied.remove(BRANCH_DEST);

        Self {
            values,
            selection,
            supplied,
            extras,
            errors,
        }
    }
}

/// The configured command line parser.
/// Built via `ArgumentParser::build` or `SubCommandParser::build`.
pub struct GeneralParser {
    command: ParseUnit,
    sub_commands: HashMap<String, ParseUnit>,
    policy: Policy,
    user_interface: Rc<dyn UserInterface>,
}

impl std::fmt::Debug for GeneralParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralParser")
            .field("program", &self.command.program)
            .field("sub_commands", &self.sub_commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GeneralParser {
    pub(crate) fn new(
        command: ParseUnit,
        sub_commands: HashMap<String, ParseUnit>,
        policy: Policy,
        user_interface: Rc<dyn UserInterface>,
    ) -> Self {
        Self {
            command,
            sub_commands,
            policy,
            user_interface,
        }
    }

    /// Run the command line parser against the input tokens.
    ///
    /// Parsing happens in two phases:
    /// 1. Token matching aligns the tokens to arguments and options.
    /// 2. Token capturing converts the tokens into values, checks them against any choices, and fills in defaults.
    ///
    /// If the parser encounters an error (ex: un-matched token, un-convertible token, etc), it reports the error
    /// through the user interface and returns with `Err(2)`.
    /// When built with `suppress_errors`, the errors are recorded on the `Parsed` result instead.
    ///
    /// If the help switch (`-h` or `--help`) is encountered, the parser displays the help message and returns
    /// with `Err(0)`.
    ///
    /// In the case of a branching parser, this process is repeated for the selected sub-command, on the tokens
    /// after its selector.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Parsed, i32> {
        let mut session = Session::default();
        let ui = &*self.user_interface;

        match self.command.invoke(tokens, self.policy, &mut session, ui) {
            Step::Complete => Ok(Parsed::from_session(session, Selection::Nothing)),
            Step::Branch { variant, remaining } => match self.sub_commands.get(&variant) {
                Some(sub_command) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Branching into '{variant}' with {remaining:?}.");
                    }

                    let remaining: Vec<&str> = remaining.iter().map(String::as_str).collect();

                    match sub_command.invoke(&remaining, self.policy, &mut session, ui) {
                        Step::Complete => {
                            Ok(Parsed::from_session(session, Selection::Command(variant)))
                        }
                        Step::Branch { .. } => {
                            unreachable!("internal error - sub-commands do not branch")
                        }
                        Step::Exit(code) => Err(code),
                    }
                }
                None => Ok(Parsed::from_session(session, Selection::Unknown(variant))),
            },
            Step::Exit(code) => Err(code),
        }
    }

    /// The usage line of the top level command.
    pub fn usage(&self) -> String {
        self.command.printer.usage(&self.command.program)
    }
}

pub(crate) struct ParseUnit {
    program: String,
    parser: Parser,
    printer: Printer,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Complete,
    Branch {
        variant: String,
        remaining: Vec<String>,
    },
    Exit(i32),
}

impl ParseUnit {
    pub(crate) fn new(program: impl Into<String>, parser: Parser, printer: Printer) -> Self {
        Self {
            program: program.into(),
            parser,
            printer,
        }
    }

    fn invoke(
        &self,
        tokens: &[&str],
        policy: Policy,
        session: &mut Session,
        user_interface: &(impl UserInterface + ?Sized),
    ) -> Step {
        match self.parser.consume(tokens, policy, session) {
            Ok(Action::Continue {
                discriminee: Some((_, variant)),
                remaining,
            }) => Step::Branch { variant, remaining },
            Ok(Action::Continue {
                discriminee: None, ..
            }) => Step::Complete,
            Ok(Action::PrintHelp) => {
                self.printer.print_help(&self.program, user_interface);
                Step::Exit(0)
            }
            Err((offset, parse_error)) => {
                user_interface.print_error(self.printer.usage(&self.program));
                user_interface.print_error(parse_error.to_string());
                user_interface.print_error_context(ErrorContext::new(offset, tokens));
                Step::Exit(ERROR_EXIT_CODE)
            }
        }
    }
}
