use std::rc::Rc;

use crate::matcher::{ArgumentConfig, Bound, OptionConfig};
use crate::model::Nargs;
use crate::parser::{Capture, CaptureAction, ConfigError, Entry, MatchTarget};
use crate::prelude::Collect;
use crate::value::{Converter, Value};

#[derive(Clone)]
enum RuleClass {
    Argument,
    Option { long: String, short: Option<char> },
    Switch { long: String, short: Option<char> },
    Collector(Rc<dyn Collect>),
}

/// One rule of a command line parser: where its tokens come from, and how they become a value.
///
/// ### Example
/// ```
/// use argbind_engine::{convert, ArgumentParser, Nargs, Rule, Value};
///
/// let parser = ArgumentParser::new("program")
///     .add(Rule::argument("items").nargs(Nargs::AtLeastOne).convert(convert::integer()))
///     .add(Rule::option("level", "level", Some('l')).default(Value::Int(1)))
///     .add(Rule::switch("verbose", "verbose", Some('v')))
///     .build_parser()
///     .unwrap();
///
/// let parsed = parser.parse_tokens(&["1", "2", "-v"]).unwrap();
///
/// assert_eq!(parsed.values["items"], Value::from(vec![1, 2]));
/// assert_eq!(parsed.values["level"], Value::Int(1));
/// assert_eq!(parsed.values["verbose"], Value::Bool(true));
/// ```
#[derive(Clone)]
pub struct Rule {
    class: RuleClass,
    dest: String,
    nargs: Nargs,
    help: Option<String>,
    display: Option<String>,
    default: Option<Value>,
    converter: Option<Converter>,
    choices: Vec<Value>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("dest", &self.dest)
            .field("nargs", &self.nargs)
            .finish()
    }
}

impl Rule {
    fn new(class: RuleClass, dest: impl Into<String>, nargs: Nargs, default: Option<Value>) -> Self {
        Self {
            class,
            dest: dest.into(),
            nargs,
            help: None,
            display: None,
            default,
            converter: None,
            choices: Vec::default(),
        }
    }

    /// A positional rule taking precisely one value, and required unless given a default.
    pub fn argument(dest: impl Into<String>) -> Self {
        Rule::new(RuleClass::Argument, dest, Nargs::Precisely(1), None)
    }

    /// A named rule `--long VALUE` (and `-s VALUE`), defaulting to `Value::Null`.
    pub fn option(dest: impl Into<String>, long: impl Into<String>, short: Option<char>) -> Self {
        let class = RuleClass::Option {
            long: long.into(),
            short,
        };
        Rule::new(class, dest, Nargs::Precisely(1), Some(Value::Null))
    }

    /// A boolean switch `--long` (and `-s`), `false` unless given.
    pub fn switch(dest: impl Into<String>, long: impl Into<String>, short: Option<char>) -> Self {
        let class = RuleClass::Switch {
            long: long.into(),
            short,
        };
        Rule::new(class, dest, Nargs::Precisely(0), Some(Value::Bool(false)))
    }

    /// A positional catch-all (`*`), handing each matched token to a custom collector.
    pub fn collector(dest: impl Into<String>, action: impl Collect + 'static) -> Self {
        Rule::new(RuleClass::Collector(Rc::new(action)), dest, Nargs::Any, None)
    }

    /// Set the cardinality. Ignored by switches.
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = nargs;
        self
    }

    /// Document the rule.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }

    /// Set the label shown for the rule's values in the usage and help.
    pub fn display(mut self, name: impl Into<String>) -> Self {
        self.display.replace(name.into());
        self
    }

    /// Set the value taken when the rule is not matched.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default.replace(value.into());
        self
    }

    /// Convert each token; tokens are kept as `Value::Str` otherwise.
    pub fn convert(mut self, converter: Converter) -> Self {
        self.converter.replace(converter);
        self
    }

    /// Restrict the (converted) values to a fixed set.
    pub fn choices<V: Into<Value>>(mut self, choices: impl IntoIterator<Item = V>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    #[allow(missing_docs)]
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Split into the parsing half and the help half.
    pub(crate) fn prepare(self) -> Result<((MatchTarget, Capture), Entry), ConfigError> {
        let Rule {
            class,
            dest,
            nargs,
            help,
            display,
            default,
            converter,
            choices,
        } = self;
        let labels: Vec<String> = choices.iter().map(|c| c.to_string()).collect();

        let (target, action, entry) = match class {
            RuleClass::Argument | RuleClass::Collector(_) if nargs == Nargs::Precisely(0) => {
                return Err(ConfigError(format!(
                    "Argument '{dest}' must take at least one value."
                )));
            }
            RuleClass::Argument => (
                MatchTarget::Argument(ArgumentConfig::new(dest.clone(), Bound::from(nargs))),
                CaptureAction::Store,
                Entry::argument(dest.clone(), nargs, help, display, labels),
            ),
            RuleClass::Collector(collector) => (
                MatchTarget::Argument(ArgumentConfig::new(dest.clone(), Bound::from(nargs))),
                CaptureAction::Collect(collector),
                Entry::argument(dest.clone(), nargs, help, display, labels),
            ),
            RuleClass::Option { long, short } => (
                MatchTarget::Option(OptionConfig::new(long.clone(), short, Bound::from(nargs))),
                CaptureAction::Store,
                Entry::option(long, short, nargs, help, display, labels),
            ),
            RuleClass::Switch { long, short } => (
                MatchTarget::Option(OptionConfig::new(
                    long.clone(),
                    short,
                    Bound::Range(0, 0),
                )),
                CaptureAction::StoreTrue,
                Entry::option(long, short, Nargs::Precisely(0), help, display, labels),
            ),
        };

        let capture = Capture::new(dest, nargs, action, converter, choices, default);
        Ok(((target, capture), entry))
    }
}
