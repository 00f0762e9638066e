use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

use crate::constant::*;
use crate::matcher::*;
use crate::model::Nargs;
use crate::prelude::Collect;
use crate::value::{Converter, Value, Values};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A misconfiguration of the parser, detected while building it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

impl From<MatcherConfigError> for ConfigError {
    fn from(error: MatcherConfigError) -> Self {
        ConfigError(error.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Parse error: {0}")]
pub(crate) struct ParseError(pub(crate) String);

impl From<MatchError> for ParseError {
    fn from(error: MatchError) -> Self {
        ParseError(error.to_string())
    }
}

impl From<CaptureError> for ParseError {
    fn from(error: CaptureError) -> Self {
        ParseError(error.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CaptureError {
    #[error("Invalid value '{token}' for '{name}': {reason}.")]
    Invalid {
        name: String,
        token: String,
        reason: String,
    },

    #[error("Invalid choice '{token}' for '{name}' (choose from {choices}).")]
    Choice {
        name: String,
        token: String,
        choices: String,
    },
}

/// How a parse treats errors and unrecognized tokens.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Policy {
    /// Record errors and carry on with partial values.
    pub suppress: bool,
    /// Keep unrecognized tokens as extras instead of failing.
    pub lenient: bool,
}

/// The accumulating state of one parse, shared by a command and its sub-command.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub values: Values,
    pub supplied: BTreeSet<String>,
    pub extras: Vec<String>,
    pub errors: Vec<String>,
}

impl Session {
    fn record(&mut self, error: ParseError) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Suppressing: {error}.");
        }

        self.errors.push(error.to_string());
    }
}

pub(crate) enum CaptureAction {
    Store,
    StoreTrue,
    Collect(Rc<dyn Collect>),
}

/// What to do with the tokens matched for one rule.
pub(crate) struct Capture {
    dest: String,
    nargs: Nargs,
    action: CaptureAction,
    converter: Option<Converter>,
    choices: Vec<Value>,
    default: Option<Value>,
}

impl Capture {
    pub(crate) fn new(
        dest: impl Into<String>,
        nargs: Nargs,
        action: CaptureAction,
        converter: Option<Converter>,
        choices: Vec<Value>,
        default: Option<Value>,
    ) -> Self {
        Self {
            dest: dest.into(),
            nargs,
            action,
            converter,
            choices,
            default,
        }
    }

    pub(crate) fn dest(&self) -> &str {
        &self.dest
    }

    fn seed(&self, values: &mut Values) {
        if let Some(default) = &self.default {
            values.insert(self.dest.clone(), default.clone());
        }
    }

    fn apply(&self, tokens: &[OffsetValue], values: &mut Values) -> Result<(), (usize, CaptureError)> {
        match &self.action {
            CaptureAction::StoreTrue => {
                values.insert(self.dest.clone(), Value::Bool(true));
            }
            CaptureAction::Store => {
                let mut converted = Vec::with_capacity(tokens.len());

                for (offset, token) in tokens {
                    converted.push(self.convert(token).map_err(|error| (*offset, error))?);
                }

                if self.nargs.is_single() {
                    // Zero tokens for a single value leaves the default in place.
                    if let Some(value) = converted.pop() {
                        values.insert(self.dest.clone(), value);
                    }
                } else {
                    values.insert(self.dest.clone(), Value::List(converted));
                }
            }
            CaptureAction::Collect(collector) => {
                for (offset, token) in tokens {
                    collector
                        .collect(&self.dest, token, self.converter.as_ref(), values)
                        .map_err(|reason| {
                            (
                                *offset,
                                CaptureError::Invalid {
                                    name: self.dest.clone(),
                                    token: token.clone(),
                                    reason,
                                },
                            )
                        })?;
                }
            }
        }

        Ok(())
    }

    fn convert(&self, token: &str) -> Result<Value, CaptureError> {
        let value = match &self.converter {
            Some(converter) => converter(token).map_err(|reason| CaptureError::Invalid {
                name: self.dest.clone(),
                token: token.to_string(),
                reason,
            })?,
            None => Value::Str(token.to_string()),
        };

        if !self.choices.is_empty() && !self.choices.contains(&value) {
            let choices: Vec<String> = self.choices.iter().map(|c| c.to_string()).collect();
            return Err(CaptureError::Choice {
                name: self.dest.clone(),
                token: token.to_string(),
                choices: choices.join(", "),
            });
        }

        Ok(value)
    }
}

/// Where a capture's tokens come from.
#[derive(Debug, Clone)]
pub(crate) enum MatchTarget {
    Option(OptionConfig),
    Argument(ArgumentConfig),
}

impl MatchTarget {
    fn name(&self) -> &str {
        match self {
            MatchTarget::Option(config) => config.name(),
            MatchTarget::Argument(config) => config.name(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Continue {
        discriminee: Option<OffsetValue>,
        remaining: Vec<String>,
    },
    PrintHelp,
}

pub(crate) struct Parser {
    options: Vec<OptionConfig>,
    arguments: Vec<ArgumentConfig>,
    captures: HashMap<String, Capture>,
    discriminator: Option<String>,
    discriminator_label: Option<String>,
    variants: HashSet<String>,
    help: bool,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser{..}").finish()
    }
}

impl Parser {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(Vec::default(), None, HashSet::default()).unwrap()
    }

    pub(crate) fn new(
        bindings: Vec<(MatchTarget, Capture)>,
        discriminator: Option<String>,
        variants: HashSet<String>,
    ) -> Result<Self, ConfigError> {
        let mut options = vec![OptionConfig::new(
            HELP_NAME,
            Some(HELP_SHORT),
            Bound::Range(0, 0),
        )];
        let mut arguments = Vec::default();
        let mut captures = HashMap::default();
        let mut dests = HashSet::new();

        for (target, capture) in bindings {
            if target.name() == HELP_NAME {
                return Err(ConfigError(format!(
                    "Cannot use the reserved name '{HELP_NAME}'."
                )));
            }

            if !dests.insert(capture.dest().to_string()) {
                return Err(ConfigError(format!(
                    "Cannot duplicate the parameter '{}'.",
                    capture.dest()
                )));
            }

            if captures
                .insert(target.name().to_string(), capture)
                .is_some()
            {
                return Err(ConfigError(format!(
                    "Cannot duplicate the parameter '{}'.",
                    target.name()
                )));
            }

            match target {
                MatchTarget::Option(config) => options.push(config),
                MatchTarget::Argument(config) => arguments.push(config),
            }
        }

        // Surface duplicate short options now, rather than on every parse.
        TokenMatcher::new(options.clone(), arguments.clone())?;

        Ok(Self {
            options,
            arguments,
            captures,
            discriminator,
            discriminator_label: None,
            variants,
            help: true,
        })
    }

    /// Treat `-h` and `--help` like any other token.
    pub(crate) fn without_help(mut self) -> Self {
        self.options.retain(|option| option.name() != HELP_NAME);
        self.help = false;
        self
    }

    /// Name the discriminator `label` (rather than by its dest) in error messages.
    pub(crate) fn label_discriminator(mut self, label: impl Into<String>) -> Self {
        self.discriminator_label.replace(label.into());
        self
    }

    fn report(&self, error: MatchError) -> ParseError {
        match (&self.discriminator, &self.discriminator_label) {
            (Some(dest), Some(label)) => ParseError::from(error.relabel(dest, label)),
            _ => ParseError::from(error),
        }
    }

    pub(crate) fn consume(
        &self,
        tokens: &[&str],
        policy: Policy,
        session: &mut Session,
    ) -> Result<Action, (usize, ParseError)> {
        let mut token_matcher = TokenMatcher::new(self.options.clone(), self.arguments.clone())
            .expect("internal error - matcher configuration is validated on construction");
        let mut fed = 0;
        let mut consumed = 0;

        // 1. Feed the raw token strings to the matcher.
        for token in tokens {
            consumed += 1;

            if self.help && is_help(token) {
                return Ok(Action::PrintHelp);
            }

            let (result, discriminated) = match &self.discriminator {
                Some(target)
                    if self.variants.contains(*token) && !token_matcher.expects_value() =>
                {
                    (token_matcher.feed_discriminator(target, token), true)
                }
                _ => (token_matcher.feed(token), false),
            };

            if let Err(error) = result {
                if policy.lenient && error.is_unrecognized() {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Tolerating unrecognized token '{token}'.");
                    }

                    session.extras.push(token.to_string());
                } else if policy.suppress {
                    session.record(self.report(error));
                } else if self.help_ahead(&tokens[consumed..]) {
                    return Ok(Action::PrintHelp);
                } else {
                    return Err((fed, self.report(error)));
                }
            }

            fed += token.len();

            // A branching parser only consumes up to (and including) its discriminator.
            if self.discriminator.is_some() && (discriminated || token_matcher.can_close()) {
                break;
            }
        }

        let matches = match token_matcher.close() {
            Ok(matches) | Err((_, _, matches)) if matches.contains(HELP_NAME) => {
                return Ok(Action::PrintHelp);
            }
            Ok(matches) => matches,
            Err((offset, error, matches)) => {
                if policy.suppress {
                    session.record(self.report(error));
                    matches
                } else {
                    return Err((offset, self.report(error)));
                }
            }
        };

        // 2. Seed every default, so that anything unmatched still has its value.
        for capture in self.captures.values() {
            capture.seed(&mut session.values);
        }

        let mut discriminee: Option<OffsetValue> = None;

        // 3. Convert the matched tokens, in match order.
        for match_tokens in matches.values {
            let capture = self
                .captures
                .get(&match_tokens.name)
                .expect("internal error - mismatch between matches and captures");

            if let Err((offset, error)) = capture.apply(&match_tokens.values, &mut session.values) {
                if policy.suppress {
                    session.record(ParseError::from(error));
                } else {
                    return Err((offset, ParseError::from(error)));
                }
            }

            let is_option = self.options.iter().any(|o| o.name() == match_tokens.name);

            if is_option || !match_tokens.values.is_empty() {
                session.supplied.insert(capture.dest().to_string());
            }

            if self.discriminator.as_deref() == Some(match_tokens.name.as_str()) {
                if let [(offset, variant)] = &match_tokens.values[..] {
                    discriminee.replace((*offset, variant.clone()));
                }
            }
        }

        Ok(Action::Continue {
            discriminee,
            remaining: tokens[consumed..].iter().map(|t| t.to_string()).collect(),
        })
    }

    // Whether a help switch for this parser (rather than a sub-command's) lies in `tokens`.
    fn help_ahead(&self, tokens: &[&str]) -> bool {
        self.help
            && tokens
                .iter()
                .take_while(|token| !self.variants.contains(**token))
                .any(|token| is_help(token))
    }
}

fn is_help(token: &str) -> bool {
    token.strip_prefix("--") == Some(HELP_NAME)
        || (token.len() == 2 && token.strip_prefix('-') == Some(HELP_SHORT.to_string().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::convert;
    use rstest::rstest;

    fn store(dest: &str, nargs: Nargs) -> Capture {
        Capture::new(dest, nargs, CaptureAction::Store, None, vec![], None)
    }

    fn argument(name: &str, nargs: Nargs, capture: Capture) -> (MatchTarget, Capture) {
        (
            MatchTarget::Argument(ArgumentConfig::new(name, Bound::from(nargs))),
            capture,
        )
    }

    fn option(name: &str, short: Option<char>, nargs: Nargs, capture: Capture) -> (MatchTarget, Capture) {
        (
            MatchTarget::Option(OptionConfig::new(name, short, Bound::from(nargs))),
            capture,
        )
    }

    fn parse(parser: &Parser, tokens: &[&str], policy: Policy) -> (Result<Action, (usize, ParseError)>, Session) {
        let mut session = Session::default();
        let result = parser.consume(tokens, policy, &mut session);
        (result, session)
    }

    #[test]
    fn empty() {
        // Setup
        let parser = Parser::empty();

        // Execute
        let (result, session) = parse(&parser, &[], Policy::default());

        // Verify
        assert_eq!(
            result.unwrap(),
            Action::Continue {
                discriminee: None,
                remaining: vec![],
            }
        );
        assert!(session.values.is_empty());
    }

    #[rstest]
    #[case(vec!["-h"])]
    #[case(vec!["--help"])]
    #[case(vec!["abc", "--help"])]
    #[case(vec!["--nope", "-h"])]
    fn help(#[case] tokens: Vec<&str>) {
        let parser = Parser::new(
            vec![argument("code", Nargs::Precisely(1), store("code", Nargs::Precisely(1)))],
            None,
            HashSet::default(),
        )
        .unwrap();
        let (result, _) = parse(&parser, &tokens, Policy::default());
        assert_eq!(result.unwrap(), Action::PrintHelp);
    }

    #[rstest]
    #[case(vec![], Value::from("1234"))]
    #[case(vec!["4321"], Value::from("4321"))]
    fn optional_argument(#[case] tokens: Vec<&str>, #[case] expected: Value) {
        // Setup
        let capture = Capture::new(
            "code",
            Nargs::AtMostOne,
            CaptureAction::Store,
            None,
            vec![],
            Some(Value::from("1234")),
        );
        let parser = Parser::new(
            vec![argument("code", Nargs::AtMostOne, capture)],
            None,
            HashSet::default(),
        )
        .unwrap();

        // Execute
        let (result, session) = parse(&parser, &tokens, Policy::default());

        // Verify
        result.unwrap();
        assert_eq!(session.values["code"], expected);
        assert_eq!(session.supplied.contains("code"), !tokens.is_empty());
    }

    #[test]
    fn switch_and_option() {
        // Setup
        let parser = Parser::new(
            vec![
                option(
                    "verbose",
                    Some('v'),
                    Nargs::Precisely(0),
                    Capture::new("verbose", Nargs::Precisely(0), CaptureAction::StoreTrue, None, vec![], Some(Value::Bool(false))),
                ),
                option(
                    "level",
                    None,
                    Nargs::Precisely(1),
                    Capture::new("level", Nargs::Precisely(1), CaptureAction::Store, Some(convert::integer()), vec![], Some(Value::Null)),
                ),
            ],
            None,
            HashSet::default(),
        )
        .unwrap();

        // Execute
        let (unset, unset_session) = parse(&parser, &[], Policy::default());
        let (set, set_session) = parse(&parser, &["-v", "--level", "3"], Policy::default());

        // Verify
        unset.unwrap();
        assert_eq!(unset_session.values["verbose"], Value::Bool(false));
        assert_eq!(unset_session.values["level"], Value::Null);
        assert!(unset_session.supplied.is_empty());
        set.unwrap();
        assert_eq!(set_session.values["verbose"], Value::Bool(true));
        assert_eq!(set_session.values["level"], Value::Int(3));
        assert_eq!(
            set_session.supplied,
            BTreeSet::from(["verbose".to_string(), "level".to_string()])
        );
    }

    #[test]
    fn conversion_error() {
        // Setup
        let parser = Parser::new(
            vec![argument(
                "count",
                Nargs::Precisely(1),
                Capture::new("count", Nargs::Precisely(1), CaptureAction::Store, Some(convert::integer()), vec![], None),
            )],
            None,
            HashSet::default(),
        )
        .unwrap();

        // Execute
        let (result, _) = parse(&parser, &["abc"], Policy::default());

        // Verify
        let (offset, error) = result.unwrap_err();
        assert_eq!(offset, 0);
        assert_eq!(
            error.to_string(),
            "Parse error: Invalid value 'abc' for 'count': expected i64."
        );
    }

    #[test]
    fn choices() {
        // Setup
        let capture = Capture::new(
            "colour",
            Nargs::Precisely(1),
            CaptureAction::Store,
            None,
            vec![Value::from("red"), Value::from("blue")],
            None,
        );
        let parser = Parser::new(
            vec![argument("colour", Nargs::Precisely(1), capture)],
            None,
            HashSet::default(),
        )
        .unwrap();

        // Execute
        let (ok, ok_session) = parse(&parser, &["blue"], Policy::default());
        let (bad, _) = parse(&parser, &["green"], Policy::default());

        // Verify
        ok.unwrap();
        assert_eq!(ok_session.values["colour"], Value::from("blue"));
        assert_eq!(
            bad.unwrap_err().1.to_string(),
            "Parse error: Invalid choice 'green' for 'colour' (choose from red, blue)."
        );
    }

    #[test]
    fn too_few_arguments() {
        let parser = Parser::new(
            vec![argument("code", Nargs::Precisely(1), store("code", Nargs::Precisely(1)))],
            None,
            HashSet::default(),
        )
        .unwrap();
        let (result, _) = parse(&parser, &[], Policy::default());
        assert_eq!(
            result.unwrap_err(),
            (0, ParseError("Not enough tokens provided to 'code'.".to_string()))
        );
    }

    #[test]
    fn suppress_accumulates() {
        // Setup
        let parser = Parser::new(
            vec![
                argument("code", Nargs::Precisely(1), store("code", Nargs::Precisely(1))),
                option(
                    "count",
                    None,
                    Nargs::Precisely(1),
                    Capture::new("count", Nargs::Precisely(1), CaptureAction::Store, Some(convert::integer()), vec![], Some(Value::Null)),
                ),
            ],
            None,
            HashSet::default(),
        )
        .unwrap();
        let policy = Policy {
            suppress: true,
            lenient: false,
        };

        // Execute
        let (result, session) = parse(&parser, &["--count", "x", "--bogus"], policy);

        // Verify
        result.unwrap();
        assert_eq!(
            session.errors,
            vec![
                "Parse error: Option '--bogus' does not exist.".to_string(),
                "Parse error: Not enough tokens provided to 'code'.".to_string(),
                "Parse error: Invalid value 'x' for 'count': expected i64.".to_string(),
            ]
        );
        assert_eq!(session.values["count"], Value::Null);
        assert!(!session.values.contains_key("code"));
    }

    #[test]
    fn lenient_extras() {
        // Setup
        let parser = Parser::new(
            vec![argument("code", Nargs::Precisely(1), store("code", Nargs::Precisely(1)))],
            None,
            HashSet::default(),
        )
        .unwrap();
        let policy = Policy {
            suppress: false,
            lenient: true,
        };

        // Execute
        let (result, session) = parse(&parser, &["--bogus", "a", "b", "-x"], policy);

        // Verify
        result.unwrap();
        assert_eq!(session.values["code"], Value::from("a"));
        assert_eq!(session.extras, vec!["--bogus", "b", "-x"]);
    }

    #[test]
    fn collector() {
        // Setup
        let upper = |dest: &str, token: &str, _: Option<&Converter>, values: &mut Values| {
            match values.get_mut(dest) {
                Some(Value::List(items)) => {
                    items.push(Value::from(token.to_uppercase()));
                    Ok(())
                }
                _ => Err("not a list".to_string()),
            }
        };
        let capture = Capture::new(
            "rest",
            Nargs::Any,
            CaptureAction::Collect(Rc::new(upper)),
            None,
            vec![],
            Some(Value::List(vec![])),
        );
        let parser = Parser::new(
            vec![argument("rest", Nargs::Any, capture)],
            None,
            HashSet::default(),
        )
        .unwrap();

        // Execute
        let (result, session) = parse(&parser, &["a", "b"], Policy::default());

        // Verify
        result.unwrap();
        assert_eq!(session.values["rest"], Value::from(vec!["A", "B"]));
    }

    #[rstest]
    #[case(vec!["search", "x"], Some((0, "search")), vec!["x"])]
    #[case(vec!["-v", "search", "-v"], Some((2, "search")), vec!["-v"])]
    // The unknown name fills the optional argument; the next bare token lands on the discriminator.
    #[case(vec!["unknown", "x", "y"], Some((7, "x")), vec!["y"])]
    fn discriminator(
        #[case] tokens: Vec<&str>,
        #[case] expected: Option<(usize, &str)>,
        #[case] remaining: Vec<&str>,
    ) {
        // Setup
        let parser = Parser::new(
            vec![
                option(
                    "verbose",
                    Some('v'),
                    Nargs::Precisely(0),
                    Capture::new("verbose", Nargs::Precisely(0), CaptureAction::StoreTrue, None, vec![], Some(Value::Bool(false))),
                ),
                argument("name", Nargs::AtMostOne, store("name", Nargs::AtMostOne)),
                argument(BRANCH_DEST, Nargs::Precisely(1), store(BRANCH_DEST, Nargs::Precisely(1))),
            ],
            Some(BRANCH_DEST.to_string()),
            HashSet::from(["search".to_string()]),
        )
        .unwrap();

        // Execute
        let (result, _) = parse(&parser, &tokens, Policy::default());

        // Verify
        assert_eq!(
            result.unwrap(),
            Action::Continue {
                discriminee: expected.map(|(o, v)| (o, v.to_string())),
                remaining: remaining.into_iter().map(|t| t.to_string()).collect(),
            }
        );
    }

    #[rstest]
    #[case(vec![(MatchTarget::Argument(ArgumentConfig::new("a", Bound::Range(1, 1))), "a"), (MatchTarget::Argument(ArgumentConfig::new("a", Bound::Range(1, 1))), "b")])]
    #[case(vec![(MatchTarget::Argument(ArgumentConfig::new("a", Bound::Range(1, 1))), "x"), (MatchTarget::Option(OptionConfig::new("b", None, Bound::Range(1, 1))), "x")])]
    #[case(vec![(MatchTarget::Option(OptionConfig::new("help", None, Bound::Range(0, 0))), "help")])]
    #[case(vec![(MatchTarget::Option(OptionConfig::new("hello", Some('h'), Bound::Range(0, 0))), "hello")])]
    fn invalid_config(#[case] targets: Vec<(MatchTarget, &str)>) {
        let bindings = targets
            .into_iter()
            .map(|(target, dest)| (target, store(dest, Nargs::Precisely(1))))
            .collect();
        assert_matches!(Parser::new(bindings, None, HashSet::default()), Err(ConfigError(_)));
    }
}
