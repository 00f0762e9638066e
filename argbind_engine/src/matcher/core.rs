use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use crate::matcher::api::*;
use crate::matcher::model::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatcherConfigError {
    #[error("Cannot duplicate the option '--{0}'.")]
    DuplicateOption(String),

    #[error("Cannot duplicate the short option '-{0}'.")]
    DuplicateShortOption(char),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("Not enough tokens provided to '{0}'.")]
    Undercomplete(String),

    #[error("Too many tokens provided to '{0}'.")]
    Overcomplete(String),

    #[error("Unrecognized argument '{0}'.")]
    ArgumentsExhausted(String),

    #[error("Option '--{0}' does not exist.")]
    InvalidOption(String),

    #[error("Short option '-{0}' does not exist.")]
    InvalidShortOption(char),
}

impl MatchError {
    /// Whether the token was not recognized at all (as opposed to being malformed).
    pub(crate) fn is_unrecognized(&self) -> bool {
        matches!(
            self,
            MatchError::ArgumentsExhausted(_)
                | MatchError::InvalidOption(_)
                | MatchError::InvalidShortOption(_)
        )
    }

    /// Refer to the slot `from` as `to`.
    pub(crate) fn relabel(self, from: &str, to: &str) -> Self {
        match self {
            MatchError::Undercomplete(name) if name == from => MatchError::Undercomplete(to.to_string()),
            MatchError::Overcomplete(name) if name == from => MatchError::Overcomplete(to.to_string()),
            other => other,
        }
    }
}

impl From<CloseError> for MatchError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFew { name, .. } => MatchError::Undercomplete(name),
            CloseError::TooMany { name, .. } => MatchError::Overcomplete(name),
        }
    }
}

/// Aligns a stream of tokens to the configured options and arguments.
/// Options may repeat; each occurrence is matched in turn.
#[derive(Debug)]
pub(crate) struct TokenMatcher {
    option_bounds: HashMap<String, Bound>,
    short_options: HashMap<char, String>,
    arguments: VecDeque<ArgumentConfig>,
    fed: usize,
    matches: Vec<MatchTokens>,
    slot: Option<Slot>,
}

impl TokenMatcher {
    pub(crate) fn new(
        options: Vec<OptionConfig>,
        arguments: Vec<ArgumentConfig>,
    ) -> Result<Self, MatcherConfigError> {
        let mut option_bounds = HashMap::default();
        let mut short_options = HashMap::default();

        for option in options {
            if let Some(short) = option.short() {
                if short_options
                    .insert(short, option.name().to_string())
                    .is_some()
                {
                    return Err(MatcherConfigError::DuplicateShortOption(short));
                }
            }

            if option_bounds
                .insert(option.name().to_string(), option.bound())
                .is_some()
            {
                return Err(MatcherConfigError::DuplicateOption(
                    option.name().to_string(),
                ));
            }
        }

        Ok(Self {
            option_bounds,
            short_options,
            arguments: VecDeque::from(arguments),
            fed: 0,
            matches: Vec::default(),
            slot: None,
        })
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), MatchError> {
        let result = if let Some(long) = token.strip_prefix("--") {
            self.match_option(long)
        } else if let Some(shorts) = token
            .strip_prefix('-')
            .filter(|shorts| !shorts.is_empty() && !self.is_negative_number(shorts))
        {
            self.match_shorts(shorts)
        } else {
            self.match_argument(token)
        };

        self.fed += token.len();
        result
    }

    /// Feed `token` straight into the argument `target`.
    /// Any arguments still pending before `target` are closed without values.
    pub(crate) fn feed_discriminator(&mut self, target: &str, token: &str) -> Result<(), MatchError> {
        let result = self.match_discriminator(target, token);
        self.fed += token.len();
        result
    }

    /// Whether the matcher is part way through the values of an option.
    pub(crate) fn expects_value(&self) -> bool {
        match &self.slot {
            Some(slot) => self.option_bounds.contains_key(slot.name()) && !slot.satisfied(),
            None => false,
        }
    }

    pub(crate) fn can_close(&self) -> bool {
        let slot_ok = self.slot.as_ref().map_or(true, |slot| slot.satisfied());

        slot_ok
            && self
                .arguments
                .iter()
                .all(|argument| argument.bound().minimum() == 0)
    }

    /// Close all outstanding slots.
    /// On error, the first failure is reported alongside everything that did match.
    pub(crate) fn close(self) -> Result<Matches, (usize, MatchError, Matches)> {
        let TokenMatcher {
            arguments,
            fed,
            mut matches,
            slot,
            ..
        } = self;
        let mut first_error: Option<CloseError> = None;
        let remaining = arguments
            .into_iter()
            .map(|argument| Slot::new(argument.name(), argument.bound()));

        for pending in slot.into_iter().chain(remaining) {
            match pending.close() {
                Ok(match_tokens) => matches.push(match_tokens),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        let matches = Matches { values: matches };

        match first_error {
            Some(error) => Err((fed, MatchError::from(error), matches)),
            None => Ok(matches),
        }
    }

    fn match_argument(&mut self, token: &str) -> Result<(), MatchError> {
        let mut slot = match self.slot.take() {
            Some(slot) if slot.accepting() => slot,
            Some(slot) => {
                self.matches.push(slot.close()?);
                self.next_argument(token)?
            }
            None => self.next_argument(token)?,
        };

        slot.push(self.fed, token);
        self.slot.replace(slot);
        Ok(())
    }

    fn next_argument(&mut self, token: &str) -> Result<Slot, MatchError> {
        match self.arguments.pop_front() {
            Some(argument) => Ok(Slot::new(argument.name(), argument.bound())),
            None => Err(MatchError::ArgumentsExhausted(token.to_string())),
        }
    }

    fn match_option(&mut self, long: &str) -> Result<(), MatchError> {
        let (name, inline) = split_equals_delimiter(long);
        let bound = self
            .option_bounds
            .get(name)
            .copied()
            .ok_or_else(|| MatchError::InvalidOption(name.to_string()))?;
        // The 3 accounts for the "--" prefix and the "=" delimiter.
        let inline_offset = self.fed + name.len() + 3;
        self.open_option(name.to_string(), bound, inline.map(|v| (inline_offset, v)))
    }

    fn match_shorts(&mut self, shorts: &str) -> Result<(), MatchError> {
        let (singles, inline) = split_equals_delimiter(shorts);
        // The 2 accounts for the "-" prefix and the "=" delimiter.
        let inline_offset = self.fed + singles.len() + 2;
        let count = singles.chars().count();

        for (index, single) in singles.chars().enumerate() {
            let name = self
                .short_options
                .get(&single)
                .cloned()
                .ok_or(MatchError::InvalidShortOption(single))?;
            let bound = *self
                .option_bounds
                .get(&name)
                .expect("internal error - short option without a long option");

            if index + 1 == count {
                self.open_option(name, bound, inline.map(|v| (inline_offset, v)))?;
            } else {
                // Only the last of a combined "-abc" may take values.
                self.settle()?;
                self.matches.push(Slot::new(name, bound).close()?);
            }
        }

        Ok(())
    }

    fn open_option(
        &mut self,
        name: String,
        bound: Bound,
        inline: Option<(usize, &str)>,
    ) -> Result<(), MatchError> {
        self.settle()?;
        let mut slot = Slot::new(name, bound);

        match inline {
            Some((offset, value)) => {
                slot.push(offset, value);
                self.matches.push(slot.close()?);
            }
            None => {
                self.slot.replace(slot);
            }
        }

        Ok(())
    }

    fn match_discriminator(&mut self, target: &str, token: &str) -> Result<(), MatchError> {
        self.settle()?;

        while let Some(argument) = self.arguments.pop_front() {
            let mut slot = Slot::new(argument.name(), argument.bound());

            if argument.name() == target {
                slot.push(self.fed, token);
                self.matches.push(slot.close()?);
                return Ok(());
            }

            self.matches.push(slot.close()?);
        }

        Err(MatchError::ArgumentsExhausted(token.to_string()))
    }

    fn settle(&mut self) -> Result<(), MatchError> {
        if let Some(slot) = self.slot.take() {
            self.matches.push(slot.close()?);
        }

        Ok(())
    }

    fn is_negative_number(&self, shorts: &str) -> bool {
        match shorts.chars().next() {
            Some(first) if !self.short_options.contains_key(&first) => {
                shorts.parse::<f64>().is_ok()
            }
            _ => false,
        }
    }
}

fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn option(name: &str, short: Option<char>, bound: Bound) -> OptionConfig {
        OptionConfig::new(name, short, bound)
    }

    fn argument(name: &str, bound: Bound) -> ArgumentConfig {
        ArgumentConfig::new(name, bound)
    }

    fn tokens(name: &str, values: Vec<(usize, &str)>) -> MatchTokens {
        MatchTokens {
            name: name.to_string(),
            values: values
                .into_iter()
                .map(|(offset, value)| (offset, value.to_string()))
                .collect(),
        }
    }

    #[rstest]
    #[case(MatchError::Undercomplete("_x_".to_string()), MatchError::Undercomplete("X".to_string()))]
    #[case(MatchError::Overcomplete("_x_".to_string()), MatchError::Overcomplete("X".to_string()))]
    #[case(MatchError::Undercomplete("other".to_string()), MatchError::Undercomplete("other".to_string()))]
    #[case(MatchError::ArgumentsExhausted("_x_".to_string()), MatchError::ArgumentsExhausted("_x_".to_string()))]
    fn relabel(#[case] error: MatchError, #[case] expected: MatchError) {
        assert_eq!(error.relabel("_x_", "X"), expected);
    }

    #[test]
    fn option_duplicate() {
        let result = TokenMatcher::new(
            vec![
                option("verbose", None, Bound::Range(0, 0)),
                option("verbose", None, Bound::Range(0, 0)),
            ],
            Vec::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            MatcherConfigError::DuplicateOption("verbose".to_string())
        );
    }

    #[test]
    fn option_short_duplicate() {
        let result = TokenMatcher::new(
            vec![
                option("verbose", Some('v'), Bound::Range(0, 0)),
                option("value", Some('v'), Bound::Range(1, 1)),
            ],
            Vec::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            MatcherConfigError::DuplicateShortOption('v')
        );
    }

    #[rstest]
    #[case(vec!["--level", "3"], vec![(7, "3")])]
    #[case(vec!["--level=3"], vec![(8, "3")])]
    #[case(vec!["--level="], vec![(8, "")])]
    #[case(vec!["-l", "3"], vec![(2, "3")])]
    #[case(vec!["-l=3"], vec![(3, "3")])]
    fn option_value(#[case] input: Vec<&str>, #[case] expected: Vec<(usize, &str)>) {
        // Setup
        let mut matcher =
            TokenMatcher::new(vec![option("level", Some('l'), Bound::Range(1, 1))], vec![])
                .unwrap();

        // Execute
        for token in &input {
            matcher.feed(token).unwrap();
        }

        // Verify
        assert_eq!(
            matcher.close().unwrap().values,
            vec![tokens("level", expected)]
        );
    }

    #[test]
    fn option_repeat() {
        // Setup
        let mut matcher =
            TokenMatcher::new(vec![option("level", None, Bound::Range(1, 1))], vec![]).unwrap();

        // Execute
        for token in ["--level", "1", "--level", "2"] {
            matcher.feed(token).unwrap();
        }

        // Verify
        assert_eq!(
            matcher.close().unwrap().values,
            vec![tokens("level", vec![(7, "1")]), tokens("level", vec![(15, "2")])]
        );
    }

    #[test]
    fn option_undercomplete() {
        // Setup
        let mut matcher =
            TokenMatcher::new(vec![option("level", None, Bound::Range(1, 1))], vec![]).unwrap();

        // Execute
        matcher.feed("--level").unwrap();
        assert!(matcher.expects_value());
        let (offset, error, matches) = matcher.close().unwrap_err();

        // Verify
        assert_eq!(offset, 7);
        assert_eq!(error, MatchError::Undercomplete("level".to_string()));
        assert_eq!(matches, Matches::default());
    }

    #[rstest]
    #[case("--missing", MatchError::InvalidOption("missing".to_string()))]
    #[case("--missing=1", MatchError::InvalidOption("missing".to_string()))]
    #[case("-m", MatchError::InvalidShortOption('m'))]
    #[case("extra", MatchError::ArgumentsExhausted("extra".to_string()))]
    fn unrecognized(#[case] token: &str, #[case] expected: MatchError) {
        let mut matcher = TokenMatcher::new(vec![], vec![]).unwrap();
        let error = matcher.feed(token).unwrap_err();
        assert!(error.is_unrecognized());
        assert_eq!(error, expected);
    }

    #[test]
    fn shorts_combined() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![
                option("all", Some('a'), Bound::Range(0, 0)),
                option("brief", Some('b'), Bound::Range(0, 0)),
                option("count", Some('c'), Bound::Range(1, 1)),
            ],
            vec![],
        )
        .unwrap();

        // Execute
        matcher.feed("-abc=5").unwrap();

        // Verify
        assert_eq!(
            matcher.close().unwrap().values,
            vec![
                tokens("all", vec![]),
                tokens("brief", vec![]),
                tokens("count", vec![(5, "5")]),
            ]
        );
    }

    #[test]
    fn shorts_combined_value_in_middle() {
        let mut matcher = TokenMatcher::new(
            vec![
                option("count", Some('c'), Bound::Range(1, 1)),
                option("all", Some('a'), Bound::Range(0, 0)),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(
            matcher.feed("-ca").unwrap_err(),
            MatchError::Undercomplete("count".to_string())
        );
    }

    #[rstest]
    #[case("-5")]
    #[case("-1.25")]
    #[case("-")]
    fn negative_numbers_are_arguments(#[case] token: &str) {
        // Setup
        let mut matcher =
            TokenMatcher::new(vec![], vec![argument("value", Bound::Range(1, 1))]).unwrap();

        // Execute
        matcher.feed(token).unwrap();

        // Verify
        assert_eq!(
            matcher.close().unwrap().values,
            vec![tokens("value", vec![(0, token)])]
        );
    }

    #[rstest]
    #[case(vec![], vec![tokens("first", vec![]), tokens("rest", vec![])])]
    #[case(vec!["a"], vec![tokens("first", vec![(0, "a")]), tokens("rest", vec![])])]
    #[case(vec!["a", "b", "c"], vec![tokens("first", vec![(0, "a")]), tokens("rest", vec![(1, "b"), (2, "c")])])]
    fn arguments_optional_then_any(
        #[case] input: Vec<&str>,
        #[case] expected: Vec<MatchTokens>,
    ) {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![],
            vec![
                argument("first", Bound::Range(0, 1)),
                argument("rest", Bound::Lower(0)),
            ],
        )
        .unwrap();

        // Execute
        for token in &input {
            matcher.feed(token).unwrap();
        }

        // Verify
        assert!(matcher.can_close());
        assert_eq!(matcher.close().unwrap().values, expected);
    }

    #[test]
    fn arguments_required_missing() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![],
            vec![
                argument("first", Bound::Range(1, 1)),
                argument("second", Bound::Range(1, 1)),
            ],
        )
        .unwrap();

        // Execute
        matcher.feed("a").unwrap();
        assert!(!matcher.can_close());
        let (_, error, matches) = matcher.close().unwrap_err();

        // Verify
        assert_eq!(error, MatchError::Undercomplete("second".to_string()));
        assert_eq!(matches.values, vec![tokens("first", vec![(0, "a")])]);
    }

    #[test]
    fn option_breaks_greedy_argument() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![option("verbose", Some('v'), Bound::Range(0, 0))],
            vec![
                argument("items", Bound::Lower(1)),
                argument("last", Bound::Range(1, 1)),
            ],
        )
        .unwrap();

        // Execute
        for token in ["a", "b", "-v", "c"] {
            matcher.feed(token).unwrap();
        }

        // Verify
        assert_eq!(
            matcher.close().unwrap().values,
            vec![
                tokens("items", vec![(0, "a"), (1, "b")]),
                tokens("verbose", vec![]),
                tokens("last", vec![(4, "c")]),
            ]
        );
    }

    #[test]
    fn discriminator_skips_optional_arguments() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![],
            vec![
                argument("name", Bound::Range(0, 1)),
                argument("command", Bound::Range(1, 1)),
            ],
        )
        .unwrap();

        // Execute
        matcher.feed_discriminator("command", "search").unwrap();

        // Verify
        assert!(matcher.can_close());
        assert_eq!(
            matcher.close().unwrap().values,
            vec![tokens("name", vec![]), tokens("command", vec![(0, "search")])]
        );
    }

    #[test]
    fn discriminator_missing_required() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![],
            vec![
                argument("name", Bound::Range(1, 1)),
                argument("command", Bound::Range(1, 1)),
            ],
        )
        .unwrap();

        // Execute
        let error = matcher.feed_discriminator("command", "search").unwrap_err();

        // Verify
        assert_eq!(error, MatchError::Undercomplete("name".to_string()));
    }

    #[test]
    fn expects_value() {
        // Setup
        let mut matcher = TokenMatcher::new(
            vec![
                option("level", None, Bound::Range(1, 1)),
                option("verbose", None, Bound::Range(0, 0)),
            ],
            vec![argument("rest", Bound::Lower(0))],
        )
        .unwrap();
        assert!(!matcher.expects_value());

        // Execute & Verify
        matcher.feed("--level").unwrap();
        assert!(matcher.expects_value());
        matcher.feed("1").unwrap();
        assert!(!matcher.expects_value());
        matcher.feed("--verbose").unwrap();
        assert!(!matcher.expects_value());
        matcher.feed("x").unwrap();
        assert!(!matcher.expects_value());
    }
}
