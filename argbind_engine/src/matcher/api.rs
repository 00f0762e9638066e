use crate::matcher::MatchTokens;
use crate::model::Nargs;

/// A token paired with its offset into the (space-less) token stream.
pub(crate) type OffsetValue = (usize, String);

/// How many tokens a slot accepts: `Range(min, max)` inclusive, or `Lower(min)` and unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(u8, u8),
    Lower(u8),
}

impl Bound {
    pub(crate) fn minimum(&self) -> u8 {
        match self {
            Bound::Range(minimum, _) | Bound::Lower(minimum) => *minimum,
        }
    }

    pub(crate) fn admits(&self, count: usize) -> bool {
        match self {
            Bound::Range(_, maximum) => count < *maximum as usize,
            Bound::Lower(_) => true,
        }
    }
}

impl From<Nargs> for Bound {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Bound::Range(n, n),
            Nargs::AtMostOne => Bound::Range(0, 1),
            Nargs::Any => Bound::Lower(0),
            Nargs::AtLeastOne => Bound::Lower(1),
        }
    }
}

#[cfg(test)]
impl rand::distributions::Distribution<Bound> for rand::distributions::Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Bound {
        if rng.gen_bool(0.5) {
            let maximum: u8 = rng.gen();
            Bound::Range(rng.gen_range(0..=maximum), maximum)
        } else {
            Bound::Lower(rng.gen())
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentConfig {
    name: String,
    bound: Bound,
}

impl ArgumentConfig {
    pub(crate) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OptionConfig {
    name: String,
    short: Option<char>,
    bound: Bound,
}

impl OptionConfig {
    pub(crate) fn new(name: impl Into<String>, short: Option<char>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            short,
            bound,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn short(&self) -> Option<char> {
        self.short
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

/// Everything matched from one token stream, in the order it was matched.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Matches {
    pub values: Vec<MatchTokens>,
}

impl Matches {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|tokens| tokens.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;

    #[rstest]
    #[case(Nargs::Precisely(0), Bound::Range(0, 0))]
    #[case(Nargs::Precisely(3), Bound::Range(3, 3))]
    #[case(Nargs::AtMostOne, Bound::Range(0, 1))]
    #[case(Nargs::Any, Bound::Lower(0))]
    #[case(Nargs::AtLeastOne, Bound::Lower(1))]
    fn from_nargs(#[case] nargs: Nargs, #[case] expected: Bound) {
        assert_eq!(Bound::from(nargs), expected);
    }

    #[test]
    fn admits_random() {
        let mut rng = rand::thread_rng();

        for _ in 0..100 {
            let bound: Bound = rng.gen();
            match bound {
                Bound::Range(minimum, maximum) => {
                    assert!(minimum <= maximum);
                    assert!(!bound.admits(maximum as usize));
                    assert_eq!(bound.admits(minimum as usize), minimum < maximum);
                }
                Bound::Lower(minimum) => {
                    assert!(bound.admits(minimum as usize));
                    assert!(bound.admits(usize::MAX));
                }
            }
        }
    }
}
