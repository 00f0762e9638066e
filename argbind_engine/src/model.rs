/// The cardinality of inputs to match for a rule.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(u8),
    /// `?`: Zero or one value.
    AtMostOne,
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl Nargs {
    /// Whether the matched values are stored as a single value, rather than a list.
    pub(crate) fn is_single(&self) -> bool {
        matches!(self, Nargs::Precisely(1) | Nargs::AtMostOne)
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
