//! Parsing engine for `argbind`.
//!
//! Builds a command line parser out of [`Rule`]s, optionally branching into sub-commands, and parses tokens
//! into dynamically typed [`Value`]s.
//! Most users want the `argbind` crate, which derives these rules from callable signatures.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;
mod value;

pub use api::*;
pub use constant::ERROR_EXIT_CODE;
pub use model::Nargs;
pub use parser::{
    ConfigError, ConsoleInterface, ErrorContext, GeneralParser, InMemoryInterface, Parsed,
    Selection, UserInterface,
};
pub use value::{convert, Converter, Value, Values};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
