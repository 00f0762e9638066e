//! Derive Api for typed parameters.
//!
//! ### Getting Started
//! Instrument a struct `S` with `#[derive(Arguments)]`, and hand a function of `S` to [`Function::typed`].
//! This generates `S::parameters()`, declaring one parameter per field, and `S::from_call(..)`, binding the
//! reconstructed call back into `S`.
//! `argbind` infers the parameter from the field type:
//! * `bool` fields are flags (`--name`), defaulting to `false`.
//! * `Option<T>` fields are options (`--name VALUE`), defaulting to `None`.
//! * Any other field is a positional, required unless given a `default`.
//!
//! Non-`String` scalars are converted from their token via [`std::str::FromStr`].
//!
//! ```no_run
#![doc = include_str!("../demos/demo_derive.rs")]
//! ```
//!
//! ### Field Configuration
//! Each field takes `#[argbind(..)]` attributes:
//! * `positional`, `option`, `flag`: override the inferred kind.
//! * `short = 'c'`: the short alias of an option or flag.
//! * `help = "..."`: the help message; `{default}` is substituted.
//! * `default = expr`: the default (any expression convertible into a [`Value`]).
//! * `display = "..."`: the label shown for the value in the usage and help.
//! * `choices = [a, b, ..]`: the allowed values.
//! * `varargs`: collect the remaining bare tokens (on a `Vec<T>`).
//! * `varkw`: collect the remaining `name=value` tokens (on a `BTreeMap<String, T>` or `HashMap<String, T>`).
//!
//! Incompatible attributes (ex: `positional` with `short`) are compile errors.
//!
//! [`Function::typed`]: crate::Function::typed
//! [`Value`]: crate::Value
pub use argbind_derive::Arguments;
