//! Traits which, typically, may be imported without concern: `use argbind_engine::prelude::*`.

use crate::value::{Converter, Values};

/// Behaviour for a custom collector rule: fold one matched token into the parse values.
// Needs to be imported in order to implement a custom collector.
pub trait Collect {
    /// Fold `token` into `values`, typically under `dest`.
    /// The collector decides how (or whether) to apply the declared `converter`.
    /// An `Err` is a short reason, reported against the offending token.
    fn collect(
        &self,
        dest: &str,
        token: &str,
        converter: Option<&Converter>,
        values: &mut Values,
    ) -> Result<(), String>;
}

impl<F> Collect for F
where
    F: Fn(&str, &str, Option<&Converter>, &mut Values) -> Result<(), String>,
{
    fn collect(
        &self,
        dest: &str,
        token: &str,
        converter: Option<&Converter>,
        values: &mut Values,
    ) -> Result<(), String> {
        self(dest, token, converter, values)
    }
}
