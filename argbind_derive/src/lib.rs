extern crate proc_macro;

mod generate;
mod load;
mod model;

use crate::model::DeriveArguments;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

/// Implement `argbind::Arguments` for a struct with named fields.
/// See `argbind::derive` for the field attributes.
#[proc_macro_derive(Arguments, attributes(argbind))]
pub fn arguments(input: TokenStream) -> TokenStream {
    let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);

    match DeriveArguments::try_from(derive_input) {
        Ok(arguments) => TokenStream2::from(arguments).into(),
        Err(error) => error.to_compile_error().into(),
    }
}
