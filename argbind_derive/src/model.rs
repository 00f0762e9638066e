use proc_macro2::TokenStream as TokenStream2;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DeriveValue {
    pub tokens: TokenStream2,
}

impl PartialEq for DeriveValue {
    fn eq(&self, other: &Self) -> bool {
        let st = &self.tokens.to_string();
        let ot = &other.tokens.to_string();
        st == ot
    }
}

impl Eq for DeriveValue {}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntermediateAttributes {
    pub singletons: HashSet<String>,
    pub pairs: HashMap<String, Vec<DeriveValue>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Positional,
    Option,
    Flag,
    VarArgs,
    VarKw,
}

/// How the values of a field convert from their tokens.
#[derive(Debug, PartialEq, Eq)]
pub enum Conversion {
    /// Kept as is (`String`, `Value`).
    Verbatim,
    Boolean,
    /// Via `FromStr` of the scalar type.
    Parse(DeriveValue),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveField {
    pub field_name: syn::Ident,
    pub kind: FieldKind,
    /// Whether the field binds `Null` (an `Option<..>` field).
    pub nullable: bool,
    pub conversion: Conversion,
    pub short: Option<DeriveValue>,
    pub help: Option<DeriveValue>,
    pub default: Option<DeriveValue>,
    pub display: Option<DeriveValue>,
    pub choices: Option<DeriveValue>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveArguments {
    pub struct_name: syn::Ident,
    pub fields: Vec<DeriveField>,
}
