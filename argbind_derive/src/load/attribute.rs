use crate::model::{DeriveValue, IntermediateAttributes};
use quote::ToTokens;
use std::collections::{HashMap, HashSet};

impl TryFrom<&syn::Attribute> for IntermediateAttributes {
    type Error = syn::Error;

    fn try_from(value: &syn::Attribute) -> Result<Self, Self::Error> {
        let attributes_parser =
            syn::punctuated::Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated;
        let expressions = value.parse_args_with(attributes_parser)?;
        let mut singletons = HashSet::default();
        let mut pairs: HashMap<String, Vec<DeriveValue>> = HashMap::default();

        for expression in expressions {
            match expression {
                syn::Expr::Assign(assignment) => {
                    let left = assignment.left.to_token_stream();
                    let values = pairs.entry(left.to_string()).or_default();
                    values.push(DeriveValue {
                        tokens: assignment.right.to_token_stream(),
                    });
                }
                syn::Expr::Path(ref path) if path.path.get_ident().is_some() => {
                    if let Some(ident) = path.path.get_ident() {
                        singletons.insert(ident.to_string());
                    }
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        &other,
                        format!(
                            "Invalid - unparseable attribute `{}`.",
                            other.to_token_stream()
                        ),
                    ));
                }
            };
        }

        Ok(Self { singletons, pairs })
    }
}

impl IntermediateAttributes {
    /// Merge the `#[argbind(..)]` attributes of an item.
    pub fn collect(attributes: &[syn::Attribute]) -> Result<Self, syn::Error> {
        let mut merged = IntermediateAttributes::default();

        for attribute in attributes {
            if attribute.path().is_ident("argbind") {
                let IntermediateAttributes { singletons, pairs } =
                    IntermediateAttributes::try_from(attribute)?;
                merged.singletons.extend(singletons);

                for (key, values) in pairs {
                    merged.pairs.entry(key).or_default().extend(values);
                }
            }
        }

        Ok(merged)
    }

    pub fn has(&self, singleton: &str) -> bool {
        self.singletons.contains(singleton)
    }

    /// The last value of a pair, if given.
    pub fn pair(&self, key: &str) -> Option<DeriveValue> {
        self.pairs
            .get(key)
            .and_then(|values| values.last())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::Literal;
    use quote::ToTokens;
    use std::collections::{HashMap, HashSet};
    use syn::parse_quote;

    #[test]
    fn construct_attributes_empty() {
        // Setup
        let attribute: syn::Attribute = parse_quote! {
            #[argbind()]
        };

        // Execute
        let attributes = IntermediateAttributes::try_from(&attribute).unwrap();

        // Verify
        assert_eq!(
            attributes,
            IntermediateAttributes {
                singletons: HashSet::default(),
                pairs: HashMap::default()
            }
        );
    }

    #[test]
    fn construct_attributes() {
        // Setup
        let attribute: syn::Attribute = parse_quote! {
            #[argbind(option, help = "123")]
        };

        // Execute
        let attributes = IntermediateAttributes::try_from(&attribute).unwrap();

        // Verify
        assert_eq!(
            attributes,
            IntermediateAttributes {
                singletons: HashSet::from(["option".to_string()]),
                pairs: HashMap::from([(
                    "help".to_string(),
                    vec![DeriveValue {
                        tokens: Literal::string("123").into_token_stream(),
                    }]
                )])
            }
        );
    }

    #[test]
    fn construct_attributes_unparseable() {
        // Setup
        let attribute: syn::Attribute = parse_quote! {
            #[argbind(1 + 2)]
        };

        // Execute
        let result = IntermediateAttributes::try_from(&attribute);

        // Verify
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unparseable attribute"), "{message}");
    }

    #[test]
    fn collect_merges() {
        // Setup
        let field: syn::Field = parse_quote! {
            #[argbind(option, help = "first")]
            #[doc = "ignored"]
            #[argbind(short = 'c', help = "second")]
            my_field: Option<u32>
        };

        // Execute
        let attributes = IntermediateAttributes::collect(&field.attrs).unwrap();

        // Verify
        assert!(attributes.has("option"));
        assert!(!attributes.has("flag"));
        assert_eq!(
            attributes.pair("help"),
            Some(DeriveValue {
                tokens: Literal::string("second").into_token_stream(),
            })
        );
        assert_eq!(
            attributes.pair("short"),
            Some(DeriveValue {
                tokens: Literal::character('c').into_token_stream(),
            })
        );
    }
}
