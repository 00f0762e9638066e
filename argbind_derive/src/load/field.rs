use crate::load::incompatible_error;
use crate::model::{Conversion, DeriveField, DeriveValue, FieldKind, IntermediateAttributes};
use quote::ToTokens;

// The structure of a field type, as far as the command line is concerned.
enum Shape<'a> {
    Bool,
    Optional(&'a syn::Type),
    Sequence(&'a syn::Type),
    Mapping(&'a syn::Type),
    Scalar(&'a syn::Type),
}

impl TryFrom<&syn::Field> for DeriveField {
    type Error = syn::Error;

    fn try_from(value: &syn::Field) -> Result<Self, Self::Error> {
        let field_name = value
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(value, "Invalid - field must be named."))?;
        let attributes = IntermediateAttributes::collect(&value.attrs)?;
        let explicit: Vec<&str> = ["positional", "option", "flag", "varargs", "varkw"]
            .into_iter()
            .filter(|singleton| attributes.has(singleton))
            .collect();

        if let [left, right, ..] = explicit.as_slice() {
            return Err(incompatible_error(
                &field_name,
                format!("#[argbind({left})]"),
                format!("#[argbind({right})]"),
            ));
        }

        let shape = shape(&field_name, &value.ty)?;
        let nullable = matches!(shape, Shape::Optional(_));
        let (kind, conversion) = match (explicit.first().copied(), shape) {
            (Some("varargs"), Shape::Sequence(inner)) => (FieldKind::VarArgs, conversion(inner)),
            (Some("varargs"), _) => return Err(requires(&field_name, "varargs", "Vec<..>")),
            (Some("varkw"), Shape::Mapping(inner)) => (FieldKind::VarKw, conversion(inner)),
            (Some("varkw"), _) => {
                return Err(requires(&field_name, "varkw", "BTreeMap<String, ..>"));
            }
            (Some("flag") | None, Shape::Bool) => (FieldKind::Flag, Conversion::Verbatim),
            (Some("flag"), _) => return Err(requires(&field_name, "flag", "bool")),
            (Some("option") | None, Shape::Optional(inner)) => {
                (FieldKind::Option, conversion(inner))
            }
            (Some("option"), Shape::Scalar(inner)) => (FieldKind::Option, conversion(inner)),
            (Some("option"), Shape::Bool) => (FieldKind::Option, Conversion::Boolean),
            (Some("positional"), Shape::Optional(inner)) => {
                (FieldKind::Positional, conversion(inner))
            }
            (Some("positional"), Shape::Bool) => (FieldKind::Positional, Conversion::Boolean),
            (Some("positional") | None, Shape::Scalar(inner)) => {
                (FieldKind::Positional, conversion(inner))
            }
            (_, Shape::Sequence(_)) => return Err(requires(&field_name, "varargs", "Vec<..>")),
            (_, Shape::Mapping(_)) => {
                return Err(requires(&field_name, "varkw", "BTreeMap<String, ..>"));
            }
            (Some(other), _) => unreachable!("internal error - unexpected singleton '{other}'"),
        };

        let short = attributes.pair("short");
        let default = attributes.pair("default");

        if short.is_some() {
            match kind {
                FieldKind::Positional => {
                    return Err(incompatible_error(
                        &field_name,
                        "positional",
                        "#[argbind(short = ..)]",
                    ));
                }
                FieldKind::VarArgs | FieldKind::VarKw => {
                    return Err(incompatible_error(
                        &field_name,
                        "variadic",
                        "#[argbind(short = ..)]",
                    ));
                }
                FieldKind::Option | FieldKind::Flag => {}
            }
        }

        if default.is_some() && matches!(kind, FieldKind::VarArgs | FieldKind::VarKw) {
            return Err(incompatible_error(
                &field_name,
                "variadic",
                "#[argbind(default = ..)]",
            ));
        }

        Ok(DeriveField {
            field_name,
            kind,
            nullable,
            conversion,
            short,
            help: attributes.pair("help"),
            default,
            display: attributes.pair("display"),
            choices: attributes.pair("choices"),
        })
    }
}

fn requires(field_name: &syn::Ident, singleton: &str, field_type: &str) -> syn::Error {
    syn::Error::new(
        field_name.span(),
        format!("Invalid - `#[argbind({singleton})]` requires a `{field_type}` field."),
    )
}

fn shape<'a>(field_name: &syn::Ident, ty: &'a syn::Type) -> Result<Shape<'a>, syn::Error> {
    let segment = match ty {
        syn::Type::Path(path) => path.path.segments.last(),
        _ => None,
    };
    let segment = segment.ok_or_else(|| {
        syn::Error::new(
            field_name.span(),
            format!("Invalid - unsupported field type `{}`.", ty.to_token_stream()),
        )
    })?;
    let generics: Vec<&syn::Type> = match &segment.arguments {
        syn::PathArguments::AngleBracketed(arguments) => arguments
            .args
            .iter()
            .filter_map(|argument| match argument {
                syn::GenericArgument::Type(inner) => Some(inner),
                _ => None,
            })
            .collect(),
        _ => Vec::default(),
    };

    Ok(
        match (segment.ident.to_string().as_str(), generics.as_slice()) {
            ("bool", []) => Shape::Bool,
            ("Option", [inner]) => Shape::Optional(inner),
            ("Vec", [inner]) => Shape::Sequence(inner),
            ("BTreeMap" | "HashMap", [_, inner]) => Shape::Mapping(inner),
            _ => Shape::Scalar(ty),
        },
    )
}

fn conversion(ty: &syn::Type) -> Conversion {
    let ident = match ty {
        syn::Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    match ident.as_deref() {
        Some("String" | "Value") => Conversion::Verbatim,
        Some("bool") => Conversion::Boolean,
        _ => Conversion::Parse(DeriveValue {
            tokens: ty.to_token_stream(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::{Literal, Span};
    use quote::quote;
    use syn::parse_quote;

    //# Implicit construction

    #[test]
    fn construct_positional() {
        // Setup
        let input: syn::Field = parse_quote! {
            my_field: usize
        };

        // Execute
        let derive_field = DeriveField::try_from(&input).unwrap();

        // Verify
        assert_eq!(
            derive_field,
            DeriveField {
                field_name: ident("my_field"),
                kind: FieldKind::Positional,
                nullable: false,
                conversion: Conversion::Parse(DeriveValue {
                    tokens: quote! { usize },
                }),
                short: None,
                help: None,
                default: None,
                display: None,
                choices: None,
            }
        );
    }

    #[test]
    fn construct_positional_string() {
        let input: syn::Field = parse_quote! {
            my_field: String
        };
        let derive_field = DeriveField::try_from(&input).unwrap();
        assert_eq!(derive_field.kind, FieldKind::Positional);
        assert_eq!(derive_field.conversion, Conversion::Verbatim);
    }

    #[test]
    fn construct_option() {
        // Setup
        let input: syn::Field = parse_quote! {
            #[argbind(short = 'm', help = "abc")]
            my_field: Option<u32>
        };

        // Execute
        let derive_field = DeriveField::try_from(&input).unwrap();

        // Verify
        assert_eq!(derive_field.kind, FieldKind::Option);
        assert_eq!(
            derive_field.conversion,
            Conversion::Parse(DeriveValue {
                tokens: quote! { u32 },
            })
        );
        assert_eq!(
            derive_field.short,
            Some(DeriveValue {
                tokens: Literal::character('m').into_token_stream(),
            })
        );
        assert_eq!(
            derive_field.help,
            Some(DeriveValue {
                tokens: Literal::string("abc").into_token_stream(),
            })
        );
    }

    #[test]
    fn construct_flag() {
        let input: syn::Field = parse_quote! {
            my_field: bool
        };
        let derive_field = DeriveField::try_from(&input).unwrap();
        assert_eq!(derive_field.kind, FieldKind::Flag);
    }

    #[test]
    fn construct_varargs() {
        // Setup
        let input: syn::Field = parse_quote! {
            #[argbind(varargs)]
            my_field: Vec<f64>
        };

        // Execute
        let derive_field = DeriveField::try_from(&input).unwrap();

        // Verify
        assert_eq!(derive_field.kind, FieldKind::VarArgs);
        assert_eq!(
            derive_field.conversion,
            Conversion::Parse(DeriveValue {
                tokens: quote! { f64 },
            })
        );
    }

    #[test]
    fn construct_varkw() {
        // Setup
        let input: syn::Field = parse_quote! {
            #[argbind(varkw)]
            my_field: std::collections::HashMap<String, String>
        };

        // Execute
        let derive_field = DeriveField::try_from(&input).unwrap();

        // Verify
        assert_eq!(derive_field.kind, FieldKind::VarKw);
        assert_eq!(derive_field.conversion, Conversion::Verbatim);
    }

    //# Explicit construction

    #[test]
    fn construct_explicit_option() {
        let input: syn::Field = parse_quote! {
            #[argbind(option, default = 3)]
            my_field: u8
        };
        let derive_field = DeriveField::try_from(&input).unwrap();
        assert_eq!(derive_field.kind, FieldKind::Option);
        assert_eq!(
            derive_field.default,
            Some(DeriveValue {
                tokens: quote! { 3 },
            })
        );
    }

    #[test]
    fn construct_explicit_positional_optional() {
        let input: syn::Field = parse_quote! {
            #[argbind(positional)]
            my_field: Option<String>
        };
        let derive_field = DeriveField::try_from(&input).unwrap();
        assert_eq!(derive_field.kind, FieldKind::Positional);
        assert!(derive_field.nullable);
        assert_eq!(derive_field.conversion, Conversion::Verbatim);
    }

    #[test]
    fn construct_explicit_positional_bool() {
        let input: syn::Field = parse_quote! {
            #[argbind(positional)]
            my_field: bool
        };
        let derive_field = DeriveField::try_from(&input).unwrap();
        assert_eq!(derive_field.kind, FieldKind::Positional);
        assert_eq!(derive_field.conversion, Conversion::Boolean);
    }

    //# Errors

    #[test]
    fn construct_positional_option() {
        // Setup
        let input: syn::Field = parse_quote! {
            #[argbind(positional, option)]
            my_field: u32
        };

        // Execute
        let result = DeriveField::try_from(&input);

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid - field cannot be both `#[argbind(positional)]` and `#[argbind(option)]`."
        );
    }

    #[test]
    fn construct_flag_non_bool() {
        let input: syn::Field = parse_quote! {
            #[argbind(flag)]
            my_field: u32
        };
        let result = DeriveField::try_from(&input);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid - `#[argbind(flag)]` requires a `bool` field."
        );
    }

    #[test]
    fn construct_varargs_non_vec() {
        let input: syn::Field = parse_quote! {
            #[argbind(varargs)]
            my_field: String
        };
        let result = DeriveField::try_from(&input);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid - `#[argbind(varargs)]` requires a `Vec<..>` field."
        );
    }

    #[test]
    fn construct_implicit_vec() {
        let input: syn::Field = parse_quote! {
            my_field: Vec<String>
        };
        assert!(DeriveField::try_from(&input).is_err());
    }

    #[test]
    fn construct_positional_short() {
        // Setup
        let input: syn::Field = parse_quote! {
            #[argbind(short = 'm')]
            my_field: u32
        };

        // Execute
        let result = DeriveField::try_from(&input);

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid - field cannot be both `positional` and `#[argbind(short = ..)]`."
        );
    }

    #[test]
    fn construct_variadic_default() {
        let input: syn::Field = parse_quote! {
            #[argbind(varargs, default = 1)]
            my_field: Vec<u32>
        };
        assert!(DeriveField::try_from(&input).is_err());
    }

    #[test]
    fn construct_unsupported_type() {
        let input: syn::Field = parse_quote! {
            my_field: &'static str
        };
        let result = DeriveField::try_from(&input);
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("Invalid - unsupported field type"));
    }

    fn ident(name: &str) -> syn::Ident {
        syn::Ident::new(name, Span::call_site())
    }
}
