mod attribute;
mod field;

use crate::model::{DeriveArguments, DeriveField, FieldKind};

pub(self) fn incompatible_error(
    field_name: &syn::Ident,
    left: impl Into<String>,
    right: impl Into<String>,
) -> syn::Error {
    syn::Error::new(
        field_name.span(),
        format!(
            "Invalid - field cannot be both `{}` and `{}`.",
            left.into(),
            right.into(),
        ),
    )
}

impl TryFrom<syn::DeriveInput> for DeriveArguments {
    type Error = syn::Error;

    fn try_from(value: syn::DeriveInput) -> Result<Self, Self::Error> {
        let struct_name = value.ident.clone();

        if !value.generics.params.is_empty() {
            return Err(syn::Error::new(
                struct_name.span(),
                "Invalid - `Arguments` cannot be derived for a generic struct.",
            ));
        }

        let fields = match &value.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(fields),
                ..
            }) => fields
                .named
                .iter()
                .map(DeriveField::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Unit,
                ..
            }) => Vec::default(),
            _ => {
                return Err(syn::Error::new(
                    struct_name.span(),
                    "Invalid - `Arguments` can only be derived for a struct with named fields.",
                ));
            }
        };

        for kind in [FieldKind::VarArgs, FieldKind::VarKw] {
            let variadic: Vec<String> = fields
                .iter()
                .filter(|f| f.kind == kind)
                .map(|f| f.field_name.to_string())
                .collect();

            if variadic.len() > 1 {
                return Err(syn::Error::new(
                    struct_name.span(),
                    format!("Invalid - struct cannot have multiple {kind:?} fields: {variadic:?}."),
                ));
            }
        }

        Ok(DeriveArguments {
            struct_name,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn construct_arguments() {
        // Setup
        let input: syn::DeriveInput = parse_quote! {
            struct Parameters {
                a: u32,
                #[argbind(varargs)]
                rest: Vec<String>,
            }
        };

        // Execute
        let arguments = DeriveArguments::try_from(input).unwrap();

        // Verify
        assert_eq!(arguments.struct_name.to_string(), "Parameters");
        assert_eq!(
            arguments.fields.iter().map(|f| f.kind).collect::<Vec<_>>(),
            vec![FieldKind::Positional, FieldKind::VarArgs]
        );
    }

    #[test]
    fn construct_unit() {
        let input: syn::DeriveInput = parse_quote! {
            struct Nothing;
        };
        let arguments = DeriveArguments::try_from(input).unwrap();
        assert!(arguments.fields.is_empty());
    }

    #[test]
    fn construct_multiple_varargs() {
        // Setup
        let input: syn::DeriveInput = parse_quote! {
            struct Parameters {
                #[argbind(varargs)]
                left: Vec<String>,
                #[argbind(varargs)]
                right: Vec<String>,
            }
        };

        // Execute
        let result = DeriveArguments::try_from(input);

        // Verify
        let message = result.unwrap_err().to_string();
        assert!(message.contains("multiple VarArgs fields"), "{message}");
    }

    #[test]
    fn construct_enum() {
        let input: syn::DeriveInput = parse_quote! {
            enum Parameters { A, B }
        };
        assert!(DeriveArguments::try_from(input).is_err());
    }

    #[test]
    fn construct_generic() {
        let input: syn::DeriveInput = parse_quote! {
            struct Parameters<T> { a: T }
        };
        assert!(DeriveArguments::try_from(input).is_err());
    }
}
