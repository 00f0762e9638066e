use crate::model::{Conversion, DeriveField, DeriveValue, FieldKind};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

impl DeriveField {
    /// The `Parameters` builder calls declaring the field.
    pub(crate) fn declaration(&self) -> TokenStream2 {
        let name = self.field_name.to_string();
        let declare = match (self.kind, &self.default) {
            (FieldKind::VarArgs, _) => quote! { .varargs(#name) },
            (FieldKind::VarKw, _) => quote! { .varkw(#name) },
            (_, Some(DeriveValue { tokens })) => quote! { .optional(#name, #tokens) },
            (FieldKind::Flag, None) => quote! { .optional(#name, false) },
            (FieldKind::Option, None) => quote! { .optional(#name, argbind::Value::Null) },
            (FieldKind::Positional, None) if self.nullable => {
                quote! { .optional(#name, argbind::Value::Null) }
            }
            (FieldKind::Positional, None) => quote! { .required(#name) },
        };
        let metadata = self.metadata();

        quote! {
            #declare
            .annotate(#name, #metadata)
        }
    }

    fn metadata(&self) -> TokenStream2 {
        let mut metadata = match self.kind {
            FieldKind::Positional | FieldKind::VarArgs | FieldKind::VarKw => {
                quote! { argbind::Metadata::positional() }
            }
            FieldKind::Option => quote! { argbind::Metadata::option() },
            FieldKind::Flag => quote! { argbind::Metadata::flag() },
        };

        for (method, value) in [
            (quote! { short }, &self.short),
            (quote! { help }, &self.help),
            (quote! { display }, &self.display),
            (quote! { choices }, &self.choices),
        ] {
            if let Some(DeriveValue { tokens }) = value {
                metadata = quote! { #metadata.#method(#tokens) };
            }
        }

        match &self.conversion {
            Conversion::Verbatim => metadata,
            Conversion::Boolean => quote! { #metadata.convert(argbind::convert::boolean()) },
            Conversion::Parse(DeriveValue { tokens }) => {
                quote! { #metadata.convert(argbind::convert::parse::<#tokens>()) }
            }
        }
    }

    /// The statement binding the field out of the call.
    pub(crate) fn binding(&self) -> TokenStream2 {
        let field_name = &self.field_name;
        let name = field_name.to_string();

        match self.kind {
            FieldKind::VarArgs => quote! { let #field_name = __binder.varargs(#name)?; },
            FieldKind::VarKw => quote! { let #field_name = __binder.varkw(#name)?; },
            FieldKind::Positional | FieldKind::Option | FieldKind::Flag => {
                quote! { let #field_name = __binder.next(#name)?; }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(input: syn::Field) -> DeriveField {
        DeriveField::try_from(&input).unwrap()
    }

    #[test]
    fn render_required() {
        // Setup
        let derive_field = field(parse_quote! {
            my_field: u32
        });

        // Execute
        let token_stream = derive_field.declaration();

        // Verify
        assert_eq!(
            token_stream.to_string(),
            ". required (\"my_field\") . annotate (\"my_field\" , argbind :: Metadata :: positional () . convert (argbind :: convert :: parse :: < u32 > ()))"
        );
    }

    #[test]
    fn render_option() {
        // Setup
        let derive_field = field(parse_quote! {
            #[argbind(short = 'v', help = "The value.")]
            value: Option<String>
        });

        // Execute
        let token_stream = derive_field.declaration();

        // Verify
        assert_eq!(
            token_stream.to_string(),
            ". optional (\"value\" , argbind :: Value :: Null) . annotate (\"value\" , argbind :: Metadata :: option () . short ('v') . help (\"The value.\"))"
        );
    }

    #[test]
    fn render_flag_default() {
        let derive_field = field(parse_quote! {
            verbose: bool
        });
        assert_eq!(
            derive_field.declaration().to_string(),
            ". optional (\"verbose\" , false) . annotate (\"verbose\" , argbind :: Metadata :: flag ())"
        );
    }

    #[test]
    fn render_positional_default() {
        let derive_field = field(parse_quote! {
            #[argbind(default = "1234", choices = ["1234", "4321"])]
            code: String
        });
        assert_eq!(
            derive_field.declaration().to_string(),
            ". optional (\"code\" , \"1234\") . annotate (\"code\" , argbind :: Metadata :: positional () . choices ([\"1234\" , \"4321\"]))"
        );
    }

    #[test]
    fn render_varkw() {
        // Setup
        let derive_field = field(parse_quote! {
            #[argbind(varkw)]
            extra: BTreeMap<String, i64>
        });

        // Execute
        let declaration = derive_field.declaration();
        let binding = derive_field.binding();

        // Verify
        assert_eq!(
            declaration.to_string(),
            ". varkw (\"extra\") . annotate (\"extra\" , argbind :: Metadata :: positional () . convert (argbind :: convert :: parse :: < i64 > ()))"
        );
        assert_eq!(
            binding.to_string(),
            "let extra = __binder . varkw (\"extra\") ? ;"
        );
    }

    #[test]
    fn render_binding() {
        let derive_field = field(parse_quote! {
            my_field: u32
        });
        assert_eq!(
            derive_field.binding().to_string(),
            "let my_field = __binder . next (\"my_field\") ? ;"
        );
    }
}
