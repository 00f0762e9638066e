mod field;

use crate::model::DeriveArguments;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

impl From<DeriveArguments> for TokenStream2 {
    fn from(value: DeriveArguments) -> Self {
        let DeriveArguments {
            struct_name,
            fields,
        } = value;
        let declarations: Vec<TokenStream2> = fields.iter().map(|f| f.declaration()).collect();
        let bindings: Vec<TokenStream2> = fields.iter().map(|f| f.binding()).collect();
        let field_names = fields.iter().map(|f| &f.field_name);

        quote! {
            impl argbind::Arguments for #struct_name {
                fn parameters() -> argbind::Parameters {
                    argbind::Parameters::new()
                        #( #declarations )*
                }

                fn from_call(call: argbind::Call) -> ::std::result::Result<Self, argbind::BindError> {
                    #[allow(unused_mut, unused_variables)]
                    let mut __binder = argbind::Binder::new(call);
                    #( #bindings )*
                    ::std::result::Result::Ok(Self { #( #field_names ),* })
                }
            }
        }
    }
}
