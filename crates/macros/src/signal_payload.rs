//! SignalPayload derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_signal_payload, SignalPayloadArgs};

/// Generate the SignalPayload implementation
pub fn derive_signal_payload(input: DeriveInput) -> TokenStream {
    match parse_signal_payload(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: SignalPayloadArgs) -> TokenStream {
    let struct_name = &args.ident;
    let signal_name = args.signal_name();
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let fields = match &args.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "SignalPayload can only be derived for structs",
            )
            .to_compile_error()
        }
    };

    let params = fields.iter().map(|f| {
        let name = f.param_name();
        let ty = &f.ty;
        quote! {
            ::finhook_core::sdk::SignalParam::new(
                #name,
                <#ty as ::finhook_core::sdk::SignalValue>::TYPE,
            )
        }
    });

    let values = fields.iter().filter_map(|f| f.ident.as_ref()).map(|ident| {
        quote! { ::finhook_core::sdk::NetworkValue::from(self.#ident) }
    });

    let count = fields.len();
    let values_body = if count == 0 {
        quote! { ::std::vec::Vec::new() }
    } else {
        quote! { ::std::vec![#(#values),*] }
    };

    quote! {
        impl #impl_generics ::finhook_core::signal::SignalPayload for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #signal_name;

            fn params() -> ::std::vec::Vec<::finhook_core::sdk::SignalParam> {
                ::std::vec![#(#params),*]
            }

            fn into_values(self) -> ::std::vec::Vec<::finhook_core::sdk::NetworkValue> {
                #values_body
            }
        }
    }
}
