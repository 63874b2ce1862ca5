//! Attribute parsing for SignalPayload derive macro

use darling::{FromDeriveInput, FromField};
use syn::{DeriveInput, Generics, Ident, Type};

/// Parsed #[signal(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(signal), supports(struct_named, struct_unit))]
pub struct SignalPayloadArgs {
    /// Struct identifier
    pub ident: Ident,

    pub generics: Generics,

    /// Struct fields
    pub data: darling::ast::Data<(), SignalFieldArgs>,

    /// Script-visible signal name
    #[darling(default)]
    pub name: Option<String>,
}

impl SignalPayloadArgs {
    /// Signal name, falling back to the struct name
    pub fn signal_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parsed #[signal(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(signal))]
pub struct SignalFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Script-visible parameter name
    #[darling(default)]
    pub rename: Option<String>,
}

impl SignalFieldArgs {
    /// Parameter name, falling back to the field name
    pub fn param_name(&self) -> String {
        match (&self.rename, &self.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => ident.to_string().trim_start_matches("r#").to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Parse a DeriveInput into SignalPayloadArgs
pub fn parse_signal_payload(input: &DeriveInput) -> darling::Result<SignalPayloadArgs> {
    SignalPayloadArgs::from_derive_input(input)
}
