//! finhook Proc Macros
//!
//! - `#[derive(SignalPayload)]` - Describe a signal's parameters with a struct
//!
//! # SignalPayload Example
//!
//! ```ignore
//! use finhook_core::SignalPayload;
//! use finhook_core::sdk::ObjectHandle;
//!
//! #[derive(SignalPayload)]
//! #[signal(name = "StartDocking")]
//! pub struct StartDocking {
//!     success: bool,
//!     locomotive: ObjectHandle,
//!     offset: f64,
//! }
//!
//! // Generated:
//! // - StartDocking::NAME == "StartDocking"
//! // - StartDocking::params() -> [success: Bool, locomotive: Object, offset: Float]
//! // - payload.into_values() -> values in field order
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes
//!
//! - `#[signal(name = "SignalName")]` - Optional. Script-visible signal name
//!   (default: the struct name).
//!
//! ## Field Attributes
//!
//! - `#[signal(rename = "paramName")]` - Optional. Script-visible parameter
//!   name (default: the field name).

mod parse;
mod signal_payload;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for signal payloads
///
/// Each named field becomes one signal parameter, in declaration order.
/// Field types must implement `SignalValue`. Unit structs describe signals
/// without parameters.
///
/// # Example
///
/// ```ignore
/// #[derive(SignalPayload)]
/// #[signal(name = "SelfDrvingUpdate")]
/// pub struct SelfDrivingUpdate {
///     enabled: bool,
/// }
/// ```
#[proc_macro_derive(SignalPayload, attributes(signal))]
pub fn derive_signal_payload(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    signal_payload::derive_signal_payload(input).into()
}
