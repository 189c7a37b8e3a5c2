//! Derive macros for the microlist crate.
//!
//! Provides:
//! - `#[derive(Error)]` - `Display` + `std::error::Error` from `#[error("...")]` messages
//! - `#[derive(BinaryCodec)]` - big-endian `Encode`/`Decode` for fixed-layout structs

mod binary_codec;
mod error;

use proc_macro::TokenStream;

/// Implements `Encode` and `Decode` by serializing each field in declaration order.
#[proc_macro_derive(BinaryCodec)]
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    binary_codec::derive_binary_codec(input)
}

/// Implements `Display` and `Error` for error enums and structs.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
