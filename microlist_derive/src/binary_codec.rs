//! Derive macro for fixed-layout binary records.
//!
//! Generates `Encode` and `Decode` implementations (from
//! `crate::types::encoding`) for structs whose fields are themselves
//! `Encode + Decode`. Fields are written in declaration order with no padding
//! and no tags, so the struct definition *is* the wire layout.
//!
//! ```ignore
//! use microlist_derive::BinaryCodec;
//!
//! #[derive(BinaryCodec)]
//! struct ProgramHeader {
//!     magic: [u8; 5],
//!     version: Version,
//!     instruction_count: u32,
//! }
//! ```
//!
//! Enums and unions are rejected: every tagged layout in the bytecode format
//! is written by hand.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data_struct) => expand_struct(&input, &data_struct.fields),
        Data::Enum(_) => syn::Error::new_spanned(
            &input,
            "BinaryCodec derive only supports structs; encode tagged layouts by hand",
        )
        .to_compile_error(),
        Data::Union(_) => {
            syn::Error::new_spanned(&input, "BinaryCodec derive does not support unions")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

fn expand_struct(input: &DeriveInput, fields: &Fields) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (encode_body, decode_body) = match fields {
        // `struct Header { magic: [u8; 5], count: u32 }`
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
            (
                quote! {
                    #( crate::types::encoding::Encode::encode(&self.#names, out); )*
                },
                quote! {
                    Ok(Self {
                        #( #names: crate::types::encoding::Decode::decode(input)?, )*
                    })
                },
            )
        }
        // `struct Version(u8, u8)`
        Fields::Unnamed(fields) => {
            let indices: Vec<_> = (0..fields.unnamed.len()).map(syn::Index::from).collect();
            let decoders = indices
                .iter()
                .map(|_| quote! { crate::types::encoding::Decode::decode(input)?, });
            (
                quote! {
                    #( crate::types::encoding::Encode::encode(&self.#indices, out); )*
                },
                quote! {
                    Ok(Self( #(#decoders)* ))
                },
            )
        }
        Fields::Unit => (quote! { let _ = out; }, quote! { let _ = input; Ok(Self) }),
    };

    quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                #encode_body
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            fn decode(input: &mut &[u8]) -> ::std::result::Result<Self, crate::types::encoding::DecodeError> {
                #decode_body
            }
        }
    }
}
