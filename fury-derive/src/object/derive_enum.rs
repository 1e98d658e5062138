// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Fields, Ident};

pub fn check_variants(data_enum: &DataEnum, name: &Ident) -> syn::Result<()> {
    if data_enum.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "FuryObject needs at least one enum variant",
        ));
    }
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "FuryObject only supports fieldless enum variants",
            ));
        }
    }
    Ok(())
}

fn variant_names(data_enum: &DataEnum) -> Vec<String> {
    data_enum
        .variants
        .iter()
        .map(|v| syn::ext::IdentExt::unraw(&v.ident).to_string())
        .collect()
}

pub fn gen_default(data_enum: &DataEnum) -> TokenStream {
    let first = data_enum.variants.iter().map(|v| &v.ident).take(1);
    quote! {
        #(Self::#first)*
    }
}

pub fn gen_write_data(data_enum: &DataEnum) -> TokenStream {
    let variant_idents = data_enum.variants.iter().map(|v| &v.ident);
    let variant_values = (0..data_enum.variants.len()).map(|v| v as u32);
    let names = variant_names(data_enum);
    quote! {
        let (ordinal, name) = match self {
            #(
                Self::#variant_idents => (#variant_values, #names),
            )*
        };
        fury_core::serializer::enum_::write_variant::<Self>(context, ordinal, name)
    }
}

pub fn gen_read_data(data_enum: &DataEnum) -> TokenStream {
    let variant_idents = data_enum.variants.iter().map(|v| &v.ident);
    let variant_values = (0..data_enum.variants.len()).map(|v| v as u32);
    let names = variant_names(data_enum);
    quote! {
        match fury_core::serializer::enum_::read_variant::<Self>(context, &[#(#names),*])? {
            #(
                #variant_values => Ok(Self::#variant_idents),
            )*
            ordinal => Err(fury_core::error::Error::unknown_enum(format!(
                "unknown ordinal {} for {}",
                ordinal,
                ::std::any::type_name::<Self>()
            ))),
        }
    }
}

pub fn gen_write_type_info() -> TokenStream {
    quote! {
        fury_core::serializer::enum_::write_type_info::<Self>(context)
    }
}

pub fn gen_read_type_info() -> TokenStream {
    quote! {
        fury_core::serializer::enum_::read_type_info::<Self>(context)
    }
}
