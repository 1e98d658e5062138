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

use crate::object::{derive_enum, misc, read, write};
use crate::util::{add_trait_bounds, source_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Data;

/// Method bodies that differ between structs and enums.
struct Parts {
    default: TokenStream,
    write_data: TokenStream,
    write_type_info: TokenStream,
    read_data: TokenStream,
    read_type_info: TokenStream,
    // Extra `Serializer` methods.
    serializer_extra: TokenStream,
    static_type_id: TokenStream,
    // `StructSerializer` methods.
    struct_serializer: TokenStream,
}

fn struct_parts(s: &syn::DataStruct) -> syn::Result<Parts> {
    let fields = source_fields(&s.fields)?;
    let fields_info_ts = misc::gen_fields_info(&fields);
    let read_compatible_ts = read::gen_read_compatible(&fields);
    let read_body_ts = read::gen_read_body();
    Ok(Parts {
        default: misc::gen_default(&fields),
        write_data: write::gen_write_data(&fields),
        write_type_info: write::gen_write_type_info(),
        read_data: read::gen_read_data(&fields),
        read_type_info: read::gen_read_type_info(),
        serializer_extra: quote! {
            fn fury_read_body(
                context: &mut fury_core::resolver::context::ReadContext,
                read_type_info: bool,
            ) -> Result<Self, fury_core::error::Error> {
                #read_body_ts
            }
        },
        static_type_id: quote! { fury_core::types::TypeId::STRUCT },
        struct_serializer: quote! {
            fn fury_fields_info() -> Vec<fury_core::meta::FieldDescriptor> {
                #fields_info_ts
            }

            fn fury_read_compatible(
                context: &mut fury_core::resolver::context::ReadContext,
                schema: ::std::sync::Arc<fury_core::meta::SchemaDef>,
            ) -> Result<Self, fury_core::error::Error> {
                #read_compatible_ts
            }
        },
    })
}

fn enum_parts(e: &syn::DataEnum, name: &syn::Ident) -> syn::Result<Parts> {
    derive_enum::check_variants(e, name)?;
    Ok(Parts {
        default: derive_enum::gen_default(e),
        write_data: derive_enum::gen_write_data(e),
        write_type_info: derive_enum::gen_write_type_info(),
        read_data: derive_enum::gen_read_data(e),
        read_type_info: derive_enum::gen_read_type_info(),
        serializer_extra: quote! {},
        static_type_id: quote! { fury_core::types::TypeId::ENUM },
        struct_serializer: quote! {},
    })
}

pub fn derive_serializer(ast: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let generics = add_trait_bounds(ast.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let Parts {
        default,
        write_data,
        write_type_info,
        read_data,
        read_type_info,
        serializer_extra,
        static_type_id,
        struct_serializer,
    } = match &ast.data {
        Data::Struct(s) => struct_parts(s)?,
        Data::Enum(e) => enum_parts(e, name)?,
        Data::Union(u) => {
            return Err(syn::Error::new_spanned(
                u.union_token,
                "FuryObject does not support unions",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics fury_core::serializer::FuryDefault for #name #ty_generics #where_clause {
            fn fury_default() -> Self {
                #default
            }
        }

        impl #impl_generics fury_core::serializer::Serializer for #name #ty_generics #where_clause {
            fn fury_write_data(
                &self,
                context: &mut fury_core::resolver::context::WriteContext,
            ) -> Result<(), fury_core::error::Error> {
                #write_data
            }

            fn fury_write_type_info(
                context: &mut fury_core::resolver::context::WriteContext,
            ) -> Result<(), fury_core::error::Error> {
                #write_type_info
            }

            fn fury_read_data(
                context: &mut fury_core::resolver::context::ReadContext,
            ) -> Result<Self, fury_core::error::Error> {
                #read_data
            }

            fn fury_read_type_info(
                context: &mut fury_core::resolver::context::ReadContext,
            ) -> Result<(), fury_core::error::Error> {
                #read_type_info
            }

            #serializer_extra

            fn fury_static_type_id() -> fury_core::types::TypeId {
                #static_type_id
            }
        }

        impl #impl_generics fury_core::serializer::StructSerializer for #name #ty_generics #where_clause {
            #struct_serializer
        }
    })
}
