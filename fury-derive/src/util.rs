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
use syn::ext::IdentExt;
use syn::{Field, Fields, Generics, Ident, Type};

/// A named field together with its `#[fury(..)]` options.
pub struct SourceField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub skip: bool,
}

impl<'a> SourceField<'a> {
    /// Name the field is described by in schema defs.
    pub fn wire_name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

fn parse_field(field: &Field) -> syn::Result<SourceField<'_>> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("fury")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported fury attribute, expected `skip`"))
            }
        })?;
    }
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "FuryObject needs named fields"))?;
    Ok(SourceField {
        ident,
        ty: &field.ty,
        skip,
    })
}

pub fn source_fields(fields: &Fields) -> syn::Result<Vec<SourceField<'_>>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(parse_field).collect(),
        Fields::Unit => Ok(Vec::new()),
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "FuryObject does not support tuple structs",
        )),
    }
}

/// Adds `Serializer + FuryDefault` bounds for every type parameter.
pub fn add_trait_bounds(mut generics: Generics) -> Generics {
    let type_params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in type_params {
        where_clause.predicates.push(syn::parse_quote! {
            #param: fury_core::serializer::Serializer + fury_core::serializer::FuryDefault
        });
    }
    generics
}

pub fn skipped_field_inits(fields: &[SourceField<'_>]) -> TokenStream {
    let idents = fields.iter().filter(|f| f.skip).map(|f| f.ident);
    quote! {
        #(#idents: ::std::default::Default::default(),)*
    }
}
