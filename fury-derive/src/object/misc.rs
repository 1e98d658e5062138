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

use crate::util::{skipped_field_inits, SourceField};
use proc_macro2::TokenStream;
use quote::quote;

pub fn gen_fields_info(fields: &[SourceField<'_>]) -> TokenStream {
    let descriptors = fields.iter().filter(|f| !f.skip).map(|field| {
        let ty = field.ty;
        let name = field.wire_name();
        quote! {
            fury_core::meta::FieldDescriptor::new(
                #name,
                <#ty as fury_core::serializer::Serializer>::fury_field_type(),
            )
        }
    });
    quote! {
        vec![#(#descriptors),*]
    }
}

pub fn gen_default(fields: &[SourceField<'_>]) -> TokenStream {
    let kept = fields.iter().filter(|f| !f.skip);
    let idents = kept.clone().map(|f| f.ident);
    let tys = kept.map(|f| f.ty);
    let skipped = skipped_field_inits(fields);
    quote! {
        Self {
            #(#idents: <#tys as fury_core::serializer::FuryDefault>::fury_default(),)*
            #skipped
        }
    }
}
