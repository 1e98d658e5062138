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
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

// Locals are prefixed so a field named like a parameter cannot shadow it.
fn local_ident(field: &SourceField<'_>) -> Ident {
    format_ident!("__fury_{}", field.wire_name())
}

pub fn gen_read_data(fields: &[SourceField<'_>]) -> TokenStream {
    let kept: Vec<_> = fields.iter().filter(|f| !f.skip).collect();
    let locals: Vec<_> = kept.iter().map(|f| local_ident(f)).collect();
    let tys = kept.iter().map(|f| f.ty);
    let idents = kept.iter().map(|f| f.ident);
    let skipped = skipped_field_inits(fields);
    quote! {
        context.inc_depth()?;
        #(
            let #locals = fury_core::serializer::struct_::read_field::<#tys>(context)?;
        )*
        context.dec_depth();
        Ok(Self {
            #(#idents: #locals,)*
            #skipped
        })
    }
}

pub fn gen_read_type_info() -> TokenStream {
    quote! {
        fury_core::serializer::struct_::read_type_info::<Self>(context).map(|_| ())
    }
}

pub fn gen_read_body() -> TokenStream {
    quote! {
        fury_core::serializer::struct_::read_body::<Self>(context, read_type_info)
    }
}

/// Reads the sender's fields in the sender's order, keeping those this
/// struct declares and skipping the rest. Fields the sender lacks take
/// their `fury_default`.
pub fn gen_read_compatible(fields: &[SourceField<'_>]) -> TokenStream {
    let kept: Vec<_> = fields.iter().filter(|f| !f.skip).collect();
    let locals: Vec<_> = kept.iter().map(|f| local_ident(f)).collect();
    let tys: Vec<_> = kept.iter().map(|f| f.ty).collect();
    let names = kept.iter().map(|f| f.wire_name());
    let idents = kept.iter().map(|f| f.ident);
    let skipped = skipped_field_inits(fields);
    quote! {
        #(
            let mut #locals: ::std::option::Option<#tys> = ::std::option::Option::None;
        )*
        context.inc_depth()?;
        for field in schema.fields() {
            match field.name.as_str() {
                #(
                    #names => {
                        #locals = ::std::option::Option::Some(
                            fury_core::serializer::struct_::read_compatible_field::<#tys>(context, field)?,
                        );
                    }
                )*
                _ => fury_core::serializer::skip::skip_field(context, &field.field_type)?,
            }
        }
        context.dec_depth();
        Ok(Self {
            #(
                #idents: #locals.unwrap_or_else(
                    <#tys as fury_core::serializer::FuryDefault>::fury_default,
                ),
            )*
            #skipped
        })
    }
}
