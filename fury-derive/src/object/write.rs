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

use crate::util::SourceField;
use proc_macro2::TokenStream;
use quote::quote;

pub fn gen_write_data(fields: &[SourceField<'_>]) -> TokenStream {
    let writes = fields.iter().filter(|f| !f.skip).map(|field| {
        let ty = field.ty;
        let ident = field.ident;
        quote! {
            fury_core::serializer::struct_::write_field::<#ty>(&self.#ident, context)?;
        }
    });
    quote! {
        context.inc_depth()?;
        #(#writes)*
        context.dec_depth();
        Ok(())
    }
}

pub fn gen_write_type_info() -> TokenStream {
    quote! {
        fury_core::serializer::struct_::write_type_info::<Self>(context)
    }
}
