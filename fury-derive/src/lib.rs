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

//! # Fury Derive Macros
//!
//! `#[derive(FuryObject)]` generates the encoding strategy for user types:
//!
//! - **Structs with named fields** get a field-by-field strategy. Fields are
//!   written in declaration order; in compatible mode they are matched by
//!   name against the sender's schema def, so either peer may add or drop
//!   fields.
//! - **Fieldless enums** are written as their variant ordinal, or by name
//!   when the `Fury` instance has `enum_by_name` set.
//!
//! The generated code refers to `fury_core`, so the deriving crate needs it
//! as a dependency next to `fury`.
//!
//! ```rust, ignore
//! use fury::{Fury, FuryObject};
//!
//! #[derive(FuryObject, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     status: Status,
//!     #[fury(skip)]
//!     cached_score: Option<f64>,
//! }
//!
//! #[derive(FuryObject, Debug, PartialEq)]
//! enum Status {
//!     Active,
//!     Suspended,
//! }
//!
//! let mut fury = Fury::default();
//! fury.register::<Person>(1)?;
//! fury.register::<Status>(2)?;
//! ```
//!
//! ## Field attributes
//!
//! - `#[fury(skip)]`: the field is neither written nor described in the
//!   schema def, and is rebuilt with `Default::default()` on read.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derives `FuryDefault`, `Serializer` and `StructSerializer`.
///
/// Missing fields of an evolved struct are filled with
/// `FuryDefault::fury_default`, so every field type must implement it.
#[proc_macro_derive(FuryObject, attributes(fury))]
pub fn proc_macro_derive_fury_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_serializer(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
