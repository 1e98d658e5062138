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

//! # Fury
//!
//! A binary object-graph serializer. Values keep their shape across a
//! round trip: a value shared by several owners is written once and comes
//! back shared, and cyclic graphs built from `Rc<RefCell<T>>` or
//! `Arc<Mutex<T>>` come back cyclic.
//!
//! ## Getting started
//!
//! Derive [`FuryObject`] on your types, register them and call
//! [`Fury::serialize`] / [`Fury::deserialize`]:
//!
//! ```rust
//! use fury::{Error, Fury, FuryObject};
//! use std::collections::HashMap;
//!
//! #[derive(FuryObject, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     address: Address,
//!     tags: HashMap<String, String>,
//! }
//!
//! #[derive(FuryObject, Debug, PartialEq)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let mut fury = Fury::default();
//!     fury.register::<Person>(1)?;
//!     fury.register::<Address>(2)?;
//!
//!     let person = Person {
//!         name: "Ada".to_string(),
//!         age: 36,
//!         address: Address {
//!             street: "12 St James's Square".to_string(),
//!             city: "London".to_string(),
//!         },
//!         tags: HashMap::from([("role".to_string(), "analyst".to_string())]),
//!     };
//!     let bytes = fury.serialize(&person)?;
//!     let back: Person = fury.deserialize(&bytes)?;
//!     assert_eq!(person, back);
//!     Ok(())
//! }
//! ```
//!
//! ## Schema evolution
//!
//! In [`Mode::Compatible`] every struct carries a schema def describing its
//! fields, and readers match fields by name. Fields the reader does not
//! know are skipped; fields the writer did not send take their
//! `FuryDefault`.
//!
//! ```rust
//! use fury::{Error, Fury, FuryObject, Mode};
//!
//! #[derive(FuryObject, Debug)]
//! struct V1 {
//!     id: i64,
//!     note: String,
//! }
//!
//! #[derive(FuryObject, Debug)]
//! struct V2 {
//!     id: i64,
//!     score: Option<f64>,
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let mut writer = Fury::default().mode(Mode::Compatible);
//!     writer.register::<V1>(7)?;
//!     let mut reader = Fury::default().mode(Mode::Compatible);
//!     reader.register::<V2>(7)?;
//!
//!     let bytes = writer.serialize(&V1 { id: 9, note: "old".to_string() })?;
//!     let v2: V2 = reader.deserialize(&bytes)?;
//!     assert_eq!(v2.id, 9);
//!     assert_eq!(v2.score, None);
//!     Ok(())
//! }
//! ```
//!
//! ## Shared and cyclic graphs
//!
//! Reference tracking is on by default:
//!
//! ```rust
//! use fury::{Error, Fury};
//! use std::rc::Rc;
//!
//! fn main() -> Result<(), Error> {
//!     let fury = Fury::default();
//!     let shared = Rc::new("shared".to_string());
//!     let list = vec![shared.clone(), shared];
//!     let bytes = fury.serialize(&list)?;
//!     let back: Vec<Rc<String>> = fury.deserialize(&bytes)?;
//!     assert!(Rc::ptr_eq(&back[0], &back[1]));
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! Registration is required by default, so a stream can only name types
//! the reader registered. [`Fury::require_registration`] with `false` binds
//! unregistered types by their Rust type name; pair it with an
//! [`AllowListChecker`] to restrict what may be decoded.
//!
//! ## Thread safety
//!
//! A configured `Fury` is `Send + Sync` and is meant to be shared behind an
//! `Arc`. Each call works on its own context.

pub use fury_core::{
    error::Error, AllowListChecker, CheckLevel, FieldDescriptor, FieldType, Fury, FuryDefault,
    InternedString, Mode, ReadContext, RefFlag, SchemaCache, SchemaDef, SecurityChecker,
    Serializer, StructSerializer, TypeId, TypeKey, WriteContext,
};
pub use fury_derive::FuryObject;
