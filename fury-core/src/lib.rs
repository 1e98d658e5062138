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

//! # Fury Core
//!
//! The object-graph encoding engine behind the `fury` crate.
//!
//! A value is written as a four byte header followed by the root value.
//! Every value is an optional ref flag, optional inline type info and the
//! body; shared pointers get ref ids so shared and cyclic graphs come back
//! with the same shape.
//!
//! ## Architecture
//!
//! - **`fury`**: the [`Fury`] instance, its configuration and entry points
//! - **`buffer`**: bounds checked `Writer` and `Reader`
//! - **`serializer`**: per-type strategies behind the [`Serializer`] trait
//! - **`resolver`**: per-call contexts, type registry, ref tracking, string
//!   table and schema def dedup
//! - **`meta`**: schema defs describing struct layouts for compatible mode
//! - **`types`**: wire type ids, ref flags and header bits
//! - **`error`**: the crate [`Error`] type
//!
//! ## Modes
//!
//! - **SchemaConsistent**: both peers share the exact struct layouts.
//! - **Compatible**: structs carry a schema def and fields are matched by
//!   name, so either side may add or drop fields.
//!
//! ## Usage
//!
//! ```rust
//! use fury_core::{Fury, Mode};
//!
//! let fury = Fury::default().mode(Mode::Compatible);
//! let bytes = fury.serialize(&"hello".to_string()).unwrap();
//! let back: String = fury.deserialize(&bytes).unwrap();
//! assert_eq!(back, "hello");
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod fury;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod types;

pub use crate::error::Error;
pub use crate::fury::Fury;
pub use crate::meta::{FieldDescriptor, FieldType, SchemaDef};
pub use crate::resolver::context::{ReadContext, WriteContext};
pub use crate::resolver::meta_resolver::SchemaCache;
pub use crate::resolver::security::{AllowListChecker, CheckLevel, SecurityChecker};
pub use crate::resolver::string_table::InternedString;
pub use crate::resolver::type_resolver::TypeKey;
pub use crate::serializer::{FuryDefault, Serializer, StructSerializer};
pub use crate::types::{Mode, RefFlag, TypeId};
