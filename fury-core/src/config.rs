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

use crate::types::Mode;

/// Options controlling how a `Fury` instance encodes and decodes graphs.
///
/// Built through the consuming builder methods on `Fury` and shared with the
/// per-call `WriteContext`/`ReadContext`.
#[derive(Clone, Debug)]
pub struct Config {
    /// `Compatible` turns on SchemaDef encoding and by-name field reconciliation.
    pub mode: Mode,
    /// Whether `Rc`/`Arc` values are identity tracked.
    /// Without tracking, shared values are duplicated and cycles cannot be encoded.
    pub track_ref: bool,
    /// Skip identity tracking for shared pointers to scalars and strings.
    /// Saves the ref table entry at the cost of identity (not value) equality.
    pub basic_types_ref_ignored: bool,
    /// Var-int encoding for 32/64-bit integers instead of fixed width.
    pub compress_number: bool,
    /// Closed registration: only registered types can be (de)serialized.
    pub require_registration: bool,
    /// Maximum nesting of containers and beans within one call.
    pub max_depth: u32,
    /// Write enum values by variant name through the string table.
    pub enum_by_name: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::SchemaConsistent,
            track_ref: true,
            basic_types_ref_ignored: false,
            compress_number: true,
            require_registration: true,
            max_depth: 64,
            enum_by_name: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_compatible(&self) -> bool {
        self.mode == Mode::Compatible
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }

    #[inline(always)]
    pub fn is_basic_types_ref_ignored(&self) -> bool {
        self.basic_types_ref_ignored
    }

    #[inline(always)]
    pub fn is_compress_number(&self) -> bool {
        self.compress_number
    }

    #[inline(always)]
    pub fn is_require_registration(&self) -> bool {
        self.require_registration
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn is_enum_by_name(&self) -> bool {
        self.enum_by_name
    }
}
