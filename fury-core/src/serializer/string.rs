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

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::string_table::InternedString;
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;

impl Serializer for String {
    #[inline]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_utf8_string(self);
        Ok(())
    }

    #[inline]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        context.reader.read_utf8_string()
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        TypeId::STRING
    }
}

impl FuryDefault for String {
    #[inline(always)]
    fn fury_default() -> Self {
        String::new()
    }
}

/// Written through the per-stream string table: the first occurrence carries
/// the bytes, later ones only the 64-bit hash.
impl Serializer for InternedString {
    #[inline]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.write_interned(self)
    }

    #[inline]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        context.read_interned()
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        TypeId::INTERNED_STRING
    }
}

impl FuryDefault for InternedString {
    fn fury_default() -> Self {
        InternedString::default()
    }
}
