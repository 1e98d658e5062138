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

//! Helpers behind `#[derive(FuryObject)]` on structs.
//!
//! A struct body is its fields in declaration order, each written as a
//! collection element would be. In compatible mode the type info carries
//! the writer's schema def and the reader matches fields by name.

use crate::error::Error;
use crate::meta::{FieldDescriptor, SchemaDef};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_element, write_element};
use crate::serializer::{FuryDefault, Serializer, StructSerializer};
use std::sync::Arc;

#[inline(always)]
pub fn write_type_info<T: StructSerializer + FuryDefault>(
    context: &mut WriteContext,
) -> Result<(), Error> {
    let type_info = context.resolve_type_info::<T>()?;
    context.write_type_info(&type_info)
}

/// Reads type info that must describe `T`. Returns the sender's schema def
/// when it differs from the local layout.
pub fn read_type_info<T: StructSerializer + FuryDefault>(
    context: &mut ReadContext,
) -> Result<Option<Arc<SchemaDef>>, Error> {
    let (type_info, schema) = context.read_struct_type_info::<T>()?;
    match schema {
        Some(schema) if schema.content_hash() != type_info.schema_def()?.content_hash() => {
            Ok(Some(schema))
        }
        _ => Ok(None),
    }
}

pub fn read_body<T: StructSerializer + FuryDefault>(
    context: &mut ReadContext,
    read_type_info: bool,
) -> Result<T, Error> {
    if read_type_info {
        if let Some(schema) = self::read_type_info::<T>(context)? {
            return T::fury_read_compatible(context, schema);
        }
    }
    T::fury_read_data(context)
}

#[inline(always)]
pub fn write_field<T: Serializer>(value: &T, context: &mut WriteContext) -> Result<(), Error> {
    write_element(value, context)
}

#[inline(always)]
pub fn read_field<T: Serializer + FuryDefault>(context: &mut ReadContext) -> Result<T, Error> {
    read_element(context)
}

/// Reads a field the sender declared as `remote`, failing when its declared
/// type cannot be decoded as `T`.
pub fn read_compatible_field<T: Serializer + FuryDefault>(
    context: &mut ReadContext,
    remote: &FieldDescriptor,
) -> Result<T, Error> {
    let local = T::fury_field_type();
    if !local.is_compatible_with(&remote.field_type) {
        return Err(Error::schema_mismatch(format!(
            "field `{}` is {:?} locally but {:?} in the stream",
            remote.name, local, remote.field_type
        )));
    }
    read_element(context)
}
