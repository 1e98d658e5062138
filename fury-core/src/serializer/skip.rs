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

//! Consumes values the reader has no field for, driven by the field type
//! the sender declared in its schema def.

use crate::error::Error;
use crate::meta::{FieldType, SchemaDef};
use crate::resolver::context::ReadContext;
use crate::serializer::collection::read_len;
use std::any::Any;
use crate::types::{
    RefFlag, ARRAY, BOOL, COMPATIBLE_STRUCT, ENUM, EXT, FLOAT32, FLOAT64, INT16, INT32, INT64,
    INT8, INTERNED_STRING, LIST, LOCAL_DATE, MAP, NAMED_COMPATIBLE_STRUCT, NAMED_ENUM, NAMED_EXT,
    NAMED_STRUCT, SET, STRING, STRUCT, TIMESTAMP, U16, U32, U64, U8, UNKNOWN,
};

/// Skips one field value, flag byte included.
///
/// A tracked value still takes its ref id so later ids stay aligned. When the
/// value is a builtin scalar or a type known locally it is decoded and kept
/// in its slot, so a kept field that back-references it still resolves.
/// Other tracked values leave a skipped slot behind, and a back-reference to
/// one fails with `InvalidRef`.
pub fn skip_field(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    if field_type.has_ref_flag() {
        match context.ref_reader.read_ref_flag(&mut context.reader)? {
            RefFlag::Null => return Ok(()),
            RefFlag::Ref => {
                context.ref_reader.read_ref_id(&mut context.reader)?;
                return Ok(());
            }
            RefFlag::RefValue => {
                let ref_id = context.ref_reader.reserve_ref_id();
                return match read_discarded(context, field_type)? {
                    Some(value) => context.ref_reader.set_detached(ref_id, value),
                    None => context.ref_reader.set_skipped(ref_id),
                };
            }
            RefFlag::NotNullValue => {}
        }
    }
    skip_value(context, field_type)
}

/// Decodes a tracked value nobody reads, or skips it when there is no local
/// type to decode it into.
fn read_discarded(
    context: &mut ReadContext,
    field_type: &FieldType,
) -> Result<Option<Box<dyn Any>>, Error> {
    match field_type.type_id {
        STRUCT | EXT | UNKNOWN => skip_typed(context),
        type_id => {
            let builtin = context.get_fury().get_type_resolver().get_builtin(type_id);
            match builtin {
                Some(info) => info.get_harness().read_data(context).map(Some),
                None => skip_value(context, field_type).map(|_| None),
            }
        }
    }
}

fn generic(field_type: &FieldType, index: usize) -> Result<&FieldType, Error> {
    field_type.generics.get(index).ok_or_else(|| {
        Error::protocol_error(format!(
            "field type {} is missing generic parameter {index}",
            field_type.type_id
        ))
    })
}

/// Lists of these are the length followed by one raw byte per element.
fn is_byte_elements(element: &FieldType) -> bool {
    matches!(element.type_id, BOOL | INT8 | U8) && !element.has_ref_flag()
}

fn skip_value(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    let compress = context.is_compress_number();
    match field_type.type_id {
        BOOL | INT8 | U8 => context.reader.skip(1),
        INT16 | U16 => context.reader.skip(2),
        FLOAT32 | LOCAL_DATE => context.reader.skip(4),
        FLOAT64 | TIMESTAMP => context.reader.skip(8),
        INT32 if compress => context.reader.read_varint32().map(drop),
        INT64 if compress => context.reader.read_varint64().map(drop),
        U32 if compress => context.reader.read_varuint32().map(drop),
        U64 if compress => context.reader.read_varuint64().map(drop),
        INT32 | U32 => context.reader.skip(4),
        INT64 | U64 => context.reader.skip(8),
        STRING => context.reader.read_len_prefixed_bytes().map(drop),
        INTERNED_STRING => context.read_interned().map(drop),
        ENUM if context.is_enum_by_name() => context.read_interned().map(drop),
        ENUM => context.reader.read_varuint32().map(drop),
        LIST | ARRAY if field_type.generics.first().map_or(false, is_byte_elements) => {
            let len = read_len(context)?;
            context.reader.skip(len)
        }
        LIST | SET | ARRAY => {
            let element = generic(field_type, 0)?;
            context.inc_depth()?;
            let len = read_len(context)?;
            for _ in 0..len {
                skip_field(context, element)?;
            }
            context.dec_depth();
            Ok(())
        }
        MAP => {
            let key = generic(field_type, 0)?;
            let value = generic(field_type, 1)?;
            context.inc_depth()?;
            let len = read_len(context)?;
            for _ in 0..len {
                skip_field(context, key)?;
                skip_field(context, value)?;
            }
            context.dec_depth();
            Ok(())
        }
        STRUCT | EXT | UNKNOWN => skip_typed(context).map(drop),
        other => Err(Error::protocol_error(format!(
            "cannot skip a field of type {other}"
        ))),
    }
}

/// Consumes a value that starts with inline type info, returning it decoded
/// when its type is known here.
fn skip_typed(context: &mut ReadContext) -> Result<Option<Box<dyn Any>>, Error> {
    let wire_type_id = context.reader.read_varuint32()?;
    let fury = context.get_fury();
    let type_info = match wire_type_id & 0xff {
        // Compatible structs are walked through the sender's own layout when
        // the type does not exist on this side.
        kind @ (COMPATIBLE_STRUCT | NAMED_COMPATIBLE_STRUCT) => {
            let schema = context.read_schema_def(wire_type_id)?;
            let type_resolver = fury.get_type_resolver();
            let local = if kind == NAMED_COMPATIBLE_STRUCT {
                type_resolver.get_by_name(schema.namespace(), schema.type_name())
            } else {
                type_resolver.get_by_wire_id(wire_type_id)
            };
            return match local {
                Ok(info) if info.get_harness().has_field_layout() => {
                    info.get_harness().read_compatible(context, schema).map(Some)
                }
                _ => skip_struct(context, &schema).map(|_| None),
            };
        }
        NAMED_STRUCT | NAMED_ENUM | NAMED_EXT => {
            let namespace = context.read_interned()?;
            let type_name = context.read_interned()?;
            fury.get_type_resolver()
                .get_by_name(namespace.as_str(), type_name.as_str())?
        }
        _ => fury.get_type_resolver().get_by_wire_id(wire_type_id)?,
    };
    type_info.get_harness().read_data(context).map(Some)
}

fn skip_struct(context: &mut ReadContext, schema: &SchemaDef) -> Result<(), Error> {
    context.inc_depth()?;
    for field in schema.fields() {
        skip_field(context, &field.field_type)?;
    }
    context.dec_depth();
    Ok(())
}
