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

//! Length-prefixed element sequences shared by the list, set, array and map
//! strategies, plus the per-element flag/type rules used by struct fields.
//!
//! Wire: `varuint32 len` then each element. An element carries a ref flag
//! unless its type is a non-nullable primitive, and inline type info only
//! when its declared kind does not pin the concrete type (structs, ext
//! types and dynamic values).

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::need_to_write_type_for_field;

#[inline(always)]
pub fn write_element<T: Serializer>(value: &T, context: &mut WriteContext) -> Result<(), Error> {
    value.fury_write(
        context,
        T::fury_has_ref_flag(),
        need_to_write_type_for_field(T::fury_static_type_id() as u32),
    )
}

#[inline(always)]
pub fn read_element<T: Serializer + FuryDefault>(context: &mut ReadContext) -> Result<T, Error> {
    T::fury_read(
        context,
        T::fury_has_ref_flag(),
        need_to_write_type_for_field(T::fury_static_type_id() as u32),
    )
}

pub fn write_len(len: usize, context: &mut WriteContext) -> Result<(), Error> {
    let len = u32::try_from(len)
        .map_err(|_| Error::encode_error(format!("collection of {len} elements is too large")))?;
    context.writer.write_varuint32(len);
    Ok(())
}

/// Reads an element count. Every element takes at least one byte, so a
/// count larger than the rest of the input is rejected before allocating.
pub fn read_len(context: &mut ReadContext) -> Result<usize, Error> {
    let len = context.reader.read_varuint32()? as usize;
    let remaining = context.reader.remaining();
    if len > remaining {
        let cursor = context.reader.get_cursor();
        return Err(Error::buffer_out_of_bound(cursor, len, cursor + remaining));
    }
    Ok(len)
}

pub fn write_collection<'a, T, I>(iter: I, context: &mut WriteContext) -> Result<(), Error>
where
    T: Serializer + 'a,
    I: ExactSizeIterator<Item = &'a T>,
{
    context.inc_depth()?;
    write_len(iter.len(), context)?;
    for item in iter {
        write_element(item, context)?;
    }
    context.dec_depth();
    Ok(())
}

pub fn read_collection<C, T>(context: &mut ReadContext) -> Result<C, Error>
where
    T: Serializer + FuryDefault,
    C: FromIterator<T>,
{
    context.inc_depth()?;
    let len = read_len(context)?;
    let collection = (0..len)
        .map(|_| read_element::<T>(context))
        .collect::<Result<C, Error>>()?;
    context.dec_depth();
    Ok(collection)
}
