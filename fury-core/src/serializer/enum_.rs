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

//! Helpers behind `#[derive(FuryObject)]` on fieldless enums.
//!
//! A variant is its ordinal as a varuint32, or its name through the string
//! table when `enum_by_name` is set. Both peers must agree on that setting.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, StructSerializer};

#[inline(always)]
pub fn write_type_info<T: StructSerializer + FuryDefault>(
    context: &mut WriteContext,
) -> Result<(), Error> {
    let type_info = context.resolve_type_info::<T>()?;
    context.write_type_info(&type_info)
}

#[inline(always)]
pub fn read_type_info<T: StructSerializer + FuryDefault>(
    context: &mut ReadContext,
) -> Result<(), Error> {
    context.read_struct_type_info::<T>()?;
    Ok(())
}

pub fn write_variant<T: StructSerializer + FuryDefault>(
    context: &mut WriteContext,
    ordinal: u32,
    name: &str,
) -> Result<(), Error> {
    context.resolve_type_info::<T>()?;
    if context.is_enum_by_name() {
        let name = context.intern(name);
        context.write_interned(&name)?;
    } else {
        context.writer.write_varuint32(ordinal);
    }
    Ok(())
}

/// Returns the ordinal of the variant read, validated against `names`.
pub fn read_variant<T: StructSerializer + FuryDefault>(
    context: &mut ReadContext,
    names: &[&str],
) -> Result<u32, Error> {
    context.resolve_type_info::<T>()?;
    if context.is_enum_by_name() {
        let name = context.read_interned()?;
        return names
            .iter()
            .position(|n| *n == name.as_str())
            .map(|ordinal| ordinal as u32)
            .ok_or_else(|| {
                Error::unknown_enum(format!(
                    "{} has no variant named {:?}",
                    std::any::type_name::<T>(),
                    name.as_str()
                ))
            });
    }
    let ordinal = context.reader.read_varuint32()?;
    if ordinal as usize >= names.len() {
        return Err(Error::unknown_enum(format!(
            "{} has {} variants, got ordinal {ordinal}",
            std::any::type_name::<T>(),
            names.len()
        )));
    }
    Ok(ordinal)
}
