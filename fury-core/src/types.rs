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
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Flag byte written in front of every nullable or reference-typed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    Null = -3,
    // Ref indicates the value was already written; a varuint32 ref id follows.
    Ref = -2,
    // NotNullValue indicates a non-null value that is not identity tracked.
    NotNullValue = -1,
    // RefValue indicates a tracked value written for the first time.
    RefValue = 0,
}

impl RefFlag {
    #[inline(always)]
    pub fn from_byte(flag: i8) -> Result<RefFlag, Error> {
        RefFlag::try_from(flag)
            .map_err(|_| Error::protocol_error(format!("unexpected ref flag byte: {flag}")))
    }
}

/// Internal type ids. User types are encoded as `(registered_id << 8) | kind`
/// where `kind` is one of the struct/enum/ext ids below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum TypeId {
    BOOL = 1,
    INT8 = 2,
    INT16 = 3,
    INT32 = 4,
    INT64 = 6,
    FLOAT32 = 10,
    FLOAT64 = 11,
    STRING = 12,
    ENUM = 13,
    NAMED_ENUM = 14,
    STRUCT = 15,
    COMPATIBLE_STRUCT = 16,
    NAMED_STRUCT = 17,
    NAMED_COMPATIBLE_STRUCT = 18,
    EXT = 19,
    NAMED_EXT = 20,
    LIST = 21,
    SET = 22,
    MAP = 23,
    TIMESTAMP = 25,
    LOCAL_DATE = 26,
    ARRAY = 29,
    U8 = 64,
    U16 = 65,
    U32 = 66,
    U64 = 67,
    // Reserved stub for dynamic values whose concrete type is resolved per value.
    UNKNOWN = 74,
    INTERNED_STRING = 75,
}

pub const BOOL: u32 = TypeId::BOOL as u32;
pub const INT8: u32 = TypeId::INT8 as u32;
pub const INT16: u32 = TypeId::INT16 as u32;
pub const INT32: u32 = TypeId::INT32 as u32;
pub const INT64: u32 = TypeId::INT64 as u32;
pub const FLOAT32: u32 = TypeId::FLOAT32 as u32;
pub const FLOAT64: u32 = TypeId::FLOAT64 as u32;
pub const STRING: u32 = TypeId::STRING as u32;
pub const ENUM: u32 = TypeId::ENUM as u32;
pub const NAMED_ENUM: u32 = TypeId::NAMED_ENUM as u32;
pub const STRUCT: u32 = TypeId::STRUCT as u32;
pub const COMPATIBLE_STRUCT: u32 = TypeId::COMPATIBLE_STRUCT as u32;
pub const NAMED_STRUCT: u32 = TypeId::NAMED_STRUCT as u32;
pub const NAMED_COMPATIBLE_STRUCT: u32 = TypeId::NAMED_COMPATIBLE_STRUCT as u32;
pub const EXT: u32 = TypeId::EXT as u32;
pub const NAMED_EXT: u32 = TypeId::NAMED_EXT as u32;
pub const LIST: u32 = TypeId::LIST as u32;
pub const SET: u32 = TypeId::SET as u32;
pub const MAP: u32 = TypeId::MAP as u32;
pub const TIMESTAMP: u32 = TypeId::TIMESTAMP as u32;
pub const LOCAL_DATE: u32 = TypeId::LOCAL_DATE as u32;
pub const ARRAY: u32 = TypeId::ARRAY as u32;
pub const U8: u32 = TypeId::U8 as u32;
pub const U16: u32 = TypeId::U16 as u32;
pub const U32: u32 = TypeId::U32 as u32;
pub const U64: u32 = TypeId::U64 as u32;
pub const UNKNOWN: u32 = TypeId::UNKNOWN as u32;
pub const INTERNED_STRING: u32 = TypeId::INTERNED_STRING as u32;

pub static PRIMITIVE_TYPES: [u32; 11] = [
    BOOL, INT8, INT16, INT32, INT64, FLOAT32, FLOAT64, U8, U16, U32, U64,
];

/// Largest id a user may register; the low byte of a wire id holds the kind.
pub const MAX_USER_TYPE_ID: u32 = (1 << 24) - 1;

#[inline(always)]
pub fn is_primitive_type_id(type_id: u32) -> bool {
    PRIMITIVE_TYPES.contains(&type_id)
}

/// Scalars whose shared pointers are skipped by `basic_types_ref_ignored`.
#[inline(always)]
pub fn is_basic_type_id(type_id: u32) -> bool {
    is_primitive_type_id(type_id)
        || matches!(
            type_id,
            STRING | INTERNED_STRING | TIMESTAMP | LOCAL_DATE
        )
}

/// Kinds whose concrete type is only known from inline type info.
#[inline(always)]
pub fn need_to_write_type_for_field(type_id: u32) -> bool {
    matches!(type_id & 0xff, STRUCT | EXT | UNKNOWN)
}

#[inline(always)]
pub fn is_named_kind(kind: u32) -> bool {
    matches!(
        kind,
        NAMED_STRUCT | NAMED_COMPATIBLE_STRUCT | NAMED_ENUM | NAMED_EXT
    )
}

pub mod config_flags {
    pub const IS_NULL_FLAG: u8 = 1 << 0;
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1 << 1;
    pub const IS_COMPATIBLE_FLAG: u8 = 1 << 2;
    pub const COMPRESS_NUMBER_FLAG: u8 = 1 << 3;
}

pub const MAGIC_NUMBER: u16 = 0x62d4;

/// Bumped whenever flag values, type ids or header layout change.
pub const PROTOCOL_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    // Type declarations must be the same between serialization peers.
    #[default]
    SchemaConsistent,
    // Type declarations may differ; fields are reconciled by name.
    Compatible,
}
