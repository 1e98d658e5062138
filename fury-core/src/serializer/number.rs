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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_len, write_len};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;

macro_rules! impl_num_serializer {
    ($ty:ty, $writer:expr, $reader:expr, $field_type:expr) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                $writer(&mut context.writer, *self);
                Ok(())
            }

            #[inline(always)]
            fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
                $reader(&mut context.reader)
            }

            #[inline(always)]
            fn fury_static_type_id() -> TypeId {
                $field_type
            }
        }

        impl FuryDefault for $ty {
            #[inline(always)]
            fn fury_default() -> Self {
                0 as $ty
            }
        }
    };
}

// 32/64-bit integers follow the session's number compression: var-int
// (zigzag for signed) when on, fixed width when off.
macro_rules! impl_compressible_num_serializer {
    ($ty:ty, $fixed_writer:expr, $var_writer:expr, $fixed_reader:expr, $var_reader:expr, $field_type:expr) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                if context.is_compress_number() {
                    $var_writer(&mut context.writer, *self);
                } else {
                    $fixed_writer(&mut context.writer, *self);
                }
                Ok(())
            }

            #[inline(always)]
            fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
                if context.is_compress_number() {
                    $var_reader(&mut context.reader)
                } else {
                    $fixed_reader(&mut context.reader)
                }
            }

            #[inline(always)]
            fn fury_static_type_id() -> TypeId {
                $field_type
            }
        }

        impl FuryDefault for $ty {
            #[inline(always)]
            fn fury_default() -> Self {
                0
            }
        }
    };
}

impl_num_serializer!(i16, Writer::write_i16, Reader::read_i16, TypeId::INT16);
impl_num_serializer!(u16, Writer::write_u16, Reader::read_u16, TypeId::U16);
impl_num_serializer!(f32, Writer::write_f32, Reader::read_f32, TypeId::FLOAT32);
impl_num_serializer!(f64, Writer::write_f64, Reader::read_f64, TypeId::FLOAT64);
impl_compressible_num_serializer!(
    i32,
    Writer::write_i32,
    Writer::write_varint32,
    Reader::read_i32,
    Reader::read_varint32,
    TypeId::INT32
);
impl_compressible_num_serializer!(
    i64,
    Writer::write_i64,
    Writer::write_varint64,
    Reader::read_i64,
    Reader::read_varint64,
    TypeId::INT64
);
impl_compressible_num_serializer!(
    u32,
    Writer::write_u32,
    Writer::write_varuint32,
    Reader::read_u32,
    Reader::read_varuint32,
    TypeId::U32
);
impl_compressible_num_serializer!(
    u64,
    Writer::write_u64,
    Writer::write_varuint64,
    Reader::read_u64,
    Reader::read_varuint64,
    TypeId::U64
);

// Byte-wide integers carry no per-element flag, so a list of them is the
// length followed by the raw bytes and is copied as one block.

impl Serializer for u8 {
    #[inline(always)]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_u8(*self);
        Ok(())
    }

    #[inline(always)]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        context.reader.read_u8()
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        TypeId::U8
    }

    fn fury_write_slice(values: &[Self], context: &mut WriteContext) -> Result<(), Error> {
        write_len(values.len(), context)?;
        context.writer.write_bytes(values);
        Ok(())
    }

    fn fury_read_vec(context: &mut ReadContext) -> Result<Vec<Self>, Error> {
        let len = read_len(context)?;
        Ok(context.reader.read_bytes(len)?.to_vec())
    }
}

impl FuryDefault for u8 {
    #[inline(always)]
    fn fury_default() -> Self {
        0
    }
}

impl Serializer for i8 {
    #[inline(always)]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_i8(*self);
        Ok(())
    }

    #[inline(always)]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        context.reader.read_i8()
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        TypeId::INT8
    }

    fn fury_write_slice(values: &[Self], context: &mut WriteContext) -> Result<(), Error> {
        write_len(values.len(), context)?;
        context.writer.write_byte_iter(values.iter().map(|&v| v as u8));
        Ok(())
    }

    fn fury_read_vec(context: &mut ReadContext) -> Result<Vec<Self>, Error> {
        let len = read_len(context)?;
        Ok(context.reader.read_bytes(len)?.iter().map(|&b| b as i8).collect())
    }
}

impl FuryDefault for i8 {
    #[inline(always)]
    fn fury_default() -> Self {
        0
    }
}
