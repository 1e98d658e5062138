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
use crate::meta::FieldType;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::{RefFlag, TypeId};

/// `None` is the `NULL` flag; `Some` is encoded exactly like the inner value.
impl<T: Serializer + FuryDefault> Serializer for Option<T> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error> {
        match self {
            Some(v) => v.fury_write(context, write_ref_info, write_type_info),
            None if write_ref_info => {
                context.writer.write_i8(RefFlag::Null as i8);
                Ok(())
            }
            None => Err(Error::encode_error(format!(
                "None for {} in a position without a ref flag",
                std::any::type_name::<T>()
            ))),
        }
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Some(v) => v.fury_write_data(context),
            None => Err(Error::encode_error("None has no data to write")),
        }
    }

    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_type_info(context)
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error> {
        if read_ref_info && context.reader.peek_i8()? == RefFlag::Null as i8 {
            context.reader.skip(1)?;
            return Ok(None);
        }
        T::fury_read(context, read_ref_info, read_type_info).map(Some)
    }

    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error> {
        T::fury_read_body(context, read_type_info).map(Some)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_data(context).map(Some)
    }

    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error> {
        T::fury_read_type_info(context)
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        T::fury_static_type_id()
    }

    fn fury_field_type() -> FieldType {
        T::fury_field_type().nullable()
    }

    #[inline(always)]
    fn fury_has_ref_flag() -> bool {
        true
    }

    #[inline(always)]
    fn fury_is_none(&self) -> bool {
        self.is_none()
    }
}

impl<T> FuryDefault for Option<T> {
    fn fury_default() -> Self {
        None
    }
}
