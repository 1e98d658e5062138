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
use std::sync::Arc;

/// Same encoding as the `Rc` strategy; ids are shared between both kinds.
impl<T: Serializer + FuryDefault> Serializer for Arc<T> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error> {
        if !write_ref_info
            || T::fury_is_none(&**self)
            || !context.is_tracked(T::fury_static_type_id() as u32)
        {
            return T::fury_write(&**self, context, write_ref_info, write_type_info);
        }
        if context
            .ref_writer
            .try_write_arc_ref(&mut context.writer, self)
        {
            return Ok(());
        }
        if write_type_info {
            T::fury_write_type_info(context)?;
        }
        T::fury_write_data(&**self, context)
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_data(&**self, context)
    }

    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_type_info(context)
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error> {
        if !read_ref_info {
            return T::fury_read_body(context, read_type_info).map(Arc::new);
        }
        match context.ref_reader.read_ref_flag(&mut context.reader)? {
            RefFlag::Null => Ok(Arc::new(T::fury_default())),
            RefFlag::Ref => {
                let ref_id = context.ref_reader.read_ref_id(&mut context.reader)?;
                context.ref_reader.get_arc_ref::<T>(ref_id)
            }
            RefFlag::NotNullValue => T::fury_read_body(context, read_type_info).map(Arc::new),
            RefFlag::RefValue => {
                let ref_id = context.ref_reader.reserve_ref_id();
                T::fury_read_into_arc(context, ref_id, read_type_info)
            }
        }
    }

    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error> {
        T::fury_read_body(context, read_type_info).map(Arc::new)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_data(context).map(Arc::new)
    }

    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error> {
        T::fury_read_type_info(context)
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        T::fury_static_type_id()
    }

    fn fury_field_type() -> FieldType {
        T::fury_field_type().tracked()
    }

    #[inline(always)]
    fn fury_has_ref_flag() -> bool {
        true
    }
}

impl<T: FuryDefault> FuryDefault for Arc<T> {
    fn fury_default() -> Self {
        Arc::new(T::fury_default())
    }
}
