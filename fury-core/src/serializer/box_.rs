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
use crate::types::TypeId;

impl<T: Serializer + FuryDefault> Serializer for Box<T> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error> {
        T::fury_write(self.as_ref(), context, write_ref_info, write_type_info)
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_data(self.as_ref(), context)
    }

    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_type_info(context)
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error> {
        T::fury_read(context, read_ref_info, read_type_info).map(Box::new)
    }

    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error> {
        T::fury_read_body(context, read_type_info).map(Box::new)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_data(context).map(Box::new)
    }

    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error> {
        T::fury_read_type_info(context)
    }

    fn fury_static_type_id() -> TypeId {
        T::fury_static_type_id()
    }

    fn fury_field_type() -> FieldType {
        T::fury_field_type()
    }

    fn fury_has_ref_flag() -> bool {
        T::fury_has_ref_flag()
    }

    fn fury_is_none(&self) -> bool {
        T::fury_is_none(self.as_ref())
    }
}

impl<T: FuryDefault> FuryDefault for Box<T> {
    fn fury_default() -> Self {
        Box::new(T::fury_default())
    }
}
