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
use crate::serializer::collection::{read_collection, write_collection};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::{TypeId, LIST};
use std::collections::VecDeque;

impl<T: Serializer + FuryDefault> Serializer for Vec<T> {
    #[inline(always)]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_slice(self, context)
    }

    #[inline(always)]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_vec(context)
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::LIST
    }

    fn fury_field_type() -> FieldType {
        FieldType::new(LIST, false, vec![T::fury_field_type()])
    }
}

impl<T> FuryDefault for Vec<T> {
    fn fury_default() -> Self {
        Vec::new()
    }
}

impl<T: Serializer + FuryDefault> Serializer for VecDeque<T> {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_collection(self.iter(), context)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_collection(context)
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::LIST
    }

    fn fury_field_type() -> FieldType {
        FieldType::new(LIST, false, vec![T::fury_field_type()])
    }
}

impl<T> FuryDefault for VecDeque<T> {
    fn fury_default() -> Self {
        VecDeque::new()
    }
}
