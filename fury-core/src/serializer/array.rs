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
use crate::types::{TypeId, ARRAY};

/// Fixed-size arrays share the list wire layout; the decoded length must
/// equal `N`.
impl<T: Serializer + FuryDefault, const N: usize> Serializer for [T; N] {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_slice(self, context)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let elements = T::fury_read_vec(context)?;
        let len = elements.len();
        elements
            .try_into()
            .map_err(|_| Error::invalid_data(format!("expected array of {N} elements, got {len}")))
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::ARRAY
    }

    fn fury_field_type() -> FieldType {
        FieldType::new(ARRAY, false, vec![T::fury_field_type()])
    }
}

impl<T: FuryDefault, const N: usize> FuryDefault for [T; N] {
    fn fury_default() -> Self {
        std::array::from_fn(|_| T::fury_default())
    }
}
