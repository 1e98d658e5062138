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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_len, write_len};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;

impl Serializer for bool {
    #[inline(always)]
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_bool(*self);
        Ok(())
    }

    #[inline(always)]
    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        context.reader.read_bool()
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        TypeId::BOOL
    }

    fn fury_write_slice(values: &[Self], context: &mut WriteContext) -> Result<(), Error> {
        write_len(values.len(), context)?;
        context.writer.write_byte_iter(values.iter().map(|&v| v as u8));
        Ok(())
    }

    fn fury_read_vec(context: &mut ReadContext) -> Result<Vec<Self>, Error> {
        let len = read_len(context)?;
        context
            .reader
            .read_bytes(len)?
            .iter()
            .map(|&b| match b {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(Error::invalid_data(format!("invalid bool byte: {other}"))),
            })
            .collect()
    }
}

impl FuryDefault for bool {
    fn fury_default() -> Self {
        false
    }
}
