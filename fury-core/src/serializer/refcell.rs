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

//! `RefCell<T>` is transparent on the wire. Its job is on the read side of
//! `Rc<RefCell<T>>`: the cell is published under its ref id holding a
//! default value, and filled once the body has been read, so a cycle back
//! to it resolves to the same allocation.

use crate::error::Error;
use crate::meta::FieldType;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

fn borrow<T>(cell: &RefCell<T>) -> Result<Ref<'_, T>, Error> {
    cell.try_borrow().map_err(|_| {
        Error::not_allowed(format!(
            "RefCell<{}> is mutably borrowed during serialization",
            std::any::type_name::<T>()
        ))
    })
}

impl<T: Serializer + FuryDefault> Serializer for RefCell<T> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error> {
        borrow(self)?.fury_write(context, write_ref_info, write_type_info)
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        borrow(self)?.fury_write_data(context)
    }

    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_type_info(context)
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error> {
        T::fury_read(context, read_ref_info, read_type_info).map(RefCell::new)
    }

    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error> {
        T::fury_read_body(context, read_type_info).map(RefCell::new)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_data(context).map(RefCell::new)
    }

    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error> {
        T::fury_read_type_info(context)
    }

    fn fury_read_into_rc(
        context: &mut ReadContext,
        ref_id: u32,
        read_type_info: bool,
    ) -> Result<Rc<Self>, Error> {
        let placeholder = Rc::new(RefCell::new(T::fury_default()));
        context.ref_reader.set_rc_ref(ref_id, &placeholder)?;
        let value = T::fury_read_body(context, read_type_info)?;
        let mut slot = placeholder.try_borrow_mut().map_err(|_| {
            Error::invalid_ref(format!("ref {ref_id} is borrowed while being populated"))
        })?;
        *slot = value;
        drop(slot);
        Ok(placeholder)
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId {
        T::fury_static_type_id()
    }

    fn fury_field_type() -> FieldType {
        T::fury_field_type()
    }

    #[inline(always)]
    fn fury_has_ref_flag() -> bool {
        T::fury_has_ref_flag()
    }
}

impl<T: FuryDefault> FuryDefault for RefCell<T> {
    fn fury_default() -> Self {
        RefCell::new(T::fury_default())
    }
}
