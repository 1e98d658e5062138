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

//! `Mutex<T>` is transparent on the wire and plays the placeholder role for
//! `Arc<Mutex<T>>`, like `RefCell` does for `Rc`.
//!
//! Locks are taken with `try_lock`: a mutex held elsewhere, or reached again
//! through an untracked cycle, fails the call instead of blocking.

use crate::error::Error;
use crate::meta::FieldType;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex.try_lock().map_err(|e| match e {
        TryLockError::Poisoned(_) => Error::not_allowed(format!(
            "Mutex<{}> is poisoned",
            std::any::type_name::<T>()
        )),
        TryLockError::WouldBlock => Error::not_allowed(format!(
            "Mutex<{}> is locked during serialization",
            std::any::type_name::<T>()
        )),
    })
}

impl<T: Serializer + FuryDefault> Serializer for Mutex<T> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error> {
        lock(self)?.fury_write(context, write_ref_info, write_type_info)
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        lock(self)?.fury_write_data(context)
    }

    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error> {
        T::fury_write_type_info(context)
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error> {
        T::fury_read(context, read_ref_info, read_type_info).map(Mutex::new)
    }

    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error> {
        T::fury_read_body(context, read_type_info).map(Mutex::new)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::fury_read_data(context).map(Mutex::new)
    }

    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error> {
        T::fury_read_type_info(context)
    }

    fn fury_read_into_arc(
        context: &mut ReadContext,
        ref_id: u32,
        read_type_info: bool,
    ) -> Result<Arc<Self>, Error> {
        let placeholder = Arc::new(Mutex::new(T::fury_default()));
        context.ref_reader.set_arc_ref(ref_id, &placeholder)?;
        let value = T::fury_read_body(context, read_type_info)?;
        *lock(&*placeholder)? = value;
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

impl<T: FuryDefault> FuryDefault for Mutex<T> {
    fn fury_default() -> Self {
        Mutex::new(T::fury_default())
    }
}
