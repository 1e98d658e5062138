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

//! Polymorphic values. The declared type is the `UNKNOWN` stub; each value
//! carries the type info of its runtime type and is dispatched through the
//! harness registered for it.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::{RefFlag, TypeId, UNKNOWN};
use std::any::Any;
use std::rc::Rc;

fn write_dyn(value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
    let type_info = context.get_type_info(value.type_id())?;
    context.write_type_info(&type_info)?;
    type_info.get_harness().write_data(value, context)
}

fn read_dyn(context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
    let (type_info, schema) = context.read_type_info()?;
    match schema {
        Some(schema) => type_info.get_harness().read_compatible(context, schema),
        None => type_info.get_harness().read_data(context),
    }
}

impl Serializer for Box<dyn Any> {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_dyn(&**self, context)
    }

    // Type info is part of the data for dynamic values.
    fn fury_write_type_info(_context: &mut WriteContext) -> Result<(), Error> {
        Ok(())
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_dyn(context)
    }

    fn fury_read_type_info(_context: &mut ReadContext) -> Result<(), Error> {
        Ok(())
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::UNKNOWN
    }
}

impl FuryDefault for Box<dyn Any> {
    fn fury_default() -> Self {
        Box::new(())
    }
}

/// Tracked like `Rc<T>`, sharing ref ids with typed `Rc`s of the same
/// allocation. The concrete value is only built once its body is read, so a
/// cycle through an `Rc<dyn Any>` fails with `InvalidRef`.
impl Serializer for Rc<dyn Any> {
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        _write_type_info: bool,
    ) -> Result<(), Error> {
        if write_ref_info && context.is_tracked(UNKNOWN) {
            if context
                .ref_writer
                .try_write_rc_ref(&mut context.writer, self)
            {
                return Ok(());
            }
        } else if write_ref_info {
            context.writer.write_i8(RefFlag::NotNullValue as i8);
        }
        write_dyn(&**self, context)
    }

    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_dyn(&**self, context)
    }

    fn fury_write_type_info(_context: &mut WriteContext) -> Result<(), Error> {
        Ok(())
    }

    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        _read_type_info: bool,
    ) -> Result<Self, Error> {
        if !read_ref_info {
            return read_dyn(context).map(Rc::from);
        }
        match context.ref_reader.read_ref_flag(&mut context.reader)? {
            RefFlag::Null => Ok(Self::fury_default()),
            RefFlag::Ref => {
                let ref_id = context.ref_reader.read_ref_id(&mut context.reader)?;
                context.ref_reader.get_rc_any(ref_id)
            }
            RefFlag::NotNullValue => read_dyn(context).map(Rc::from),
            RefFlag::RefValue => {
                let ref_id = context.ref_reader.reserve_ref_id();
                let rc: Rc<dyn Any> = Rc::from(read_dyn(context)?);
                context.ref_reader.set_rc_any(ref_id, &rc)?;
                Ok(rc)
            }
        }
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_dyn(context).map(Rc::from)
    }

    fn fury_read_type_info(_context: &mut ReadContext) -> Result<(), Error> {
        Ok(())
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::UNKNOWN
    }

    fn fury_has_ref_flag() -> bool {
        true
    }

    fn fury_field_type() -> crate::meta::FieldType {
        crate::meta::FieldType::leaf(UNKNOWN).tracked()
    }
}

impl FuryDefault for Rc<dyn Any> {
    fn fury_default() -> Self {
        Rc::new(())
    }
}
