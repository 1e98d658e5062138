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
use crate::meta::{FieldDescriptor, FieldType, SchemaDef};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_collection, write_collection};
use crate::types::{is_primitive_type_id, RefFlag, TypeId, ENUM, EXT, STRUCT};
use std::rc::Rc;
use std::sync::Arc;

/// Value used for a missing field, a null flag on a non-optional type, and
/// the placeholder a cyclic value is published as before it is read.
pub trait FuryDefault: Sized {
    fn fury_default() -> Self;
}

// No blanket impl over `Default`: it would conflict with the impls for
// `Box<dyn Any>` and `Rc<dyn Any>` should std ever add `Default` for them.

#[inline(always)]
fn is_user_kind(type_id: u32) -> bool {
    matches!(type_id, STRUCT | ENUM | EXT)
}

pub trait Serializer: 'static {
    /// Entry point of serialization.
    ///
    /// * `write_ref_info` - write the ref flag byte in front of the value.
    /// * `write_type_info` - write the inline type info after the flag.
    ///
    /// Option and shared pointer strategies override this to emit
    /// `NULL`/`REF`/`REF_VALUE`.
    fn fury_write(
        &self,
        context: &mut WriteContext,
        write_ref_info: bool,
        write_type_info: bool,
    ) -> Result<(), Error>
    where
        Self: Sized,
    {
        if write_ref_info {
            context.writer.write_i8(RefFlag::NotNullValue as i8);
        }
        if write_type_info {
            Self::fury_write_type_info(context)?;
        }
        self.fury_write_data(context)
    }

    /// Writes the value body only.
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Built-in kinds write their static id; user kinds write their
    /// registered binding.
    #[inline(always)]
    fn fury_write_type_info(context: &mut WriteContext) -> Result<(), Error>
    where
        Self: Sized,
    {
        let static_id = Self::fury_static_type_id() as u32;
        if is_user_kind(static_id) {
            let info = context.get_type_info(std::any::TypeId::of::<Self>())?;
            context.write_type_info(&info)
        } else {
            context.writer.write_varuint32(static_id);
            Ok(())
        }
    }

    /// Entry point of deserialization, mirroring [`Serializer::fury_write`].
    fn fury_read(
        context: &mut ReadContext,
        read_ref_info: bool,
        read_type_info: bool,
    ) -> Result<Self, Error>
    where
        Self: Sized + FuryDefault,
    {
        if read_ref_info {
            match context.ref_reader.read_ref_flag(&mut context.reader)? {
                RefFlag::Null => return Ok(Self::fury_default()),
                RefFlag::Ref => {
                    return Err(Error::invalid_ref(format!(
                        "back-reference for untracked type {}",
                        std::any::type_name::<Self>()
                    )))
                }
                RefFlag::RefValue => {
                    // Keeps ids aligned with a writer that tracked this value.
                    context.ref_reader.reserve_ref_id();
                }
                RefFlag::NotNullValue => {}
            }
        }
        Self::fury_read_body(context, read_type_info)
    }

    /// Reads optional type info followed by the body. Structs override this
    /// to switch to by-name reconciliation when a schema def is present.
    #[inline(always)]
    fn fury_read_body(context: &mut ReadContext, read_type_info: bool) -> Result<Self, Error>
    where
        Self: Sized + FuryDefault,
    {
        if read_type_info {
            Self::fury_read_type_info(context)?;
        }
        Self::fury_read_data(context)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized + FuryDefault;

    #[inline(always)]
    fn fury_read_type_info(context: &mut ReadContext) -> Result<(), Error>
    where
        Self: Sized,
    {
        let static_id = Self::fury_static_type_id() as u32;
        if is_user_kind(static_id) {
            let (info, _) = context.read_type_info()?;
            if info.rust_type_id() != std::any::TypeId::of::<Self>() {
                return Err(Error::enhance_type_error::<Self>(Error::type_error(format!(
                    "stream carries {}",
                    info.qualified_name()
                ))));
            }
            return Ok(());
        }
        let remote_id = context.reader.read_varuint32()?;
        if remote_id != static_id {
            return Err(Error::type_mismatch(static_id, remote_id));
        }
        Ok(())
    }

    /// Publishes the `Rc` for a tracked value under `ref_id` and returns it.
    ///
    /// Interior-mutable types publish a default placeholder before reading
    /// the body so back-references inside it resolve to the same allocation.
    fn fury_read_into_rc(
        context: &mut ReadContext,
        ref_id: u32,
        read_type_info: bool,
    ) -> Result<Rc<Self>, Error>
    where
        Self: Sized + FuryDefault,
    {
        let rc = Rc::new(Self::fury_read_body(context, read_type_info)?);
        context.ref_reader.set_rc_ref(ref_id, &rc)?;
        Ok(rc)
    }

    /// `Arc` counterpart of [`Serializer::fury_read_into_rc`].
    fn fury_read_into_arc(
        context: &mut ReadContext,
        ref_id: u32,
        read_type_info: bool,
    ) -> Result<Arc<Self>, Error>
    where
        Self: Sized + FuryDefault,
    {
        let arc = Arc::new(Self::fury_read_body(context, read_type_info)?);
        context.ref_reader.set_arc_ref(ref_id, &arc)?;
        Ok(arc)
    }

    #[inline(always)]
    fn fury_static_type_id() -> TypeId
    where
        Self: Sized,
    {
        // EXT keeps hand-written serializers for user types simple.
        TypeId::EXT
    }

    /// Declared type of a field or element holding `Self`.
    fn fury_field_type() -> FieldType
    where
        Self: Sized,
    {
        FieldType::leaf(Self::fury_static_type_id() as u32)
    }

    /// Whether a field or element of this type is preceded by a ref flag.
    /// Must agree with `fury_field_type().has_ref_flag()`.
    #[inline(always)]
    fn fury_has_ref_flag() -> bool
    where
        Self: Sized,
    {
        !is_primitive_type_id(Self::fury_static_type_id() as u32)
    }

    #[inline(always)]
    fn fury_is_none(&self) -> bool {
        false
    }

    /// Writes `values` as a list body. Byte-wide scalars copy the slice as
    /// one block; the wire layout is the same either way.
    fn fury_write_slice(values: &[Self], context: &mut WriteContext) -> Result<(), Error>
    where
        Self: Sized,
    {
        write_collection(values.iter(), context)
    }

    /// Reads a list body written by [`Serializer::fury_write_slice`].
    fn fury_read_vec(context: &mut ReadContext) -> Result<Vec<Self>, Error>
    where
        Self: Sized + FuryDefault,
    {
        read_collection(context)
    }
}

/// Strategy surface of registrable user types.
pub trait StructSerializer: Serializer {
    /// Field layout in declaration order.
    fn fury_fields_info() -> Vec<FieldDescriptor> {
        Vec::new()
    }

    /// Reads a body written by a peer whose layout is `schema`.
    #[allow(unused_variables)]
    fn fury_read_compatible(
        context: &mut ReadContext,
        schema: Arc<SchemaDef>,
    ) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Err(Error::type_error(format!(
            "{} cannot be read against schema {:#x}",
            std::any::type_name::<Self>(),
            schema.content_hash()
        )))
    }
}
