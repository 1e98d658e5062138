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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::types::RefFlag;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Write-side identity table for one serialization pass.
///
/// Keys are allocation addresses of shared pointers. The graph being written
/// is borrowed for the whole pass, so no address can be freed and reused while
/// it is in the table.
///
/// # Examples
///
/// ```rust
/// use fury_core::buffer::Writer;
/// use fury_core::resolver::ref_resolver::RefWriter;
/// use std::rc::Rc;
///
/// let mut ref_writer = RefWriter::new();
/// let mut writer = Writer::default();
/// let shared = Rc::new(42);
///
/// // First occurrence: REF_VALUE flag, caller writes the body.
/// assert!(!ref_writer.try_write_rc_ref(&mut writer, &shared));
/// // Second occurrence: REF flag plus the ref id.
/// assert!(ref_writer.try_write_rc_ref(&mut writer, &shared));
/// assert_eq!(ref_writer.ref_id_of(&shared), Some(0));
/// ```
#[derive(Default)]
pub struct RefWriter {
    refs: HashMap<usize, u32>,
    next_ref_id: u32,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the flag for a tracked value keyed by `identity`.
    ///
    /// Returns `true` when the value was already written, in which case a
    /// back-reference has been emitted and the caller must not write the body.
    /// Otherwise the next ref id is assigned and `REF_VALUE` is written.
    pub fn try_write_ref(&mut self, writer: &mut Writer, identity: usize) -> bool {
        if let Some(&ref_id) = self.refs.get(&identity) {
            writer.write_i8(RefFlag::Ref as i8);
            writer.write_varuint32(ref_id);
            true
        } else {
            let ref_id = self.next_ref_id;
            self.next_ref_id += 1;
            self.refs.insert(identity, ref_id);
            writer.write_i8(RefFlag::RefValue as i8);
            false
        }
    }

    /// Like [`RefWriter::try_write_ref`], writing `NULL` for `None`.
    pub fn write_ref_or_null(&mut self, writer: &mut Writer, identity: Option<usize>) -> bool {
        match identity {
            None => {
                writer.write_i8(RefFlag::Null as i8);
                true
            }
            Some(identity) => self.try_write_ref(writer, identity),
        }
    }

    #[inline(always)]
    pub fn try_write_rc_ref<T: ?Sized>(&mut self, writer: &mut Writer, rc: &Rc<T>) -> bool {
        self.try_write_ref(writer, Rc::as_ptr(rc) as *const () as usize)
    }

    #[inline(always)]
    pub fn try_write_arc_ref<T: ?Sized>(&mut self, writer: &mut Writer, arc: &Arc<T>) -> bool {
        self.try_write_ref(writer, Arc::as_ptr(arc) as *const () as usize)
    }

    pub fn ref_id_of<T: ?Sized>(&self, rc: &Rc<T>) -> Option<u32> {
        self.refs.get(&(Rc::as_ptr(rc) as *const () as usize)).copied()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn reset(&mut self) {
        self.refs.clear();
        self.next_ref_id = 0;
    }
}

enum RefSlot {
    /// Reserved; the body is still being read.
    Pending,
    /// Consumed without a local type to decode it into.
    Skipped,
    /// Decoded while skipping a field; wrapped into a pointer on first use.
    Detached(Box<dyn Any>),
    /// `typed` holds the `Rc<T>`/`Arc<T>` as read. `erased` is the same `Rc`
    /// allocation as `Rc<dyn Any>`, so typed and dynamic holders alias.
    Shared {
        typed: Box<dyn Any>,
        erased: Option<Rc<dyn Any>>,
    },
}

/// Read-side arena of decoded tracked values, indexed by ref id.
///
/// A slot is reserved before the value's children are decoded so ids line up
/// with the writer's numbering. Cyclic values fill the slot with their
/// placeholder before recursing, which is what lets a back-reference to an
/// object that is still being populated resolve.
#[derive(Default)]
pub struct RefReader {
    refs: Vec<RefSlot>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn read_ref_flag(&self, reader: &mut Reader) -> Result<RefFlag, Error> {
        RefFlag::from_byte(reader.read_i8()?)
    }

    #[inline(always)]
    pub fn read_ref_id(&self, reader: &mut Reader) -> Result<u32, Error> {
        reader.read_varuint32()
    }

    /// Reserves the next ref id for a value whose body is about to be read.
    pub fn reserve_ref_id(&mut self) -> u32 {
        let ref_id = self.refs.len() as u32;
        self.refs.push(RefSlot::Pending);
        ref_id
    }

    fn fill(&mut self, ref_id: u32, slot: RefSlot) -> Result<(), Error> {
        match self.refs.get_mut(ref_id as usize) {
            Some(current) => {
                *current = slot;
                Ok(())
            }
            None => Err(Error::invalid_ref(format!(
                "ref id {ref_id} was never reserved"
            ))),
        }
    }

    pub fn set_rc_ref<T: 'static>(&mut self, ref_id: u32, rc: &Rc<T>) -> Result<(), Error> {
        let erased: Rc<dyn Any> = rc.clone();
        self.fill(
            ref_id,
            RefSlot::Shared {
                typed: Box::new(rc.clone()),
                erased: Some(erased),
            },
        )
    }

    pub fn set_rc_any(&mut self, ref_id: u32, rc: &Rc<dyn Any>) -> Result<(), Error> {
        self.fill(
            ref_id,
            RefSlot::Shared {
                typed: Box::new(rc.clone()),
                erased: Some(rc.clone()),
            },
        )
    }

    pub fn set_arc_ref<T: 'static>(&mut self, ref_id: u32, arc: &Arc<T>) -> Result<(), Error> {
        self.fill(
            ref_id,
            RefSlot::Shared {
                typed: Box::new(arc.clone()),
                erased: None,
            },
        )
    }

    /// Keeps a value decoded from a skipped field for later back-references.
    pub fn set_detached(&mut self, ref_id: u32, value: Box<dyn Any>) -> Result<(), Error> {
        self.fill(ref_id, RefSlot::Detached(value))
    }

    pub fn set_skipped(&mut self, ref_id: u32) -> Result<(), Error> {
        self.fill(ref_id, RefSlot::Skipped)
    }

    fn slot_mut(&mut self, ref_id: u32) -> Result<&mut RefSlot, Error> {
        let len = self.refs.len();
        match self.refs.get_mut(ref_id as usize) {
            Some(RefSlot::Pending) => Err(Error::invalid_ref(format!(
                "ref id {ref_id} points to a value that is still being read"
            ))),
            Some(RefSlot::Skipped) => Err(Error::invalid_ref(format!(
                "ref id {ref_id} points to a value that was skipped"
            ))),
            Some(slot) => Ok(slot),
            None => Err(Error::protocol_error(format!(
                "ref id {ref_id} out of range, {len} refs read"
            ))),
        }
    }

    /// Moves a detached value of type `T` into a shared pointer built by
    /// `wrap` and returns the slot's new typed content.
    fn attach<T: 'static, P: Clone + 'static>(
        slot: &mut RefSlot,
        wrap: impl FnOnce(Box<T>) -> P,
        erase: impl FnOnce(&P) -> Option<Rc<dyn Any>>,
    ) -> Option<P> {
        let taken = std::mem::replace(slot, RefSlot::Pending);
        match taken {
            RefSlot::Detached(value) => match value.downcast::<T>() {
                Ok(value) => {
                    let pointer = wrap(value);
                    *slot = RefSlot::Shared {
                        typed: Box::new(pointer.clone()),
                        erased: erase(&pointer),
                    };
                    Some(pointer)
                }
                Err(value) => {
                    *slot = RefSlot::Detached(value);
                    None
                }
            },
            other => {
                *slot = other;
                None
            }
        }
    }

    fn mismatch(ref_id: u32, expected: &str) -> Error {
        Error::protocol_error(format!("ref id {ref_id} does not refer to a {expected}"))
    }

    pub fn get_rc_ref<T: 'static>(&mut self, ref_id: u32) -> Result<Rc<T>, Error> {
        let slot = self.slot_mut(ref_id)?;
        if let RefSlot::Shared { typed, erased } = slot {
            if let Some(rc) = typed.downcast_ref::<Rc<T>>() {
                return Ok(rc.clone());
            }
            return erased
                .clone()
                .and_then(|rc| rc.downcast::<T>().ok())
                .ok_or_else(|| Self::mismatch(ref_id, std::any::type_name::<Rc<T>>()));
        }
        Self::attach::<T, Rc<T>>(slot, |value| Rc::from(value), |rc| {
            let erased: Rc<dyn Any> = rc.clone();
            Some(erased)
        })
        .ok_or_else(|| Self::mismatch(ref_id, std::any::type_name::<Rc<T>>()))
    }

    pub fn get_rc_any(&mut self, ref_id: u32) -> Result<Rc<dyn Any>, Error> {
        let slot = self.slot_mut(ref_id)?;
        if let RefSlot::Shared { erased, .. } = slot {
            return erased
                .clone()
                .ok_or_else(|| Self::mismatch(ref_id, "Rc<dyn Any>"));
        }
        match std::mem::replace(slot, RefSlot::Pending) {
            RefSlot::Detached(value) => {
                let rc: Rc<dyn Any> = Rc::from(value);
                *slot = RefSlot::Shared {
                    typed: Box::new(rc.clone()),
                    erased: Some(rc.clone()),
                };
                Ok(rc)
            }
            other => {
                *slot = other;
                Err(Self::mismatch(ref_id, "Rc<dyn Any>"))
            }
        }
    }

    pub fn get_arc_ref<T: 'static>(&mut self, ref_id: u32) -> Result<Arc<T>, Error> {
        let slot = self.slot_mut(ref_id)?;
        if let RefSlot::Shared { typed, .. } = slot {
            return typed
                .downcast_ref::<Arc<T>>()
                .cloned()
                .ok_or_else(|| Self::mismatch(ref_id, std::any::type_name::<Arc<T>>()));
        }
        Self::attach::<T, Arc<T>>(slot, |value| Arc::from(value), |_| None)
            .ok_or_else(|| Self::mismatch(ref_id, std::any::type_name::<Arc<T>>()))
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn reset(&mut self) {
        self.refs.clear();
    }
}
