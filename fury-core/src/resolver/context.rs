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
use crate::fury::Fury;
use crate::meta::SchemaDef;
use crate::resolver::meta_resolver::{MetaReaderResolver, MetaWriterResolver, SchemaCache};
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::string_table::{
    InternedString, StringTable, StringTableReader, StringTableWriter,
};
use crate::resolver::type_resolver::{TypeInfo, TypeInfoCache};
use crate::serializer::{FuryDefault, StructSerializer};
use crate::types::config_flags::{
    COMPRESS_NUMBER_FLAG, IS_COMPATIBLE_FLAG, IS_LITTLE_ENDIAN_FLAG, IS_NULL_FLAG,
};
use crate::types::{
    MAGIC_NUMBER, NAMED_COMPATIBLE_STRUCT, NAMED_ENUM, NAMED_EXT, NAMED_STRUCT,
    PROTOCOL_VERSION, COMPATIBLE_STRUCT,
};
use log::trace;
use std::sync::Arc;

fn depth_exceeded(max_depth: u32) -> Error {
    Error::depth_exceed(format!(
        "maximum nesting depth {max_depth} exceeded; the graph is too deep or a cycle \
         is written without reference tracking"
    ))
}

/// Per-call write state: output buffer, identity table, string and schema
/// dedup, and the nesting depth.
///
/// A context is confined to one thread. Reusing it for an unrelated call is
/// allowed once it has been reset, which `Fury` does after every call.
pub struct WriteContext<'a> {
    pub writer: Writer,
    fury: &'a Fury,
    pub ref_writer: RefWriter,
    meta_resolver: MetaWriterResolver,
    string_table: StringTable,
    string_writer: StringTableWriter,
    type_info_cache: TypeInfoCache,
    depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(fury: &'a Fury) -> WriteContext<'a> {
        WriteContext {
            writer: Writer::default(),
            fury,
            ref_writer: RefWriter::new(),
            meta_resolver: MetaWriterResolver::default(),
            string_table: StringTable::default(),
            string_writer: StringTableWriter::default(),
            type_info_cache: TypeInfoCache::default(),
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_fury(&self) -> &'a Fury {
        self.fury
    }

    #[inline(always)]
    pub fn is_compatible(&self) -> bool {
        self.fury.get_config().is_compatible()
    }

    #[inline(always)]
    pub fn is_compress_number(&self) -> bool {
        self.fury.get_config().is_compress_number()
    }

    #[inline(always)]
    pub fn is_enum_by_name(&self) -> bool {
        self.fury.get_config().is_enum_by_name()
    }

    /// Whether a shared pointer to a value of `type_id` gets a ref id.
    #[inline(always)]
    pub fn is_tracked(&self, type_id: u32) -> bool {
        let config = self.fury.get_config();
        config.is_track_ref()
            && !(config.is_basic_types_ref_ignored() && crate::types::is_basic_type_id(type_id))
    }

    pub fn write_header(&mut self, is_null: bool) {
        let [lo, hi] = MAGIC_NUMBER.to_le_bytes();
        self.writer.write_u8(lo);
        self.writer.write_u8(hi);
        self.writer.write_u8(PROTOCOL_VERSION);
        let mut bitmap = 0;
        if cfg!(target_endian = "little") {
            bitmap |= IS_LITTLE_ENDIAN_FLAG;
        }
        if is_null {
            bitmap |= IS_NULL_FLAG;
        }
        if self.is_compatible() {
            bitmap |= IS_COMPATIBLE_FLAG;
        }
        if self.is_compress_number() {
            bitmap |= COMPRESS_NUMBER_FLAG;
        }
        self.writer.write_u8(bitmap);
    }

    #[inline(always)]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.depth += 1;
        let max_depth = self.fury.get_config().max_depth();
        if self.depth > max_depth {
            return Err(depth_exceeded(max_depth));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// A clean context has no open nesting, no live refs and no output.
    pub fn is_clean(&self) -> bool {
        self.depth == 0 && self.ref_writer.is_empty() && self.writer.is_empty()
    }

    pub fn reset(&mut self) {
        trace!(
            "resetting write context: {} refs, depth {}",
            self.ref_writer.len(),
            self.depth
        );
        self.writer.reset();
        self.ref_writer.reset();
        self.meta_resolver.reset();
        self.string_writer.reset();
        self.type_info_cache.clear();
        self.depth = 0;
    }

    /// Binding for a statically known user type, checked on every call.
    #[inline(always)]
    pub fn resolve_type_info<T: StructSerializer + FuryDefault>(
        &mut self,
    ) -> Result<Arc<TypeInfo>, Error> {
        let fury = self.fury;
        let type_resolver = fury.get_type_resolver();
        if let Some(info) = self.type_info_cache.get(std::any::TypeId::of::<T>()) {
            type_resolver.check(info)?;
            return Ok(info.clone());
        }
        let info = type_resolver.resolve::<T>()?;
        self.type_info_cache.put(info.clone());
        Ok(info)
    }

    /// Binding for a runtime type id, as found behind `dyn Any`.
    pub fn get_type_info(&mut self, rust_type_id: std::any::TypeId) -> Result<Arc<TypeInfo>, Error> {
        let fury = self.fury;
        let type_resolver = fury.get_type_resolver();
        if let Some(info) = self.type_info_cache.get(rust_type_id) {
            type_resolver.check(info)?;
            return Ok(info.clone());
        }
        let info = type_resolver.get_type_info(&rust_type_id)?;
        self.type_info_cache.put(info.clone());
        Ok(info)
    }

    /// Writes the wire id of `type_info`, followed by its names for named
    /// kinds or its schema def for compatible structs.
    pub fn write_type_info(&mut self, type_info: &TypeInfo) -> Result<(), Error> {
        let wire_type_id = type_info.wire_type_id(self.is_compatible());
        self.writer.write_varuint32(wire_type_id);
        match wire_type_id & 0xff {
            NAMED_STRUCT | NAMED_ENUM | NAMED_EXT => {
                self.string_writer
                    .write(&mut self.writer, type_info.get_namespace())?;
                self.string_writer
                    .write(&mut self.writer, type_info.get_type_name())?;
            }
            COMPATIBLE_STRUCT | NAMED_COMPATIBLE_STRUCT => {
                let def = type_info.schema_def()?;
                self.meta_resolver.write(&mut self.writer, &def);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn intern(&mut self, s: &str) -> InternedString {
        self.string_table.get_or_create(s)
    }

    #[inline(always)]
    pub fn write_interned(&mut self, s: &InternedString) -> Result<(), Error> {
        self.string_writer.write(&mut self.writer, s)
    }

    pub fn attach_schema_cache(&mut self, cache: &mut SchemaCache) {
        self.meta_resolver.attach(cache);
    }

    pub fn detach_schema_cache(&mut self, cache: &mut SchemaCache, committed: bool) {
        self.meta_resolver.detach(cache, committed);
    }
}

/// Per-call read state, mirroring [`WriteContext`].
pub struct ReadContext<'de, 'bf> {
    pub reader: Reader<'bf>,
    fury: &'de Fury,
    pub ref_reader: RefReader,
    meta_resolver: MetaReaderResolver,
    string_reader: StringTableReader,
    type_info_cache: TypeInfoCache,
    compress_number: bool,
    depth: u32,
}

impl<'de, 'bf> ReadContext<'de, 'bf> {
    pub fn new(fury: &'de Fury, reader: Reader<'bf>) -> ReadContext<'de, 'bf> {
        ReadContext {
            reader,
            fury,
            ref_reader: RefReader::new(),
            meta_resolver: MetaReaderResolver::default(),
            string_reader: StringTableReader::default(),
            type_info_cache: TypeInfoCache::default(),
            compress_number: fury.get_config().is_compress_number(),
            depth: 0,
        }
    }

    /// Points the context at the next input.
    pub fn init(&mut self, bf: &'bf [u8]) {
        self.reader = Reader::new(bf);
    }

    #[inline(always)]
    pub fn get_fury(&self) -> &'de Fury {
        self.fury
    }

    /// Number compression as announced by the stream header.
    #[inline(always)]
    pub fn is_compress_number(&self) -> bool {
        self.compress_number
    }

    #[inline(always)]
    pub fn is_enum_by_name(&self) -> bool {
        self.fury.get_config().is_enum_by_name()
    }

    /// Reads the stream header and adopts its byte order and number
    /// encoding. Returns whether the root value is null.
    pub fn read_header(&mut self) -> Result<bool, Error> {
        let lo = self.reader.read_u8()?;
        let hi = self.reader.read_u8()?;
        let magic = u16::from_le_bytes([lo, hi]);
        if magic != MAGIC_NUMBER {
            return Err(Error::protocol_error(format!(
                "stream must start with magic number {MAGIC_NUMBER:#x}, got {magic:#x}"
            )));
        }
        let version = self.reader.read_u8()?;
        if version != PROTOCOL_VERSION {
            return Err(Error::protocol_error(format!(
                "unsupported protocol version {version}, expected {PROTOCOL_VERSION}"
            )));
        }
        let bitmap = self.reader.read_u8()?;
        let peer_compatible = bitmap & IS_COMPATIBLE_FLAG != 0;
        if peer_compatible != self.fury.get_config().is_compatible() {
            return Err(Error::protocol_error(format!(
                "stream was written in {} mode, reader is configured for {} mode",
                if peer_compatible { "compatible" } else { "schema consistent" },
                if peer_compatible { "schema consistent" } else { "compatible" },
            )));
        }
        self.reader
            .set_little_endian(bitmap & IS_LITTLE_ENDIAN_FLAG != 0);
        self.compress_number = bitmap & COMPRESS_NUMBER_FLAG != 0;
        Ok(bitmap & IS_NULL_FLAG != 0)
    }

    #[inline(always)]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.depth += 1;
        let max_depth = self.fury.get_config().max_depth();
        if self.depth > max_depth {
            return Err(depth_exceeded(max_depth));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_clean(&self) -> bool {
        self.depth == 0 && self.ref_reader.is_empty()
    }

    pub fn reset(&mut self) {
        trace!(
            "resetting read context: {} refs, depth {}",
            self.ref_reader.len(),
            self.depth
        );
        self.reader = Reader::new(&[]);
        self.ref_reader.reset();
        self.meta_resolver.reset();
        self.string_reader.reset();
        self.type_info_cache.clear();
        self.compress_number = self.fury.get_config().is_compress_number();
        self.depth = 0;
    }

    #[inline(always)]
    pub fn resolve_type_info<T: StructSerializer + FuryDefault>(
        &mut self,
    ) -> Result<Arc<TypeInfo>, Error> {
        let fury = self.fury;
        let type_resolver = fury.get_type_resolver();
        if let Some(info) = self.type_info_cache.get(std::any::TypeId::of::<T>()) {
            type_resolver.check(info)?;
            return Ok(info.clone());
        }
        let info = type_resolver.resolve::<T>()?;
        self.type_info_cache.put(info.clone());
        Ok(info)
    }

    /// Reads inline type info and resolves it to a binding. Compatible
    /// structs also yield the sender's schema def.
    pub fn read_type_info(&mut self) -> Result<(Arc<TypeInfo>, Option<Arc<SchemaDef>>), Error> {
        let wire_type_id = self.reader.read_varuint32()?;
        let fury = self.fury;
        let type_resolver = fury.get_type_resolver();
        match wire_type_id & 0xff {
            NAMED_STRUCT | NAMED_ENUM | NAMED_EXT => {
                let namespace = self.string_reader.read(&mut self.reader)?;
                let type_name = self.string_reader.read(&mut self.reader)?;
                let info = type_resolver.get_by_name(&namespace, &type_name)?;
                Ok((info, None))
            }
            NAMED_COMPATIBLE_STRUCT => {
                let def = self.read_schema_def(wire_type_id)?;
                let info = type_resolver.get_by_name(def.namespace(), def.type_name())?;
                Ok((info, Some(def)))
            }
            COMPATIBLE_STRUCT => {
                let def = self.read_schema_def(wire_type_id)?;
                let info = type_resolver.get_by_wire_id(wire_type_id)?;
                Ok((info, Some(def)))
            }
            _ => Ok((type_resolver.get_by_wire_id(wire_type_id)?, None)),
        }
    }

    /// Reads the schema def following a compatible struct wire id without
    /// resolving the type, which may be unknown to this side.
    pub fn read_schema_def(&mut self, wire_type_id: u32) -> Result<Arc<SchemaDef>, Error> {
        let def = self.meta_resolver.read(&mut self.reader)?;
        if wire_type_id & 0xff == COMPATIBLE_STRUCT && def.type_id() != wire_type_id {
            return Err(Error::protocol_error(format!(
                "schema def for wire id {} follows wire id {wire_type_id}",
                def.type_id()
            )));
        }
        Ok(def)
    }

    /// Reads inline type info that must describe `T`.
    pub fn read_struct_type_info<T: StructSerializer + FuryDefault>(
        &mut self,
    ) -> Result<(Arc<TypeInfo>, Option<Arc<SchemaDef>>), Error> {
        // Binds T first so open mode can resolve its name and closed mode
        // reports the local type rather than the stream's id.
        let expected = self.resolve_type_info::<T>()?;
        let (info, def) = self.read_type_info()?;
        if !Arc::ptr_eq(&expected, &info) {
            return Err(Error::type_mismatch(
                expected.wire_type_id(false),
                info.wire_type_id(false),
            ));
        }
        Ok((info, def))
    }

    #[inline(always)]
    pub fn read_interned(&mut self) -> Result<InternedString, Error> {
        self.string_reader.read(&mut self.reader)
    }

    pub fn attach_schema_cache(&mut self, cache: &mut SchemaCache) {
        self.meta_resolver.attach(cache);
    }

    pub fn detach_schema_cache(&mut self, cache: &mut SchemaCache) {
        self.meta_resolver.detach(cache);
    }
}
