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

use crate::buffer::Reader;
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::meta_resolver::SchemaCache;
use crate::resolver::security::SecurityChecker;
use crate::resolver::type_resolver::{TypeKey, TypeResolver};
use crate::serializer::{FuryDefault, Serializer, StructSerializer};
use crate::types::Mode;
use std::sync::Arc;

/// The codec instance: configuration plus the type registry.
///
/// `Fury` is built once, registered against, and then shared read-only.
/// Every call creates its own [`WriteContext`] or [`ReadContext`], so one
/// instance can serve many threads behind an `Arc`.
///
/// # Examples
///
/// ```rust
/// use fury_core::fury::Fury;
/// use fury_core::types::Mode;
///
/// let fury = Fury::default()
///     .mode(Mode::Compatible)
///     .max_depth(32);
///
/// let bytes = fury.serialize(&vec![1i32, 2, 3]).unwrap();
/// let back: Vec<i32> = fury.deserialize(&bytes).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
///
/// Deriving types and registering them goes through the `fury` crate:
///
/// ```rust, ignore
/// use fury::{Fury, FuryObject};
///
/// #[derive(FuryObject, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let mut fury = Fury::default();
/// fury.register::<Point>(100)?;
/// let bytes = fury.serialize(&Point { x: 3, y: 4 })?;
/// let point: Point = fury.deserialize(&bytes)?;
/// ```
#[derive(Default)]
pub struct Fury {
    config: Config,
    type_resolver: TypeResolver,
}

impl Fury {
    /// `Compatible` lets peers evolve their structs independently; fields are
    /// matched by name through schema defs written into the stream.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn compatible(self, compatible: bool) -> Self {
        self.mode(if compatible {
            Mode::Compatible
        } else {
            Mode::SchemaConsistent
        })
    }

    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.config.track_ref = track_ref;
        self
    }

    /// Skips identity tracking for `Rc`/`Arc` around scalars, strings and
    /// time values. Shared pointers to such values come back as distinct
    /// allocations with equal contents.
    pub fn basic_types_ref_ignored(mut self, ignored: bool) -> Self {
        self.config.basic_types_ref_ignored = ignored;
        self
    }

    pub fn compress_number(mut self, compress_number: bool) -> Self {
        self.config.compress_number = compress_number;
        self
    }

    /// With `false`, statically typed structs and enums that were never
    /// registered are bound by their Rust type name on first use.
    pub fn require_registration(mut self, require_registration: bool) -> Self {
        self.config.require_registration = require_registration;
        self.type_resolver
            .set_require_registration(require_registration);
        self
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn enum_by_name(mut self, enum_by_name: bool) -> Self {
        self.config.enum_by_name = enum_by_name;
        self
    }

    /// Installs a checker consulted on every user type lookup, on both the
    /// write and the read path.
    pub fn security_checker(mut self, checker: Arc<dyn SecurityChecker>) -> Self {
        self.type_resolver.set_security_checker(checker);
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn is_compatible(&self) -> bool {
        self.config.is_compatible()
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Registers `T` under a numeric id. Ids start at 1 and are unique per
    /// instance.
    pub fn register<T: StructSerializer + FuryDefault>(&mut self, id: u32) -> Result<(), Error> {
        self.type_resolver.register::<T>(TypeKey::Id(id), false)
    }

    /// Registers `T` under `namespace` and `type_name`, which are written to
    /// the stream through the string table.
    pub fn register_by_name<T: StructSerializer + FuryDefault>(
        &mut self,
        namespace: &str,
        type_name: &str,
    ) -> Result<(), Error> {
        self.type_resolver
            .register::<T>(TypeKey::name(namespace, type_name), false)
    }

    /// Registers `T` and, with `create_strategy_now`, builds its schema def
    /// up front instead of on first use.
    pub fn register_with<T: StructSerializer + FuryDefault>(
        &mut self,
        key: TypeKey,
        create_strategy_now: bool,
    ) -> Result<(), Error> {
        self.type_resolver.register::<T>(key, create_strategy_now)
    }

    pub fn new_write_context(&self) -> WriteContext<'_> {
        WriteContext::new(self)
    }

    pub fn new_read_context<'bf>(&self) -> ReadContext<'_, 'bf> {
        ReadContext::new(self, Reader::new(&[]))
    }

    pub fn serialize<T: Serializer>(&self, record: &T) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(self);
        self.write_root(record, &mut context)?;
        Ok(context.writer.into_bytes())
    }

    /// Serializes through a caller-owned context, which is reset afterwards
    /// whether or not the call succeeded.
    pub fn serialize_with_context<T: Serializer>(
        &self,
        record: &T,
        context: &mut WriteContext,
    ) -> Result<Vec<u8>, Error> {
        ensure!(
            std::ptr::eq(context.get_fury(), self),
            Error::not_allowed("write context belongs to another Fury instance")
        );
        ensure!(
            context.is_clean(),
            Error::not_allowed(format!(
                "write context is still in use: depth {}, {} live refs",
                context.depth(),
                context.ref_writer.len()
            ))
        );
        let result = self
            .write_root(record, context)
            .map(|_| context.writer.dump());
        context.reset();
        result
    }

    /// Serializes with schema defs deduplicated across calls.
    ///
    /// A def already sent through `cache` is written as its hash only, so
    /// the peer must read every stream produced here, in order, through its
    /// own cache.
    pub fn serialize_with_schema_cache<T: Serializer>(
        &self,
        record: &T,
        cache: &mut SchemaCache,
    ) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(self);
        context.attach_schema_cache(cache);
        let result = self.write_root(record, &mut context);
        context.detach_schema_cache(cache, result.is_ok());
        result.map(|_| context.writer.into_bytes())
    }

    fn write_root<T: Serializer>(
        &self,
        record: &T,
        context: &mut WriteContext,
    ) -> Result<(), Error> {
        let is_none = record.fury_is_none();
        context.write_header(is_none);
        if !is_none {
            record.fury_write(context, true, true)?;
        }
        Ok(())
    }

    pub fn deserialize<T: Serializer + FuryDefault>(&self, bf: &[u8]) -> Result<T, Error> {
        let mut context = ReadContext::new(self, Reader::new(bf));
        self.read_root(&mut context)
    }

    /// Deserializes through a caller-owned context, which is reset afterwards
    /// whether or not the call succeeded.
    pub fn deserialize_with_context<'bf, T: Serializer + FuryDefault>(
        &self,
        bf: &'bf [u8],
        context: &mut ReadContext<'_, 'bf>,
    ) -> Result<T, Error> {
        ensure!(
            std::ptr::eq(context.get_fury(), self),
            Error::not_allowed("read context belongs to another Fury instance")
        );
        ensure!(
            context.is_clean(),
            Error::not_allowed(format!(
                "read context is still in use: depth {}, {} live refs",
                context.depth(),
                context.ref_reader.len()
            ))
        );
        context.init(bf);
        let result = self.read_root(context);
        context.reset();
        result
    }

    pub fn deserialize_with_schema_cache<T: Serializer + FuryDefault>(
        &self,
        bf: &[u8],
        cache: &mut SchemaCache,
    ) -> Result<T, Error> {
        let mut context = ReadContext::new(self, Reader::new(bf));
        context.attach_schema_cache(cache);
        let result = self.read_root(&mut context);
        context.detach_schema_cache(cache);
        result
    }

    fn read_root<T: Serializer + FuryDefault>(
        &self,
        context: &mut ReadContext,
    ) -> Result<T, Error> {
        if context.read_header()? {
            return Ok(T::fury_default());
        }
        let value = T::fury_read(context, true, true)?;
        ensure!(
            context.reader.remaining() == 0,
            Error::invalid_data(format!(
                "{} trailing bytes after the root value",
                context.reader.remaining()
            ))
        );
        Ok(value)
    }
}
