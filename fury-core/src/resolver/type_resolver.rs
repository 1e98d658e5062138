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

use super::context::{ReadContext, WriteContext};
use super::security::SecurityChecker;
use super::string_table::InternedString;
use crate::error::Error;
use crate::meta::{FieldDescriptor, SchemaDef};
use crate::serializer::{FuryDefault, Serializer, StructSerializer};
use crate::types::{
    TypeId, COMPATIBLE_STRUCT, ENUM, EXT, MAX_USER_TYPE_ID, NAMED_COMPATIBLE_STRUCT,
    NAMED_ENUM, NAMED_EXT, NAMED_STRUCT, STRUCT,
};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

type WriteDataFn = fn(&dyn Any, &mut WriteContext) -> Result<(), Error>;
type ReadDataFn = fn(&mut ReadContext) -> Result<Box<dyn Any>, Error>;
type ReadCompatibleFn = fn(&mut ReadContext, Arc<SchemaDef>) -> Result<Box<dyn Any>, Error>;
type FieldsFn = fn() -> Vec<FieldDescriptor>;

/// Function-pointer vtable for one concrete type, used wherever the static
/// type is erased (`Box<dyn Any>`, `Rc<dyn Any>`, skipped beans).
#[derive(Clone, Copy)]
pub struct Harness {
    write_data_fn: WriteDataFn,
    read_data_fn: ReadDataFn,
    read_compatible_fn: Option<ReadCompatibleFn>,
    fields_fn: Option<FieldsFn>,
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("has_fields", &self.fields_fn.is_some())
            .finish_non_exhaustive()
    }
}

fn write_data<T: Serializer>(value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
    match value.downcast_ref::<T>() {
        Some(v) => v.fury_write_data(context),
        None => Err(Error::type_error(format!(
            "harness for {} received a value of another type",
            std::any::type_name::<T>()
        ))),
    }
}

fn read_data<T: Serializer + FuryDefault>(
    context: &mut ReadContext,
) -> Result<Box<dyn Any>, Error> {
    Ok(Box::new(T::fury_read_data(context)?))
}

fn read_compatible<T: StructSerializer + FuryDefault>(
    context: &mut ReadContext,
    schema: Arc<SchemaDef>,
) -> Result<Box<dyn Any>, Error> {
    Ok(Box::new(T::fury_read_compatible(context, schema)?))
}

impl Harness {
    pub fn of_builtin<T: Serializer + FuryDefault>() -> Harness {
        Harness {
            write_data_fn: write_data::<T>,
            read_data_fn: read_data::<T>,
            read_compatible_fn: None,
            fields_fn: None,
        }
    }

    pub fn of_user_type<T: StructSerializer + FuryDefault>() -> Harness {
        let is_struct = T::fury_static_type_id() == TypeId::STRUCT;
        Harness {
            write_data_fn: write_data::<T>,
            read_data_fn: read_data::<T>,
            read_compatible_fn: if is_struct {
                Some(read_compatible::<T>)
            } else {
                None
            },
            fields_fn: if is_struct {
                Some(T::fury_fields_info)
            } else {
                None
            },
        }
    }

    #[inline(always)]
    pub fn write_data(&self, value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
        (self.write_data_fn)(value, context)
    }

    #[inline(always)]
    pub fn read_data(&self, context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
        (self.read_data_fn)(context)
    }

    /// Whether [`Harness::read_compatible`] can rebuild this type from a
    /// foreign schema def.
    pub fn has_field_layout(&self) -> bool {
        self.read_compatible_fn.is_some()
    }

    pub fn read_compatible(
        &self,
        context: &mut ReadContext,
        schema: Arc<SchemaDef>,
    ) -> Result<Box<dyn Any>, Error> {
        match self.read_compatible_fn {
            Some(f) => f(context, schema),
            None => Err(Error::type_error(format!(
                "type {} has no field layout",
                schema.type_name()
            ))),
        }
    }
}

/// How a user type is identified on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Id(u32),
    Name { namespace: String, type_name: String },
}

impl TypeKey {
    pub fn name(namespace: &str, type_name: &str) -> TypeKey {
        TypeKey::Name {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// Binding between a Rust type and its wire identity. Immutable once created.
#[derive(Debug)]
pub struct TypeInfo {
    // Builtin id, or the STRUCT/ENUM/EXT kind of a user type.
    kind: u32,
    user_id: Option<u32>,
    builtin: bool,
    rust_type_id: std::any::TypeId,
    rust_type_name: &'static str,
    namespace: InternedString,
    type_name: InternedString,
    harness: Harness,
    schema: OnceLock<Arc<SchemaDef>>,
}

impl TypeInfo {
    fn builtin<T: Serializer + FuryDefault>() -> TypeInfo {
        TypeInfo {
            kind: T::fury_static_type_id() as u32,
            user_id: None,
            builtin: true,
            rust_type_id: std::any::TypeId::of::<T>(),
            rust_type_name: std::any::type_name::<T>(),
            namespace: InternedString::default(),
            type_name: InternedString::new(std::any::type_name::<T>()),
            harness: Harness::of_builtin::<T>(),
            schema: OnceLock::new(),
        }
    }

    fn user_type<T: StructSerializer + FuryDefault>(key: &TypeKey) -> TypeInfo {
        let (user_id, namespace, type_name) = match key {
            TypeKey::Id(id) => (Some(*id), "", std::any::type_name::<T>()),
            TypeKey::Name {
                namespace,
                type_name,
            } => (None, namespace.as_str(), type_name.as_str()),
        };
        TypeInfo {
            kind: T::fury_static_type_id() as u32,
            user_id,
            builtin: false,
            rust_type_id: std::any::TypeId::of::<T>(),
            rust_type_name: std::any::type_name::<T>(),
            namespace: InternedString::new(namespace),
            type_name: InternedString::new(type_name),
            harness: Harness::of_user_type::<T>(),
            schema: OnceLock::new(),
        }
    }

    /// Wire id of this binding. Struct ids depend on whether compatible mode
    /// is on, since compatible structs are followed by a schema def.
    pub fn wire_type_id(&self, compatible: bool) -> u32 {
        if self.builtin {
            return self.kind;
        }
        let kind = match (self.kind, self.user_id.is_some(), compatible) {
            (STRUCT, true, false) => STRUCT,
            (STRUCT, true, true) => COMPATIBLE_STRUCT,
            (STRUCT, false, false) => NAMED_STRUCT,
            (STRUCT, false, true) => NAMED_COMPATIBLE_STRUCT,
            (ENUM, true, _) => ENUM,
            (ENUM, false, _) => NAMED_ENUM,
            (_, true, _) => EXT,
            (_, false, _) => NAMED_EXT,
        };
        match self.user_id {
            Some(id) => (id << 8) | kind,
            None => kind,
        }
    }

    /// Builtin id or STRUCT/ENUM/EXT.
    pub fn kind(&self) -> u32 {
        self.kind
    }

    pub fn user_id(&self) -> Option<u32> {
        self.user_id
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_registered_by_name(&self) -> bool {
        !self.builtin && self.user_id.is_none()
    }

    pub fn rust_type_id(&self) -> std::any::TypeId {
        self.rust_type_id
    }

    pub fn get_namespace(&self) -> &InternedString {
        &self.namespace
    }

    pub fn get_type_name(&self) -> &InternedString {
        &self.type_name
    }

    /// Name presented to the security checker.
    pub fn qualified_name(&self) -> String {
        if self.user_id.is_some() || self.builtin {
            self.rust_type_name.to_string()
        } else if self.namespace.is_empty() {
            self.type_name.to_string()
        } else {
            format!("{}.{}", self.namespace, self.type_name)
        }
    }

    #[inline(always)]
    pub fn get_harness(&self) -> &Harness {
        &self.harness
    }

    /// Whether the schema def has been built, either eagerly at registration
    /// or on first use.
    pub fn has_schema_def(&self) -> bool {
        self.schema.get().is_some()
    }

    /// Field layout snapshot, built on first use and cached.
    pub fn schema_def(&self) -> Result<Arc<SchemaDef>, Error> {
        let fields_fn = self.harness.fields_fn.ok_or_else(|| {
            Error::type_error(format!("{} is not a struct", self.qualified_name()))
        })?;
        Ok(self
            .schema
            .get_or_init(|| {
                // Id-registered layouts must not depend on Rust module paths.
                let (namespace, type_name): (&str, &str) = if self.is_registered_by_name() {
                    (self.namespace.as_str(), self.type_name.as_str())
                } else {
                    ("", "")
                };
                let def =
                    SchemaDef::new(self.wire_type_id(true), namespace, type_name, fields_fn());
                debug!(
                    "built schema def {:#x} for {} with {} fields",
                    def.content_hash(),
                    self.rust_type_name,
                    def.fields().len()
                );
                Arc::new(def)
            })
            .clone())
    }
}

/// Single-slot identity cache in front of the resolver's maps.
///
/// Repeated values of one type (list elements, a field in a loop) hit the
/// slot instead of taking the registry lock and probing the hash map.
#[derive(Default)]
pub struct TypeInfoCache {
    last: Option<(std::any::TypeId, Arc<TypeInfo>)>,
}

impl TypeInfoCache {
    #[inline(always)]
    pub fn get(&self, rust_type_id: std::any::TypeId) -> Option<&Arc<TypeInfo>> {
        match &self.last {
            Some((id, info)) if *id == rust_type_id => Some(info),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn put(&mut self, type_info: Arc<TypeInfo>) {
        self.last = Some((type_info.rust_type_id, type_info));
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, Error> {
    lock.read()
        .map_err(|_| Error::unknown("type registry lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, Error> {
    lock.write()
        .map_err(|_| Error::unknown("type registry lock poisoned"))
}

/// Maps Rust types to wire identities and enforces the registration policy.
///
/// Built once with the `Fury` instance; explicit registration needs `&mut`,
/// while open-mode auto-registration goes through the internal locks so a
/// shared `Fury` can be used from many threads.
pub struct TypeResolver {
    builtins: HashMap<u32, Arc<TypeInfo>>,
    by_rust_id: RwLock<HashMap<std::any::TypeId, Arc<TypeInfo>>>,
    by_id: RwLock<HashMap<u32, Arc<TypeInfo>>>,
    by_name: RwLock<HashMap<(String, String), Arc<TypeInfo>>>,
    require_registration: bool,
    security_checker: Option<Arc<dyn SecurityChecker>>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        let mut resolver = TypeResolver {
            builtins: HashMap::new(),
            by_rust_id: RwLock::default(),
            by_id: RwLock::default(),
            by_name: RwLock::default(),
            require_registration: true,
            security_checker: None,
        };
        resolver.register_builtin_types();
        resolver
    }
}

impl TypeResolver {
    fn register_builtin<T: Serializer + FuryDefault>(&mut self) {
        let info = Arc::new(TypeInfo::builtin::<T>());
        self.builtins.insert(info.kind, info.clone());
        if let Ok(map) = self.by_rust_id.get_mut() {
            map.insert(info.rust_type_id, info);
        }
    }

    fn register_builtin_types(&mut self) {
        self.register_builtin::<bool>();
        self.register_builtin::<i8>();
        self.register_builtin::<i16>();
        self.register_builtin::<i32>();
        self.register_builtin::<i64>();
        self.register_builtin::<u8>();
        self.register_builtin::<u16>();
        self.register_builtin::<u32>();
        self.register_builtin::<u64>();
        self.register_builtin::<f32>();
        self.register_builtin::<f64>();
        self.register_builtin::<String>();
        self.register_builtin::<InternedString>();
        self.register_builtin::<NaiveDate>();
        self.register_builtin::<NaiveDateTime>();
    }

    pub fn set_require_registration(&mut self, require_registration: bool) {
        self.require_registration = require_registration;
    }

    pub fn set_security_checker(&mut self, checker: Arc<dyn SecurityChecker>) {
        self.security_checker = Some(checker);
    }

    /// Registers `T` under `key`.
    ///
    /// With `create_strategy_now` the struct's schema def is built here
    /// instead of on first use in compatible mode.
    pub fn register<T: StructSerializer + FuryDefault>(
        &mut self,
        key: TypeKey,
        create_strategy_now: bool,
    ) -> Result<(), Error> {
        if let TypeKey::Id(id) = key {
            if id == 0 || id > MAX_USER_TYPE_ID {
                return Err(Error::not_allowed(format!(
                    "type id {id} is outside 1..={MAX_USER_TYPE_ID}"
                )));
            }
        }
        let rust_type_id = std::any::TypeId::of::<T>();
        let by_rust_id = self
            .by_rust_id
            .get_mut()
            .map_err(|_| Error::unknown("type registry lock poisoned"))?;
        if by_rust_id.contains_key(&rust_type_id) {
            return Err(Error::not_allowed(format!(
                "{} is already registered",
                std::any::type_name::<T>()
            )));
        }
        let info = Arc::new(TypeInfo::user_type::<T>(&key));
        match &key {
            TypeKey::Id(id) => {
                let by_id = self
                    .by_id
                    .get_mut()
                    .map_err(|_| Error::unknown("type registry lock poisoned"))?;
                match by_id.entry(*id) {
                    Entry::Occupied(e) => {
                        return Err(Error::not_allowed(format!(
                            "type id {id} is already used by {}",
                            e.get().rust_type_name
                        )))
                    }
                    Entry::Vacant(e) => {
                        e.insert(info.clone());
                    }
                }
            }
            TypeKey::Name {
                namespace,
                type_name,
            } => {
                let by_name = self
                    .by_name
                    .get_mut()
                    .map_err(|_| Error::unknown("type registry lock poisoned"))?;
                match by_name.entry((namespace.clone(), type_name.clone())) {
                    Entry::Occupied(_) => {
                        return Err(Error::not_allowed(format!(
                            "type name {namespace}.{type_name} is already registered"
                        )))
                    }
                    Entry::Vacant(e) => {
                        e.insert(info.clone());
                    }
                }
            }
        }
        if create_strategy_now && info.harness.fields_fn.is_some() {
            info.schema_def()?;
        }
        debug!(
            "registered {} as {:?}, wire id {}",
            info.rust_type_name,
            key,
            info.wire_type_id(false)
        );
        by_rust_id.insert(rust_type_id, info);
        Ok(())
    }

    /// Rejects the type when a security checker is configured and denies it.
    #[inline(always)]
    pub fn check(&self, type_info: &TypeInfo) -> Result<(), Error> {
        if type_info.builtin {
            return Ok(());
        }
        if let Some(checker) = &self.security_checker {
            let name = type_info.qualified_name();
            if !checker.is_allowed(&name) {
                return Err(Error::insecure_type(name));
            }
        }
        Ok(())
    }

    /// Looks up an already known binding by Rust type.
    pub fn get_type_info(&self, rust_type_id: &std::any::TypeId) -> Result<Arc<TypeInfo>, Error> {
        let info = read_lock(&self.by_rust_id)?
            .get(rust_type_id)
            .cloned()
            .ok_or_else(|| Error::unregistered_type(format!("{rust_type_id:?}")))?;
        self.check(&info)?;
        Ok(info)
    }

    /// Binding for a statically known user type.
    ///
    /// In open mode an unknown `T` is registered by its Rust type name.
    pub fn resolve<T: StructSerializer + FuryDefault>(&self) -> Result<Arc<TypeInfo>, Error> {
        let rust_type_id = std::any::TypeId::of::<T>();
        if let Some(info) = read_lock(&self.by_rust_id)?.get(&rust_type_id).cloned() {
            self.check(&info)?;
            return Ok(info);
        }
        if self.require_registration {
            return Err(Error::unregistered_type(std::any::type_name::<T>()));
        }
        let info = self.auto_register::<T>()?;
        self.check(&info)?;
        Ok(info)
    }

    fn auto_register<T: StructSerializer + FuryDefault>(&self) -> Result<Arc<TypeInfo>, Error> {
        let rust_type_id = std::any::TypeId::of::<T>();
        let mut by_rust_id = write_lock(&self.by_rust_id)?;
        if let Some(info) = by_rust_id.get(&rust_type_id) {
            return Ok(info.clone());
        }
        let key = TypeKey::name("", std::any::type_name::<T>());
        let info = Arc::new(TypeInfo::user_type::<T>(&key));
        let mut by_name = write_lock(&self.by_name)?;
        by_name.insert(
            (String::new(), std::any::type_name::<T>().to_string()),
            info.clone(),
        );
        by_rust_id.insert(rust_type_id, info.clone());
        debug!("auto registered {} by name", info.rust_type_name);
        Ok(info)
    }

    /// Binding for a builtin type id such as `STRING` or `INT32`.
    pub fn get_builtin(&self, type_id: u32) -> Option<Arc<TypeInfo>> {
        self.builtins.get(&type_id).cloned()
    }

    /// Binding for a wire id that carries no name.
    pub fn get_by_wire_id(&self, wire_type_id: u32) -> Result<Arc<TypeInfo>, Error> {
        let user_id = wire_type_id >> 8;
        let info = if user_id == 0 {
            self.builtins.get(&wire_type_id).cloned()
        } else {
            read_lock(&self.by_id)?.get(&user_id).cloned()
        };
        let info = info.ok_or_else(|| {
            Error::unregistered_type(format!("no type registered for wire id {wire_type_id}"))
        })?;
        if user_id != 0 && info.wire_type_id(false) & 0xff != base_kind(wire_type_id & 0xff) {
            return Err(Error::type_mismatch(info.wire_type_id(false), wire_type_id));
        }
        self.check(&info)?;
        Ok(info)
    }

    pub fn get_by_name(&self, namespace: &str, type_name: &str) -> Result<Arc<TypeInfo>, Error> {
        let info = read_lock(&self.by_name)?
            .get(&(namespace.to_string(), type_name.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::unregistered_type(if namespace.is_empty() {
                    type_name.to_string()
                } else {
                    format!("{namespace}.{type_name}")
                })
            })?;
        self.check(&info)?;
        Ok(info)
    }
}

// Compatible and consistent struct ids share one binding.
fn base_kind(kind: u32) -> u32 {
    match kind {
        COMPATIBLE_STRUCT => STRUCT,
        NAMED_COMPATIBLE_STRUCT => NAMED_STRUCT,
        other => other,
    }
}
