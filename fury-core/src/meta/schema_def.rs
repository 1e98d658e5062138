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
use crate::meta::hash::stream_hash;
use crate::types::{is_named_kind, is_primitive_type_id};

const NULLABLE_FLAG: u8 = 0b10;
const TRACK_REF_FLAG: u8 = 0b01;
// Nesting bound for generic parameters decoded from untrusted bytes.
const MAX_GENERICS_DEPTH: usize = 32;

/// Declared type of a field: a type tag plus generic parameters.
///
/// User types are described by their kind only (`STRUCT`, `ENUM`, `EXT`);
/// the concrete type travels as inline type info next to each value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub type_id: u32,
    pub nullable: bool,
    pub track_ref: bool,
    pub generics: Vec<FieldType>,
}

impl FieldType {
    pub fn new(type_id: u32, nullable: bool, generics: Vec<FieldType>) -> Self {
        FieldType {
            type_id,
            nullable,
            track_ref: false,
            generics,
        }
    }

    pub fn leaf(type_id: u32) -> Self {
        FieldType::new(type_id, false, Vec::new())
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn tracked(mut self) -> Self {
        self.track_ref = true;
        self
    }

    /// Whether values of this type are preceded by a ref flag byte.
    #[inline(always)]
    pub fn has_ref_flag(&self) -> bool {
        self.nullable || self.track_ref || !is_primitive_type_id(self.type_id)
    }

    /// Two field types can be decoded into each other when the tags match,
    /// the flag byte presence matches and every generic is compatible.
    pub fn is_compatible_with(&self, other: &FieldType) -> bool {
        self.type_id == other.type_id
            && self.has_ref_flag() == other.has_ref_flag()
            && self.generics.len() == other.generics.len()
            && self
                .generics
                .iter()
                .zip(other.generics.iter())
                .all(|(a, b)| a.is_compatible_with(b))
    }

    fn write_tag(&self, writer: &mut Writer) {
        writer.write_varuint32(self.type_id);
        let mut flags = 0u8;
        if self.nullable {
            flags |= NULLABLE_FLAG;
        }
        if self.track_ref {
            flags |= TRACK_REF_FLAG;
        }
        writer.write_u8(flags);
        writer.write_varuint32(self.generics.len() as u32);
        for generic in &self.generics {
            generic.write_tag(writer);
        }
    }

    fn read_tag(reader: &mut Reader, depth: usize) -> Result<FieldType, Error> {
        if depth > MAX_GENERICS_DEPTH {
            return Err(Error::protocol_error("field type generics nested too deep"));
        }
        let type_id = reader.read_varuint32()?;
        let flags = reader.read_u8()?;
        let count = reader.read_varuint32()? as usize;
        let mut generics = Vec::with_capacity(count.min(4));
        for _ in 0..count {
            generics.push(FieldType::read_tag(reader, depth + 1)?);
        }
        Ok(FieldType {
            type_id,
            nullable: flags & NULLABLE_FLAG != 0,
            track_ref: flags & TRACK_REF_FLAG != 0,
            generics,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            field_type,
        }
    }
}

/// Structural snapshot of a bean: its identity on the wire and its ordered
/// field descriptors.
///
/// The body encoding is
/// `varuint32 type_id | namespace | type_name | varuint32 field_count |
/// (name | type tag)*`, where names are length prefixed UTF-8. The content
/// hash is computed over the body, so equal hashes imply identical bytes.
#[derive(Debug)]
pub struct SchemaDef {
    type_id: u32,
    namespace: String,
    type_name: String,
    fields: Vec<FieldDescriptor>,
    content_hash: u64,
    body: Vec<u8>,
}

impl SchemaDef {
    pub fn new(
        type_id: u32,
        namespace: &str,
        type_name: &str,
        fields: Vec<FieldDescriptor>,
    ) -> SchemaDef {
        let mut writer = Writer::default();
        writer.write_varuint32(type_id);
        writer.write_utf8_string(namespace);
        writer.write_utf8_string(type_name);
        writer.write_varuint32(fields.len() as u32);
        for field in &fields {
            writer.write_utf8_string(&field.name);
            field.field_type.write_tag(&mut writer);
        }
        let body = writer.into_bytes();
        SchemaDef {
            type_id,
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            fields,
            content_hash: stream_hash(&body),
            body,
        }
    }

    /// Decodes a body received from the wire, verifying it against `content_hash`.
    pub fn from_body(content_hash: u64, body: &[u8]) -> Result<SchemaDef, Error> {
        let actual = stream_hash(body);
        if actual != content_hash {
            return Err(Error::protocol_error(format!(
                "schema def hash mismatch: header {content_hash:#x}, body {actual:#x}"
            )));
        }
        let mut reader = Reader::new(body);
        let type_id = reader.read_varuint32()?;
        let namespace = reader.read_utf8_string()?;
        let type_name = reader.read_utf8_string()?;
        let field_count = reader.read_varuint32()? as usize;
        let mut fields = Vec::with_capacity(field_count.min(64));
        for _ in 0..field_count {
            let name = reader.read_utf8_string()?;
            let field_type = FieldType::read_tag(&mut reader, 0)?;
            fields.push(FieldDescriptor { name, field_type });
        }
        if reader.remaining() != 0 {
            return Err(Error::protocol_error("trailing bytes in schema def body"));
        }
        Ok(SchemaDef {
            type_id,
            namespace,
            type_name,
            fields,
            content_hash,
            body: body.to_vec(),
        })
    }

    #[inline(always)]
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn is_registered_by_name(&self) -> bool {
        is_named_kind(self.type_id & 0xff)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn body(&self) -> &[u8] {
        &self.body
    }
}
