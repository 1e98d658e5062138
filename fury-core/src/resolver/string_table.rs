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

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::meta::stream_hash;

const BACK_REF_FLAG: u32 = 1;

/// A string deduplicated within a stream by its 64-bit hash.
///
/// Equality and hashing use the stream hash only; a collision between two
/// different strings is an accepted risk of the encoding.
#[derive(Clone)]
pub struct InternedString {
    value: Arc<str>,
    hash: u64,
}

impl InternedString {
    pub fn new(s: &str) -> InternedString {
        InternedString {
            value: Arc::from(s),
            hash: stream_hash(s.as_bytes()),
        }
    }

    #[inline(always)]
    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Default for InternedString {
    fn default() -> Self {
        InternedString::new("")
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for InternedString {}

impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl Deref for InternedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{:x}", &*self.value, self.hash)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for InternedString {
    fn from(s: &str) -> Self {
        InternedString::new(s)
    }
}

impl From<String> for InternedString {
    fn from(s: String) -> Self {
        InternedString::new(&s)
    }
}

/// Interning cache so repeated names are hashed once per table.
#[derive(Default)]
pub struct StringTable {
    strings: HashMap<Box<str>, InternedString>,
}

impl StringTable {
    pub fn get_or_create(&mut self, s: &str) -> InternedString {
        if let Some(interned) = self.strings.get(s) {
            return interned.clone();
        }
        let interned = InternedString::new(s);
        self.strings.insert(Box::from(s), interned.clone());
        interned
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn clear(&mut self) {
        self.strings.clear();
    }
}

/// Write side of the per-stream string dedup.
///
/// The first occurrence of a hash is written as
/// `varuint32(len << 1) | u64 hash | utf8 bytes`; later occurrences as
/// `varuint32(1) | u64 hash`.
#[derive(Default)]
pub struct StringTableWriter {
    written: HashSet<u64>,
}

impl StringTableWriter {
    pub fn write(&mut self, writer: &mut Writer, s: &InternedString) -> Result<(), Error> {
        if self.written.contains(&s.hash) {
            writer.write_varuint32(BACK_REF_FLAG);
            writer.write_u64(s.hash);
            return Ok(());
        }
        writer.write_varuint32(definition_header(s.value.len())?);
        writer.write_u64(s.hash);
        writer.write_bytes(s.value.as_bytes());
        self.written.insert(s.hash);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.written.clear();
    }
}

/// Length shifted past the back-ref flag; must fit in 31 bits.
fn definition_header(len: usize) -> Result<u32, Error> {
    u32::try_from(len)
        .ok()
        .filter(|len| *len <= u32::MAX >> 1)
        .map(|len| len << 1)
        .ok_or_else(|| {
            Error::encode_error(format!("interned string of {len} bytes is too long"))
        })
}

/// Read side of the per-stream string dedup: an index from hash to string.
#[derive(Default)]
pub struct StringTableReader {
    strings: HashMap<u64, InternedString>,
}

impl StringTableReader {
    pub fn read(&mut self, reader: &mut Reader) -> Result<InternedString, Error> {
        let header = reader.read_varuint32()?;
        let hash = reader.read_u64()?;
        if hash == 0 {
            return Err(Error::protocol_error("interned string with zero hash"));
        }
        if header & BACK_REF_FLAG != 0 {
            return self.strings.get(&hash).cloned().ok_or_else(|| {
                Error::protocol_error(format!(
                    "interned string {hash:#x} referenced before its definition"
                ))
            });
        }
        let bytes = reader.read_bytes((header >> 1) as usize)?;
        if stream_hash(bytes) != hash {
            return Err(Error::protocol_error(format!(
                "interned string bytes do not match hash {hash:#x}"
            )));
        }
        let s = std::str::from_utf8(bytes)
            .map_err(|e| Error::invalid_data(format!("invalid utf8 in interned string: {e}")))?;
        match self.strings.entry(hash) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                let interned = InternedString {
                    value: Arc::from(s),
                    hash,
                };
                Ok(e.insert(interned).clone())
            }
        }
    }

    pub fn reset(&mut self) {
        self.strings.clear();
    }
}
