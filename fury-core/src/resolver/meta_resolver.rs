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
use crate::meta::SchemaDef;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const FULL_DEF: u8 = 0;
const DEF_REF: u8 = 1;
const MAX_PARSED_NUM_SCHEMA_DEFS: usize = 8192;

/// Schema defs carried across calls on both ends of a channel.
///
/// The writer side remembers which hashes it already sent and never sends
/// them again; the reader side remembers what it received. Both ends must
/// keep reusing their cache for the lifetime of the channel, and share it
/// across threads only behind the caller's own synchronization.
#[derive(Default)]
pub struct SchemaCache {
    sent: HashSet<u64>,
    received: HashMap<u64, Arc<SchemaDef>>,
}

impl SchemaCache {
    pub fn new() -> SchemaCache {
        SchemaCache::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn received_count(&self) -> usize {
        self.received.len()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
        self.received.clear();
    }
}

/// Writes each distinct schema def in full once, then by hash.
///
/// Wire: `u8 marker | u64 content_hash`, and for a full definition
/// `varuint32 body_len | body` after the hash.
#[derive(Default)]
pub struct MetaWriterResolver {
    sent: HashSet<u64>,
    sent_in_call: Vec<u64>,
    shared: bool,
}

impl MetaWriterResolver {
    pub fn write(&mut self, writer: &mut Writer, def: &SchemaDef) {
        let hash = def.content_hash();
        if self.sent.contains(&hash) {
            writer.write_u8(DEF_REF);
            writer.write_u64(hash);
            return;
        }
        self.sent.insert(hash);
        self.sent_in_call.push(hash);
        debug!(
            "writing schema def {:#x} ({} fields)",
            hash,
            def.fields().len()
        );
        writer.write_u8(FULL_DEF);
        writer.write_u64(hash);
        writer.write_len_prefixed_bytes(def.body());
    }

    /// Continues from the hashes a long-lived cache already sent.
    pub fn attach(&mut self, cache: &mut SchemaCache) {
        self.sent = std::mem::take(&mut cache.sent);
        self.sent_in_call.clear();
        self.shared = true;
    }

    /// Hands the sent set back to the cache. Definitions written by a call
    /// that failed never reached the peer, so they are forgotten.
    pub fn detach(&mut self, cache: &mut SchemaCache, committed: bool) {
        if !committed {
            for hash in self.sent_in_call.drain(..) {
                self.sent.remove(&hash);
            }
        }
        cache.sent = std::mem::take(&mut self.sent);
        self.sent_in_call.clear();
        self.shared = false;
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn reset(&mut self) {
        self.sent.clear();
        self.sent_in_call.clear();
        self.shared = false;
    }
}

/// Reader-side hash to schema def table.
#[derive(Default)]
pub struct MetaReaderResolver {
    defs: HashMap<u64, Arc<SchemaDef>>,
    shared: bool,
}

impl MetaReaderResolver {
    pub fn read(&mut self, reader: &mut Reader) -> Result<Arc<SchemaDef>, Error> {
        let marker = reader.read_u8()?;
        let hash = reader.read_u64()?;
        match marker {
            DEF_REF => self.defs.get(&hash).cloned().ok_or_else(|| {
                Error::protocol_error(format!(
                    "schema def {hash:#x} referenced before its definition"
                ))
            }),
            FULL_DEF => {
                let body = reader.read_len_prefixed_bytes()?;
                if let Some(def) = self.defs.get(&hash) {
                    if self.shared {
                        return Err(Error::protocol_error(format!(
                            "schema def {hash:#x} was sent again over a shared schema cache"
                        )));
                    }
                    return Ok(def.clone());
                }
                if self.defs.len() >= MAX_PARSED_NUM_SCHEMA_DEFS {
                    return Err(Error::protocol_error(format!(
                        "more than {MAX_PARSED_NUM_SCHEMA_DEFS} schema defs in one session"
                    )));
                }
                let def = Arc::new(SchemaDef::from_body(hash, body)?);
                debug!(
                    "accepted schema def {:#x} for {:?} ({} fields)",
                    hash,
                    def.type_name(),
                    def.fields().len()
                );
                self.defs.insert(hash, def.clone());
                Ok(def)
            }
            other => Err(Error::protocol_error(format!(
                "unknown schema def marker {other}"
            ))),
        }
    }

    pub fn attach(&mut self, cache: &mut SchemaCache) {
        self.defs = std::mem::take(&mut cache.received);
        self.shared = true;
    }

    pub fn detach(&mut self, cache: &mut SchemaCache) {
        cache.received = std::mem::take(&mut self.defs);
        self.shared = false;
    }

    pub fn reset(&mut self) {
        self.defs.clear();
        self.shared = false;
    }
}
