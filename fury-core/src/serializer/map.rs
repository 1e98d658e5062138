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

//! Map strategies. Wire: `varuint32 len`, then each entry as key followed
//! by value, both encoded with the element rules of `collection`.

use crate::error::Error;
use crate::meta::FieldType;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_element, read_len, write_element, write_len};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::{TypeId, MAP};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

fn write_map<'a, K, V, I>(iter: I, context: &mut WriteContext) -> Result<(), Error>
where
    K: Serializer + 'a,
    V: Serializer + 'a,
    I: ExactSizeIterator<Item = (&'a K, &'a V)>,
{
    context.inc_depth()?;
    write_len(iter.len(), context)?;
    for (key, value) in iter {
        write_element(key, context)?;
        write_element(value, context)?;
    }
    context.dec_depth();
    Ok(())
}

fn read_map<M, K, V>(context: &mut ReadContext) -> Result<M, Error>
where
    K: Serializer + FuryDefault,
    V: Serializer + FuryDefault,
    M: FromIterator<(K, V)>,
{
    context.inc_depth()?;
    let len = read_len(context)?;
    let map = (0..len)
        .map(|_| {
            let key = read_element::<K>(context)?;
            let value = read_element::<V>(context)?;
            Ok((key, value))
        })
        .collect::<Result<M, Error>>()?;
    context.dec_depth();
    Ok(map)
}

fn map_field_type<K: Serializer, V: Serializer>() -> FieldType {
    FieldType::new(MAP, false, vec![K::fury_field_type(), V::fury_field_type()])
}

impl<K, V> Serializer for HashMap<K, V>
where
    K: Serializer + FuryDefault + Eq + Hash,
    V: Serializer + FuryDefault,
{
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_map(self.iter(), context)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_map(context)
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::MAP
    }

    fn fury_field_type() -> FieldType {
        map_field_type::<K, V>()
    }
}

impl<K, V> FuryDefault for HashMap<K, V> {
    fn fury_default() -> Self {
        HashMap::new()
    }
}

impl<K, V> Serializer for BTreeMap<K, V>
where
    K: Serializer + FuryDefault + Ord,
    V: Serializer + FuryDefault,
{
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_map(self.iter(), context)
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_map(context)
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::MAP
    }

    fn fury_field_type() -> FieldType {
        map_field_type::<K, V>()
    }
}

impl<K, V> FuryDefault for BTreeMap<K, V> {
    fn fury_default() -> Self {
        BTreeMap::new()
    }
}
