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

use fury_core::fury::Fury;
use fury_core::resolver::string_table::InternedString;
use fury_core::types::Mode;
use fury_derive::FuryObject;
use std::collections::HashMap;

#[derive(FuryObject, Debug, PartialEq)]
struct Event {
    kind: InternedString,
    source: InternedString,
    value: i64,
}

#[test]
fn test_repeated_strings_are_written_once() {
    let fury = Fury::default();
    let interned: Vec<InternedString> = vec![InternedString::new("us-east-1/availability"); 1000];
    let plain: Vec<String> = vec!["us-east-1/availability".to_string(); 1000];

    let interned_bytes = fury.serialize(&interned).unwrap();
    let plain_bytes = fury.serialize(&plain).unwrap();
    assert!(interned_bytes.len() * 4 < plain_bytes.len());

    let back: Vec<InternedString> = fury.deserialize(&interned_bytes).unwrap();
    assert_eq!(back.len(), 1000);
    assert!(back.iter().all(|s| s.as_str() == "us-east-1/availability"));
}

#[test]
fn test_interned_fields() {
    let mut fury = Fury::default().mode(Mode::Compatible);
    fury.register::<Event>(1).unwrap();
    let events: Vec<Event> = (0..100)
        .map(|i| Event {
            kind: InternedString::new(if i % 2 == 0 { "click" } else { "scroll" }),
            source: InternedString::new("web"),
            value: i,
        })
        .collect();
    let bytes = fury.serialize(&events).unwrap();
    let back: Vec<Event> = fury.deserialize(&bytes).unwrap();
    assert_eq!(back, events);
    assert_eq!(back[3].kind.as_str(), "scroll");
}

#[test]
fn test_interned_map_keys() {
    let fury = Fury::default();
    let counts: HashMap<InternedString, i32> = ["alpha", "beta", "gamma"]
        .iter()
        .enumerate()
        .map(|(i, k)| (InternedString::from(*k), i as i32))
        .collect();
    let bytes = fury.serialize(&counts).unwrap();
    let back: HashMap<InternedString, i32> = fury.deserialize(&bytes).unwrap();
    assert_eq!(back, counts);
    assert_eq!(back[&InternedString::new("gamma")], 2);
}

#[test]
fn test_table_is_per_call() {
    let fury = Fury::default();
    let value = vec![InternedString::new("only once per stream")];
    let first = fury.serialize(&value).unwrap();
    let second = fury.serialize(&value).unwrap();
    assert_eq!(first, second);
}
