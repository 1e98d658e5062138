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

use fury_core::error::Error;
use fury_core::fury::Fury;
use fury_core::resolver::meta_resolver::SchemaCache;
use fury_core::resolver::type_resolver::TypeKey;
use fury_core::types::Mode;
use fury_derive::FuryObject;
use std::collections::HashMap;
use std::rc::Rc;

mod v1 {
    use super::*;

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Address {
        pub city: String,
        pub zip: i32,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Person {
        pub id: i32,
        pub name: String,
        pub address: Address,
        pub tags: Vec<String>,
        pub scores: HashMap<String, i64>,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Counter {
        pub id: String,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Optional {
        pub count: Option<i32>,
        pub label: Option<String>,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Blob {
        pub name: String,
        pub data: Vec<u8>,
        pub checksum: [u8; 4],
        pub size: i64,
    }

    #[derive(FuryObject, Debug)]
    pub struct Doc {
        pub draft: Rc<String>,
        pub title: Rc<String>,
        pub cover: Rc<Address>,
        pub home: Rc<Address>,
    }
}

mod v2 {
    use super::*;

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Person {
        pub name: String,
        pub nickname: Option<String>,
        pub age: i64,
        pub id: i32,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Counter {
        pub id: i32,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Optional {
        pub count: i32,
        pub label: String,
    }

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Blob {
        pub name: String,
        pub size: i64,
    }

    #[derive(FuryObject, Debug)]
    pub struct Doc {
        pub title: Rc<String>,
        pub home: Rc<v1::Address>,
    }
}

fn compatible() -> Fury {
    Fury::default().mode(Mode::Compatible)
}

fn sample_v1() -> v1::Person {
    v1::Person {
        id: 42,
        name: "Ada".to_string(),
        address: v1::Address {
            city: "London".to_string(),
            zip: 1815,
        },
        tags: vec!["math".to_string(), "engines".to_string()],
        scores: HashMap::from([("notes".to_string(), 7)]),
    }
}

fn v1_writer() -> Fury {
    let mut fury = compatible();
    fury.register::<v1::Address>(2).unwrap();
    fury.register::<v1::Person>(1).unwrap();
    fury
}

#[test]
fn test_same_layout_round_trip() {
    let fury = v1_writer();
    let person = sample_v1();
    let bytes = fury.serialize(&person).unwrap();
    assert_eq!(fury.deserialize::<v1::Person>(&bytes).unwrap(), person);
}

#[test]
fn test_wide_to_narrow_skips_unknown_fields() {
    let bytes = v1_writer().serialize(&sample_v1()).unwrap();

    // The reader never registered Address; its value is skipped through the
    // schema def carried in the stream.
    let mut reader = compatible();
    reader.register::<v2::Person>(1).unwrap();
    let person: v2::Person = reader.deserialize(&bytes).unwrap();
    assert_eq!(
        person,
        v2::Person {
            name: "Ada".to_string(),
            nickname: None,
            age: 0,
            id: 42,
        }
    );
}

#[test]
fn test_narrow_to_wide_fills_defaults() {
    let mut writer = compatible();
    writer.register::<v2::Person>(1).unwrap();
    let bytes = writer
        .serialize(&v2::Person {
            name: "Grace".to_string(),
            nickname: Some("amazing".to_string()),
            age: 85,
            id: 7,
        })
        .unwrap();

    let person: v1::Person = v1_writer().deserialize(&bytes).unwrap();
    assert_eq!(person.id, 7);
    assert_eq!(person.name, "Grace");
    assert_eq!(person.address, v1::Address { city: String::new(), zip: 0 });
    assert!(person.tags.is_empty());
    assert!(person.scores.is_empty());
}

#[test]
fn test_field_type_conflict() {
    let mut writer = compatible();
    writer.register::<v1::Counter>(3).unwrap();
    let bytes = writer
        .serialize(&v1::Counter {
            id: "seven".to_string(),
        })
        .unwrap();

    let mut reader = compatible();
    reader.register::<v2::Counter>(3).unwrap();
    assert!(matches!(
        reader.deserialize::<v2::Counter>(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
}

#[test]
fn test_nullability_conflict() {
    let mut writer = compatible();
    writer.register::<v1::Optional>(4).unwrap();
    let mut reader = compatible();
    reader.register::<v2::Optional>(4).unwrap();

    // Option<i32> carries a flag byte that a plain i32 field does not.
    let bytes = writer
        .serialize(&v1::Optional {
            count: Some(1),
            label: Some("x".to_string()),
        })
        .unwrap();
    assert!(matches!(
        reader.deserialize::<v2::Optional>(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
}

#[test]
fn test_by_name_registration() {
    let mut writer = compatible();
    writer.register_by_name::<v1::Address>("demo", "Address").unwrap();
    writer.register_by_name::<v1::Person>("demo", "Person").unwrap();
    let bytes = writer.serialize(&sample_v1()).unwrap();

    let mut reader = compatible();
    reader.register_by_name::<v2::Person>("demo", "Person").unwrap();
    let person: v2::Person = reader.deserialize(&bytes).unwrap();
    assert_eq!(person.id, 42);
    assert_eq!(person.name, "Ada");

    let mut stranger = compatible();
    stranger.register_by_name::<v2::Person>("other", "Person").unwrap();
    assert!(matches!(
        stranger.deserialize::<v2::Person>(&bytes),
        Err(Error::UnregisteredType(_))
    ));
}

#[test]
fn test_list_of_evolved_structs() {
    let fury = v1_writer();
    let people: Vec<v1::Person> = (0..3)
        .map(|i| v1::Person {
            id: i,
            ..sample_v1()
        })
        .collect();
    let bytes = fury.serialize(&people).unwrap();

    let mut reader = compatible();
    reader.register::<v2::Person>(1).unwrap();
    let back: Vec<v2::Person> = reader.deserialize(&bytes).unwrap();
    assert_eq!(back.iter().map(|p| p.id).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_schema_def_written_once_per_call() {
    let fury = v1_writer();
    let one = fury.serialize(&vec![sample_v1()]).unwrap();
    let two = fury.serialize(&vec![sample_v1(), sample_v1()]).unwrap();
    let three = fury.serialize(&vec![sample_v1(), sample_v1(), sample_v1()]).unwrap();
    // Every extra element adds the same amount: its body plus two def refs.
    assert_eq!(two.len() - one.len(), three.len() - two.len());
    assert!(two.len() - one.len() < one.len());
}

#[test]
fn test_schema_cache_across_calls() {
    let fury = v1_writer();
    let mut write_cache = SchemaCache::new();
    let first = fury
        .serialize_with_schema_cache(&sample_v1(), &mut write_cache)
        .unwrap();
    let second = fury
        .serialize_with_schema_cache(&sample_v1(), &mut write_cache)
        .unwrap();
    assert!(second.len() < first.len());
    assert_eq!(write_cache.sent_count(), 2);

    let mut read_cache = SchemaCache::new();
    let a: v1::Person = fury
        .deserialize_with_schema_cache(&first, &mut read_cache)
        .unwrap();
    let b: v1::Person = fury
        .deserialize_with_schema_cache(&second, &mut read_cache)
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(read_cache.received_count(), 2);

    // Without the cache the second stream references unknown defs.
    assert!(matches!(
        fury.deserialize::<v1::Person>(&second),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_mode_mismatch_is_rejected() {
    let bytes = v1_writer().serialize(&sample_v1()).unwrap();
    let mut consistent = Fury::default();
    consistent.register::<v1::Address>(2).unwrap();
    consistent.register::<v1::Person>(1).unwrap();
    assert!(matches!(
        consistent.deserialize::<v1::Person>(&bytes),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_back_reference_into_skipped_field() {
    let text = Rc::new("shared text".to_string());
    let address = Rc::new(v1::Address {
        city: "Paris".to_string(),
        zip: 75001,
    });
    let doc = v1::Doc {
        draft: text.clone(),
        title: text,
        cover: address.clone(),
        home: address,
    };
    let mut writer = compatible();
    writer.register::<v1::Address>(2).unwrap();
    writer.register::<v1::Doc>(5).unwrap();
    let bytes = writer.serialize(&doc).unwrap();

    // The reader has no `draft` or `cover`; both are decoded while skipped so
    // the kept fields' back-references resolve.
    let mut reader = compatible();
    reader.register::<v1::Address>(2).unwrap();
    reader.register::<v2::Doc>(5).unwrap();
    let back: v2::Doc = reader.deserialize(&bytes).unwrap();
    assert_eq!(back.title.as_str(), "shared text");
    assert_eq!(
        *back.home,
        v1::Address {
            city: "Paris".to_string(),
            zip: 75001
        }
    );
}

#[test]
fn test_back_reference_into_unknown_skipped_type() {
    let address = Rc::new(v1::Address {
        city: "Oslo".to_string(),
        zip: 150,
    });
    let doc = v1::Doc {
        draft: Rc::new("a".to_string()),
        title: Rc::new("b".to_string()),
        cover: address.clone(),
        home: address,
    };
    let mut writer = compatible();
    writer.register::<v1::Address>(2).unwrap();
    writer.register::<v1::Doc>(5).unwrap();
    let bytes = writer.serialize(&doc).unwrap();

    // Address is registered under another id here, so the skipped `cover`
    // cannot be decoded and `home` has nothing to point at.
    let mut reader = compatible();
    reader.register::<v1::Address>(7).unwrap();
    reader.register::<v2::Doc>(5).unwrap();
    assert!(matches!(
        reader.deserialize::<v2::Doc>(&bytes),
        Err(Error::InvalidRef(_))
    ));
}

#[test]
fn test_register_with_eager_schema() {
    let mut writer = compatible();
    writer
        .register_with::<v1::Address>(TypeKey::Id(2), true)
        .unwrap();
    writer
        .register_with::<v1::Person>(TypeKey::name("demo", "Person"), true)
        .unwrap();
    let lazy = {
        let mut fury = compatible();
        fury.register_with::<v1::Address>(TypeKey::Id(2), false)
            .unwrap();
        fury
    };
    let resolver = writer.get_type_resolver();
    for rust_type_id in [
        std::any::TypeId::of::<v1::Address>(),
        std::any::TypeId::of::<v1::Person>(),
    ] {
        assert!(resolver.get_type_info(&rust_type_id).unwrap().has_schema_def());
    }
    assert!(!lazy
        .get_type_resolver()
        .get_type_info(&std::any::TypeId::of::<v1::Address>())
        .unwrap()
        .has_schema_def());

    let person = sample_v1();
    let bytes = writer.serialize(&person).unwrap();
    assert_eq!(writer.deserialize::<v1::Person>(&bytes).unwrap(), person);

    let mut reader = compatible();
    reader
        .register_with::<v2::Person>(TypeKey::name("demo", "Person"), true)
        .unwrap();
    let narrow: v2::Person = reader.deserialize(&bytes).unwrap();
    assert_eq!(narrow.id, 42);
    assert_eq!(narrow.name, "Ada");

    assert!(matches!(
        writer.register_with::<v1::Counter>(TypeKey::Id(2), true),
        Err(Error::NotAllowed(_))
    ));
    assert!(matches!(
        writer.register_with::<v1::Counter>(TypeKey::name("demo", "Person"), true),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_skip_byte_payload() {
    let blob = v1::Blob {
        name: "firmware".to_string(),
        data: vec![0x5a; 4096],
        checksum: [1, 2, 3, 4],
        size: 4096,
    };
    let mut writer = compatible();
    writer.register::<v1::Blob>(6).unwrap();
    let bytes = writer.serialize(&blob).unwrap();
    assert_eq!(writer.deserialize::<v1::Blob>(&bytes).unwrap(), blob);

    let mut reader = compatible();
    reader.register::<v2::Blob>(6).unwrap();
    assert_eq!(
        reader.deserialize::<v2::Blob>(&bytes).unwrap(),
        v2::Blob {
            name: "firmware".to_string(),
            size: 4096
        }
    );
}
