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
use fury_core::types::Mode;
use fury_derive::FuryObject;

#[derive(FuryObject, Debug, PartialEq)]
struct Item {
    name: String,
    qty: i32,
}

fn nested(depth: usize) -> Vec<Vec<Vec<Vec<i32>>>> {
    vec![vec![vec![vec![depth as i32]]]]
}

#[test]
fn test_depth_limit_on_write() {
    let fury = Fury::default().max_depth(3);
    assert!(matches!(
        fury.serialize(&nested(4)),
        Err(Error::DepthExceed(_))
    ));
    assert!(fury.serialize(&vec![vec![vec![1i32]]]).is_ok());
}

#[test]
fn test_depth_limit_on_read() {
    let bytes = Fury::default().serialize(&nested(4)).unwrap();
    let shallow = Fury::default().max_depth(3);
    assert!(matches!(
        shallow.deserialize::<Vec<Vec<Vec<Vec<i32>>>>>(&bytes),
        Err(Error::DepthExceed(_))
    ));
}

#[test]
fn test_context_reuse() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut fury = Fury::default();
    fury.register::<Item>(1).unwrap();

    let mut write_context = fury.new_write_context();
    let first = fury
        .serialize_with_context(
            &Item {
                name: "bolt".to_string(),
                qty: 10,
            },
            &mut write_context,
        )
        .unwrap();
    let second = fury
        .serialize_with_context(
            &Item {
                name: "nut".to_string(),
                qty: 20,
            },
            &mut write_context,
        )
        .unwrap();
    // Reused contexts produce the same bytes as fresh ones.
    assert_eq!(
        second,
        fury.serialize(&Item {
            name: "nut".to_string(),
            qty: 20
        })
        .unwrap()
    );

    let mut read_context = fury.new_read_context();
    let a: Item = fury
        .deserialize_with_context(&first, &mut read_context)
        .unwrap();
    let b: Item = fury
        .deserialize_with_context(&second, &mut read_context)
        .unwrap();
    assert_eq!(a.name, "bolt");
    assert_eq!(b.qty, 20);
}

#[test]
fn test_context_is_reset_after_failure() {
    let fury = Fury::default().max_depth(3);
    let mut write_context = fury.new_write_context();
    assert!(fury
        .serialize_with_context(&nested(4), &mut write_context)
        .is_err());
    let bytes = fury
        .serialize_with_context(&"ok".to_string(), &mut write_context)
        .unwrap();
    assert_eq!(fury.deserialize::<String>(&bytes).unwrap(), "ok");
}

#[test]
fn test_dirty_context_is_rejected() {
    let fury = Fury::default();
    let mut write_context = fury.new_write_context();
    write_context.inc_depth().unwrap();
    assert!(matches!(
        fury.serialize_with_context(&1i32, &mut write_context),
        Err(Error::NotAllowed(_))
    ));

    let bytes = fury.serialize(&1i32).unwrap();
    let mut read_context = fury.new_read_context();
    read_context.inc_depth().unwrap();
    assert!(matches!(
        fury.deserialize_with_context::<i32>(&bytes, &mut read_context),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_context_of_another_instance_is_rejected() {
    let fury = Fury::default();
    let other = Fury::default();
    let mut write_context = other.new_write_context();
    assert!(matches!(
        fury.serialize_with_context(&1i32, &mut write_context),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_bad_magic() {
    let fury = Fury::default();
    let mut bytes = fury.serialize(&"payload".to_string()).unwrap();
    bytes[0] ^= 0xff;
    assert!(matches!(
        fury.deserialize::<String>(&bytes),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_unsupported_version() {
    let fury = Fury::default();
    let mut bytes = fury.serialize(&1i64).unwrap();
    bytes[2] = 99;
    assert!(matches!(
        fury.deserialize::<i64>(&bytes),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_truncated_input() {
    let fury = Fury::default();
    let bytes = fury.serialize(&"payload".to_string()).unwrap();
    assert!(matches!(
        fury.deserialize::<String>(&bytes[..bytes.len() - 1]),
        Err(Error::BufferOutOfBound(..))
    ));
    assert!(matches!(
        fury.deserialize::<String>(&bytes[..2]),
        Err(Error::BufferOutOfBound(..))
    ));
}

#[test]
fn test_trailing_bytes() {
    let fury = Fury::default();
    let mut bytes = fury.serialize(&"payload".to_string()).unwrap();
    bytes.push(0);
    assert!(matches!(
        fury.deserialize::<String>(&bytes),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_mode_mismatch() {
    let consistent = Fury::default();
    let compatible = Fury::default().mode(Mode::Compatible);
    let bytes = consistent.serialize(&vec![1i32]).unwrap();
    assert!(matches!(
        compatible.deserialize::<Vec<i32>>(&bytes),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_reader_follows_stream_number_encoding() {
    let writer = Fury::default().compress_number(false);
    let reader = Fury::default();
    let bytes = writer.serialize(&vec![1i64 << 40, -3]).unwrap();
    assert_eq!(
        reader.deserialize::<Vec<i64>>(&bytes).unwrap(),
        vec![1i64 << 40, -3]
    );
}
