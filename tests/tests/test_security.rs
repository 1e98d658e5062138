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
use fury_core::resolver::security::{AllowListChecker, CheckLevel, SecurityChecker};
use fury_derive::FuryObject;
use std::sync::Arc;

#[derive(FuryObject, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(FuryObject, Debug, PartialEq)]
struct Secret {
    token: String,
}

fn checked_fury(checker: &Arc<AllowListChecker>) -> Fury {
    let shared: Arc<dyn SecurityChecker> = checker.clone();
    let mut fury = Fury::default().security_checker(shared);
    fury.register_by_name::<Point>("demo", "Point").unwrap();
    fury.register::<Secret>(9).unwrap();
    fury
}

#[test]
fn test_closed_registration() {
    let fury = Fury::default();
    assert!(matches!(
        fury.serialize(&Point { x: 1, y: 2 }),
        Err(Error::UnregisteredType(_))
    ));
    // Builtin types need no registration.
    assert!(fury.serialize(&vec![1i32, 2]).is_ok());
}

#[test]
fn test_strict_allow_list() {
    let checker = Arc::new(AllowListChecker::new(CheckLevel::Strict));
    checker.allow("demo.*");
    let fury = checked_fury(&checker);

    let bytes = fury.serialize(&Point { x: 1, y: 2 }).unwrap();
    assert_eq!(
        fury.deserialize::<Point>(&bytes).unwrap(),
        Point { x: 1, y: 2 }
    );
    assert!(matches!(
        fury.serialize(&Secret {
            token: "hunter2".to_string()
        }),
        Err(Error::InsecureType(_))
    ));
}

#[test]
fn test_revoked_type_is_blocked_both_ways() {
    let checker = Arc::new(AllowListChecker::new(CheckLevel::Strict));
    checker.allow("demo.*");
    let fury = checked_fury(&checker);
    let bytes = fury.serialize(&Point { x: 3, y: 4 }).unwrap();

    checker.revoke("demo.*");
    assert!(matches!(
        fury.serialize(&Point { x: 3, y: 4 }),
        Err(Error::InsecureType(_))
    ));
    assert!(matches!(
        fury.deserialize::<Point>(&bytes),
        Err(Error::InsecureType(_))
    ));

    checker.allow("demo.Point");
    assert!(fury.deserialize::<Point>(&bytes).is_ok());
}

#[test]
fn test_disallow_inside_containers() {
    let checker = Arc::new(AllowListChecker::new(CheckLevel::Warn));
    let fury = checked_fury(&checker);
    let points = vec![Point { x: 0, y: 0 }, Point { x: 1, y: 1 }];
    let bytes = fury.serialize(&points).unwrap();

    checker.disallow("demo.Point");
    assert!(matches!(
        fury.deserialize::<Vec<Point>>(&bytes),
        Err(Error::InsecureType(_))
    ));
}

#[test]
fn test_id_registered_types_are_checked_by_rust_name() {
    let checker = Arc::new(AllowListChecker::new(CheckLevel::Strict));
    checker.allow(std::any::type_name::<Secret>());
    let fury = checked_fury(&checker);
    let secret = Secret {
        token: "t".to_string(),
    };
    let bytes = fury.serialize(&secret).unwrap();
    assert_eq!(fury.deserialize::<Secret>(&bytes).unwrap(), secret);
}
