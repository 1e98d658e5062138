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
use fury_core::types::Mode;
use fury_derive::FuryObject;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[derive(FuryObject, Debug, PartialEq, Clone)]
struct Order {
    id: i64,
    lines: Vec<String>,
    totals: HashMap<String, f64>,
}

#[derive(FuryObject, Debug, PartialEq)]
struct Receipt {
    order: Order,
    paid: bool,
}

fn order(id: i64) -> Order {
    Order {
        id,
        lines: (0..id).map(|i| format!("line-{i}")).collect(),
        totals: HashMap::from([("net".to_string(), id as f64 * 1.5)]),
    }
}

#[test]
fn test_shared_instance_across_threads() {
    let mut fury = Fury::default().mode(Mode::Compatible);
    fury.register::<Order>(1).unwrap();
    let fury = Arc::new(fury);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let fury = Arc::clone(&fury);
            thread::spawn(move || {
                for i in 0..50 {
                    let value = order(t * 100 + i % 7);
                    let bytes = fury.serialize(&value).unwrap();
                    let back: Order = fury.deserialize(&bytes).unwrap();
                    assert_eq!(back, value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_open_registration_across_threads() {
    let fury = Arc::new(Fury::default().require_registration(false));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let fury = Arc::clone(&fury);
            thread::spawn(move || {
                fury.serialize(&Receipt {
                    order: order(t),
                    paid: t % 2 == 0,
                })
                .unwrap()
            })
        })
        .collect();
    let bytes: Vec<Vec<u8>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for (t, bytes) in bytes.iter().enumerate() {
        let receipt: Receipt = fury.deserialize(bytes).unwrap();
        assert_eq!(receipt.order, order(t as i64));
        assert_eq!(receipt.paid, t % 2 == 0);
    }
}
