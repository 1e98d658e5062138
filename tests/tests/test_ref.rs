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
use fury_derive::FuryObject;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(FuryObject, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(FuryObject, Debug)]
struct Node {
    value: i32,
    next: Option<Rc<RefCell<Node>>>,
}

#[derive(FuryObject, Debug)]
struct SyncNode {
    value: i32,
    next: Option<Arc<Mutex<SyncNode>>>,
}

#[derive(FuryObject, Debug)]
struct Holder {
    first: Rc<Point>,
    second: Rc<Point>,
}

#[derive(FuryObject, Debug)]
struct MaybeHolder {
    maybe: Rc<Option<Point>>,
    again: Rc<Option<Point>>,
}

#[test]
fn test_shared_values_in_list() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    let a = Rc::new(Point { x: 1, y: 2 });
    let b = Rc::new(Point { x: 1, y: 2 });
    let list = vec![a.clone(), b, a];

    let bytes = fury.serialize(&list).unwrap();
    let back: Vec<Rc<Point>> = fury.deserialize(&bytes).unwrap();
    assert_eq!(back.len(), 3);
    assert!(Rc::ptr_eq(&back[0], &back[2]));
    assert!(!Rc::ptr_eq(&back[0], &back[1]));
    assert_eq!(*back[1], Point { x: 1, y: 2 });
}

#[test]
fn test_shared_fields() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    fury.register::<Holder>(2).unwrap();
    let shared = Rc::new(Point { x: 5, y: 6 });
    let holder = Holder {
        first: shared.clone(),
        second: shared,
    };
    let bytes = fury.serialize(&holder).unwrap();
    let back: Holder = fury.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&back.first, &back.second));
}

#[test]
fn test_rc_refcell_cycle() {
    let mut fury = Fury::default();
    fury.register::<Node>(3).unwrap();
    let a = Rc::new(RefCell::new(Node {
        value: 1,
        next: None,
    }));
    let b = Rc::new(RefCell::new(Node {
        value: 2,
        next: Some(a.clone()),
    }));
    a.borrow_mut().next = Some(b.clone());

    let bytes = fury.serialize(&a).unwrap();
    let a2: Rc<RefCell<Node>> = fury.deserialize(&bytes).unwrap();
    let b2 = a2.borrow().next.clone().unwrap();
    assert_eq!(a2.borrow().value, 1);
    assert_eq!(b2.borrow().value, 2);
    let back_to_a = b2.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&back_to_a, &a2));

    // Break both cycles so the test does not leak.
    a.borrow_mut().next = None;
    a2.borrow_mut().next = None;
}

#[test]
fn test_self_cycle() {
    let mut fury = Fury::default();
    fury.register::<Node>(3).unwrap();
    let node = Rc::new(RefCell::new(Node {
        value: 9,
        next: None,
    }));
    node.borrow_mut().next = Some(node.clone());

    let bytes = fury.serialize(&node).unwrap();
    let back: Rc<RefCell<Node>> = fury.deserialize(&bytes).unwrap();
    let next = back.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&next, &back));

    node.borrow_mut().next = None;
    back.borrow_mut().next = None;
}

#[test]
fn test_arc_mutex_cycle() {
    let mut fury = Fury::default();
    fury.register::<SyncNode>(4).unwrap();
    let a = Arc::new(Mutex::new(SyncNode {
        value: 1,
        next: None,
    }));
    let b = Arc::new(Mutex::new(SyncNode {
        value: 2,
        next: Some(a.clone()),
    }));
    a.lock().unwrap().next = Some(b.clone());

    let bytes = fury.serialize(&a).unwrap();
    let a2: Arc<Mutex<SyncNode>> = fury.deserialize(&bytes).unwrap();
    let b2 = a2.lock().unwrap().next.clone().unwrap();
    assert_eq!(b2.lock().unwrap().value, 2);
    let back_to_a = b2.lock().unwrap().next.clone().unwrap();
    assert!(Arc::ptr_eq(&back_to_a, &a2));

    a.lock().unwrap().next = None;
    a2.lock().unwrap().next = None;
}

#[test]
fn test_untracked_refs_are_copied() {
    let fury = Fury::default().track_ref(false);
    let shared = Rc::new("same".to_string());
    let list = vec![shared.clone(), shared];
    let bytes = fury.serialize(&list).unwrap();
    let back: Vec<Rc<String>> = fury.deserialize(&bytes).unwrap();
    assert_eq!(back[0], back[1]);
    assert!(!Rc::ptr_eq(&back[0], &back[1]));
}

#[test]
fn test_untracked_cycle_exceeds_depth() {
    let mut fury = Fury::default().track_ref(false);
    fury.register::<Node>(3).unwrap();
    let node = Rc::new(RefCell::new(Node {
        value: 1,
        next: None,
    }));
    node.borrow_mut().next = Some(node.clone());
    assert!(matches!(
        fury.serialize(&node),
        Err(Error::DepthExceed(_))
    ));
    node.borrow_mut().next = None;
}

#[test]
fn test_basic_types_ref_ignored() {
    let shared = Arc::new(1234567i64);
    let list = vec![shared.clone(), shared];

    let tracking = Fury::default();
    let ignoring = Fury::default().basic_types_ref_ignored(true);
    let tracked_bytes = tracking.serialize(&list).unwrap();
    let ignored_bytes = ignoring.serialize(&list).unwrap();
    assert_ne!(tracked_bytes, ignored_bytes);

    let back: Vec<Arc<i64>> = tracking.deserialize(&tracked_bytes).unwrap();
    assert!(Arc::ptr_eq(&back[0], &back[1]));
    let back: Vec<Arc<i64>> = ignoring.deserialize(&ignored_bytes).unwrap();
    assert_eq!(*back[0], 1234567);
    assert!(!Arc::ptr_eq(&back[0], &back[1]));
}

#[test]
fn test_ref_ids_follow_first_occurrence() {
    let fury = Fury::default();
    let values: Vec<Rc<String>> = (0..4).map(|i| Rc::new(format!("v{i}"))).collect();
    // 0 1 2 3 2 0 1
    let order = [0, 1, 2, 3, 2, 0, 1];
    let list: Vec<Rc<String>> = order.iter().map(|&i| values[i].clone()).collect();

    let bytes = fury.serialize(&list).unwrap();
    let back: Vec<Rc<String>> = fury.deserialize(&bytes).unwrap();
    for (i, &a) in order.iter().enumerate() {
        for (j, &b) in order.iter().enumerate() {
            assert_eq!(Rc::ptr_eq(&back[i], &back[j]), a == b);
        }
    }
    assert_eq!(*back[4], "v2");
}

#[test]
fn test_dangling_ref_is_rejected() {
    let fury = Fury::default();
    let shared = Rc::new("x".to_string());
    let mut bytes = fury.serialize(&vec![shared.clone(), shared]).unwrap();
    // The second element is REF + id 0; point it at an id that never existed.
    let last = bytes.len() - 1;
    bytes[last] = 5;
    assert!(fury.deserialize::<Vec<Rc<String>>>(&bytes).is_err());
}

#[test]
fn test_shared_empty_option_root() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();

    let bytes = fury.serialize(&Rc::new(None::<Point>)).unwrap();
    let back: Rc<Option<Point>> = fury.deserialize(&bytes).unwrap();
    assert!(back.is_none());

    let bytes = fury.serialize(&Rc::new(None::<String>)).unwrap();
    let back: Rc<Option<String>> = fury.deserialize(&bytes).unwrap();
    assert!(back.is_none());

    let bytes = fury.serialize(&Arc::new(None::<i32>)).unwrap();
    let back: Arc<Option<i32>> = fury.deserialize(&bytes).unwrap();
    assert!(back.is_none());
}

#[test]
fn test_shared_empty_option_field() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    fury.register::<MaybeHolder>(6).unwrap();

    let empty = Rc::new(None);
    let holder = MaybeHolder {
        maybe: empty.clone(),
        again: empty,
    };
    let bytes = fury.serialize(&holder).unwrap();
    let back: MaybeHolder = fury.deserialize(&bytes).unwrap();
    assert!(back.maybe.is_none());
    assert!(back.again.is_none());

    let some = Rc::new(Some(Point { x: 3, y: 4 }));
    let holder = MaybeHolder {
        maybe: some.clone(),
        again: some,
    };
    let bytes = fury.serialize(&holder).unwrap();
    let back: MaybeHolder = fury.deserialize(&bytes).unwrap();
    assert_eq!(*back.maybe, Some(Point { x: 3, y: 4 }));
    assert!(Rc::ptr_eq(&back.maybe, &back.again));
}
