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
use fury_core::resolver::context::{ReadContext, WriteContext};
use fury_core::serializer::{FuryDefault, Serializer, StructSerializer};
use fury_core::types::Mode;
use fury_derive::FuryObject;
use std::any::Any;
use std::collections::HashMap;

#[derive(FuryObject, Debug, PartialEq, Clone)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(FuryObject, Debug, PartialEq)]
struct Line {
    from: Point,
    to: Option<Point>,
    label: String,
}

#[derive(FuryObject, Debug, PartialEq, Clone, Copy)]
enum Color {
    Red,
    Green,
    Blue,
}

#[derive(FuryObject, Debug, PartialEq)]
struct Palette {
    name: String,
    colors: Vec<Color>,
    by_name: HashMap<String, Color>,
}

#[test]
fn test_point() {
    let mut fury = Fury::default();
    fury.register::<Point>(100).unwrap();
    let point = Point { x: 3, y: 4 };
    let bytes = fury.serialize(&point).unwrap();
    let back: Point = fury.deserialize(&bytes).unwrap();
    assert_eq!(back, point);
}

#[test]
fn test_nested_structs() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    fury.register::<Line>(2).unwrap();
    let line = Line {
        from: Point { x: 0, y: 0 },
        to: Some(Point { x: -5, y: 12 }),
        label: "diagonal".to_string(),
    };
    let bytes = fury.serialize(&line).unwrap();
    assert_eq!(fury.deserialize::<Line>(&bytes).unwrap(), line);

    let open = Line {
        from: Point { x: 1, y: 1 },
        to: None,
        label: String::new(),
    };
    let bytes = fury.serialize(&open).unwrap();
    assert_eq!(fury.deserialize::<Line>(&bytes).unwrap(), open);
}

#[test]
fn test_struct_collections() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
    let bytes = fury.serialize(&points).unwrap();
    assert_eq!(fury.deserialize::<Vec<Point>>(&bytes).unwrap(), points);

    let mut named = HashMap::new();
    named.insert("origin".to_string(), Point { x: 0, y: 0 });
    let bytes = fury.serialize(&named).unwrap();
    assert_eq!(
        fury.deserialize::<HashMap<String, Point>>(&bytes).unwrap(),
        named
    );
}

#[test]
fn test_register_by_name() {
    let mut writer = Fury::default();
    writer.register_by_name::<Point>("geo", "Point").unwrap();
    let mut reader = Fury::default();
    reader.register_by_name::<Point>("geo", "Point").unwrap();
    let bytes = writer.serialize(&Point { x: 8, y: 9 }).unwrap();
    assert_eq!(
        reader.deserialize::<Point>(&bytes).unwrap(),
        Point { x: 8, y: 9 }
    );
}

#[test]
fn test_duplicate_registration() {
    let mut fury = Fury::default();
    fury.register::<Point>(5).unwrap();
    assert!(matches!(
        fury.register::<Line>(5),
        Err(Error::NotAllowed(_))
    ));
    assert!(matches!(
        fury.register_by_name::<Point>("geo", "Point"),
        Err(Error::NotAllowed(_))
    ));
    assert!(matches!(
        fury.register::<Color>(0),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_unregistered_type() {
    let fury = Fury::default();
    assert!(matches!(
        fury.serialize(&Point { x: 1, y: 1 }),
        Err(Error::UnregisteredType(_))
    ));

    let mut writer = Fury::default();
    writer.register::<Point>(42).unwrap();
    let bytes = writer.serialize(&Point { x: 1, y: 1 }).unwrap();
    let mut reader = Fury::default();
    reader.register::<Point>(43).unwrap();
    assert!(reader.deserialize::<Point>(&bytes).is_err());
}

#[test]
fn test_open_registration() {
    let writer = Fury::default().require_registration(false);
    let reader = Fury::default().require_registration(false);
    let line = Line {
        from: Point { x: 2, y: 3 },
        to: None,
        label: "auto".to_string(),
    };
    let bytes = writer.serialize(&line).unwrap();
    assert_eq!(reader.deserialize::<Line>(&bytes).unwrap(), line);
}

#[test]
fn test_wrong_struct_type() {
    let mut fury = Fury::default();
    fury.register::<Point>(1).unwrap();
    fury.register::<Line>(2).unwrap();
    let bytes = fury.serialize(&Point { x: 1, y: 2 }).unwrap();
    assert!(matches!(
        fury.deserialize::<Line>(&bytes),
        Err(Error::TypeMismatch(..))
    ));
}

#[test]
fn test_enum() {
    let mut fury = Fury::default();
    fury.register::<Color>(10).unwrap();
    fury.register::<Palette>(11).unwrap();

    let bytes = fury.serialize(&Color::Blue).unwrap();
    assert_eq!(fury.deserialize::<Color>(&bytes).unwrap(), Color::Blue);

    let palette = Palette {
        name: "flag".to_string(),
        colors: vec![Color::Red, Color::Green, Color::Red],
        by_name: [("sky".to_string(), Color::Blue)].into_iter().collect(),
    };
    let bytes = fury.serialize(&palette).unwrap();
    assert_eq!(fury.deserialize::<Palette>(&bytes).unwrap(), palette);
}

#[test]
fn test_enum_by_name() {
    let mut fury = Fury::default().enum_by_name(true);
    fury.register::<Color>(10).unwrap();
    let colors = vec![Color::Green; 50];
    let bytes = fury.serialize(&colors).unwrap();
    assert_eq!(fury.deserialize::<Vec<Color>>(&bytes).unwrap(), colors);
}

mod v2 {
    use fury_derive::FuryObject;

    #[derive(FuryObject, Debug, PartialEq)]
    pub enum Color {
        Red,
        Green,
        Blue,
        Violet,
    }
}

#[test]
fn test_unknown_enum_variant() {
    let mut writer = Fury::default();
    writer.register::<v2::Color>(10).unwrap();
    let mut reader = Fury::default();
    reader.register::<Color>(10).unwrap();

    let bytes = writer.serialize(&v2::Color::Green).unwrap();
    assert_eq!(reader.deserialize::<Color>(&bytes).unwrap(), Color::Green);
    let bytes = writer.serialize(&v2::Color::Violet).unwrap();
    assert!(matches!(
        reader.deserialize::<Color>(&bytes),
        Err(Error::UnknownEnum(_))
    ));

    let mut writer = Fury::default().enum_by_name(true);
    writer.register::<v2::Color>(10).unwrap();
    let mut reader = Fury::default().enum_by_name(true);
    reader.register::<Color>(10).unwrap();
    let bytes = writer.serialize(&v2::Color::Violet).unwrap();
    assert!(matches!(
        reader.deserialize::<Color>(&bytes),
        Err(Error::UnknownEnum(_))
    ));
}

#[derive(FuryObject, Debug, PartialEq)]
struct Cached {
    id: u64,
    #[fury(skip)]
    memo: Vec<i32>,
}

#[test]
fn test_skipped_field() {
    let mut fury = Fury::default();
    fury.register::<Cached>(3).unwrap();
    let value = Cached {
        id: 77,
        memo: vec![1, 2, 3],
    };
    let bytes = fury.serialize(&value).unwrap();
    let back: Cached = fury.deserialize(&bytes).unwrap();
    assert_eq!(back.id, 77);
    assert!(back.memo.is_empty());
}

#[derive(FuryObject, Debug, PartialEq)]
struct Wrapper<T> {
    inner: T,
    count: u32,
}

#[test]
fn test_generic_struct() {
    let mut fury = Fury::default();
    fury.register::<Wrapper<String>>(20).unwrap();
    fury.register::<Wrapper<Vec<i64>>>(21).unwrap();
    let value = Wrapper {
        inner: "boxed".to_string(),
        count: 1,
    };
    let bytes = fury.serialize(&value).unwrap();
    assert_eq!(fury.deserialize::<Wrapper<String>>(&bytes).unwrap(), value);

    let value = Wrapper {
        inner: vec![1i64, 2],
        count: 2,
    };
    let bytes = fury.serialize(&value).unwrap();
    assert_eq!(
        fury.deserialize::<Wrapper<Vec<i64>>>(&bytes).unwrap(),
        value
    );
}

#[derive(FuryObject, Debug, PartialEq)]
struct Keywords {
    r#type: String,
    r#match: bool,
}

#[test]
fn test_raw_identifiers() {
    let mut fury = Fury::default();
    fury.register::<Keywords>(30).unwrap();
    let value = Keywords {
        r#type: "kind".to_string(),
        r#match: true,
    };
    let bytes = fury.serialize(&value).unwrap();
    assert_eq!(fury.deserialize::<Keywords>(&bytes).unwrap(), value);
}

/// Hand-written extension type: a compact amount plus its currency code.
#[derive(Debug, PartialEq, Clone)]
struct Money {
    cents: i64,
    currency: String,
}

impl Serializer for Money {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_varint64(self.cents);
        context.writer.write_utf8_string(&self.currency);
        Ok(())
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Money {
            cents: context.reader.read_varint64()?,
            currency: context.reader.read_utf8_string()?,
        })
    }
}

impl StructSerializer for Money {}

impl FuryDefault for Money {
    fn fury_default() -> Self {
        Money {
            cents: 0,
            currency: String::new(),
        }
    }
}

#[derive(FuryObject, Debug, PartialEq)]
struct Invoice {
    id: i32,
    total: Money,
    refund: Option<Money>,
}

mod narrow {
    use super::*;

    #[derive(FuryObject, Debug, PartialEq)]
    pub struct Invoice {
        pub id: i32,
    }
}

fn invoice() -> Invoice {
    Invoice {
        id: 12,
        total: Money {
            cents: -250_075,
            currency: "EUR".to_string(),
        },
        refund: None,
    }
}

#[test]
fn test_ext_type_as_field() {
    for mode in [Mode::SchemaConsistent, Mode::Compatible] {
        let mut by_id = Fury::default().mode(mode);
        by_id.register::<Money>(40).unwrap();
        by_id.register::<Invoice>(41).unwrap();
        let mut by_name = Fury::default().mode(mode);
        by_name.register_by_name::<Money>("billing", "Money").unwrap();
        by_name.register_by_name::<Invoice>("billing", "Invoice").unwrap();

        for fury in [&by_id, &by_name] {
            let mut value = invoice();
            let bytes = fury.serialize(&value).unwrap();
            assert_eq!(fury.deserialize::<Invoice>(&bytes).unwrap(), value);

            value.refund = Some(value.total.clone());
            let bytes = fury.serialize(&value).unwrap();
            assert_eq!(fury.deserialize::<Invoice>(&bytes).unwrap(), value);
        }
    }
}

#[test]
fn test_ext_type_behind_box_any() {
    for mode in [Mode::SchemaConsistent, Mode::Compatible] {
        let mut fury = Fury::default().mode(mode);
        fury.register_by_name::<Money>("billing", "Money").unwrap();
        let value: Box<dyn Any> = Box::new(invoice().total);
        let bytes = fury.serialize(&value).unwrap();
        let back: Box<dyn Any> = fury.deserialize(&bytes).unwrap();
        assert_eq!(back.downcast_ref::<Money>(), Some(&invoice().total));

        let list: Vec<Box<dyn Any>> = vec![Box::new(invoice().total), Box::new(7i32)];
        let bytes = fury.serialize(&list).unwrap();
        let back: Vec<Box<dyn Any>> = fury.deserialize(&bytes).unwrap();
        assert_eq!(back[0].downcast_ref::<Money>().map(|m| m.cents), Some(-250_075));
        assert_eq!(back[1].downcast_ref::<i32>(), Some(&7));
    }
}

#[test]
fn test_ext_field_skipped_by_narrow_reader() {
    let mut writer = Fury::default().mode(Mode::Compatible);
    writer.register::<Money>(40).unwrap();
    writer.register::<Invoice>(41).unwrap();
    let mut value = invoice();
    value.refund = Some(Money {
        cents: 5,
        currency: "USD".to_string(),
    });
    let bytes = writer.serialize(&value).unwrap();

    // An extension value carries no schema def, so skipping it needs the
    // local binding.
    let mut reader = Fury::default().mode(Mode::Compatible);
    reader.register::<Money>(40).unwrap();
    reader.register::<narrow::Invoice>(41).unwrap();
    let back: narrow::Invoice = reader.deserialize(&bytes).unwrap();
    assert_eq!(back, narrow::Invoice { id: 12 });

    let mut unaware = Fury::default().mode(Mode::Compatible);
    unaware.register::<narrow::Invoice>(41).unwrap();
    assert!(matches!(
        unaware.deserialize::<narrow::Invoice>(&bytes),
        Err(Error::UnregisteredType(_))
    ));
}
