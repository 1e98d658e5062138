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

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{FuryDefault, Serializer};
use crate::types::TypeId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    None => {
        panic!("Unreachable code")
    }
    Some(epoch) => epoch,
};

/// Microseconds since the Unix epoch, UTC.
impl Serializer for NaiveDateTime {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        let dt = self.and_utc();
        let micros = dt
            .timestamp()
            .checked_mul(1_000_000)
            .and_then(|m| m.checked_add(dt.timestamp_subsec_micros() as i64))
            .ok_or_else(|| Error::encode_error(format!("timestamp {self} out of range")))?;
        context.writer.write_i64(micros);
        Ok(())
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let micros = context.reader.read_i64()?;
        DateTime::from_timestamp_micros(micros)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| Error::invalid_data(format!("timestamp {micros}us out of range")))
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::TIMESTAMP
    }
}

/// Days since the Unix epoch.
impl Serializer for NaiveDate {
    fn fury_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        let days_since_epoch = self.signed_duration_since(EPOCH).num_days();
        context.writer.write_i32(days_since_epoch as i32);
        Ok(())
    }

    fn fury_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let days = context.reader.read_i32()?;
        EPOCH
            .checked_add_signed(TimeDelta::days(days as i64))
            .ok_or_else(|| Error::invalid_data(format!("date {days} days from epoch out of range")))
    }

    fn fury_static_type_id() -> TypeId {
        TypeId::LOCAL_DATE
    }
}

impl FuryDefault for NaiveDateTime {
    fn fury_default() -> Self {
        NaiveDateTime::default()
    }
}

impl FuryDefault for NaiveDate {
    fn fury_default() -> Self {
        NaiveDate::default()
    }
}
