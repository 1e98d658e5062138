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
use byteorder::{BigEndian, ByteOrder, LittleEndian};

const MIN_CAPACITY: usize = 64;

/// Growable byte sink. Fixed-width values are written in native byte order;
/// the stream header records which order that was.
#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.bf.capacity()
    }

    /// Doubles the capacity until `min_extra` more bytes fit.
    pub fn grow(&mut self, min_extra: usize) {
        let required = self.bf.len() + min_extra;
        if required <= self.bf.capacity() {
            return;
        }
        let mut new_capacity = self.bf.capacity().max(MIN_CAPACITY);
        while new_capacity < required {
            new_capacity *= 2;
        }
        self.bf.reserve_exact(new_capacity - self.bf.len());
    }

    #[inline(always)]
    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.grow(v.len());
        self.bf.extend_from_slice(v);
        v.len()
    }

    /// Appends the bytes yielded by `iter`, growing once.
    pub fn write_byte_iter<I: ExactSizeIterator<Item = u8>>(&mut self, iter: I) {
        self.grow(iter.len());
        self.bf.extend(iter);
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.grow(1);
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    #[inline(always)]
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    #[inline(always)]
    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_ne_bytes());
    }

    /// 7 data bits per byte, continuation bit in bit 7, low group first.
    pub fn write_varuint64(&mut self, mut value: u64) {
        self.grow(10);
        while value >= 0x80 {
            self.bf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }

    #[inline(always)]
    pub fn write_varuint32(&mut self, value: u32) {
        self.write_varuint64(value as u64);
    }

    #[inline(always)]
    pub fn write_varint32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varuint32(zigzag);
    }

    #[inline(always)]
    pub fn write_varint64(&mut self, value: i64) {
        let zigzag = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varuint64(zigzag);
    }

    /// Writes `varuint32(len)` followed by the raw bytes.
    pub fn write_len_prefixed_bytes(&mut self, v: &[u8]) {
        self.write_varuint32(v.len() as u32);
        self.write_bytes(v);
    }

    pub fn write_utf8_string(&mut self, s: &str) {
        self.write_len_prefixed_bytes(s.as_bytes());
    }
}

/// Cursor over a serialized stream. Every read is bounds checked.
pub struct Reader<'bf> {
    bf: &'bf [u8],
    cursor: usize,
    little_endian: bool,
}

impl<'bf> Reader<'bf> {
    pub fn new(bf: &'bf [u8]) -> Reader<'bf> {
        Reader {
            bf,
            cursor: 0,
            little_endian: cfg!(target_endian = "little"),
        }
    }

    /// Fixed-width reads follow the byte order recorded by the writer.
    pub fn set_little_endian(&mut self, little_endian: bool) {
        self.little_endian = little_endian;
    }

    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    #[inline(always)]
    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    /// Zero-copy view into the underlying bytes, independent of the cursor.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'bf [u8], Error> {
        match offset.checked_add(len) {
            Some(end) if end <= self.bf.len() => Ok(&self.bf[offset..end]),
            _ => Err(Error::buffer_out_of_bound(offset, len, self.bf.len())),
        }
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    /// Takes the next `len` bytes without copying them.
    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        self.check_bound(len)?;
        let bytes = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.read_bytes(len).map(|_| ())
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check_bound(1)?;
        let v = self.bf[self.cursor];
        self.cursor += 1;
        Ok(v)
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_u8().map(|v| v as i8)
    }

    #[inline(always)]
    pub fn peek_i8(&self) -> Result<i8, Error> {
        self.check_bound(1)?;
        Ok(self.bf[self.cursor] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!("invalid bool byte: {other}"))),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let bytes = self.read_bytes(2)?;
        Ok(if self.little_endian {
            LittleEndian::read_u16(bytes)
        } else {
            BigEndian::read_u16(bytes)
        })
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let bytes = self.read_bytes(4)?;
        Ok(if self.little_endian {
            LittleEndian::read_u32(bytes)
        } else {
            BigEndian::read_u32(bytes)
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let bytes = self.read_bytes(8)?;
        Ok(if self.little_endian {
            LittleEndian::read_u64(bytes)
        } else {
            BigEndian::read_u64(bytes)
        })
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.read_u64().map(|v| v as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_u64().map(f64::from_bits)
    }

    pub fn read_varuint64(&mut self) -> Result<u64, Error> {
        let mut result = 0u64;
        let mut shift = 0;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(Error::protocol_error("varuint64 overflows 64 bits"));
            }
            result |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let v = self.read_varuint64()?;
        u32::try_from(v).map_err(|_| Error::protocol_error(format!("varuint32 overflow: {v}")))
    }

    pub fn read_varint32(&mut self) -> Result<i32, Error> {
        let v = self.read_varuint32()?;
        Ok(((v >> 1) as i32) ^ -((v & 1) as i32))
    }

    pub fn read_varint64(&mut self) -> Result<i64, Error> {
        let v = self.read_varuint64()?;
        Ok(((v >> 1) as i64) ^ -((v & 1) as i64))
    }

    pub fn read_len_prefixed_bytes(&mut self) -> Result<&'bf [u8], Error> {
        let len = self.read_varuint32()? as usize;
        self.read_bytes(len)
    }

    pub fn read_utf8_string(&mut self) -> Result<String, Error> {
        let bytes = self.read_len_prefixed_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::invalid_data(format!("invalid utf8 string: {e}")))
    }
}
