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

use byteorder::{ByteOrder, LittleEndian};

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccdu64);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53u64);
    k ^= k >> 33;

    k
}

pub fn murmurhash3_x64_128(bytes: &[u8], seed: u64) -> (u64, u64) {
    let c1 = 0x87c37b91114253d5u64;
    let c2 = 0x4cf5ad432745937fu64;
    let read_size = 16;
    let len = bytes.len() as u64;
    let block_count = len / read_size;

    let (mut h1, mut h2) = (seed, seed);

    for block in bytes.chunks_exact(16) {
        let mut k1 = LittleEndian::read_u64(&block[..8]);
        let mut k2 = LittleEndian::read_u64(&block[8..]);

        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5);
        h1 = h1.wrapping_add(0x52dce729);

        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5);
        h2 = h2.wrapping_add(0x38495ab5);
    }
    let tail = &bytes[(block_count * read_size) as usize..];
    let (mut k1, mut k2) = (0u64, 0u64);

    if len & 15 == 15 {
        k2 ^= (tail[14] as u64) << 48;
    }
    if len & 15 >= 14 {
        k2 ^= (tail[13] as u64) << 40;
    }
    if len & 15 >= 13 {
        k2 ^= (tail[12] as u64) << 32;
    }
    if len & 15 >= 12 {
        k2 ^= (tail[11] as u64) << 24;
    }
    if len & 15 >= 11 {
        k2 ^= (tail[10] as u64) << 16;
    }
    if len & 15 >= 10 {
        k2 ^= (tail[9] as u64) << 8;
    }
    if len & 15 >= 9 {
        k2 ^= tail[8] as u64;
        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;
    }

    if len & 15 >= 8 {
        k1 ^= (tail[7] as u64) << 56;
    }
    if len & 15 >= 7 {
        k1 ^= (tail[6] as u64) << 48;
    }
    if len & 15 >= 6 {
        k1 ^= (tail[5] as u64) << 40;
    }
    if len & 15 >= 5 {
        k1 ^= (tail[4] as u64) << 32;
    }
    if len & 15 >= 4 {
        k1 ^= (tail[3] as u64) << 24;
    }
    if len & 15 >= 3 {
        k1 ^= (tail[2] as u64) << 16;
    }
    if len & 15 >= 2 {
        k1 ^= (tail[1] as u64) << 8;
    }
    if len & 15 >= 1 {
        k1 ^= tail[0] as u64;
        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;
    }

    h1 ^= bytes.len() as u64;
    h2 ^= bytes.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}


/// Seed shared by every stream-level hash (interned strings, schema defs).
pub const HASH_SEED: u64 = 47;

/// Lower 64 bits of the seeded murmur3 hash, never zero.
///
/// Zero is kept free so it can mean "absent" on the wire.
pub fn stream_hash(bytes: &[u8]) -> u64 {
    let (h1, _) = murmurhash3_x64_128(bytes, HASH_SEED);
    if h1 == 0 {
        1
    } else {
        h1
    }
}
