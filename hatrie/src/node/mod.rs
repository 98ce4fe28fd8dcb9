/*
 * Created on Tue Jul 22 2025
 *
 * This file is a part of Hatrie
 * Hatrie is a free and open-source in-memory index written by Sayan Nandan
 * ("the Author") with the vision to provide hash-table class lookup and
 * insert speed without giving up ordered traversal
 *
 * Copyright (c) 2025, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

pub(crate) mod array;
pub(crate) mod bucket;
pub(crate) mod pail;
pub(crate) mod radix;

use crate::mem::NodeRef;

/// longest representable key: 15 bits of length prefix
pub const KEY_MAX: usize = 0x7fff;
/// radix fan-out; one 7-bit byte per level
pub(crate) const RADIX_FAN: usize = 128;

/// class index of the radix node
pub(crate) const CLASS_RADIX: u8 = 0;
/// class index of the bucket node
pub(crate) const CLASS_BUCKET: u8 = 1;
/// class index of the pail node
pub(crate) const CLASS_PAIL: u8 = 3;
/// class index of the smallest array size class
pub(crate) const CLASS_ARRAY0: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum NodeKind {
    /// 128-way fan-out table over one key byte
    Radix = 0,
    /// large open hash of array/pail children; the bursting unit
    Bucket = 1,
    /// compact linear array of keys and aux slots
    Array = 2,
    /// small open hash of array children; the overflow stage below an array
    Pail = 3,
}

impl NodeKind {
    #[inline(always)]
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::Radix,
            1 => Self::Bucket,
            2 => Self::Array,
            3 => Self::Pail,
            _ => unreachable!("logic, reserved node tag {tag}"),
        }
    }
    #[inline(always)]
    pub fn tagged(self, addr: *mut u8) -> NodeRef {
        NodeRef::new(addr, self as u8)
    }
}

impl NodeRef {
    #[inline(always)]
    pub(crate) fn kind(self) -> NodeKind {
        NodeKind::from_tag(self.tag())
    }
}

/*
    Key storage format, shared by the array node and the cursor: each key is
    a 1 or 2 byte little-endian length prefix followed by the raw bytes. A
    length below 128 is a single byte; otherwise the first byte carries the
    low 7 bits with the high bit set and the second byte carries the rest.
*/

#[inline(always)]
pub(crate) fn len_prefix(len: usize) -> usize {
    1 + (len > 0x7f) as usize
}

/// Write the length prefix for `len` at `at`.
///
/// ## Safety
/// `at` must have room for [`len_prefix`]`(len)` bytes and `len` must be
/// within [`KEY_MAX`]
#[inline(always)]
pub(crate) unsafe fn encode_len(at: *mut u8, len: usize) {
    debug_assert!(len <= KEY_MAX);
    if len > 0x7f {
        *at = (len & 0x7f) as u8 | 0x80;
        *at.add(1) = (len >> 7) as u8;
    } else {
        *at = len as u8;
    }
}

/// Decode a length prefix at `at`, returning `(len, prefix bytes)`.
///
/// ## Safety
/// `at` must point at a prefix produced by [`encode_len`]
#[inline(always)]
pub(crate) unsafe fn decode_len(at: *const u8) -> (usize, usize) {
    let b = *at;
    if b & 0x80 != 0 {
        ((b & 0x7f) as usize | ((*at.add(1) as usize) << 7), 2)
    } else {
        (b as usize, 1)
    }
}
