/*
 * Created on Wed Jul 16 2025
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

use core::fmt;

/// A tagged reference to a node. The arena hands out blocks on [`super::ALIGN`]
/// boundaries, so the low [`Self::TAG_BITS`] bits of any node address are free
/// to carry the node kind. The all-zero word means "empty slot", which is why
/// freshly zeroed radix/pail/bucket tables need no further initialization
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeRef(usize);

impl NodeRef {
    pub const EMPTY: Self = Self(0);
    pub const TAG_BITS: u32 = 3;
    const TAG_MASK: usize = (1 << Self::TAG_BITS) - 1;
    const ADDR_MASK: usize = !Self::TAG_MASK;

    #[inline(always)]
    pub fn new(addr: *mut u8, tag: u8) -> Self {
        debug_assert_eq!(addr as usize & Self::TAG_MASK, 0, "unaligned node address");
        debug_assert!((tag as usize) <= Self::TAG_MASK);
        Self(addr as usize | tag as usize)
    }
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
    #[inline(always)]
    pub const fn tag(self) -> u8 {
        (self.0 & Self::TAG_MASK) as u8
    }
    #[inline(always)]
    pub fn addr(self) -> *mut u8 {
        (self.0 & Self::ADDR_MASK) as *mut u8
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "NodeRef::EMPTY")
        } else {
            write!(f, "NodeRef({:p}|{})", self.addr(), self.tag())
        }
    }
}
