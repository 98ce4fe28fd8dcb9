/*
 * Created on Tue Jul 29 2025
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

use {
    super::{NodeKind, RADIX_FAN},
    crate::mem::NodeRef,
};

/// A radix node: 128 tagged references indexed by one key byte with the high
/// bit stripped. Produced when a bucket bursts
#[derive(Clone, Copy)]
pub(crate) struct RadixNode {
    base: *mut u8,
}

impl RadixNode {
    /// ## Safety
    /// `r` must carry the radix tag and address a live radix node
    #[inline(always)]
    pub unsafe fn from_ref(r: NodeRef) -> Self {
        debug_assert_eq!(r.kind(), NodeKind::Radix);
        Self { base: r.addr() }
    }
    /// ## Safety
    /// `base` must be a zeroed radix-sized block
    #[inline(always)]
    pub unsafe fn from_raw(base: *mut u8) -> Self {
        Self { base }
    }
    #[inline(always)]
    pub fn raw(&self) -> *mut u8 {
        self.base
    }
    #[inline(always)]
    pub fn slot_ptr(&self, i: usize) -> *mut NodeRef {
        debug_assert!(i < RADIX_FAN);
        unsafe {
            // UNSAFE(@ohsayan): fan-out bound asserted above
            (self.base as *mut NodeRef).add(i)
        }
    }
    #[inline(always)]
    pub fn slot(&self, i: usize) -> NodeRef {
        unsafe {
            // UNSAFE(@ohsayan): see slot_ptr
            *self.slot_ptr(i)
        }
    }
    /// First occupied slot at or after `from`
    pub fn first_occupied(&self, from: usize) -> Option<usize> {
        (from..RADIX_FAN).find(|&i| !self.slot(i).is_empty())
    }
    /// Last occupied slot strictly below `upto`
    pub fn last_occupied(&self, upto: usize) -> Option<usize> {
        (0..upto.min(RADIX_FAN)).rev().find(|&i| !self.slot(i).is_empty())
    }
}
