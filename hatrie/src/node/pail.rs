/*
 * Created on Mon Jul 28 2025
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
    super::NodeKind,
    crate::mem::NodeRef,
};

/// A pail: a bare open-hash table of P tagged references, each slot an array
/// child. Sits between a full array and a bucket in the overflow cascade
#[derive(Clone, Copy)]
pub(crate) struct PailNode {
    base: *mut u8,
}

impl PailNode {
    /// ## Safety
    /// `r` must carry the pail tag and address a live pail node
    #[inline(always)]
    pub unsafe fn from_ref(r: NodeRef) -> Self {
        debug_assert_eq!(r.kind(), NodeKind::Pail);
        Self { base: r.addr() }
    }
    /// ## Safety
    /// `base` must be a zeroed pail-sized block
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
        unsafe {
            // UNSAFE(@ohsayan): i is always reduced modulo the pail modulus
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
}
