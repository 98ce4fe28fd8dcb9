/*
 * Created on Wed Jul 23 2025
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
    super::{decode_len, encode_len, len_prefix, NodeKind},
    crate::mem::NodeRef,
    core::{mem, ptr, slice},
};

/*
    The array node is the only place keys and aux payloads actually live.
    Layout (one block of its class size):

        [ header | key key key .. ->      <- .. aux aux aux ]

    Keys are length-prefixed and grow forward from the header; aux slots are
    fixed-size and grow backward from the tail, so the k-th inserted key owns
    the slot at size - (k+1)*aux. nxt is the first free key byte and cnt the
    number of keys. Once cnt hits 255 the backward aux addressing would wrap
    the one-byte counter, so an aux-carrying array refuses further inserts
    regardless of remaining room.
*/

#[repr(C)]
pub(crate) struct ArrayHeader {
    /// first free byte in the key region, relative to the key base
    nxt: u16,
    /// array size class of this node
    class: u8,
    /// number of keys (and aux slots) present
    cnt: u8,
}

pub(crate) const ARR_HDR: usize = mem::size_of::<ArrayHeader>();

assertions!(ARR_HDR == 4);

#[derive(Clone, Copy)]
pub(crate) struct ArrayNode {
    base: *mut u8,
}

impl ArrayNode {
    /// ## Safety
    /// `r` must carry the array tag and address a live array node
    #[inline(always)]
    pub unsafe fn from_ref(r: NodeRef) -> Self {
        debug_assert_eq!(r.kind(), NodeKind::Array);
        Self { base: r.addr() }
    }
    /// Adopt a freshly allocated (zeroed) block as an empty array of `class`.
    ///
    /// ## Safety
    /// `base` must be a zeroed block of at least the class byte size
    #[inline(always)]
    pub unsafe fn raw_new(base: *mut u8, class: u8) -> Self {
        let slf = Self { base };
        (*slf.hdr()).class = class;
        slf
    }
    #[inline(always)]
    fn hdr(&self) -> *mut ArrayHeader {
        self.base as *mut ArrayHeader
    }
    #[inline(always)]
    pub fn raw(&self) -> *mut u8 {
        self.base
    }
    #[inline(always)]
    pub fn class(&self) -> u8 {
        unsafe {
            // UNSAFE(@ohsayan): live node, header always readable
            (*self.hdr()).class
        }
    }
    #[inline(always)]
    pub fn cnt(&self) -> usize {
        unsafe {
            // UNSAFE(@ohsayan): live node, header always readable
            (*self.hdr()).cnt as usize
        }
    }
    #[inline(always)]
    pub fn nxt(&self) -> usize {
        unsafe {
            // UNSAFE(@ohsayan): live node, header always readable
            (*self.hdr()).nxt as usize
        }
    }
    #[inline(always)]
    pub fn keys_base(&self) -> *mut u8 {
        unsafe {
            // UNSAFE(@ohsayan): within the node block
            self.base.add(ARR_HDR)
        }
    }
    /// Address of the aux slot of the k-th inserted key
    #[inline(always)]
    pub fn aux_at(&self, k: usize, size: usize, aux: usize) -> *mut u8 {
        unsafe {
            // UNSAFE(@ohsayan): aux slots grow backward from the tail and k
            // is bounded by cnt, so this stays inside (or one past) the block
            self.base.add(size - (k + 1) * aux)
        }
    }
    /// Walk the stored keys in insertion order
    #[inline(always)]
    pub fn scan(&self) -> KeyScan {
        KeyScan {
            cur: self.keys_base(),
            end: unsafe {
                // UNSAFE(@ohsayan): nxt is maintained within the key region
                self.keys_base().add(self.nxt())
            },
            idx: 0,
        }
    }
    /// Exact-match lookup; returns the aux slot address on a hit
    pub fn lookup(&self, key: &[u8], size: usize, aux: usize) -> Option<*mut u8> {
        for e in self.scan() {
            if e.len == key.len() && unsafe { e.bytes() } == key {
                return Some(self.aux_at(e.idx, size, aux));
            }
        }
        None
    }
    /// Would one more key of `len` bytes fit under this class?
    #[inline(always)]
    pub fn fits(&self, len: usize, size: usize, aux: usize) -> bool {
        (aux == 0 || self.cnt() < 255)
            && (self.cnt() + 1) * aux + self.nxt() + len_prefix(len) + len + ARR_HDR <= size
    }
    /// Adopt another array's fill counters after its contents were copied in
    /// (the class byte stays ours)
    #[inline(always)]
    pub fn copy_header_from(&mut self, other: &ArrayNode) {
        unsafe {
            // UNSAFE(@ohsayan): both headers are live
            (*self.hdr()).nxt = other.nxt() as u16;
            (*self.hdr()).cnt = other.cnt() as u8;
        }
    }
    /// Append a key, returning its aux slot address. The caller must have
    /// verified the fit (see [`Self::fits`])
    pub fn append(&mut self, key: &[u8], size: usize, aux: usize) -> *mut u8 {
        debug_assert!(self.fits(key.len(), size, aux), "logic, append past fit");
        let skip = len_prefix(key.len());
        // the counter may only wrap in set mode, where slot addressing
        // multiplies it away
        let k = self.cnt();
        unsafe {
            // UNSAFE(@ohsayan): fit verified by the caller; the key region
            // cannot reach into the aux region
            let at = self.keys_base().add(self.nxt());
            encode_len(at, key.len());
            ptr::copy_nonoverlapping(key.as_ptr(), at.add(skip), key.len());
            let hdr = self.hdr();
            (*hdr).nxt += (skip + key.len()) as u16;
            (*hdr).cnt = (*hdr).cnt.wrapping_add(1);
        }
        self.aux_at(k, size, aux)
    }
}

pub(crate) struct KeyEntry {
    /// position of this key in insertion order
    pub idx: usize,
    /// address of the length prefix
    pub prefix: *const u8,
    /// decoded key length
    pub len: usize,
    /// address of the first key byte
    pub tail: *const u8,
}

impl KeyEntry {
    /// ## Safety
    /// The node this entry was scanned from must still be alive
    #[inline(always)]
    pub unsafe fn bytes<'a>(&self) -> &'a [u8] {
        slice::from_raw_parts(self.tail, self.len)
    }
}

pub(crate) struct KeyScan {
    cur: *const u8,
    end: *const u8,
    idx: usize,
}

impl Iterator for KeyScan {
    type Item = KeyEntry;
    fn next(&mut self) -> Option<KeyEntry> {
        if self.cur >= self.end {
            return None;
        }
        unsafe {
            // UNSAFE(@ohsayan): prefixes parse consistently from the key base
            // up to nxt; that is the array node's core invariant
            let (len, skip) = decode_len(self.cur);
            let e = KeyEntry {
                idx: self.idx,
                prefix: self.cur,
                len,
                tail: self.cur.add(skip),
            };
            self.cur = self.cur.add(skip + len);
            self.idx += 1;
            Some(e)
        }
    }
}
