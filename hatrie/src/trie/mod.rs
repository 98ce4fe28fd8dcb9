/*
 * Created on Mon Aug 04 2025
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

pub mod shared;
#[cfg(test)]
mod tests;

use {
    crate::{
        config::HatConfig,
        cursor::HatCursor,
        error::{HatError, HatResult},
        mem::{Arena, NodeRef},
        node::{
            array::{ArrayNode, ARR_HDR},
            bucket::BucketNode,
            len_prefix,
            pail::PailNode,
            radix::RadixNode,
            NodeKind, CLASS_ARRAY0, CLASS_BUCKET, CLASS_PAIL, CLASS_RADIX, KEY_MAX, RADIX_FAN,
        },
    },
    core::{ptr, ptr::NonNull, slice},
    log::{debug, trace},
};

/*
    How the structure grows, leaves first: a key lands in a compact array
    node. A full array promotes through the size classes; past the largest
    class it bursts into a pail (under a radix) or forces its parent bucket
    to burst (under a bucket). A full pail bursts into a bucket. A bucket
    holding bucket_max keys bursts into a radix node, consuming one key byte
    and re-inserting everything below it one level down. The root is the same
    machinery flattened: boot_level implicit radix layers fused into a single
    table indexed by the first boot_level key bytes.

    The single writer rule is load-bearing. Every reshape frees nodes into
    the arena reuse lists and relocates keys and aux slots, so a reader
    racing a writer would chase freed memory. &mut self on every mutating
    method lets the compiler enforce the rule instead of a doc comment.
*/

/// 32-bit multiplicative key hash used by bucket and pail placement
#[inline(always)]
fn code(key: &[u8]) -> u32 {
    let mut h = key.len() as u32;
    for &b in key {
        h = h.wrapping_add((h << 5).wrapping_add(h >> 27).wrapping_add(b as u32));
    }
    h
}

/// Upsert and lookup counters, maintained across the life of the structure
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HatMetrics {
    /// keys freshly created by [`Hat::cell`]
    pub inserts: u64,
    /// [`Hat::cell`] calls that hit an existing key
    pub found: u64,
}

/// An ordered, in-memory index over byte-string keys
///
/// Keys are arbitrary byte strings up to [`KEY_MAX`] bytes; each carries a
/// fixed number of opaque aux bytes chosen at construction (zero makes the
/// structure a set). Lookup and insert are hash-class fast, while a
/// [`HatCursor`] walks the keys in byte-lexicographic order.
///
/// Two contracts worth reading twice:
///
/// - radix layers (including the fused root levels) consume 7 bits per key
///   byte. Keys that are not 7-bit clean at radix-consumed positions still
///   store and find correctly, but collide into shared subtrees and
///   reconstruct through [`HatCursor::key`] with the high bit dropped at
///   those positions. Byte positions consumed by a radix also elide zero
///   bytes on reconstruction
/// - aux slot references are stable only until the next mutating call, since
///   any insert may promote or burst the node holding them. The borrow on
///   [`Hat::cell`]'s return value enforces this
#[derive(Debug)]
pub struct Hat {
    arena: Arena,
    root: Box<[NodeRef]>,
    boot: u8,
    aux: usize,
    bucket_slots: usize,
    bucket_max: usize,
    pail_slots: usize,
    max_class: u8,
    stats: HatMetrics,
}

// all nodes are exclusively owned and mutation requires &mut self
unsafe impl Send for Hat {}
unsafe impl Sync for Hat {}

impl Hat {
    /// Construct an empty structure. `boot_level = 0` primes the root with a
    /// single bucket; higher levels pre-fan the key space across a flat
    /// table of 128^boot_level slots
    pub fn open(config: HatConfig) -> HatResult<Self> {
        config.validate()?;
        let sizes = config.node_sizes();
        let max_class = (sizes.len() - 1) as u8;
        let mut arena = Arena::new(sizes);
        let slots = RADIX_FAN.pow(config.boot_level as u32);
        let mut root = vec![NodeRef::EMPTY; slots].into_boxed_slice();
        if config.boot_level == 0 {
            root[0] = NodeKind::Bucket.tagged(arena.alloc(CLASS_BUCKET));
        }
        debug!(
            "hat open: boot={} aux={} bucket={}x{} pail={}",
            config.boot_level, config.aux, config.bucket_slots, config.bucket_max, config.pail_slots
        );
        Ok(Self {
            arena,
            root,
            boot: config.boot_level,
            aux: config.aux as usize,
            bucket_slots: config.bucket_slots as usize,
            bucket_max: config.bucket_max as usize,
            pail_slots: config.pail_slots as usize,
            max_class,
            stats: HatMetrics::default(),
        })
    }
    /// Allocate `amt` zeroed bytes of caller-side storage from the arena.
    /// The block lives exactly as long as this structure; it cannot be
    /// returned early
    pub fn data(&mut self, amt: usize) -> NonNull<u8> {
        self.arena.alloc_data(amt)
    }
    /// Upsert `key`, returning its aux bytes (empty when `aux = 0`). A fresh
    /// key gets a zeroed slot. Whether the call found or created the key is
    /// visible in [`Self::metrics`]
    pub fn cell(&mut self, key: &[u8]) -> HatResult<&mut [u8]> {
        if key.len() > KEY_MAX {
            return Err(HatError::KeyTooLong);
        }
        let (idx, off) = self.root_index(key);
        let aux = self.aux;
        unsafe {
            // UNSAFE(@ohsayan): the root block never moves and idx is bounded
            // by the root slot count
            let slot = self.root.as_mut_ptr().add(idx);
            let cell = self.upsert(slot, &key[off..])?;
            Ok(slice::from_raw_parts_mut(cell, aux))
        }
    }
    /// Look `key` up, returning its aux bytes on a hit (the empty slice when
    /// `aux = 0`)
    pub fn find(&self, key: &[u8]) -> Option<&[u8]> {
        if key.len() > KEY_MAX {
            return None;
        }
        let (idx, off) = self.root_index(key);
        let mut rest = &key[off..];
        let mut next = self.root[idx];
        while !next.is_empty() {
            match next.kind() {
                NodeKind::Array => {
                    let arr = unsafe {
                        // UNSAFE(@ohsayan): tag checked by kind()
                        ArrayNode::from_ref(next)
                    };
                    let size = self.arena.size_of(arr.class());
                    return arr.lookup(rest, size, self.aux).map(|p| unsafe {
                        // UNSAFE(@ohsayan): aux slots live inside the node
                        slice::from_raw_parts(p, self.aux)
                    });
                }
                NodeKind::Pail => {
                    let pail = unsafe {
                        // UNSAFE(@ohsayan): tag checked by kind()
                        PailNode::from_ref(next)
                    };
                    next = pail.slot(code(rest) as usize % self.pail_slots);
                }
                NodeKind::Bucket => {
                    let bucket = unsafe {
                        // UNSAFE(@ohsayan): tag checked by kind()
                        BucketNode::from_ref(next)
                    };
                    next = bucket.slot(code(rest) as usize % self.bucket_slots);
                }
                NodeKind::Radix => {
                    let radix = unsafe {
                        // UNSAFE(@ohsayan): tag checked by kind()
                        RadixNode::from_ref(next)
                    };
                    let ch = match rest.split_first() {
                        Some((&b, r)) => {
                            rest = r;
                            (b & 0x7f) as usize
                        }
                        None => 0,
                    };
                    next = radix.slot(ch);
                }
            }
        }
        None
    }
    /// Open an ordered cursor. Its scratch sort buffer is sized for a full
    /// bucket up front
    pub fn cursor(&self) -> HatCursor<'_> {
        HatCursor::new(self)
    }
    pub fn metrics(&self) -> HatMetrics {
        self.stats
    }
    /// Live node count per class: 0 radix, 1 bucket, 3 pail, 4.. the array
    /// size classes
    pub fn node_census(&self) -> Vec<usize> {
        (0..self.arena.classes() as u8).map(|c| self.arena.live(c)).collect()
    }
    /// Total bytes the arena has requested from the system
    pub fn allocated_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }
}

// cursor-side accessors
impl Hat {
    #[inline(always)]
    pub(crate) fn boot_level(&self) -> u8 {
        self.boot
    }
    #[inline(always)]
    pub(crate) fn aux_len(&self) -> usize {
        self.aux
    }
    #[inline(always)]
    pub(crate) fn bucket_slot_count(&self) -> usize {
        self.bucket_slots
    }
    #[inline(always)]
    pub(crate) fn bucket_key_max(&self) -> usize {
        self.bucket_max
    }
    #[inline(always)]
    pub(crate) fn pail_slot_count(&self) -> usize {
        self.pail_slots
    }
    #[inline(always)]
    pub(crate) fn root_slots(&self) -> usize {
        self.root.len()
    }
    #[inline(always)]
    pub(crate) fn root_slot(&self, i: usize) -> NodeRef {
        self.root[i]
    }
    #[inline(always)]
    pub(crate) fn class_size(&self, class: u8) -> usize {
        self.arena.size_of(class)
    }
}

// descent
impl Hat {
    /// Fold the first `boot` key bytes (7 bits each, missing bytes as 0)
    /// into the flat root index
    fn root_index(&self, key: &[u8]) -> (usize, usize) {
        let mut idx = 0;
        let mut off = 0;
        for _ in 0..self.boot {
            idx *= RADIX_FAN;
            if off < key.len() {
                idx += (key[off] & 0x7f) as usize;
                off += 1;
            }
        }
        (idx, off)
    }
    /// Core insert walk. `start` is the root slot the key hashes to; `key`
    /// is what remains after the root levels consumed their bytes.
    ///
    /// A back-reference to the most recently traversed bucket is carried so
    /// that a failed insert below it can charge the overflow to the bucket
    /// (bursting it into a radix) rather than to the leaf.
    ///
    /// ## Safety
    /// `start` must point into the live root block
    unsafe fn upsert(&mut self, start: *mut NodeRef, key: &[u8]) -> HatResult<*mut u8> {
        let mut next = start;
        let mut rest = key;
        let mut parent: Option<*mut NodeRef> = None;
        loop {
            let node = *next;
            if node.is_empty() {
                if let Some(p) = parent {
                    let bucket = BucketNode::from_ref(*p);
                    if bucket.count() < self.bucket_max {
                        return match self.new_array(next, rest) {
                            Some(cell) => {
                                bucket.bump_count();
                                self.stats.inserts += 1;
                                Ok(cell)
                            }
                            None => Err(HatError::KeyOversize),
                        };
                    }
                    self.burst_bucket(p);
                    next = p;
                    parent = None;
                    continue;
                }
                // bare radix or root slot
                return match self.new_array(next, rest) {
                    Some(cell) => {
                        self.stats.inserts += 1;
                        Ok(cell)
                    }
                    None => Err(HatError::KeyOversize),
                };
            }
            match node.kind() {
                NodeKind::Array => {
                    let arr = ArrayNode::from_ref(node);
                    let size = self.arena.size_of(arr.class());
                    if let Some(cell) = arr.lookup(rest, size, self.aux) {
                        self.stats.found += 1;
                        return Ok(cell);
                    }
                    if let Some(p) = parent {
                        let bucket = BucketNode::from_ref(*p);
                        if bucket.count() < self.bucket_max {
                            if let Some(cell) = self.add_array(next, rest, true) {
                                bucket.bump_count();
                                self.stats.inserts += 1;
                                return Ok(cell);
                            }
                        }
                        self.burst_bucket(p);
                        next = p;
                        parent = None;
                        continue;
                    }
                    if let Some(cell) = self.add_array(next, rest, true) {
                        self.stats.inserts += 1;
                        return Ok(cell);
                    }
                    // a failed add may have morphed the node into a pail on
                    // its way out; only a node still in array form bursts here
                    if (*next).kind() == NodeKind::Array {
                        self.burst_array(next);
                    }
                }
                NodeKind::Pail => {
                    let pail = PailNode::from_ref(node);
                    let child = pail.slot(code(rest) as usize % self.pail_slots);
                    if !child.is_empty() {
                        let arr = ArrayNode::from_ref(child);
                        let size = self.arena.size_of(arr.class());
                        if let Some(cell) = arr.lookup(rest, size, self.aux) {
                            self.stats.found += 1;
                            return Ok(cell);
                        }
                    }
                    if let Some(p) = parent {
                        let bucket = BucketNode::from_ref(*p);
                        if bucket.count() < self.bucket_max {
                            if let Some(cell) = self.add_pail(next, rest) {
                                bucket.bump_count();
                                self.stats.inserts += 1;
                                return Ok(cell);
                            }
                        }
                        self.burst_bucket(p);
                        next = p;
                        parent = None;
                        continue;
                    }
                    if let Some(cell) = self.add_pail(next, rest) {
                        self.stats.inserts += 1;
                        return Ok(cell);
                    }
                    self.burst_pail(next);
                }
                NodeKind::Bucket => {
                    let bucket = BucketNode::from_ref(node);
                    parent = Some(next);
                    next = bucket.slot_ptr(code(rest) as usize % self.bucket_slots);
                }
                NodeKind::Radix => {
                    let radix = RadixNode::from_ref(node);
                    let ch = match rest.split_first() {
                        Some((&b, r)) => {
                            rest = r;
                            (b & 0x7f) as usize
                        }
                        None => 0,
                    };
                    next = radix.slot_ptr(ch);
                }
            }
        }
    }
    /// Smallest array class that fits one key of `len` bytes plus its aux
    fn class_for(&self, len: usize) -> Option<u8> {
        let need = self.aux + len_prefix(len) + len + ARR_HDR;
        (CLASS_ARRAY0..=self.max_class).find(|&c| need <= self.arena.size_of(c))
    }
}

// node builders and reshapes
impl Hat {
    /// Place a fresh array holding only `key` into the empty slot `parent`.
    /// Returns the aux slot, or None when no class can hold the key
    unsafe fn new_array(&mut self, parent: *mut NodeRef, key: &[u8]) -> Option<*mut u8> {
        debug_assert!((*parent).is_empty());
        let class = self.class_for(key.len())?;
        let mut arr = ArrayNode::raw_new(self.arena.alloc(class), class);
        *parent = NodeKind::Array.tagged(arr.raw());
        Some(arr.append(key, self.arena.size_of(class), self.aux))
    }
    /// Add `key` to the array at `parent`, promoting through the size
    /// classes (and, when `allow_pail`, overflowing into a pail) as needed
    unsafe fn add_array(
        &mut self,
        parent: *mut NodeRef,
        key: &[u8],
        allow_pail: bool,
    ) -> Option<*mut u8> {
        let mut arr = ArrayNode::from_ref(*parent);
        let size = self.arena.size_of(arr.class());
        if arr.fits(key.len(), size, self.aux) {
            return Some(arr.append(key, size, self.aux));
        }
        self.promote(parent, key, allow_pail)
    }
    /// Move the array at `parent` into the smallest larger class that holds
    /// its contents plus `key`. Falls through to a pail burst when no class
    /// does (or when the aux slot counter is saturated)
    unsafe fn promote(
        &mut self,
        parent: *mut NodeRef,
        key: &[u8],
        allow_pail: bool,
    ) -> Option<*mut u8> {
        let old = ArrayNode::from_ref(*parent);
        let old_class = old.class();
        let need = (old.cnt() + 1) * self.aux + old.nxt() + len_prefix(key.len()) + key.len() + ARR_HDR;
        let target = if self.aux != 0 && old.cnt() == 255 {
            None
        } else {
            (old_class..=self.max_class).find(|&c| need <= self.arena.size_of(c))
        };
        let Some(class) = target else {
            if allow_pail && self.pail_slots != 0 {
                return self.new_pail(parent, key);
            }
            return None;
        };
        let old_size = self.arena.size_of(old_class);
        let size = self.arena.size_of(class);
        let mut arr = ArrayNode::raw_new(self.arena.alloc(class), class);
        trace!("promoting array {} -> {} bytes", old_size, size);
        // UNSAFE(@ohsayan): both regions verified against their class sizes;
        // keys copy forward from the header, aux slots backward from the tail
        ptr::copy_nonoverlapping(old.keys_base(), arr.keys_base(), old.nxt());
        if self.aux != 0 {
            ptr::copy_nonoverlapping(
                old.aux_at(old.cnt() - 1, old_size, self.aux),
                arr.aux_at(old.cnt() - 1, size, self.aux),
                old.cnt() * self.aux,
            );
        }
        arr.copy_header_from(&old);
        *parent = NodeKind::Array.tagged(arr.raw());
        let cell = arr.append(key, size, self.aux);
        self.arena.free(old.raw(), old_class);
        Some(cell)
    }
    /// Burst the full array at `parent` into a pail by rehashing every key
    /// into per-slot child arrays, then insert `key` through the pail
    unsafe fn new_pail(&mut self, parent: *mut NodeRef, key: &[u8]) -> Option<*mut u8> {
        debug_assert!(self.pail_slots != 0);
        let old = ArrayNode::from_ref(*parent);
        let old_class = old.class();
        let old_size = self.arena.size_of(old_class);
        let pail = PailNode::from_raw(self.arena.alloc(CLASS_PAIL));
        *parent = NodeKind::Pail.tagged(pail.raw());
        debug!("bursting {} key array into a pail", old.cnt());
        for e in old.scan() {
            let k = e.bytes();
            let slot = pail.slot_ptr(code(k) as usize % self.pail_slots);
            let cell = if (*slot).is_empty() {
                self.new_array(slot, k)
            } else {
                self.add_array(slot, k, false)
            }
            .expect("logic, rehashed key must fit");
            if self.aux != 0 {
                ptr::copy_nonoverlapping(old.aux_at(e.idx, old_size, self.aux), cell, self.aux);
            }
        }
        self.arena.free(old.raw(), old_class);
        self.add_pail(parent, key)
    }
    /// Add `key` to the pail at `parent`, delegating to the hashed child
    /// array (which may promote, but never grows a nested pail)
    unsafe fn add_pail(&mut self, parent: *mut NodeRef, key: &[u8]) -> Option<*mut u8> {
        let pail = PailNode::from_ref(*parent);
        let slot = pail.slot_ptr(code(key) as usize % self.pail_slots);
        if (*slot).is_empty() {
            self.new_array(slot, key)
        } else {
            self.add_array(slot, key, false)
        }
    }
    /// Burst the full array at `parent` (directly under a radix or the root)
    /// into a bucket
    unsafe fn burst_array(&mut self, parent: *mut NodeRef) {
        let old = ArrayNode::from_ref(*parent);
        let old_class = old.class();
        let old_size = self.arena.size_of(old_class);
        let bucket = BucketNode::from_raw(self.arena.alloc(CLASS_BUCKET));
        *parent = NodeKind::Bucket.tagged(bucket.raw());
        debug!("bursting {} key array into a bucket", old.cnt());
        for e in old.scan() {
            let k = e.bytes();
            let cell = self
                .place_in_bucket(bucket, k)
                .expect("logic, rehashed key must fit");
            if self.aux != 0 {
                ptr::copy_nonoverlapping(old.aux_at(e.idx, old_size, self.aux), cell, self.aux);
            }
            bucket.bump_count();
        }
        self.arena.free(old.raw(), old_class);
    }
    /// Burst the full pail at `parent` into a bucket, rehashing the keys of
    /// every child array
    unsafe fn burst_pail(&mut self, parent: *mut NodeRef) {
        let pail = PailNode::from_ref(*parent);
        let bucket = BucketNode::from_raw(self.arena.alloc(CLASS_BUCKET));
        *parent = NodeKind::Bucket.tagged(bucket.raw());
        debug!("bursting pail into a bucket");
        for i in 0..self.pail_slots {
            let child = pail.slot(i);
            if child.is_empty() {
                continue;
            }
            let arr = ArrayNode::from_ref(child);
            let arr_size = self.arena.size_of(arr.class());
            for e in arr.scan() {
                let cell = self
                    .place_in_bucket(bucket, e.bytes())
                    .expect("logic, rehashed key must fit");
                if self.aux != 0 {
                    ptr::copy_nonoverlapping(arr.aux_at(e.idx, arr_size, self.aux), cell, self.aux);
                }
                bucket.bump_count();
            }
            self.arena.free(arr.raw(), arr.class());
        }
        self.arena.free(pail.raw(), CLASS_PAIL);
    }
    /// Route one rehashed key into `bucket` during a burst; the slot may
    /// itself grow from array to pail along the way
    unsafe fn place_in_bucket(&mut self, bucket: BucketNode, key: &[u8]) -> Option<*mut u8> {
        let slot = bucket.slot_ptr(code(key) as usize % self.bucket_slots);
        if (*slot).is_empty() {
            self.new_array(slot, key)
        } else if (*slot).kind() == NodeKind::Array {
            self.add_array(slot, key, true)
        } else {
            self.add_pail(slot, key)
        }
    }
    /// Decompose the bucket at `parent` into a radix node: every key below
    /// it re-enters one level down, shortened by the byte the radix consumes
    unsafe fn burst_bucket(&mut self, parent: *mut NodeRef) {
        let bucket = BucketNode::from_ref(*parent);
        let radix = RadixNode::from_raw(self.arena.alloc(CLASS_RADIX));
        *parent = NodeKind::Radix.tagged(radix.raw());
        debug!("bursting bucket of {} keys into a radix", bucket.count());
        for i in 0..self.bucket_slots {
            let child = bucket.slot(i);
            if child.is_empty() {
                continue;
            }
            match child.kind() {
                NodeKind::Array => {
                    let arr = ArrayNode::from_ref(child);
                    let arr_size = self.arena.size_of(arr.class());
                    for e in arr.scan() {
                        self.add_radix(radix, e.bytes(), arr.aux_at(e.idx, arr_size, self.aux));
                    }
                    self.arena.free(arr.raw(), arr.class());
                }
                NodeKind::Pail => {
                    let pail = PailNode::from_ref(child);
                    for p in 0..self.pail_slots {
                        let sub = pail.slot(p);
                        if sub.is_empty() {
                            continue;
                        }
                        let arr = ArrayNode::from_ref(sub);
                        let arr_size = self.arena.size_of(arr.class());
                        for e in arr.scan() {
                            self.add_radix(radix, e.bytes(), arr.aux_at(e.idx, arr_size, self.aux));
                        }
                        self.arena.free(arr.raw(), arr.class());
                    }
                    self.arena.free(pail.raw(), CLASS_PAIL);
                }
                _ => unreachable!("logic, bucket slot holding a {:?}", child.kind()),
            }
        }
        self.arena.free(bucket.raw(), CLASS_BUCKET);
    }
    /// Re-insert one key below a radix during a bucket burst. The radix
    /// consumes the leading byte (7 bits; an exhausted key lands in slot 0)
    /// and the shortened key goes through the full add machinery, bursting
    /// children as required
    unsafe fn add_radix(&mut self, radix: RadixNode, key: &[u8], value: *const u8) {
        let (ch, rest) = match key.split_first() {
            Some((&b, r)) => ((b & 0x7f) as usize, r),
            None => (0, &[][..]),
        };
        let slot = radix.slot_ptr(ch);
        if (*slot).is_empty() {
            let cell = self
                .new_array(slot, rest)
                .expect("logic, reinserted key must fit");
            if self.aux != 0 {
                ptr::copy_nonoverlapping(value, cell, self.aux);
            }
            return;
        }
        loop {
            match (*slot).kind() {
                NodeKind::Bucket => {
                    if self.add_bucket(slot, rest, value) {
                        return;
                    }
                    self.burst_bucket(slot);
                }
                NodeKind::Radix => {
                    let deeper = RadixNode::from_ref(*slot);
                    return self.add_radix(deeper, rest, value);
                }
                NodeKind::Array => {
                    if let Some(cell) = self.add_array(slot, rest, true) {
                        if self.aux != 0 {
                            ptr::copy_nonoverlapping(value, cell, self.aux);
                        }
                        return;
                    }
                    if (*slot).kind() == NodeKind::Array {
                        self.burst_array(slot);
                    }
                }
                NodeKind::Pail => {
                    if let Some(cell) = self.add_pail(slot, rest) {
                        if self.aux != 0 {
                            ptr::copy_nonoverlapping(value, cell, self.aux);
                        }
                        return;
                    }
                    self.burst_pail(slot);
                }
            }
        }
    }
    /// Insert a rehashed key (with its aux payload) into the bucket at
    /// `slot`. False means the bucket is full or its leaf is out of room and
    /// the caller must burst it
    unsafe fn add_bucket(&mut self, slot: *mut NodeRef, key: &[u8], value: *const u8) -> bool {
        let bucket = BucketNode::from_ref(*slot);
        if bucket.count() >= self.bucket_max {
            return false;
        }
        match self.place_in_bucket(bucket, key) {
            Some(cell) => {
                if self.aux != 0 {
                    ptr::copy_nonoverlapping(value, cell, self.aux);
                }
                bucket.bump_count();
                true
            }
            None => false,
        }
    }
}

impl Drop for Hat {
    fn drop(&mut self) {
        debug!(
            "hat close: {} inserts, {} found, {} bytes across segments",
            self.stats.inserts,
            self.stats.found,
            self.arena.allocated_bytes()
        );
    }
}
