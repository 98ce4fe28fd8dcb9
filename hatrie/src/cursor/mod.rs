/*
 * Created on Tue Sep 02 2025
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

mod sort;
#[cfg(test)]
mod tests;

use {
    crate::{
        mem::NodeRef,
        node::{
            array::ArrayNode, bucket::BucketNode, decode_len, pail::PailNode, radix::RadixNode,
            NodeKind, RADIX_FAN,
        },
        trie::Hat,
    },
    core::slice,
    rand::{rngs::SmallRng, SeedableRng},
};

/*
    Ordered traversal works leaf-at-a-time. The cursor keeps a stack of the
    radix levels it descended through (level 0 stands for the flat root
    block, addressed by a base-128 scan integer rather than a single byte)
    and, for the current leaf container, a scratch array of {key, aux}
    pointers stripped out of the leaf and ternary-quicksorted on demand.
    Within a leaf, iteration is just an index walk over the sorted scratch;
    crossing a leaf boundary pops the stack and scans for the next (or
    previous) occupied slot, descending least-first (or greatest-first)
    through any radix chain it meets.

    The scratch is sized for a full bucket up front, which is also why a
    cursor is not a free object to open.
*/

/// One {key, aux} entry of the cursor's sorted scratch. Both pointers lead
/// into node storage: the cursor's borrow of the structure keeps them alive,
/// and the absence of mutation while any cursor exists keeps them stable
#[derive(Clone, Copy)]
pub(crate) struct SortEntry {
    /// address of the stored key's length prefix
    key: *const u8,
    /// address of the stored key's aux slot
    slot: *const u8,
}

impl SortEntry {
    /// the stored key bytes past the length prefix
    #[inline(always)]
    pub(crate) fn tail(&self) -> &[u8] {
        unsafe {
            // UNSAFE(@ohsayan): entry pointers stay valid for the cursor's
            // lifetime (see the type docs)
            let (len, skip) = decode_len(self.key);
            slice::from_raw_parts(self.key.add(skip), len)
        }
    }
    #[inline(always)]
    pub(crate) fn key_len(&self) -> usize {
        unsafe {
            // UNSAFE(@ohsayan): see tail()
            decode_len(self.key).0
        }
    }
    /// byte at `depth`, or 0 once the key has ended
    #[inline(always)]
    pub(crate) fn byte_at(&self, depth: usize) -> u8 {
        let t = self.tail();
        if depth < t.len() {
            t[depth]
        } else {
            0
        }
    }
}

#[derive(Clone, Copy)]
struct Level {
    node: NodeRef,
    /// the slot index this level was entered through (radix levels only)
    scan: u8,
}

impl Level {
    /// level 0 placeholder for the flat root block
    const ROOT: Self = Self {
        node: NodeRef::EMPTY,
        scan: 0,
    };
}

/// A bi-directional ordered cursor over a [`Hat`]
///
/// Position with [`Self::start`] or [`Self::last`], then walk with
/// [`Self::next`] / [`Self::prev`]; read the current entry back through
/// [`Self::key`] and [`Self::slot`]. Order is byte-lexicographic over the
/// stored keys, with the radix-layer caveats described on [`Hat`]
pub struct HatCursor<'a> {
    hat: &'a Hat,
    levels: Vec<Level>,
    /// current root slot as a boot_level-digit base-128 number
    rootscan: usize,
    maxroot: usize,
    sort: Vec<SortEntry>,
    idx: usize,
    rng: SmallRng,
}

impl<'a> HatCursor<'a> {
    /// fixed quicksort pivot seed; any seed works, a fixed one keeps runs
    /// reproducible
    const PIVOT_SEED: u64 = 0x68617472;

    pub(crate) fn new(hat: &'a Hat) -> Self {
        let mut slf = Self {
            hat,
            levels: Vec::with_capacity(16),
            rootscan: 0,
            maxroot: hat.root_slots(),
            sort: Vec::with_capacity(hat.bucket_key_max()),
            idx: 0,
            rng: SmallRng::seed_from_u64(Self::PIVOT_SEED),
        };
        slf.levels.push(Level::ROOT);
        slf
    }
    /// Position at the least stored key `>=` the given key. Returns false
    /// when no such key exists
    pub fn start(&mut self, key: &[u8]) -> bool {
        self.reset();
        let mut off = 0;
        for _ in 0..self.hat.boot_level() {
            self.rootscan *= RADIX_FAN;
            if off < key.len() {
                self.rootscan += (key[off] & 0x7f) as usize;
                off += 1;
            }
        }
        let mut node = self.hat.root_slot(self.rootscan);
        if node.is_empty() {
            // placeholder level: next() pops it and resumes the root scan
            self.levels.push(Level::ROOT);
            return self.next();
        }
        let mut rest = &key[off..];
        // once the descent leaves the search key's own path, everything
        // below is greater and the remaining key stops mattering
        let mut diverged = false;
        loop {
            self.levels.push(Level { node, scan: 0 });
            if node.kind() != NodeKind::Radix {
                break;
            }
            let radix = unsafe {
                // UNSAFE(@ohsayan): tag checked by kind()
                RadixNode::from_ref(node)
            };
            let ch = if diverged {
                0
            } else {
                match rest.split_first() {
                    Some((&b, r)) => {
                        rest = r;
                        (b & 0x7f) as usize
                    }
                    None => 0,
                }
            };
            match radix.first_occupied(ch) {
                Some(c) => {
                    if c != ch {
                        diverged = true;
                    }
                    let top = self.levels.len() - 1;
                    self.levels[top].scan = c as u8;
                    node = radix.slot(c);
                }
                // this whole subtree is below the key; climb
                None => return self.next(),
            }
        }
        self.load_leaf(node);
        self.idx = 0;
        let want: &[u8] = if diverged { &[] } else { rest };
        self.position_at_least(want)
    }
    /// Position at the greatest stored key. Returns false on an empty
    /// structure
    pub fn last(&mut self) -> bool {
        self.reset();
        let mut i = self.maxroot;
        while i > 0 {
            i -= 1;
            let n = self.hat.root_slot(i);
            if n.is_empty() {
                continue;
            }
            self.rootscan = i;
            if self.descend_max(n) {
                return true;
            }
        }
        false
    }
    /// Advance to the next key in order. Returns false at the end of the
    /// structure (after which the cursor must be re-positioned)
    pub fn next(&mut self) -> bool {
        if self.idx + 1 < self.sort.len() {
            self.idx += 1;
            return true;
        }
        // leaf exhausted (or placeholder present): climb
        self.levels.pop();
        loop {
            let top = match self.levels.len().checked_sub(1) {
                Some(t) => t,
                None => {
                    self.sort.clear();
                    self.idx = 0;
                    return false;
                }
            };
            if top == 0 {
                let mut i = self.rootscan + 1;
                while i < self.maxroot {
                    let n = self.hat.root_slot(i);
                    if !n.is_empty() {
                        self.rootscan = i;
                        if self.descend_min(n) {
                            return true;
                        }
                    }
                    i += 1;
                }
            } else {
                let radix = unsafe {
                    // UNSAFE(@ohsayan): only radix levels are stacked below
                    // the leaf
                    RadixNode::from_ref(self.levels[top].node)
                };
                let mut i = self.levels[top].scan as usize + 1;
                while i < RADIX_FAN {
                    let n = radix.slot(i);
                    if !n.is_empty() {
                        self.levels[top].scan = i as u8;
                        if self.descend_min(n) {
                            return true;
                        }
                    }
                    i += 1;
                }
            }
            self.levels.pop();
        }
    }
    /// Step back to the previous key in order. Returns false at the
    /// beginning of the structure
    pub fn prev(&mut self) -> bool {
        if self.idx > 0 {
            self.idx -= 1;
            return true;
        }
        self.levels.pop();
        loop {
            let top = match self.levels.len().checked_sub(1) {
                Some(t) => t,
                None => {
                    self.sort.clear();
                    self.idx = 0;
                    return false;
                }
            };
            if top == 0 {
                let mut i = self.rootscan;
                while i > 0 {
                    i -= 1;
                    let n = self.hat.root_slot(i);
                    if !n.is_empty() {
                        self.rootscan = i;
                        if self.descend_max(n) {
                            return true;
                        }
                    }
                }
            } else {
                let radix = unsafe {
                    // UNSAFE(@ohsayan): only radix levels are stacked below
                    // the leaf
                    RadixNode::from_ref(self.levels[top].node)
                };
                let mut i = self.levels[top].scan as usize;
                while i > 0 {
                    i -= 1;
                    let n = radix.slot(i);
                    if !n.is_empty() {
                        self.levels[top].scan = i as u8;
                        if self.descend_max(n) {
                            return true;
                        }
                    }
                }
            }
            self.levels.pop();
        }
    }
    /// Reconstruct the key under the cursor. Radix-consumed positions come
    /// back as their low 7 bits, and zero bytes consumed by a radix or root
    /// level are elided (see [`Hat`])
    pub fn key(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.valid() {
            return out;
        }
        for d in (0..self.hat.boot_level() as usize).rev() {
            let ch = ((self.rootscan >> (d * 7)) & 0x7f) as u8;
            if ch != 0 {
                out.push(ch);
            }
        }
        let top = self.levels.len() - 1;
        for l in 1..top {
            let ch = self.levels[l].scan;
            if ch != 0 {
                out.push(ch);
            }
        }
        out.extend_from_slice(self.sort[self.idx].tail());
        out
    }
    /// Reconstruct the key into `buf`, truncating to its length; returns the
    /// number of bytes written
    pub fn key_into(&self, buf: &mut [u8]) -> usize {
        let k = self.key();
        let n = k.len().min(buf.len());
        buf[..n].copy_from_slice(&k[..n]);
        n
    }
    /// Aux bytes of the current entry (the empty slice when `aux = 0`)
    pub fn slot(&self) -> &[u8] {
        assert!(self.valid(), "cursor is not positioned on a key");
        unsafe {
            // UNSAFE(@ohsayan): entry pointers stay valid for the cursor's
            // lifetime
            slice::from_raw_parts(self.sort[self.idx].slot, self.hat.aux_len())
        }
    }
}

// internals
impl<'a> HatCursor<'a> {
    fn valid(&self) -> bool {
        self.levels.len() >= 2 && self.idx < self.sort.len()
    }
    fn reset(&mut self) {
        self.levels.clear();
        self.levels.push(Level::ROOT);
        self.rootscan = 0;
        self.sort.clear();
        self.idx = 0;
    }
    /// Advance within the sorted leaf past every entry strictly below
    /// `want`; falls over to the next leaf when this one is exhausted
    fn position_at_least(&mut self, want: &[u8]) -> bool {
        while self.idx < self.sort.len() {
            if self.sort[self.idx].tail() >= want {
                return true;
            }
            self.idx += 1;
        }
        self.next()
    }
    /// Descend least-first through any radix chain, then load and sort the
    /// leaf. False (with the stack restored) if the subtree held no keys
    fn descend_min(&mut self, node: NodeRef) -> bool {
        let depth = self.levels.len();
        let mut n = node;
        loop {
            self.levels.push(Level { node: n, scan: 0 });
            if n.kind() != NodeKind::Radix {
                break;
            }
            let radix = unsafe {
                // UNSAFE(@ohsayan): tag checked by kind()
                RadixNode::from_ref(n)
            };
            match radix.first_occupied(0) {
                Some(c) => {
                    let top = self.levels.len() - 1;
                    self.levels[top].scan = c as u8;
                    n = radix.slot(c);
                }
                None => {
                    debug_assert!(false, "logic, childless radix");
                    self.levels.truncate(depth);
                    return false;
                }
            }
        }
        self.load_leaf(n);
        self.idx = 0;
        if self.sort.is_empty() {
            self.levels.truncate(depth);
            return false;
        }
        true
    }
    /// Mirror of [`Self::descend_min`]: greatest-first descent, leaf loaded
    /// at its last entry
    fn descend_max(&mut self, node: NodeRef) -> bool {
        let depth = self.levels.len();
        let mut n = node;
        loop {
            self.levels.push(Level { node: n, scan: 0 });
            if n.kind() != NodeKind::Radix {
                break;
            }
            let radix = unsafe {
                // UNSAFE(@ohsayan): tag checked by kind()
                RadixNode::from_ref(n)
            };
            match radix.last_occupied(RADIX_FAN) {
                Some(c) => {
                    let top = self.levels.len() - 1;
                    self.levels[top].scan = c as u8;
                    n = radix.slot(c);
                }
                None => {
                    debug_assert!(false, "logic, childless radix");
                    self.levels.truncate(depth);
                    return false;
                }
            }
        }
        self.load_leaf(n);
        if self.sort.is_empty() {
            self.levels.truncate(depth);
            return false;
        }
        self.idx = self.sort.len() - 1;
        true
    }
    /// Strip every key of the leaf container into the scratch and sort it
    fn load_leaf(&mut self, node: NodeRef) {
        self.sort.clear();
        unsafe {
            // UNSAFE(@ohsayan): tags checked by kind() at every step
            match node.kind() {
                NodeKind::Array => self.strip_array(ArrayNode::from_ref(node)),
                NodeKind::Pail => self.strip_pail(PailNode::from_ref(node)),
                NodeKind::Bucket => {
                    let bucket = BucketNode::from_ref(node);
                    for i in 0..self.hat.bucket_slot_count() {
                        let child = bucket.slot(i);
                        if child.is_empty() {
                            continue;
                        }
                        match child.kind() {
                            NodeKind::Array => self.strip_array(ArrayNode::from_ref(child)),
                            NodeKind::Pail => self.strip_pail(PailNode::from_ref(child)),
                            _ => unreachable!("logic, bucket slot holding a {:?}", child.kind()),
                        }
                    }
                }
                NodeKind::Radix => unreachable!("logic, radix is not a leaf"),
            }
        }
        sort::qsort(&mut self.sort, 0, &mut self.rng);
    }
    unsafe fn strip_array(&mut self, arr: ArrayNode) {
        let size = self.hat.class_size(arr.class());
        let aux = self.hat.aux_len();
        for e in arr.scan() {
            self.sort.push(SortEntry {
                key: e.prefix,
                slot: arr.aux_at(e.idx, size, aux),
            });
        }
    }
    unsafe fn strip_pail(&mut self, pail: PailNode) {
        for i in 0..self.hat.pail_slot_count() {
            let child = pail.slot(i);
            if !child.is_empty() {
                self.strip_array(ArrayNode::from_ref(child));
            }
        }
    }
}
