/*
 * Created on Fri Jul 18 2025
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

mod word;

pub use word::NodeRef;

use {
    core::{alloc::Layout, mem, ptr},
    log::trace,
    std::alloc::{alloc, dealloc},
};

/// native word size; every tagged reference is one of these
pub const WORD: usize = mem::size_of::<usize>();
/// allocation granularity; leaves the tag bits of every block address free
pub const ALIGN: usize = 8;
/// raw bytes per segment: room for a worst-case bucket table plus the header
const SEG_SIZE: usize = 65536 * WORD + 32;
/// the largest node any configuration may ask for
pub const MAX_NODE_BYTES: usize = SEG_SIZE - mem::size_of::<Segment>();

assertions! {
    ALIGN.is_power_of_two(),
    ALIGN >= (1 << NodeRef::TAG_BITS),
    mem::size_of::<Segment>() % ALIGN == 0,
}

#[inline(always)]
const fn round_up(amt: usize) -> usize {
    (amt + (ALIGN - 1)) & !(ALIGN - 1)
}

#[repr(C)]
struct Segment {
    /// previously filled segment (owned)
    prev: *mut Segment,
    /// offset of the next free byte in this segment
    next: usize,
}

impl Segment {
    const LAYOUT: Layout = unsafe {
        // UNSAFE(@ohsayan): size nonzero, align a power of two
        Layout::from_size_align_unchecked(SEG_SIZE, ALIGN)
    };
}

/*
    The arena owns every node in the structure. Nodes are carved out of large
    fixed segments with a bump pointer; a segment is never returned to the
    system before the arena itself dies. Destroyed nodes instead go onto a
    per-class reuse list threaded through the first word of the dead block,
    and allocation always tries that list first. Every block handed out is
    zeroed and starts on an ALIGN boundary.
*/

#[derive(Debug)]
pub struct Arena {
    head: *mut Segment,
    reuse: Box<[*mut u8]>,
    counts: Box<[usize]>,
    sizes: Box<[usize]>,
    seg_bytes: usize,
}

impl Arena {
    pub fn new(sizes: Box<[usize]>) -> Self {
        let classes = sizes.len();
        let mut slf = Self {
            head: ptr::null_mut(),
            reuse: vec![ptr::null_mut(); classes].into_boxed_slice(),
            counts: vec![0; classes].into_boxed_slice(),
            sizes,
            seg_bytes: 0,
        };
        slf.grow();
        slf
    }
    /// byte size of the given node class (0 for the bare array tag; real
    /// arrays are sized by their class index)
    #[inline(always)]
    pub fn size_of(&self, class: u8) -> usize {
        self.sizes[class as usize]
    }
    #[inline(always)]
    pub fn live(&self, class: u8) -> usize {
        self.counts[class as usize]
    }
    #[inline(always)]
    pub fn classes(&self) -> usize {
        self.sizes.len()
    }
    /// total bytes requested from the system so far
    #[inline(always)]
    pub fn allocated_bytes(&self) -> usize {
        self.seg_bytes
    }
    /// Allocate a zeroed node of the given class
    pub fn alloc(&mut self, class: u8) -> *mut u8 {
        let amt = round_up(self.size_of(class));
        self.counts[class as usize] += 1;
        let block = self.reuse[class as usize];
        if !block.is_null() {
            unsafe {
                // UNSAFE(@ohsayan): the reuse list threads through the first
                // word of each dead block and every entry was once a valid
                // block of exactly this class
                self.reuse[class as usize] = *(block as *mut *mut u8);
                ptr::write_bytes(block, 0, amt);
            }
            return block;
        }
        self.bump(amt)
    }
    /// Allocate a zeroed untyped block for caller-side data. It lives until
    /// the arena is dropped; there is no way to return it early
    pub fn alloc_data(&mut self, amt: usize) -> ptr::NonNull<u8> {
        let block = self.bump(round_up(amt.max(1)));
        unsafe {
            // UNSAFE(@ohsayan): bump never returns null
            ptr::NonNull::new_unchecked(block)
        }
    }
    /// Return a dead node to its class reuse list. The block must have come
    /// from [`Self::alloc`] with the same class and must be unreachable
    pub unsafe fn free(&mut self, block: *mut u8, class: u8) {
        *(block as *mut *mut u8) = self.reuse[class as usize];
        self.reuse[class as usize] = block;
        self.counts[class as usize] -= 1;
    }
    fn bump(&mut self, amt: usize) -> *mut u8 {
        debug_assert_eq!(amt % ALIGN, 0);
        assert!(amt <= MAX_NODE_BYTES, "block exceeds segment capacity");
        unsafe {
            // UNSAFE(@ohsayan): head is always a live segment and next is
            // maintained below SEG_SIZE
            if (*self.head).next + amt > SEG_SIZE {
                self.grow();
            }
            let block = (self.head as *mut u8).add((*self.head).next);
            (*self.head).next += amt;
            ptr::write_bytes(block, 0, amt);
            block
        }
    }
    fn grow(&mut self) {
        let seg = unsafe {
            // UNSAFE(@ohsayan): nonzero, sane layout
            alloc(Segment::LAYOUT)
        } as *mut Segment;
        assert!(!seg.is_null(), "out of memory");
        unsafe {
            // UNSAFE(@ohsayan): fresh block of at least header size
            (*seg).prev = self.head;
            (*seg).next = mem::size_of::<Segment>();
        }
        self.head = seg;
        self.seg_bytes += SEG_SIZE;
        trace!("arena grew to {} bytes", self.seg_bytes);
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        let mut seg = self.head;
        while !seg.is_null() {
            let prev = unsafe {
                // UNSAFE(@ohsayan): live segment chain
                (*seg).prev
            };
            unsafe {
                // UNSAFE(@ohsayan): allocated with the same layout
                dealloc(seg as *mut u8, Segment::LAYOUT)
            }
            seg = prev;
        }
    }
}
