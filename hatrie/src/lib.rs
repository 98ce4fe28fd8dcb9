/*
 * Created on Mon Jul 14 2025
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

//! # Hatrie
//!
//! An in-memory, ordered index over byte-string keys: a hybrid of a
//! top-level radix tree and bursting hash containers holding compact linear
//! arrays of short keys. Lookup and insert run at hash-table speeds; a
//! cursor walks the whole key set (or any suffix of it) in
//! byte-lexicographic order, forward or backward.
//!
//! ```
//! use hatrie::{Hat, HatConfig};
//!
//! let mut hat = Hat::open(HatConfig::new(1, 4)).unwrap();
//! hat.cell(b"apple").unwrap().copy_from_slice(&7u32.to_le_bytes());
//! hat.cell(b"banana").unwrap().copy_from_slice(&9u32.to_le_bytes());
//! assert_eq!(hat.find(b"apple").unwrap(), 7u32.to_le_bytes());
//!
//! let mut cur = hat.cursor();
//! assert!(cur.start(b""));
//! assert_eq!(cur.key(), b"apple");
//! assert!(cur.next());
//! assert_eq!(cur.key(), b"banana");
//! assert!(!cur.next());
//! ```
//!
//! The structure is single-writer: every mutating call takes `&mut self`,
//! and the borrows returned by [`Hat::cell`] and held by [`HatCursor`]
//! encode the fact that any insert may relocate keys and aux slots. Wrap a
//! [`Hat`] in [`SharedHat`] for the usual readers-or-one-writer setup.

#![deny(unreachable_patterns)]

#[macro_use]
mod macros;
mod config;
mod cursor;
mod error;
mod mem;
mod node;
mod trie;

pub use {
    config::HatConfig,
    cursor::HatCursor,
    error::{HatError, HatResult},
    node::KEY_MAX,
    trie::{shared::SharedHat, Hat, HatMetrics},
};
