/*
 * Created on Wed Sep 10 2025
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
    super::SortEntry,
    rand::{rngs::SmallRng, Rng},
};

/*
    Ternary string quicksort over the cursor scratch, after Sedgewick's
    "Quicksort with 3-way partitioning": pick a random pivot entry, take its
    byte at the current depth (0 once a key has ended), split into <, = and
    > runs, recurse on the strict runs at the same depth and iterate on the
    equal run one byte deeper. Small windows fall back to a byte-wise
    insertion sort, which also resolves prefix ties by length.

    One wrinkle: at any depth there can be at most one key that ends exactly
    there (keys are unique), and byte-wise comparison cannot tell it apart
    from its zero-byte siblings in the equal run. It is smaller than all of
    them, so it is parked at the front of the run before descending.
*/

/// windows at or below this size are insertion sorted
const INSERTION_AT: usize = 10;

pub(super) fn qsort(x: &mut [SortEntry], depth: usize, rng: &mut SmallRng) {
    let mut win: &mut [SortEntry] = x;
    let mut depth = depth;
    loop {
        let n = win.len();
        if n <= INSERTION_AT {
            isort(win, depth);
            return;
        }
        let r = rng.gen_range(0..n);
        win.swap(0, r);
        let pivot = win[0].byte_at(depth);
        let (mut a, mut b) = (1i64, 1i64);
        let (mut c, mut d) = ((n - 1) as i64, (n - 1) as i64);
        loop {
            while b <= c {
                let ch = win[b as usize].byte_at(depth);
                if ch > pivot {
                    break;
                }
                if ch == pivot {
                    win.swap(a as usize, b as usize);
                    a += 1;
                }
                b += 1;
            }
            while b <= c {
                let ch = win[c as usize].byte_at(depth);
                if ch < pivot {
                    break;
                }
                if ch == pivot {
                    win.swap(c as usize, d as usize);
                    d -= 1;
                }
                c -= 1;
            }
            if b > c {
                break;
            }
            win.swap(b as usize, c as usize);
            b += 1;
            c -= 1;
        }
        let (a, b, c, d) = (a as usize, b as usize, c as usize, d as usize);
        // fold the equal runs from both ends into the middle
        let r = a.min(b - a);
        vecswap(win, 0, b - r, r);
        let r = (d - c).min(n - 1 - d);
        vecswap(win, b, n - r, r);
        let lt = b - a;
        let gt = d - c;
        let eq = n - lt - gt;
        let w = win;
        let (head, rest) = w.split_at_mut(lt);
        let (mid, tail) = rest.split_at_mut(eq);
        if !tail.is_empty() {
            qsort(tail, depth, rng);
        }
        if !head.is_empty() {
            qsort(head, depth, rng);
        }
        if mid.len() <= 1 {
            return;
        }
        // park the key (if any) that ends at this depth; it precedes every
        // longer key sharing the prefix
        let skip = match (0..mid.len()).find(|&i| mid[i].key_len() == depth) {
            Some(i) => {
                mid.swap(0, i);
                1
            }
            None => 0,
        };
        if mid.len() - skip <= 1 {
            return;
        }
        win = &mut mid[skip..];
        depth += 1;
    }
}

fn isort(x: &mut [SortEntry], depth: usize) {
    let n = x.len();
    let mut a = 1;
    while a < n {
        let mut b = a;
        while b > 0 {
            let k1 = x[b - 1].tail();
            let k2 = x[b].tail();
            let s1 = &k1[depth.min(k1.len())..];
            let s2 = &k2[depth.min(k2.len())..];
            if s1 <= s2 {
                break;
            }
            x.swap(b - 1, b);
            b -= 1;
        }
        a += 1;
    }
}

fn vecswap(x: &mut [SortEntry], mut i: usize, mut j: usize, mut n: usize) {
    while n > 0 {
        x.swap(i, j);
        i += 1;
        j += 1;
        n -= 1;
    }
}
