/*
 * Created on Mon Sep 15 2025
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
    crate::{config::HatConfig, trie::Hat},
    rand::{rngs::SmallRng, Rng, SeedableRng},
    std::collections::HashSet,
};

#[cfg(not(miri))]
const CORPUS_CNT: usize = 100_000;
#[cfg(miri)]
const CORPUS_CNT: usize = 256;
#[cfg(not(miri))]
const SPAM_CNT: usize = 70_000;
#[cfg(miri)]
const SPAM_CNT: usize = 512;

fn open(boot_level: u8, aux: u8) -> Hat {
    Hat::open(HatConfig::new(boot_level, aux)).unwrap()
}

fn fill(hat: &mut Hat, keys: &[&[u8]]) {
    for k in keys {
        hat.cell(k).unwrap();
    }
}

fn ascending(hat: &Hat) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut cur = hat.cursor();
    if cur.start(b"") {
        loop {
            out.push(cur.key());
            if !cur.next() {
                break;
            }
        }
    }
    out
}

fn descending(hat: &Hat) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut cur = hat.cursor();
    if cur.last() {
        loop {
            out.push(cur.key());
            if !cur.prev() {
                break;
            }
        }
    }
    out
}

/// distinct pseudo-words over a-z, 2..=12 bytes
fn words(count: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut set = HashSet::with_capacity(count);
    while set.len() < count {
        let len = rng.gen_range(2..=12usize);
        let w: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
        set.insert(w);
    }
    set.into_iter().collect()
}

/// distinct 8 byte keys over 1..=127 per position: 7-bit clean with no zero
/// bytes, so radix layers reconstruct them exactly
fn clean_binary_keys(count: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut set = HashSet::with_capacity(count);
    while set.len() < count {
        let mut k = [0u8; 8];
        for b in k.iter_mut() {
            *b = rng.gen_range(1..=127u8);
        }
        set.insert(k.to_vec());
    }
    set.into_iter().collect()
}

#[test]
fn ascending_with_empty_key() {
    let mut hat = open(0, 0);
    fill(&mut hat, &[b"a".as_slice(), b"b".as_slice(), b"".as_slice()]);
    assert_eq!(ascending(&hat), [b"".to_vec(), b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn fanned_root_order() {
    let mut hat = open(2, 8);
    fill(
        &mut hat,
        &[
            b"abc".as_slice(),
            b"aaa".as_slice(),
            b"abb".as_slice(),
            b"aac".as_slice(),
            b"aba".as_slice(),
            b"aab".as_slice(),
        ],
    );
    let expect = vec![
        b"aaa".to_vec(),
        b"aab".to_vec(),
        b"aac".to_vec(),
        b"aba".to_vec(),
        b"abb".to_vec(),
        b"abc".to_vec(),
    ];
    assert_eq!(ascending(&hat), expect);
    let mut back = descending(&hat);
    back.reverse();
    assert_eq!(back, expect);
}

#[test]
fn binary_keys_under_deep_root() {
    let mut hat = open(3, 0);
    fill(
        &mut hat,
        &[b"\x01\x02\x03\x04".as_slice(), b"\x01\x02\x03\x05".as_slice()],
    );
    assert_eq!(
        ascending(&hat),
        [b"\x01\x02\x03\x04".to_vec(), b"\x01\x02\x03\x05".to_vec()]
    );
}

#[test]
fn forward_equals_backward() {
    let mut hat = open(1, 4);
    let keys = words(5_000, 21);
    for k in &keys {
        hat.cell(k).unwrap();
    }
    let fwd = ascending(&hat);
    let mut expect = keys.clone();
    expect.sort();
    assert_eq!(fwd, expect);
    let mut back = descending(&hat);
    back.reverse();
    assert_eq!(back, fwd);
}

#[test]
fn word_corpus_roundtrip() {
    let mut hat = open(0, 0);
    let keys = words(CORPUS_CNT, 0x5eed);
    for k in &keys {
        hat.cell(k).unwrap();
    }
    for k in &keys {
        assert!(hat.find(k).is_some());
    }
    let mut expect = keys.clone();
    expect.sort();
    assert_eq!(ascending(&hat), expect);
}

#[test]
fn spam_ordered_iteration() {
    // crosses the bucket burst threshold, so ordered traversal has to walk
    // radix layers and per-slot leaves alike
    let mut hat = open(0, 4);
    let keys = clean_binary_keys(SPAM_CNT, 0xfeed);
    for (i, k) in keys.iter().enumerate() {
        hat.cell(k).unwrap().copy_from_slice(&(i as u32).to_le_bytes());
    }
    let mut expect = keys.clone();
    expect.sort();
    assert_eq!(ascending(&hat), expect);
}

#[test]
fn start_positions_at_least() {
    for boot in [0u8, 1] {
        let mut hat = open(boot, 0);
        fill(&mut hat, &[b"apple".as_slice(), b"cherry".as_slice()]);
        let mut cur = hat.cursor();
        // between two stored keys: land on the greater one, even within the
        // same leaf
        assert!(cur.start(b"banana"));
        assert_eq!(cur.key(), b"cherry");
        // exact hit
        assert!(cur.start(b"apple"));
        assert_eq!(cur.key(), b"apple");
        // a prefix is below its extensions
        assert!(cur.start(b"app"));
        assert_eq!(cur.key(), b"apple");
        // past the end
        assert!(!cur.start(b"cherryz"));
        // from the very beginning
        assert!(cur.start(b""));
        assert_eq!(cur.key(), b"apple");
    }
}

#[test]
fn start_after_reseek() {
    let mut hat = open(1, 0);
    fill(
        &mut hat,
        &[b"alpha".as_slice(), b"beta".as_slice(), b"gamma".as_slice()],
    );
    let mut cur = hat.cursor();
    assert!(cur.start(b"b"));
    assert_eq!(cur.key(), b"beta");
    // cursors are re-armable: a fresh start fully resets the scan state
    assert!(cur.start(b"b"));
    assert_eq!(cur.key(), b"beta");
    assert!(cur.start(b""));
    assert_eq!(cur.key(), b"alpha");
}

#[test]
fn empty_structure() {
    for boot in [0u8, 2] {
        let hat = open(boot, 0);
        let mut cur = hat.cursor();
        assert!(!cur.start(b""));
        let mut cur = hat.cursor();
        assert!(!cur.last());
    }
}

#[test]
fn long_key_reconstruction() {
    let mut hat = open(0, 0);
    let keys: Vec<Vec<u8>> = [126usize, 127, 128, 129]
        .into_iter()
        .map(|len| vec![b'k'; len])
        .collect();
    for k in &keys {
        hat.cell(k).unwrap();
    }
    assert_eq!(ascending(&hat), keys);
    // truncating reconstruction
    let mut cur = hat.cursor();
    assert!(cur.start(b""));
    let mut buf = [0u8; 10];
    assert_eq!(cur.key_into(&mut buf), 10);
    assert_eq!(buf, [b'k'; 10]);
    let mut big = [0u8; 256];
    assert_eq!(cur.key_into(&mut big), 126);
}

#[test]
fn slot_reads_aux() {
    let mut hat = open(1, 4);
    let keys = words(64, 5);
    for (i, k) in keys.iter().enumerate() {
        hat.cell(k).unwrap().copy_from_slice(&(i as u32).to_le_bytes());
    }
    let mut cur = hat.cursor();
    assert!(cur.start(b""));
    let mut seen = 0;
    loop {
        let k = cur.key();
        let i = keys.iter().position(|x| *x == k).unwrap();
        assert_eq!(cur.slot(), (i as u32).to_le_bytes());
        seen += 1;
        if !cur.next() {
            break;
        }
    }
    assert_eq!(seen, keys.len());
}

#[test]
fn next_prev_interleave() {
    let mut hat = open(0, 0);
    fill(
        &mut hat,
        &[
            b"one".as_slice(),
            b"two".as_slice(),
            b"three".as_slice(),
            b"four".as_slice(),
        ],
    );
    let mut cur = hat.cursor();
    assert!(cur.start(b""));
    assert_eq!(cur.key(), b"four");
    assert!(cur.next());
    assert_eq!(cur.key(), b"one");
    assert!(cur.next());
    assert_eq!(cur.key(), b"three");
    assert!(cur.prev());
    assert_eq!(cur.key(), b"one");
    assert!(cur.prev());
    assert_eq!(cur.key(), b"four");
    assert!(!cur.prev());
}

#[test]
fn zero_bytes_elide_in_reconstruction() {
    // a zero byte consumed by a root (or radix) level does not round-trip
    // through key(); the key itself remains findable
    let mut hat = open(1, 0);
    fill(&mut hat, &[b"\x00q".as_slice()]);
    assert!(hat.find(b"\x00q").is_some());
    let mut cur = hat.cursor();
    assert!(cur.start(b""));
    assert_eq!(cur.key(), b"q");
}

#[test]
fn single_bucket_leaf_sorts_in_place() {
    // everything below the burst threshold lives in one bucket leaf, so the
    // whole order comes from the cursor's ternary quicksort
    let mut hat = open(0, 0);
    let keys: Vec<Vec<u8>> = (0..1000u32).map(|i| i.to_string().into_bytes()).collect();
    for k in &keys {
        hat.cell(k).unwrap();
    }
    let mut expect = keys.clone();
    expect.sort();
    assert_eq!(ascending(&hat), expect);
}

mod tsort {
    use {
        super::super::{sort::qsort, SortEntry},
        crate::node::{encode_len, len_prefix},
        rand::{rngs::SmallRng, Rng, SeedableRng},
        std::collections::HashSet,
    };

    /// materialize prefixed key buffers and scratch entries over them
    fn mkentries(keys: &[Vec<u8>]) -> (Vec<Vec<u8>>, Vec<SortEntry>) {
        let bufs: Vec<Vec<u8>> = keys
            .iter()
            .map(|k| {
                let skip = len_prefix(k.len());
                let mut b = vec![0u8; skip + k.len()];
                unsafe {
                    // UNSAFE(@ohsayan): buffer sized for prefix + key
                    encode_len(b.as_mut_ptr(), k.len());
                }
                b[skip..].copy_from_slice(k);
                b
            })
            .collect();
        let entries = bufs
            .iter()
            .map(|b| SortEntry {
                key: b.as_ptr(),
                slot: b.as_ptr(),
            })
            .collect();
        (bufs, entries)
    }

    fn check(mut keys: Vec<Vec<u8>>) {
        let (_bufs, mut entries) = mkentries(&keys);
        let mut rng = SmallRng::seed_from_u64(11);
        qsort(&mut entries, 0, &mut rng);
        let got: Vec<Vec<u8>> = entries.iter().map(|e| e.tail().to_vec()).collect();
        keys.sort();
        assert_eq!(got, keys);
    }

    #[test]
    fn small_windows() {
        check(vec![]);
        check(vec![b"solo".to_vec()]);
        check(vec![
            b"b".to_vec(),
            b"a".to_vec(),
            b"".to_vec(),
            b"ab".to_vec(),
        ]);
    }
    #[test]
    fn random_distinct_keys() {
        let mut rng = SmallRng::seed_from_u64(0xab);
        let mut set = HashSet::new();
        while set.len() < 64 {
            let len = rng.gen_range(0..20usize);
            let k: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();
            set.insert(k);
        }
        check(set.into_iter().collect());
    }
    #[test]
    fn shared_prefixes_and_lengths() {
        check(vec![
            b"prefix".to_vec(),
            b"prefixa".to_vec(),
            b"prefixb".to_vec(),
            b"prefi".to_vec(),
            b"pref".to_vec(),
            b"prefix0".to_vec(),
            b"prefixaa".to_vec(),
            b"prefixab".to_vec(),
            b"prefixba".to_vec(),
            b"prefixbb".to_vec(),
            b"prefixc".to_vec(),
            b"prefixd".to_vec(),
        ]);
    }
    #[test]
    fn zero_byte_runs() {
        // "ab", "ab\0", "ab\0\0", ...: every pair collides at every depth
        // until one of them ends, which is exactly the case the equal-run
        // parking handles
        let mut keys: Vec<Vec<u8>> = (0..12)
            .map(|i| {
                let mut k = b"ab".to_vec();
                k.extend(std::iter::repeat(0u8).take(i));
                k
            })
            .collect();
        keys.push(b"ab\x00z".to_vec());
        keys.push(b"aa".to_vec());
        check(keys);
    }
    #[test]
    fn long_keys_decode_their_prefix() {
        let keys: Vec<Vec<u8>> = (0..16)
            .map(|i| {
                let mut k = vec![b'p'; 120 + i * 2];
                k.push(b'a' + i as u8);
                k
            })
            .collect();
        check(keys);
    }
}
