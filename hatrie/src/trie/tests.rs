/*
 * Created on Wed Aug 20 2025
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
    super::{Hat, HatMetrics},
    crate::{config::HatConfig, error::HatError},
    rand::{rngs::SmallRng, Rng, SeedableRng},
    std::collections::HashSet,
};

#[cfg(not(miri))]
const SPAM_CNT: usize = 70_000;
#[cfg(miri)]
const SPAM_CNT: usize = 512;

fn open(boot_level: u8, aux: u8) -> Hat {
    Hat::open(HatConfig::new(boot_level, aux)).unwrap()
}

fn random_keys(count: usize, seed: u64) -> Vec<[u8; 8]> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut keys = HashSet::with_capacity(count);
    while keys.len() < count {
        let mut k = [0u8; 8];
        rng.fill(&mut k[..]);
        keys.insert(k);
    }
    keys.into_iter().collect()
}

#[test]
fn upsert_counters_and_slot_identity() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut hat = open(1, 4);
    let p1 = hat.cell(b"apple").unwrap().as_mut_ptr();
    let _ = hat.cell(b"banana").unwrap();
    let p3 = hat.cell(b"apple").unwrap().as_mut_ptr();
    assert_eq!(p1, p3);
    assert_eq!(
        hat.metrics(),
        HatMetrics {
            inserts: 2,
            found: 1
        }
    );
}

#[test]
fn insert_then_find_is_identity() {
    let mut hat = open(0, 4);
    hat.cell(b"k1").unwrap().copy_from_slice(&7u32.to_le_bytes());
    hat.cell(b"k2").unwrap().copy_from_slice(&9u32.to_le_bytes());
    assert_eq!(hat.find(b"k1").unwrap(), 7u32.to_le_bytes());
    assert_eq!(hat.find(b"k2").unwrap(), 9u32.to_le_bytes());
    assert!(hat.find(b"k3").is_none());
}

#[test]
fn fresh_slots_are_zeroed() {
    let mut hat = open(0, 16);
    assert!(hat.cell(b"zero").unwrap().iter().all(|&b| b == 0));
}

#[test]
fn empty_key() {
    for boot in [0u8, 1, 3] {
        let mut hat = open(boot, 4);
        hat.cell(b"").unwrap().copy_from_slice(&42u32.to_le_bytes());
        assert_eq!(hat.find(b"").unwrap(), 42u32.to_le_bytes());
    }
}

#[test]
fn set_mode() {
    // aux = 0 degrades the structure to a set: hits come back as the empty
    // slice, misses as None
    let mut hat = open(0, 0);
    assert!(hat.cell(b"member").unwrap().is_empty());
    assert_eq!(hat.find(b"member").unwrap(), &[] as &[u8]);
    assert!(hat.find(b"stranger").is_none());
    let _ = hat.cell(b"member").unwrap();
    assert_eq!(
        hat.metrics(),
        HatMetrics {
            inserts: 1,
            found: 1
        }
    );
}

#[test]
fn widest_aux() {
    let mut hat = open(0, 255);
    let fill: Vec<u8> = (0..255u8).map(|i| i ^ 0x5a).collect();
    hat.cell(b"wide").unwrap().copy_from_slice(&fill);
    assert_eq!(hat.find(b"wide").unwrap(), &fill[..]);
}

#[test]
fn prefix_boundary_lengths() {
    let mut hat = open(0, 4);
    for (i, len) in [126usize, 127, 128, 129].into_iter().enumerate() {
        let key = vec![b'x'; len];
        hat.cell(&key)
            .unwrap()
            .copy_from_slice(&(i as u32).to_le_bytes());
    }
    for (i, len) in [126usize, 127, 128, 129].into_iter().enumerate() {
        let key = vec![b'x'; len];
        assert_eq!(hat.find(&key).unwrap(), (i as u32).to_le_bytes());
    }
}

#[test]
fn key_too_long() {
    let mut hat = open(0, 0);
    let key = vec![b'a'; crate::node::KEY_MAX + 1];
    assert_eq!(hat.cell(&key), Err(HatError::KeyTooLong));
    assert!(hat.find(&key).is_none());
}

#[test]
fn largest_class_bounds_key_size() {
    // with the default 512 B top class and no aux, 506 key bytes (plus the
    // 2 byte prefix and 4 byte header) fit exactly; 507 cannot be placed
    let mut hat = open(0, 0);
    assert!(hat.cell(&vec![b'a'; 506]).is_ok());
    assert_eq!(hat.cell(&vec![b'b'; 507]), Err(HatError::KeyOversize));
    assert_eq!(hat.metrics().inserts, 1);
}

#[test]
fn custom_classes_hold_the_longest_key() {
    let mut hat = Hat::open(HatConfig {
        array_classes: vec![16, 512, 33008],
        ..HatConfig::default()
    })
    .unwrap();
    let key = vec![0x42u8; crate::node::KEY_MAX];
    assert!(hat.cell(&key).is_ok());
    assert!(hat.find(&key).is_some());
}

#[test]
fn spam_random_keys() {
    // SPAM_CNT crosses the default bucket burst threshold, so this also
    // drives the bucket -> radix decomposition at the root
    let mut hat = open(0, 4);
    let keys = random_keys(SPAM_CNT, 0xbadc0de);
    for (i, k) in keys.iter().enumerate() {
        hat.cell(k).unwrap().copy_from_slice(&(i as u32).to_le_bytes());
    }
    assert_eq!(hat.metrics().inserts, SPAM_CNT as u64);
    assert_eq!(hat.metrics().found, 0);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(hat.find(k).unwrap(), (i as u32).to_le_bytes(), "key #{i}");
    }
}

#[test]
fn reinsert_preserves_aux() {
    let mut hat = open(0, 4);
    let keys = random_keys(2048, 7);
    for (i, k) in keys.iter().enumerate() {
        hat.cell(k).unwrap().copy_from_slice(&(i as u32).to_le_bytes());
    }
    for (i, k) in keys.iter().enumerate() {
        // second upsert must land on the live slot
        assert_eq!(hat.cell(k).unwrap(), (i as u32).to_le_bytes());
    }
    assert_eq!(hat.metrics().found, 2048);
}

#[test]
fn burst_cascade_under_tiny_geometry() {
    // small moduli and a tiny class table force every reshape: promotion,
    // pail burst, bucket burst and nested radix layers
    let mut hat = Hat::open(HatConfig {
        bucket_slots: 13,
        bucket_max: 8,
        pail_slots: 5,
        array_classes: vec![16, 32],
        ..HatConfig::default()
    })
    .unwrap();
    let keys: Vec<Vec<u8>> = (0..1500u32).map(|i| i.to_string().into_bytes()).collect();
    for k in &keys {
        hat.cell(k).unwrap();
    }
    assert_eq!(hat.metrics().inserts, 1500);
    for k in &keys {
        assert!(hat.find(k).is_some(), "lost {:?}", k);
    }
    // bursts must leave radix nodes behind
    assert!(hat.node_census()[0] > 0);
}

#[test]
fn boot_levels_agree() {
    let keys = random_keys(500, 99);
    for boot in [0u8, 1, 3] {
        let mut hat = open(boot, 4);
        for (i, k) in keys.iter().enumerate() {
            hat.cell(k).unwrap().copy_from_slice(&(i as u32).to_le_bytes());
        }
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(hat.find(k).unwrap(), (i as u32).to_le_bytes());
        }
    }
}

#[test]
fn caller_data_blocks() {
    let mut hat = open(0, 0);
    let block = hat.data(24);
    unsafe {
        let bytes = core::slice::from_raw_parts_mut(block.as_ptr(), 24);
        assert!(bytes.iter().all(|&b| b == 0));
        bytes[0] = 0xee;
        bytes[23] = 0xff;
    }
    // arena blocks never move, even across structural churn
    for i in 0..512u32 {
        hat.cell(&i.to_le_bytes()).unwrap();
    }
    unsafe {
        let bytes = core::slice::from_raw_parts(block.as_ptr(), 24);
        assert_eq!(bytes[0], 0xee);
        assert_eq!(bytes[23], 0xff);
    }
}

#[test]
fn census() {
    let hat = open(0, 0);
    let census = hat.node_census();
    // a zero boot level primes the root with one bucket
    assert_eq!(census[1], 1);
    assert!(census[0] == 0 && census[3] == 0);
    let hat = open(2, 0);
    assert!(hat.node_census().iter().all(|&c| c == 0));
    assert!(hat.allocated_bytes() > 0);
}

#[test]
fn config_validation() {
    assert_eq!(
        Hat::open(HatConfig {
            boot_level: 5,
            ..HatConfig::default()
        })
        .unwrap_err(),
        HatError::BootLevelTooLarge
    );
    assert_eq!(
        Hat::open(HatConfig {
            bucket_slots: 0,
            ..HatConfig::default()
        })
        .unwrap_err(),
        HatError::BadBucketGeometry
    );
    for classes in [vec![], vec![16, 16], vec![32, 16], vec![24]] {
        assert_eq!(
            Hat::open(HatConfig {
                array_classes: classes,
                ..HatConfig::default()
            })
            .unwrap_err(),
            HatError::BadArrayClasses
        );
    }
    // pails may be disabled outright
    assert!(Hat::open(HatConfig {
        pail_slots: 0,
        ..HatConfig::default()
    })
    .is_ok());
}

#[test]
fn pail_free_overflow_path() {
    // with pails disabled, a full array under a bucket charges the bucket
    let mut hat = Hat::open(HatConfig {
        pail_slots: 0,
        bucket_slots: 3,
        array_classes: vec![16, 32],
        ..HatConfig::default()
    })
    .unwrap();
    let keys = random_keys(800, 3);
    for k in &keys {
        hat.cell(k).unwrap();
    }
    for k in &keys {
        assert!(hat.find(k).is_some());
    }
    assert_eq!(hat.node_census()[3], 0);
}
