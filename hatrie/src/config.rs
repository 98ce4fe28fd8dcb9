/*
 * Created on Tue Jul 15 2025
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
    crate::{
        error::{HatError, HatResult},
        mem::{MAX_NODE_BYTES, WORD},
        node::RADIX_FAN,
    },
    core::mem,
};

/// granularity of the array class table
pub const CLASS_GRAIN: u32 = 16;
/// the class table may hold at most this many entries
pub const CLASS_TABLE_MAX: usize = 28;
/// upper bound on cascaded root radix levels (128^4 slots is already 2 GiB
/// of root table on 64-bit; anything beyond that is a config bug)
pub const BOOT_LEVEL_MAX: u8 = 4;

const DEF_BUCKET_SLOTS: u32 = 2047;
const DEF_BUCKET_MAX: u32 = 65536;
const DEF_PAIL_SLOTS: u32 = 127;
const DEF_ARRAY_CLASSES: [u32; 12] = [16, 32, 48, 64, 96, 128, 160, 192, 224, 256, 384, 512];

/// Construction-time tunables for a [`crate::Hat`]
///
/// The defaults mirror the shape the structure was designed around: a 2047
/// slot bucket hash bursting at 65536 keys, 127 slot pails and twelve array
/// classes from 16 B to 512 B. `pail_slots = 0` disables the pail overflow
/// stage entirely (a full array under a bucket then bursts the bucket)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HatConfig {
    /// cascaded 128-way root levels fused into one flat table; level 0
    /// primes the root with a single bucket
    pub boot_level: u8,
    /// opaque payload bytes carried per key; 0 turns the structure into a set
    pub aux: u8,
    /// modulus of the bucket open hash
    pub bucket_slots: u32,
    /// keys a bucket may hold before bursting into a radix
    pub bucket_max: u32,
    /// modulus of the pail open hash
    pub pail_slots: u32,
    /// ascending array node sizes in bytes, each a multiple of [`CLASS_GRAIN`]
    pub array_classes: Vec<u32>,
}

impl HatConfig {
    pub fn new(boot_level: u8, aux: u8) -> Self {
        Self {
            boot_level,
            aux,
            ..Self::default()
        }
    }
    pub fn validate(&self) -> HatResult<()> {
        if self.boot_level > BOOT_LEVEL_MAX {
            return Err(HatError::BootLevelTooLarge);
        }
        if self.bucket_slots == 0
            || self.bucket_max == 0
            || WORD * (1 + self.bucket_slots as usize) > MAX_NODE_BYTES
        {
            return Err(HatError::BadBucketGeometry);
        }
        if WORD * self.pail_slots as usize > MAX_NODE_BYTES {
            return Err(HatError::BadPailGeometry);
        }
        let classes = &self.array_classes;
        let well_formed = !classes.is_empty()
            && classes.len() <= CLASS_TABLE_MAX
            && classes.windows(2).all(|w| w[0] < w[1])
            && classes
                .iter()
                .all(|&c| c >= CLASS_GRAIN && c % CLASS_GRAIN == 0 && c as usize <= MAX_NODE_BYTES);
        if !well_formed {
            return Err(HatError::BadArrayClasses);
        }
        Ok(())
    }
    /// Resolve the per-class node byte sizes, indexed by class. Classes 0, 1
    /// and 3 are the radix, bucket and pail nodes; class 2 is the bare array
    /// tag (arrays are sized by their own class indices from 4 up)
    pub(crate) fn node_sizes(&self) -> Box<[usize]> {
        let mut sizes = Vec::with_capacity(4 + self.array_classes.len());
        sizes.push(RADIX_FAN * WORD);
        sizes.push(WORD * (1 + self.bucket_slots as usize));
        sizes.push(0);
        sizes.push(WORD * self.pail_slots as usize);
        sizes.extend(self.array_classes.iter().map(|&c| c as usize));
        sizes.into_boxed_slice()
    }
}

impl Default for HatConfig {
    fn default() -> Self {
        Self {
            boot_level: 0,
            aux: 0,
            bucket_slots: DEF_BUCKET_SLOTS,
            bucket_max: DEF_BUCKET_MAX,
            pail_slots: DEF_PAIL_SLOTS,
            array_classes: DEF_ARRAY_CLASSES.to_vec(),
        }
    }
}

// the bucket count word shares the slot array's alignment
assertions!(mem::align_of::<usize>() <= WORD);
