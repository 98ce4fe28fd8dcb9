/*
 * Created on Tue Aug 12 2025
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
    super::Hat,
    crate::{config::HatConfig, error::HatResult},
    parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    std::sync::Arc,
};

/// A [`Hat`] behind the external lock its concurrency model calls for:
/// any number of concurrent readers, or one writer. Cloning the handle is
/// cheap and shares the underlying structure
#[derive(Clone)]
pub struct SharedHat {
    h: Arc<RwLock<Hat>>,
}

impl SharedHat {
    pub fn open(config: HatConfig) -> HatResult<Self> {
        Ok(Self {
            h: Arc::new(RwLock::new(Hat::open(config)?)),
        })
    }
    /// Take a read guard. Cursors and lookups stay valid for the life of
    /// the guard
    pub fn read(&self) -> RwLockReadGuard<'_, Hat> {
        self.h.read()
    }
    /// Take the exclusive write guard
    pub fn write(&self) -> RwLockWriteGuard<'_, Hat> {
        self.h.write()
    }
}
