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

use core::fmt;

pub type HatResult<T> = Result<T, HatError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Construction and key errors. Allocation failure is not represented here:
/// running out of memory aborts (there is no sane partial state to report)
pub enum HatError {
    /// the boot level would produce an unreasonably large root block
    BootLevelTooLarge,
    /// bucket modulus or burst threshold out of range
    BadBucketGeometry,
    /// pail modulus produces an oversized node
    BadPailGeometry,
    /// array class table is empty, unordered, overlong or misgranular
    BadArrayClasses,
    /// key exceeds the maximum representable length (32767)
    KeyTooLong,
    /// key plus its aux area cannot fit the largest configured array class
    KeyOversize,
}

impl fmt::Display for HatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::BootLevelTooLarge => "boot level too large",
            Self::BadBucketGeometry => "bad bucket geometry",
            Self::BadPailGeometry => "bad pail geometry",
            Self::BadArrayClasses => "bad array class table",
            Self::KeyTooLong => "key exceeds maximum representable length",
            Self::KeyOversize => "key does not fit the largest array class",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for HatError {}
