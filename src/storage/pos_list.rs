// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::fmt;
use std::ops::Deref;

use crate::common::ids::{ChunkId, ChunkOffset};

/// Physical address of one row: chunk plus offset within the chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    /// Row id that refers to no row. Materializes as NULL.
    pub const NULL: RowId = RowId {
        chunk_id: ChunkId::INVALID,
        chunk_offset: ChunkOffset::INVALID,
    };

    pub const fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }

    pub fn is_null(&self) -> bool {
        self.chunk_id == ChunkId::INVALID
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NULL")
        } else {
            write!(f, "({}, {})", self.chunk_id, self.chunk_offset)
        }
    }
}

/// Ordered row ids. Shared as `Arc<PosList>` and never changed after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PosList {
    rows: Vec<RowId>,
}

impl PosList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: RowId) {
        self.rows.push(row);
    }

    pub fn into_inner(self) -> Vec<RowId> {
        self.rows
    }

    /// Offsets of all rows, in list order. Intended for rows that all live in one chunk.
    pub fn offsets(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.chunk_offset.get()).collect()
    }
}

impl Deref for PosList {
    type Target = [RowId];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl From<Vec<RowId>> for PosList {
    fn from(rows: Vec<RowId>) -> Self {
        Self { rows }
    }
}

impl FromIterator<RowId> for PosList {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PosList {
    type Item = &'a RowId;
    type IntoIter = std::slice::Iter<'a, RowId>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
