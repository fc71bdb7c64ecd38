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
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::ids::ColumnId;
use crate::storage::chunk_statistics::ChunkStatistics;
use crate::storage::segment::Segment;

/// Access counter shared between a chunk and every chunk derived from it.
#[derive(Debug, Default)]
pub struct ChunkAccessCounter {
    count: AtomicU64,
}

impl ChunkAccessCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Column-aligned horizontal slice of a table. Immutable once appended.
#[derive(Clone, Debug)]
pub struct Chunk {
    segments: Vec<Segment>,
    access_counter: Arc<ChunkAccessCounter>,
    statistics: Option<Arc<ChunkStatistics>>,
}

impl Chunk {
    pub(crate) fn new(
        segments: Vec<Segment>,
        access_counter: Arc<ChunkAccessCounter>,
        statistics: Option<Arc<ChunkStatistics>>,
    ) -> Self {
        Self {
            segments,
            access_counter,
            statistics,
        }
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of rows. All segments of a chunk have the same length.
    pub fn size(&self) -> usize {
        self.segments.first().map(Segment::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn get_segment(&self, column_id: ColumnId) -> Option<&Segment> {
        self.segments.get(column_id.as_usize())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn access_counter(&self) -> &Arc<ChunkAccessCounter> {
        &self.access_counter
    }

    pub fn statistics(&self) -> Option<&Arc<ChunkStatistics>> {
        self.statistics.as_ref()
    }

    pub(crate) fn replace_segment(&mut self, column_id: ColumnId, segment: Segment) {
        if let Some(slot) = self.segments.get_mut(column_id.as_usize()) {
            *slot = segment;
        }
    }
}
