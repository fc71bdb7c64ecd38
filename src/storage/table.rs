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

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;

use crate::common::ids::{ChunkId, ColumnId, TableId};
use crate::storage::chunk::{Chunk, ChunkAccessCounter};
use crate::storage::chunk_statistics::ChunkStatistics;
use crate::storage::segment::{DictionarySegment, Segment, ValueSegment};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableKind {
    /// Holds value or dictionary segments.
    Data,
    /// Holds only reference segments.
    References,
}

#[derive(Debug)]
pub struct Table {
    id: Option<TableId>,
    column_definitions: Vec<ColumnDefinition>,
    kind: TableKind,
    max_chunk_size: usize,
    chunks: Vec<Chunk>,
}

impl Table {
    pub fn new(
        column_definitions: Vec<ColumnDefinition>,
        kind: TableKind,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            id: None,
            column_definitions,
            kind,
            max_chunk_size: max_chunk_size.max(1),
            chunks: Vec::new(),
        }
    }

    /// Data table using the configured chunk size.
    pub fn new_data(column_definitions: Vec<ColumnDefinition>) -> Self {
        Self::new(
            column_definitions,
            TableKind::Data,
            crate::common::config::storage_max_chunk_size(),
        )
    }

    /// Assigned when the table is registered; `None` for intermediate results.
    pub fn id(&self) -> Option<TableId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: TableId) {
        self.id = Some(id);
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        &self.column_definitions
    }

    pub fn column_count(&self) -> usize {
        self.column_definitions.len()
    }

    pub fn column_data_type(&self, column_id: ColumnId) -> Result<&DataType, String> {
        self.column_definitions
            .get(column_id.as_usize())
            .map(|c| &c.data_type)
            .ok_or_else(|| {
                format!(
                    "column #{} out of range for table with {} columns",
                    column_id,
                    self.column_count()
                )
            })
    }

    pub fn column_id_by_name(&self, name: &str) -> Option<ColumnId> {
        let idx = self.column_definitions.iter().position(|c| c.name == name)?;
        ColumnId::try_from(idx).ok()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(Chunk::size).sum()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(chunk_id.as_usize())
    }

    /// Same as `get_chunk`, but records the access on the chunk's shared counter.
    pub fn get_chunk_with_access_counting(&self, chunk_id: ChunkId) -> Option<&Chunk> {
        let chunk = self.chunks.get(chunk_id.as_usize())?;
        chunk.access_counter().increment();
        Some(chunk)
    }

    /// Append one sealed chunk. `access_counter` is shared with an upstream chunk when the new
    /// chunk is derived from it; otherwise a fresh counter is created.
    pub fn append_chunk(
        &mut self,
        segments: Vec<Segment>,
        access_counter: Option<Arc<ChunkAccessCounter>>,
    ) -> Result<ChunkId, String> {
        if segments.len() != self.column_count() {
            return Err(format!(
                "chunk has {} segments, table has {} columns",
                segments.len(),
                self.column_count()
            ));
        }
        if let Some(first) = segments.first() {
            let len = first.len();
            if let Some(bad) = segments.iter().find(|s| s.len() != len) {
                return Err(format!(
                    "segment lengths differ within chunk: {} vs {}",
                    len,
                    bad.len()
                ));
            }
        }
        for segment in &segments {
            let allowed = match self.kind {
                TableKind::Data => !segment.is_reference(),
                TableKind::References => segment.is_reference(),
            };
            if !allowed {
                return Err(format!(
                    "{} cannot be stored in a {:?} table",
                    segment.kind_name(),
                    self.kind
                ));
            }
        }
        let chunk_id = ChunkId::try_from(self.chunks.len())?;
        let statistics = match self.kind {
            TableKind::Data => Some(Arc::new(ChunkStatistics::from_segments(&segments))),
            TableKind::References => None,
        };
        let access_counter = access_counter.unwrap_or_else(ChunkAccessCounter::new);
        self.chunks
            .push(Chunk::new(segments, access_counter, statistics));
        Ok(chunk_id)
    }

    /// Append column data, split into chunks of at most `max_chunk_size` rows.
    pub fn append_arrays(&mut self, columns: Vec<ArrayRef>) -> Result<Vec<ChunkId>, String> {
        if self.kind != TableKind::Data {
            return Err("append_arrays requires a data table".to_string());
        }
        if columns.len() != self.column_count() {
            return Err(format!(
                "got {} columns, table has {}",
                columns.len(),
                self.column_count()
            ));
        }
        for (column, def) in columns.iter().zip(&self.column_definitions) {
            if column.data_type() != &def.data_type {
                return Err(format!(
                    "column '{}' expects {:?}, got {:?}",
                    def.name,
                    def.data_type,
                    column.data_type()
                ));
            }
            if !def.nullable && column.null_count() > 0 {
                return Err(format!("column '{}' is not nullable", def.name));
            }
        }
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut appended = Vec::new();
        let mut offset = 0;
        while offset < rows {
            let len = self.max_chunk_size.min(rows - offset);
            let mut segments = Vec::with_capacity(columns.len());
            for column in &columns {
                if column.len() != rows {
                    return Err(format!(
                        "column lengths differ: {} vs {}",
                        rows,
                        column.len()
                    ));
                }
                segments.push(Segment::Value(ValueSegment::try_new(
                    column.slice(offset, len),
                )?));
            }
            appended.push(self.append_chunk(segments, None)?);
            offset += len;
        }
        Ok(appended)
    }

    /// Dictionary-encode every column of a sealed chunk whose type supports it. Columns that
    /// cannot be encoded keep their value segment.
    pub fn encode_chunk(&mut self, chunk_id: ChunkId) -> Result<(), String> {
        if self.kind != TableKind::Data {
            return Err("only data tables can be encoded".to_string());
        }
        let chunk = self
            .chunks
            .get_mut(chunk_id.as_usize())
            .ok_or_else(|| format!("chunk {} out of range", chunk_id))?;
        for idx in 0..chunk.column_count() {
            let column_id = ColumnId::try_from(idx)?;
            let Some(Segment::Value(value)) = chunk.get_segment(column_id) else {
                continue;
            };
            if !matches!(
                value.data_type(),
                DataType::Int32 | DataType::Int64 | DataType::Utf8
            ) {
                continue;
            }
            let encoded = DictionarySegment::encode(value.values())?;
            chunk.replace_segment(column_id, Segment::Dictionary(encoded));
        }
        Ok(())
    }

    /// Encode every chunk.
    pub fn encode_all_chunks(&mut self) -> Result<(), String> {
        for idx in 0..self.chunks.len() {
            self.encode_chunk(ChunkId::try_from(idx)?)?;
        }
        Ok(())
    }
}
