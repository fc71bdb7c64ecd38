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
//! Encoding-transparent read access to one column of one chunk.
//!
//! Scan strategies never look at segment kinds. They ask for a `ColumnView`, which is either a
//! plain Arrow array or dictionary keys plus distinct values. Reference segments are resolved
//! through the `TableRegistry` and gathered from the referenced data chunks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt32Array, new_empty_array, new_null_array};
use arrow::compute::{interleave, take};
use arrow::datatypes::DataType;

use crate::common::ids::{ChunkId, ColumnId};
use crate::exec::expr::ColumnSource;
use crate::storage::chunk::Chunk;
use crate::storage::registry::TableRegistry;
use crate::storage::segment::{ReferenceSegment, Segment};
use crate::storage::table::{Table, TableKind};

#[derive(Clone, Debug)]
pub enum ColumnView {
    Plain(ArrayRef),
    /// `keys[i]` indexes `values`; a null key is a null row.
    Dictionary { keys: UInt32Array, values: ArrayRef },
}

impl ColumnView {
    pub fn len(&self) -> usize {
        match self {
            ColumnView::Plain(values) => values.len(),
            ColumnView::Dictionary { keys, .. } => keys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_data_type(&self) -> &DataType {
        match self {
            ColumnView::Plain(values) => values.data_type(),
            ColumnView::Dictionary { values, .. } => values.data_type(),
        }
    }

    /// Decode to a plain array with one entry per row.
    pub fn into_plain(self) -> Result<ArrayRef, String> {
        match self {
            ColumnView::Plain(values) => Ok(values),
            ColumnView::Dictionary { keys, values } => {
                take(values.as_ref(), &keys, None).map_err(|e| format!("dictionary decode: {e}"))
            }
        }
    }
}

pub fn column_view(
    registry: &TableRegistry,
    chunk: &Chunk,
    column_id: ColumnId,
) -> Result<ColumnView, String> {
    let segment = chunk
        .get_segment(column_id)
        .ok_or_else(|| format!("chunk has no column #{column_id}"))?;
    match segment {
        Segment::Value(s) => Ok(ColumnView::Plain(s.values().clone())),
        Segment::Dictionary(s) => Ok(ColumnView::Dictionary {
            keys: s.keys().clone(),
            values: s.dictionary().clone(),
        }),
        Segment::Reference(s) => resolve_reference(registry, s),
    }
}

fn referenced_data_table(
    registry: &TableRegistry,
    segment: &ReferenceSegment,
) -> Result<Arc<Table>, String> {
    let table = registry.get(segment.referenced_table())?;
    if table.kind() != TableKind::Data {
        return Err(format!(
            "reference segment points at table {} which is not a data table",
            segment.referenced_table()
        ));
    }
    Ok(table)
}

fn plain_segment_values(segment: &Segment) -> Result<ArrayRef, String> {
    match segment {
        Segment::Value(s) => Ok(s.values().clone()),
        Segment::Dictionary(s) => ColumnView::Dictionary {
            keys: s.keys().clone(),
            values: s.dictionary().clone(),
        }
        .into_plain(),
        Segment::Reference(_) => Err("multi-level reference segments are not supported".into()),
    }
}

fn referenced_segment<'t>(
    table: &'t Table,
    segment: &ReferenceSegment,
    chunk_id: ChunkId,
) -> Result<&'t Segment, String> {
    table
        .get_chunk(chunk_id)
        .and_then(|c| c.get_segment(segment.referenced_column_id()))
        .ok_or_else(|| {
            format!(
                "row id references missing chunk {} of table {}",
                chunk_id,
                segment.referenced_table()
            )
        })
}

fn resolve_reference(
    registry: &TableRegistry,
    segment: &ReferenceSegment,
) -> Result<ColumnView, String> {
    let table = referenced_data_table(registry, segment)?;
    let column_id = segment.referenced_column_id();
    let data_type = table.column_data_type(column_id)?.clone();
    let pos_list = segment.pos_list();
    if pos_list.is_empty() {
        return Ok(ColumnView::Plain(new_empty_array(&data_type)));
    }

    // Rows from a single dictionary segment keep their encoding.
    let first = pos_list[0];
    if !first.is_null() && pos_list.iter().all(|r| r.chunk_id == first.chunk_id) {
        let source = referenced_segment(&table, segment, first.chunk_id)?;
        let offsets = UInt32Array::from(pos_list.offsets());
        if let Some(bad) = offsets.values().iter().find(|o| **o as usize >= source.len()) {
            return Err(format!(
                "row offset {} out of range for chunk {} with {} rows",
                bad,
                first.chunk_id,
                source.len()
            ));
        }
        return match source {
            Segment::Dictionary(s) => {
                let keys = take(s.keys(), &offsets, None)
                    .map_err(|e| format!("gather dictionary keys: {e}"))?;
                let keys = keys
                    .as_any()
                    .downcast_ref::<UInt32Array>()
                    .cloned()
                    .ok_or_else(|| "gathered keys are not UInt32".to_string())?;
                Ok(ColumnView::Dictionary {
                    keys,
                    values: s.dictionary().clone(),
                })
            }
            other => {
                let values = plain_segment_values(other)?;
                let gathered = take(values.as_ref(), &offsets, None)
                    .map_err(|e| format!("gather referenced rows: {e}"))?;
                Ok(ColumnView::Plain(gathered))
            }
        };
    }

    let mut sources: Vec<ArrayRef> = Vec::new();
    let mut source_of_chunk: HashMap<ChunkId, usize> = HashMap::new();
    let mut null_source: Option<usize> = None;
    let mut indices = Vec::with_capacity(pos_list.len());
    for row in pos_list.iter() {
        if row.is_null() {
            let idx = *null_source.get_or_insert_with(|| {
                sources.push(new_null_array(&data_type, 1));
                sources.len() - 1
            });
            indices.push((idx, 0));
            continue;
        }
        let idx = match source_of_chunk.get(&row.chunk_id) {
            Some(idx) => *idx,
            None => {
                let values = plain_segment_values(referenced_segment(&table, segment, row.chunk_id)?)?;
                sources.push(values);
                source_of_chunk.insert(row.chunk_id, sources.len() - 1);
                sources.len() - 1
            }
        };
        let offset = row.chunk_offset.as_usize();
        if offset >= sources[idx].len() {
            return Err(format!(
                "row offset {} out of range for chunk {} with {} rows",
                offset,
                row.chunk_id,
                sources[idx].len()
            ));
        }
        indices.push((idx, offset));
    }
    let refs: Vec<&dyn Array> = sources.iter().map(|a| a.as_ref()).collect();
    let gathered = interleave(&refs, &indices).map_err(|e| format!("gather referenced rows: {e}"))?;
    Ok(ColumnView::Plain(gathered))
}

/// `ColumnSource` over one chunk, materializing each column at most once.
pub struct ChunkColumnSource<'a> {
    registry: &'a TableRegistry,
    chunk: &'a Chunk,
    cache: RefCell<HashMap<ColumnId, ArrayRef>>,
}

impl<'a> ChunkColumnSource<'a> {
    pub fn new(registry: &'a TableRegistry, chunk: &'a Chunk) -> Self {
        Self {
            registry,
            chunk,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl ColumnSource for ChunkColumnSource<'_> {
    fn num_rows(&self) -> usize {
        self.chunk.size()
    }

    fn column(&self, column_id: ColumnId) -> Result<ArrayRef, String> {
        if let Some(cached) = self.cache.borrow().get(&column_id) {
            return Ok(cached.clone());
        }
        let values = column_view(self.registry, self.chunk, column_id)?.into_plain()?;
        self.cache.borrow_mut().insert(column_id, values.clone());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ids::ChunkOffset;
    use crate::storage::pos_list::{PosList, RowId};
    use crate::storage::table::ColumnDefinition;
    use arrow::array::Int32Array;

    fn registry_with_table() -> (Arc<TableRegistry>, Arc<Table>) {
        let mut table = Table::new(
            vec![ColumnDefinition::new("a", DataType::Int32, true)],
            TableKind::Data,
            3,
        );
        table
            .append_arrays(vec![Arc::new(Int32Array::from(vec![
                Some(10),
                Some(11),
                None,
                Some(20),
                Some(21),
            ]))])
            .expect("append");
        table.encode_chunk(ChunkId(1)).expect("encode");
        let registry = TableRegistry::new();
        let table = registry.register("t", table).expect("register");
        (registry, table)
    }

    fn reference_chunk(table: &Table, rows: Vec<RowId>) -> Chunk {
        let segment = Segment::Reference(ReferenceSegment::new(
            table.id().expect("registered"),
            ColumnId(0),
            Arc::new(PosList::from(rows)),
        ));
        let mut refs = Table::new(
            table.column_definitions().to_vec(),
            TableKind::References,
            table.max_chunk_size(),
        );
        refs.append_chunk(vec![segment], None).expect("append");
        refs.chunks()[0].clone()
    }

    fn ints(array: &ArrayRef) -> Vec<Option<i32>> {
        array
            .as_any()
            .downcast_ref::<Int32Array>()
            .expect("int32")
            .iter()
            .collect()
    }

    #[test]
    fn reference_gather_spans_chunks_and_null_rows() {
        let (registry, table) = registry_with_table();
        let chunk = reference_chunk(
            &table,
            vec![
                RowId::new(ChunkId(1), ChunkOffset(1)),
                RowId::NULL,
                RowId::new(ChunkId(0), ChunkOffset(0)),
                RowId::new(ChunkId(0), ChunkOffset(2)),
            ],
        );
        let values = column_view(&registry, &chunk, ColumnId(0))
            .and_then(ColumnView::into_plain)
            .expect("view");
        assert_eq!(ints(&values), vec![Some(21), None, Some(10), None]);
    }

    #[test]
    fn single_dictionary_chunk_stays_encoded() {
        let (registry, table) = registry_with_table();
        let chunk = reference_chunk(&table, vec![RowId::new(ChunkId(1), ChunkOffset(0))]);
        let view = column_view(&registry, &chunk, ColumnId(0)).expect("view");
        assert!(matches!(view, ColumnView::Dictionary { .. }));
        assert_eq!(ints(&view.into_plain().expect("decode")), vec![Some(20)]);
    }

    #[test]
    fn out_of_range_offset_is_an_error() {
        let (registry, table) = registry_with_table();
        let chunk = reference_chunk(&table, vec![RowId::new(ChunkId(0), ChunkOffset(9))]);
        let err = column_view(&registry, &chunk, ColumnId(0)).expect_err("range");
        assert!(err.contains("out of range"), "err={err}");
    }
}
