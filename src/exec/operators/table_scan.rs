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
//! Table scan operator.
//!
//! Responsibilities:
//! - Resolves a scan strategy once per execution and runs it on every included chunk as a
//!   separate task.
//! - Assembles the matches into a references table whose position lists respect the
//!   single-level indirection rule.
//!
//! Key exported interfaces:
//! - Types: `TableScan`, `DescriptionMode`.
//! - Functions: `execute_table_scan`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::common::config;
use crate::common::ids::{ChunkId, ColumnId, ParameterId};
use crate::exec::expr::{ExprArena, ExprId, LiteralValue};
use crate::exec::scan::{TableScanImpl, select_table_scan_impl};
use crate::ferroscan_logging::{debug, info};
use crate::runtime::query_context::QueryContext;
use crate::runtime::task::Task;
use crate::storage::chunk::Chunk;
use crate::storage::pos_list::PosList;
use crate::storage::segment::{ReferenceSegment, Segment};
use crate::storage::table::{Table, TableKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DescriptionMode {
    SingleLine,
    MultiLine,
}

pub struct TableScan {
    arena: Arc<ExprArena>,
    predicate: ExprId,
    excluded_chunk_ids: Vec<ChunkId>,
    impl_description: Mutex<Option<String>>,
}

impl TableScan {
    pub fn new(arena: Arc<ExprArena>, predicate: ExprId) -> Self {
        Self {
            arena,
            predicate,
            excluded_chunk_ids: Vec::new(),
            impl_description: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        "TableScan"
    }

    /// Chunks that are known not to contain matches and are skipped entirely.
    pub fn set_excluded_chunk_ids(&mut self, chunk_ids: Vec<ChunkId>) {
        self.excluded_chunk_ids = chunk_ids;
    }

    pub fn excluded_chunk_ids(&self) -> &[ChunkId] {
        &self.excluded_chunk_ids
    }

    pub fn predicate(&self) -> ExprId {
        self.predicate
    }

    pub fn arena(&self) -> &Arc<ExprArena> {
        &self.arena
    }

    pub fn description(&self, mode: DescriptionMode) -> String {
        let separator = match mode {
            DescriptionMode::SingleLine => " ",
            DescriptionMode::MultiLine => "\n",
        };
        let impl_description = self
            .impl_description
            .lock()
            .expect("table scan description lock")
            .clone()
            .unwrap_or_else(|| "Impl unset".to_string());
        format!(
            "{}{}Impl: {}{}{}",
            self.name(),
            separator,
            impl_description,
            separator,
            self.arena.as_column_name(self.predicate)
        )
    }

    /// Copy with an independent predicate arena. The selected strategy is not carried over.
    pub fn deep_copy(&self) -> Result<Self, String> {
        let (arena, predicate) = self.arena.deep_copy(self.predicate)?;
        Ok(Self {
            arena: Arc::new(arena),
            predicate,
            excluded_chunk_ids: self.excluded_chunk_ids.clone(),
            impl_description: Mutex::new(None),
        })
    }

    pub fn set_parameters(&mut self, parameters: &HashMap<ParameterId, LiteralValue>) {
        Arc::make_mut(&mut self.arena).set_parameters(parameters);
    }

    pub fn execute(&self, input: Arc<Table>, ctx: &QueryContext) -> Result<Table, String> {
        let scan: Arc<dyn TableScanImpl> = Arc::from(select_table_scan_impl(
            &self.arena,
            self.predicate,
            Arc::clone(&input),
            Arc::clone(ctx.registry()),
        ));
        *self
            .impl_description
            .lock()
            .expect("table scan description lock") = Some(scan.description());

        let excluded: HashSet<ChunkId> = self.excluded_chunk_ids.iter().copied().collect();
        let output = Arc::new(Mutex::new(Table::new(
            input.column_definitions().to_vec(),
            TableKind::References,
            input.max_chunk_size(),
        )));

        let mut tasks = Vec::with_capacity(input.chunk_count());
        for idx in 0..input.chunk_count() {
            let chunk_id = ChunkId::try_from(idx)?;
            if excluded.contains(&chunk_id) {
                continue;
            }
            let scan = Arc::clone(&scan);
            let input = Arc::clone(&input);
            let output = Arc::clone(&output);
            tasks.push(Task::new(move |_| {
                scan_one_chunk(scan.as_ref(), &input, chunk_id, &output)
            }));
        }
        let scheduled = tasks.len();
        ctx.scheduler()
            .schedule_and_wait_for_tasks(&tasks, ctx.worker())?;

        let result = std::mem::replace(
            &mut *output.lock().expect("table scan output lock"),
            Table::new(Vec::new(), TableKind::References, 1),
        );
        if config::debug_log_scan_strategy() {
            info!(
                strategy = scan.name(),
                input_chunks = input.chunk_count(),
                scanned_chunks = scheduled,
                output_chunks = result.chunk_count(),
                output_rows = result.row_count(),
                "table scan finished: {}",
                scan.description()
            );
        } else {
            debug!(
                strategy = scan.name(),
                scanned_chunks = scheduled,
                output_chunks = result.chunk_count(),
                output_rows = result.row_count(),
                "table scan finished"
            );
        }
        Ok(result)
    }
}

/// One-shot scan without keeping the operator around.
pub fn execute_table_scan(
    input: Arc<Table>,
    arena: Arc<ExprArena>,
    predicate: ExprId,
    excluded_chunk_ids: Vec<ChunkId>,
    ctx: &QueryContext,
) -> Result<Table, String> {
    let mut scan = TableScan::new(arena, predicate);
    scan.set_excluded_chunk_ids(excluded_chunk_ids);
    scan.execute(input, ctx)
}

fn scan_one_chunk(
    scan: &dyn TableScanImpl,
    input: &Table,
    chunk_id: ChunkId,
    output: &Mutex<Table>,
) -> Result<(), String> {
    let chunk = input
        .get_chunk_with_access_counting(chunk_id)
        .ok_or_else(|| format!("chunk {} out of range", chunk_id))?;
    let matches = scan.scan_chunk(chunk_id)?;
    if matches.is_empty() {
        return Ok(());
    }
    let segments = output_segments(input, chunk, matches)?;
    let mut output = output.lock().expect("table scan output lock");
    output.append_chunk(segments, Some(Arc::clone(chunk.access_counter())))?;
    Ok(())
}

/// Segments of one output chunk. Every output column derived from the same position list
/// shares one filtered `Arc<PosList>`.
fn output_segments(input: &Table, chunk: &Chunk, matches: PosList) -> Result<Vec<Segment>, String> {
    match input.kind() {
        TableKind::Data => {
            let table_id = input
                .id()
                .ok_or_else(|| "data table must be registered before it is scanned".to_string())?;
            let matches = Arc::new(matches);
            (0..input.column_count())
                .map(|idx| -> Result<Segment, String> {
                    Ok(Segment::Reference(ReferenceSegment::new(
                        table_id,
                        ColumnId::try_from(idx)?,
                        Arc::clone(&matches),
                    )))
                })
                .collect()
        }
        TableKind::References => {
            let mut filtered_by_upstream: HashMap<*const PosList, Arc<PosList>> = HashMap::new();
            let mut segments = Vec::with_capacity(chunk.column_count());
            for segment in chunk.segments() {
                debug_assert!(
                    segment.is_reference(),
                    "references table holds a {}",
                    segment.kind_name()
                );
                let reference = segment.as_reference().ok_or_else(|| {
                    format!(
                        "references table holds a {}; expected only reference segments",
                        segment.kind_name()
                    )
                })?;
                let upstream = reference.pos_list();
                let key = Arc::as_ptr(upstream);
                let filtered = match filtered_by_upstream.get(&key) {
                    Some(filtered) => Arc::clone(filtered),
                    None => {
                        let filtered = Arc::new(filter_pos_list(upstream, &matches)?);
                        filtered_by_upstream.insert(key, Arc::clone(&filtered));
                        filtered
                    }
                };
                segments.push(Segment::Reference(ReferenceSegment::new(
                    reference.referenced_table(),
                    reference.referenced_column_id(),
                    filtered,
                )));
            }
            Ok(segments)
        }
    }
}

/// `upstream[m.chunk_offset]` for every match.
fn filter_pos_list(upstream: &PosList, matches: &PosList) -> Result<PosList, String> {
    matches
        .iter()
        .map(|m| {
            upstream
                .get(m.chunk_offset.as_usize())
                .copied()
                .ok_or_else(|| {
                    format!(
                        "match offset {} out of range for position list of {} rows",
                        m.chunk_offset,
                        upstream.len()
                    )
                })
        })
        .collect()
}
