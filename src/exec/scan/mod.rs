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
//! Table scan strategies.
//!
//! Responsibilities:
//! - Picks the cheapest strategy able to evaluate a predicate (`select_table_scan_impl`).
//! - Evaluates that strategy on one chunk at a time, producing matching offsets in order.
//!
//! Key exported interfaces:
//! - Traits: `TableScanImpl`.
//! - Functions: `select_table_scan_impl`.
//!
//! Selection is total: every predicate shape gets a strategy, with
//! `ExpressionEvaluatorTableScanImpl` as the fallback.

mod between;
mod column_comparison;
mod expression_evaluator;
mod is_null;
mod like;
mod single_column;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::take;

use crate::common::ids::{ChunkId, ChunkOffset, ColumnId};
use crate::exec::expr::{ExprArena, ExprId, ExprNode, flip_predicate_condition};
use crate::ferroscan_logging::debug;
use crate::storage::chunk::Chunk;
use crate::storage::column_view::{ColumnView, column_view};
use crate::storage::pos_list::{PosList, RowId};
use crate::storage::registry::TableRegistry;
use crate::storage::table::Table;

pub use self::between::BetweenTableScanImpl;
pub use self::column_comparison::ColumnComparisonTableScanImpl;
pub use self::expression_evaluator::ExpressionEvaluatorTableScanImpl;
pub use self::is_null::IsNullTableScanImpl;
pub use self::like::LikeTableScanImpl;
pub use self::single_column::SingleColumnTableScanImpl;

/// One predicate-evaluation strategy, bound to an input table.
pub trait TableScanImpl: Send + Sync {
    /// Short, stable strategy name.
    fn name(&self) -> &'static str;

    fn description(&self) -> String;

    /// Offsets of the rows of `chunk_id` that satisfy the predicate, ascending. NULL never
    /// satisfies a predicate except `IS NULL`.
    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String>;
}

/// The table being scanned plus the registry needed to resolve its reference segments.
#[derive(Clone)]
pub(crate) struct ScanSource {
    table: Arc<Table>,
    registry: Arc<TableRegistry>,
}

impl ScanSource {
    pub(crate) fn new(table: Arc<Table>, registry: Arc<TableRegistry>) -> Self {
        Self { table, registry }
    }

    pub(crate) fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub(crate) fn chunk(&self, chunk_id: ChunkId) -> Result<&Chunk, String> {
        self.table
            .get_chunk(chunk_id)
            .ok_or_else(|| format!("chunk {} out of range", chunk_id))
    }

    pub(crate) fn view(&self, chunk_id: ChunkId, column_id: ColumnId) -> Result<ColumnView, String> {
        column_view(&self.registry, self.chunk(chunk_id)?, column_id)
    }
}

/// Apply a per-value predicate to a column view. Dictionary columns evaluate the predicate once
/// per distinct value and map the result through the keys.
pub(crate) fn scan_view<F>(view: ColumnView, predicate: F) -> Result<BooleanArray, String>
where
    F: Fn(&ArrayRef) -> Result<BooleanArray, String>,
{
    match view {
        ColumnView::Plain(values) => predicate(&values),
        ColumnView::Dictionary { keys, values } => {
            let value_mask = predicate(&values)?;
            let mapped = take(&value_mask, &keys, None).map_err(|e| e.to_string())?;
            mapped
                .as_any()
                .downcast_ref::<BooleanArray>()
                .cloned()
                .ok_or_else(|| "dictionary predicate did not produce booleans".to_string())
        }
    }
}

/// Rows whose mask entry is `true`. NULL counts as not matching.
pub(crate) fn mask_to_pos_list(chunk_id: ChunkId, mask: &BooleanArray) -> Result<PosList, String> {
    let mut out = PosList::with_capacity(mask.true_count());
    for (i, hit) in mask.iter().enumerate() {
        if hit == Some(true) {
            out.push(RowId::new(chunk_id, ChunkOffset::try_from(i)?));
        }
    }
    Ok(out)
}

/// Choose a strategy for `predicate` over `table`. First matching rule wins.
pub fn select_table_scan_impl(
    arena: &Arc<ExprArena>,
    predicate: ExprId,
    table: Arc<Table>,
    registry: Arc<TableRegistry>,
) -> Box<dyn TableScanImpl> {
    let source = ScanSource::new(table, registry);
    let selected = select(arena, predicate, &source);
    let scan = selected.unwrap_or_else(|| {
        Box::new(ExpressionEvaluatorTableScanImpl::new(
            source,
            Arc::clone(arena),
            predicate,
        ))
    });
    debug!(
        strategy = scan.name(),
        predicate = %arena.as_column_name(predicate),
        "selected table scan strategy"
    );
    scan
}

fn select(
    arena: &ExprArena,
    predicate: ExprId,
    source: &ScanSource,
) -> Option<Box<dyn TableScanImpl>> {
    match arena.node(predicate)? {
        ExprNode::BinaryPredicate {
            condition,
            left,
            right,
        } => {
            let left_column = arena.column_id(*left);
            let right_column = arena.column_id(*right);
            if condition.is_like() {
                let column = left_column?;
                let pattern = arena.constant_value(*right)?.to_string();
                let scan = LikeTableScanImpl::new(source.clone(), column, *condition, pattern).ok()?;
                return Some(Box::new(scan));
            }
            if !condition.is_comparison() {
                return None;
            }
            if let Some(column) = left_column
                && let Some(value) = arena.constant_value(*right)
            {
                return Some(Box::new(SingleColumnTableScanImpl::new(
                    source.clone(),
                    column,
                    *condition,
                    value.clone(),
                )));
            }
            if let Some(column) = right_column
                && let Some(value) = arena.constant_value(*left)
            {
                let flipped = flip_predicate_condition(*condition)?;
                return Some(Box::new(SingleColumnTableScanImpl::new(
                    source.clone(),
                    column,
                    flipped,
                    value.clone(),
                )));
            }
            if let (Some(l), Some(r)) = (left_column, right_column) {
                return Some(Box::new(ColumnComparisonTableScanImpl::new(
                    source.clone(),
                    l,
                    *condition,
                    r,
                )));
            }
            None
        }
        ExprNode::IsNull { condition, operand } => {
            let column = arena.column_id(*operand)?;
            Some(Box::new(IsNullTableScanImpl::new(
                source.clone(),
                column,
                *condition,
            )))
        }
        ExprNode::Between {
            value,
            lower,
            upper,
        } => {
            let column = arena.column_id(*value)?;
            let lower = arena.constant_value(*lower)?;
            let upper = arena.constant_value(*upper)?;
            if lower.data_type() != upper.data_type() {
                return None;
            }
            Some(Box::new(BetweenTableScanImpl::new(
                source.clone(),
                column,
                lower.clone(),
                upper.clone(),
            )))
        }
        _ => None,
    }
}
