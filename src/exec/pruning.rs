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
//! Chunk pruning from per-chunk statistics.
//!
//! Feeds `TableScan::set_excluded_chunk_ids`. Only simple `column <op> constant` and
//! `column BETWEEN constant AND constant` predicates prune; anything else keeps every chunk.

use crate::common::ids::ChunkId;
use crate::exec::expr::{
    ExprArena, ExprId, ExprNode, LiteralValue, PredicateCondition, flip_predicate_condition,
};
use crate::ferroscan_logging::debug;
use crate::storage::chunk_statistics::SegmentStatistics;
use crate::storage::table::{Table, TableKind};

/// Chunks of `table` in which no row can satisfy `predicate`.
pub fn exclude_chunks(table: &Table, arena: &ExprArena, predicate: ExprId) -> Vec<ChunkId> {
    if table.kind() != TableKind::Data {
        return Vec::new();
    }
    let Some(check) = PruneCheck::from_predicate(arena, predicate) else {
        return Vec::new();
    };
    let excluded: Vec<ChunkId> = table
        .chunks()
        .iter()
        .enumerate()
        .filter(|(_, chunk)| {
            chunk
                .statistics()
                .and_then(|s| s.segment(check.column()))
                .is_some_and(|s| check.prunes(s))
        })
        .filter_map(|(idx, _)| ChunkId::try_from(idx).ok())
        .collect();
    debug!(
        predicate = %arena.as_column_name(predicate),
        chunks = table.chunk_count(),
        excluded = excluded.len(),
        "chunk pruning"
    );
    excluded
}

enum PruneCheck<'a> {
    Compare {
        column: usize,
        condition: PredicateCondition,
        value: &'a LiteralValue,
    },
    Between {
        column: usize,
        lower: &'a LiteralValue,
        upper: &'a LiteralValue,
    },
}

impl<'a> PruneCheck<'a> {
    fn from_predicate(arena: &'a ExprArena, predicate: ExprId) -> Option<Self> {
        match arena.node(predicate)? {
            ExprNode::BinaryPredicate {
                condition,
                left,
                right,
            } if condition.is_comparison() => {
                if let Some(column) = arena.column_id(*left)
                    && let Some(value) = arena.constant_value(*right)
                {
                    return Some(PruneCheck::Compare {
                        column: column.as_usize(),
                        condition: *condition,
                        value,
                    });
                }
                let column = arena.column_id(*right)?;
                let value = arena.constant_value(*left)?;
                Some(PruneCheck::Compare {
                    column: column.as_usize(),
                    condition: flip_predicate_condition(*condition)?,
                    value,
                })
            }
            ExprNode::Between {
                value,
                lower,
                upper,
            } => Some(PruneCheck::Between {
                column: arena.column_id(*value)?.as_usize(),
                lower: arena.constant_value(*lower)?,
                upper: arena.constant_value(*upper)?,
            }),
            _ => None,
        }
    }

    fn column(&self) -> usize {
        match self {
            PruneCheck::Compare { column, .. } | PruneCheck::Between { column, .. } => *column,
        }
    }

    fn prunes(&self, stats: &SegmentStatistics) -> bool {
        match self {
            PruneCheck::Compare {
                condition, value, ..
            } => stats.can_prune(*condition, value),
            PruneCheck::Between { lower, upper, .. } => stats.can_prune_between(lower, upper),
        }
    }
}
