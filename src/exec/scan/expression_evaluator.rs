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

use crate::common::ids::ChunkId;
use crate::exec::expr::{ExprArena, ExprId};
use crate::storage::column_view::ChunkColumnSource;
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list};

/// Fallback for every predicate shape without a specialized strategy: evaluates the whole
/// expression row-wise.
pub struct ExpressionEvaluatorTableScanImpl {
    source: ScanSource,
    arena: Arc<ExprArena>,
    predicate: ExprId,
}

impl ExpressionEvaluatorTableScanImpl {
    pub(crate) fn new(source: ScanSource, arena: Arc<ExprArena>, predicate: ExprId) -> Self {
        Self {
            source,
            arena,
            predicate,
        }
    }
}

impl TableScanImpl for ExpressionEvaluatorTableScanImpl {
    fn name(&self) -> &'static str {
        "ExpressionEvaluator"
    }

    fn description(&self) -> String {
        format!("{} {}", self.name(), self.arena.as_column_name(self.predicate))
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let chunk = self.source.chunk(chunk_id)?;
        let columns = ChunkColumnSource::new(self.source.registry(), chunk);
        let mask = self.arena.eval_boolean(self.predicate, &columns)?;
        if mask.len() != chunk.size() {
            return Err(format!(
                "predicate produced {} values for a chunk of {} rows",
                mask.len(),
                chunk.size()
            ));
        }
        mask_to_pos_list(chunk_id, &mask)
    }
}
