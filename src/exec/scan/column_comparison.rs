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
use crate::common::ids::{ChunkId, ColumnId};
use crate::exec::expr::PredicateCondition;
use crate::exec::expr::comparison::compare_arrays;
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list};

/// `left_column <op> right_column`, row by row.
pub struct ColumnComparisonTableScanImpl {
    source: ScanSource,
    left: ColumnId,
    condition: PredicateCondition,
    right: ColumnId,
}

impl ColumnComparisonTableScanImpl {
    pub(crate) fn new(
        source: ScanSource,
        left: ColumnId,
        condition: PredicateCondition,
        right: ColumnId,
    ) -> Self {
        Self {
            source,
            left,
            condition,
            right,
        }
    }
}

impl TableScanImpl for ColumnComparisonTableScanImpl {
    fn name(&self) -> &'static str {
        "ColumnComparison"
    }

    fn description(&self) -> String {
        format!(
            "{} #{} {} #{}",
            self.name(),
            self.left,
            self.condition,
            self.right
        )
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let left = self.source.view(chunk_id, self.left)?.into_plain()?;
        let right = self.source.view(chunk_id, self.right)?.into_plain()?;
        let mask = compare_arrays(self.condition, &left, &right)?;
        mask_to_pos_list(chunk_id, &mask)
    }
}
