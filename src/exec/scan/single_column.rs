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
use crate::exec::expr::comparison::compare_with_literal;
use crate::exec::expr::{LiteralValue, PredicateCondition};
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list, scan_view};

/// `column <op> constant`.
pub struct SingleColumnTableScanImpl {
    source: ScanSource,
    column_id: ColumnId,
    condition: PredicateCondition,
    value: LiteralValue,
}

impl SingleColumnTableScanImpl {
    pub(crate) fn new(
        source: ScanSource,
        column_id: ColumnId,
        condition: PredicateCondition,
        value: LiteralValue,
    ) -> Self {
        Self {
            source,
            column_id,
            condition,
            value,
        }
    }

    pub fn condition(&self) -> PredicateCondition {
        self.condition
    }
}

impl TableScanImpl for SingleColumnTableScanImpl {
    fn name(&self) -> &'static str {
        "SingleColumnScan"
    }

    fn description(&self) -> String {
        format!(
            "{} #{} {} {}",
            self.name(),
            self.column_id,
            self.condition,
            self.value
        )
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let view = self.source.view(chunk_id, self.column_id)?;
        let mask = scan_view(view, |values| {
            compare_with_literal(self.condition, values, &self.value)
        })?;
        mask_to_pos_list(chunk_id, &mask)
    }
}
