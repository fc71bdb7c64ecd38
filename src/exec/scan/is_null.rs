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
use arrow::array::{Array, BooleanArray};

use crate::common::ids::{ChunkId, ColumnId};
use crate::exec::expr::PredicateCondition;
use crate::storage::column_view::ColumnView;
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list};

/// `column IS [NOT] NULL`. The only strategy that selects NULL rows.
pub struct IsNullTableScanImpl {
    source: ScanSource,
    column_id: ColumnId,
    condition: PredicateCondition,
}

impl IsNullTableScanImpl {
    pub(crate) fn new(source: ScanSource, column_id: ColumnId, condition: PredicateCondition) -> Self {
        Self {
            source,
            column_id,
            condition,
        }
    }
}

fn null_flags(view: &ColumnView) -> Vec<bool> {
    match view {
        ColumnView::Plain(values) => (0..values.len()).map(|i| values.is_null(i)).collect(),
        ColumnView::Dictionary { keys, values } => keys
            .iter()
            .map(|key| match key {
                None => true,
                Some(k) => values.is_null(k as usize),
            })
            .collect(),
    }
}

impl TableScanImpl for IsNullTableScanImpl {
    fn name(&self) -> &'static str {
        "IsNullScan"
    }

    fn description(&self) -> String {
        format!("{} #{} {}", self.name(), self.column_id, self.condition)
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let view = self.source.view(chunk_id, self.column_id)?;
        let want_null = self.condition == PredicateCondition::IsNull;
        let mask: BooleanArray = null_flags(&view)
            .into_iter()
            .map(|is_null| Some(is_null == want_null))
            .collect();
        mask_to_pos_list(chunk_id, &mask)
    }
}
