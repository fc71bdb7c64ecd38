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
use arrow::compute::kernels::boolean::and_kleene;

use crate::common::ids::{ChunkId, ColumnId};
use crate::exec::expr::comparison::compare_with_literal;
use crate::exec::expr::{LiteralValue, PredicateCondition};
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list, scan_view};

/// `column BETWEEN lower AND upper`, inclusive. Bounds are compared after coercion, so
/// fractional bounds on an integer column need no rounding.
pub struct BetweenTableScanImpl {
    source: ScanSource,
    column_id: ColumnId,
    lower: LiteralValue,
    upper: LiteralValue,
}

impl BetweenTableScanImpl {
    pub(crate) fn new(
        source: ScanSource,
        column_id: ColumnId,
        lower: LiteralValue,
        upper: LiteralValue,
    ) -> Self {
        Self {
            source,
            column_id,
            lower,
            upper,
        }
    }
}

impl TableScanImpl for BetweenTableScanImpl {
    fn name(&self) -> &'static str {
        "ColumnBetween"
    }

    fn description(&self) -> String {
        format!(
            "{} #{} BETWEEN {} AND {}",
            self.name(),
            self.column_id,
            self.lower,
            self.upper
        )
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let view = self.source.view(chunk_id, self.column_id)?;
        let mask = scan_view(view, |values| {
            let ge = compare_with_literal(PredicateCondition::GreaterThanEquals, values, &self.lower)?;
            let le = compare_with_literal(PredicateCondition::LessThanEquals, values, &self.upper)?;
            and_kleene(&ge, &le).map_err(|e| e.to_string())
        })?;
        mask_to_pos_list(chunk_id, &mask)
    }
}
