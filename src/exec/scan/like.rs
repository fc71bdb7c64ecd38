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

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::kernels::boolean::not;
use arrow::datatypes::DataType;

use crate::common::ids::{ChunkId, ColumnId};
use crate::exec::expr::PredicateCondition;
use crate::exec::expr::cast::cast_to;
use crate::exec::expr::like::LikeMatcher;
use crate::storage::pos_list::PosList;

use super::{ScanSource, TableScanImpl, mask_to_pos_list, scan_view};

/// `column [NOT] LIKE 'pattern'`. Non-string columns are matched on their string form.
pub struct LikeTableScanImpl {
    source: ScanSource,
    column_id: ColumnId,
    condition: PredicateCondition,
    pattern: String,
    matcher: Arc<LikeMatcher>,
}

impl LikeTableScanImpl {
    pub(crate) fn new(
        source: ScanSource,
        column_id: ColumnId,
        condition: PredicateCondition,
        pattern: String,
    ) -> Result<Self, String> {
        if !condition.is_like() {
            return Err(format!("{condition} is not a LIKE condition"));
        }
        let matcher = Arc::new(LikeMatcher::new(&pattern)?);
        Ok(Self {
            source,
            column_id,
            condition,
            pattern,
            matcher,
        })
    }
}

impl TableScanImpl for LikeTableScanImpl {
    fn name(&self) -> &'static str {
        "Like"
    }

    fn description(&self) -> String {
        format!(
            "{} #{} {} '{}' ({})",
            self.name(),
            self.column_id,
            self.condition,
            self.pattern,
            self.matcher.kind_name()
        )
    }

    fn scan_chunk(&self, chunk_id: ChunkId) -> Result<PosList, String> {
        let view = self.source.view(chunk_id, self.column_id)?;
        let mask = scan_view(view, |values: &ArrayRef| {
            let strings = cast_to(values, &DataType::Utf8)?;
            let strings = strings
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| "like: failed to downcast to StringArray".to_string())?;
            let matched = self.matcher.matches_array(strings);
            if self.condition == PredicateCondition::NotLike {
                return not(&matched).map_err(|e| e.to_string());
            }
            Ok(matched)
        })?;
        mask_to_pos_list(chunk_id, &mask)
    }
}
