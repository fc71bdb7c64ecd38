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
//! Min/max/null-count statistics for sealed data chunks.
//!
//! Statistics only ever answer "can this chunk be skipped"; a `false` answer never means a
//! row matches.

use std::cmp::Ordering;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::compute::{max, max_boolean, max_string, min, min_boolean, min_string};
use arrow::datatypes::DataType;

use crate::exec::expr::{LiteralValue, PredicateCondition};
use crate::storage::segment::Segment;

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentStatistics {
    pub min: Option<LiteralValue>,
    pub max: Option<LiteralValue>,
    pub null_count: usize,
    pub row_count: usize,
}

impl SegmentStatistics {
    /// Statistics over the non-null values of `values`. `None` for unsupported types.
    pub fn from_array(values: &ArrayRef) -> Option<Self> {
        let (min_value, max_value) = min_max(values)?;
        Some(Self {
            min: min_value,
            max: max_value,
            null_count: values.null_count(),
            row_count: values.len(),
        })
    }

    pub fn from_segment(segment: &Segment) -> Option<Self> {
        match segment {
            Segment::Value(s) => Self::from_array(s.values()),
            Segment::Dictionary(s) => {
                // Values that no key points at would only widen the range, which keeps pruning
                // conservative.
                let (min_value, max_value) = min_max(s.dictionary())?;
                Some(Self {
                    min: min_value,
                    max: max_value,
                    null_count: s.keys().null_count(),
                    row_count: s.len(),
                })
            }
            Segment::Reference(_) => None,
        }
    }

    fn all_null(&self) -> bool {
        self.min.is_none() || self.max.is_none()
    }

    /// True if no row can satisfy `column <condition> value`.
    pub fn can_prune(&self, condition: PredicateCondition, value: &LiteralValue) -> bool {
        if value.is_null() {
            return false;
        }
        if condition.is_comparison() && self.all_null() {
            return true;
        }
        let (Some(min_value), Some(max_value)) = (self.min.as_ref(), self.max.as_ref()) else {
            return false;
        };
        let (Some(v_vs_min), Some(v_vs_max)) = (value.compare(min_value), value.compare(max_value))
        else {
            return false;
        };
        match condition {
            PredicateCondition::Equals => v_vs_min == Ordering::Less || v_vs_max == Ordering::Greater,
            PredicateCondition::NotEquals => {
                v_vs_min == Ordering::Equal && v_vs_max == Ordering::Equal
            }
            PredicateCondition::LessThan => v_vs_min != Ordering::Greater,
            PredicateCondition::LessThanEquals => v_vs_min == Ordering::Less,
            PredicateCondition::GreaterThan => v_vs_max != Ordering::Less,
            PredicateCondition::GreaterThanEquals => v_vs_max == Ordering::Greater,
            _ => false,
        }
    }

    /// True if no row can satisfy `column BETWEEN lower AND upper`.
    pub fn can_prune_between(&self, lower: &LiteralValue, upper: &LiteralValue) -> bool {
        if lower.is_null() || upper.is_null() {
            return false;
        }
        if self.all_null() {
            return true;
        }
        if lower.compare(upper) == Some(Ordering::Greater) {
            return true;
        }
        self.can_prune(PredicateCondition::GreaterThanEquals, lower)
            || self.can_prune(PredicateCondition::LessThanEquals, upper)
    }
}

/// Statistics of every column of one chunk, in column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkStatistics {
    segments: Vec<Option<SegmentStatistics>>,
}

impl ChunkStatistics {
    pub fn from_segments(segments: &[Segment]) -> Self {
        Self {
            segments: segments.iter().map(SegmentStatistics::from_segment).collect(),
        }
    }

    pub fn segment(&self, column: usize) -> Option<&SegmentStatistics> {
        self.segments.get(column).and_then(Option::as_ref)
    }
}

type MinMax = (Option<LiteralValue>, Option<LiteralValue>);

fn min_max(values: &ArrayRef) -> Option<MinMax> {
    let out = match values.data_type() {
        DataType::Boolean => {
            let arr: &BooleanArray = values.as_boolean();
            (
                min_boolean(arr).map(LiteralValue::Bool),
                max_boolean(arr).map(LiteralValue::Bool),
            )
        }
        DataType::Int32 => {
            let arr = values.as_any().downcast_ref::<Int32Array>()?;
            (
                min(arr).map(LiteralValue::Int32),
                max(arr).map(LiteralValue::Int32),
            )
        }
        DataType::Int64 => {
            let arr = values.as_any().downcast_ref::<Int64Array>()?;
            (
                min(arr).map(LiteralValue::Int64),
                max(arr).map(LiteralValue::Int64),
            )
        }
        DataType::Float32 => {
            let arr = values.as_any().downcast_ref::<Float32Array>()?;
            (
                min(arr).map(LiteralValue::Float32),
                max(arr).map(LiteralValue::Float32),
            )
        }
        DataType::Float64 => {
            let arr = values.as_any().downcast_ref::<Float64Array>()?;
            (
                min(arr).map(LiteralValue::Float64),
                max(arr).map(LiteralValue::Float64),
            )
        }
        DataType::Utf8 => {
            let arr = values.as_any().downcast_ref::<StringArray>()?;
            (
                min_string(arr).map(|s| LiteralValue::Utf8(s.to_string())),
                max_string(arr).map(|s| LiteralValue::Utf8(s.to_string())),
            )
        }
        _ => return None,
    };
    Some(out)
}
