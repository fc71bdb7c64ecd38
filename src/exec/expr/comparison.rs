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
use super::{LiteralValue, PredicateCondition, cast, literal};
use arrow::array::{Array, ArrayRef, BooleanArray, Datum, Scalar};
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq, neq};
use arrow::datatypes::DataType;

fn apply(
    condition: PredicateCondition,
    left: &dyn Datum,
    right: &dyn Datum,
) -> Result<BooleanArray, String> {
    let out = match condition {
        PredicateCondition::Equals => eq(left, right),
        PredicateCondition::NotEquals => neq(left, right),
        PredicateCondition::LessThan => lt(left, right),
        PredicateCondition::LessThanEquals => lt_eq(left, right),
        PredicateCondition::GreaterThan => gt(left, right),
        PredicateCondition::GreaterThanEquals => gt_eq(left, right),
        other => return Err(format!("{other} is not a comparison")),
    };
    out.map_err(|e| e.to_string())
}

/// Row-wise `left <condition> right` with implicit coercion. NULL on either side yields NULL.
pub(crate) fn compare_arrays(
    condition: PredicateCondition,
    left: &ArrayRef,
    right: &ArrayRef,
) -> Result<BooleanArray, String> {
    if left.len() != right.len() {
        return Err(format!(
            "comparison operands differ in length: {} vs {}",
            left.len(),
            right.len()
        ));
    }
    if matches!(left.data_type(), DataType::Null) || matches!(right.data_type(), DataType::Null) {
        return Ok(BooleanArray::new_null(left.len()));
    }
    let (l, r) = cast::coerce_pair(left, right)?;
    apply(condition, &l, &r)
}

/// `values <condition> constant`, the constant broadcast as an arrow scalar.
pub(crate) fn compare_with_literal(
    condition: PredicateCondition,
    values: &ArrayRef,
    constant: &LiteralValue,
) -> Result<BooleanArray, String> {
    if constant.is_null() || matches!(values.data_type(), DataType::Null) {
        return Ok(BooleanArray::new_null(values.len()));
    }
    let constant = literal::eval(constant, 1)?;
    let target = cast::common_type(values.data_type(), constant.data_type())?;
    let l = cast::cast_to(values, &target)?;
    let r = Scalar::new(cast::cast_to(&constant, &target)?);
    apply(condition, &l, &r)
}
