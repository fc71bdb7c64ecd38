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
//! Implicit coercion between operand types of comparisons and arithmetic.

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;

fn is_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

fn is_numeric(data_type: &DataType) -> bool {
    is_integer(data_type)
        || matches!(
            data_type,
            DataType::UInt64 | DataType::Float32 | DataType::Float64
        )
}

/// Type both operands are cast to before comparing them.
pub(crate) fn common_type(left: &DataType, right: &DataType) -> Result<DataType, String> {
    if left == right {
        return Ok(left.clone());
    }
    match (left, right) {
        (DataType::Null, other) | (other, DataType::Null) => Ok(other.clone()),
        (l, r) if is_integer(l) && is_integer(r) => Ok(DataType::Int64),
        (l, r) if is_numeric(l) && is_numeric(r) => Ok(DataType::Float64),
        (DataType::Utf8, other) | (other, DataType::Utf8) if is_numeric(other) => {
            Ok(DataType::Float64)
        }
        _ => Err(format!(
            "cannot compare values of type {:?} and {:?}",
            left, right
        )),
    }
}

pub(crate) fn cast_to(array: &ArrayRef, target: &DataType) -> Result<ArrayRef, String> {
    if array.data_type() == target {
        return Ok(array.clone());
    }
    cast(array.as_ref(), target).map_err(|e| {
        format!(
            "cast failed from {:?} to {:?}: {}",
            array.data_type(),
            target,
            e
        )
    })
}

pub(crate) fn coerce_pair(
    left: &ArrayRef,
    right: &ArrayRef,
) -> Result<(ArrayRef, ArrayRef), String> {
    let target = common_type(left.data_type(), right.data_type())?;
    Ok((cast_to(left, &target)?, cast_to(right, &target)?))
}

pub(crate) fn to_boolean(array: &ArrayRef) -> Result<BooleanArray, String> {
    match array.data_type() {
        DataType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .cloned()
            .ok_or_else(|| "failed to downcast to BooleanArray".to_string()),
        DataType::Null => Ok(BooleanArray::new_null(array.len())),
        other => Err(format!("expected a boolean predicate result, got {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widths_widen_to_int64() {
        assert_eq!(
            common_type(&DataType::Int32, &DataType::Int64),
            Ok(DataType::Int64)
        );
        assert_eq!(
            common_type(&DataType::Int32, &DataType::Float32),
            Ok(DataType::Float64)
        );
        assert_eq!(
            common_type(&DataType::Null, &DataType::Utf8),
            Ok(DataType::Utf8)
        );
        assert!(common_type(&DataType::Boolean, &DataType::Int32).is_err());
    }
}
