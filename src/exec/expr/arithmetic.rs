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
use super::{ArithmeticOp, LiteralValue, cast, literal};
use arrow::array::{Array, ArrayRef, Scalar, new_null_array};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::kernels::numeric::{add, div, mul, rem, sub};
use arrow::compute::nullif;
use arrow::datatypes::DataType;

fn numeric_target(left: &DataType, right: &DataType) -> Result<DataType, String> {
    let target = cast::common_type(left, right)?;
    match target {
        DataType::Int64 | DataType::Float64 => Ok(target),
        DataType::Int8 | DataType::Int16 | DataType::Int32 => Ok(DataType::Int64),
        DataType::Float32 => Ok(DataType::Float64),
        other => Err(format!("arithmetic is not supported for {:?}", other)),
    }
}

/// Division and modulo by zero produce NULL rather than an error.
fn null_out_zero_divisors(divisor: &ArrayRef) -> Result<ArrayRef, String> {
    let zero = literal::eval(&LiteralValue::Int64(0), 1)?;
    let zero = Scalar::new(cast::cast_to(&zero, divisor.data_type())?);
    let is_zero = eq(divisor, &zero).map_err(|e| e.to_string())?;
    nullif(divisor.as_ref(), &is_zero).map_err(|e| e.to_string())
}

pub fn eval_arithmetic(
    op: ArithmeticOp,
    left: &ArrayRef,
    right: &ArrayRef,
) -> Result<ArrayRef, String> {
    if matches!(left.data_type(), DataType::Null) || matches!(right.data_type(), DataType::Null) {
        let data_type = match (left.data_type(), right.data_type()) {
            (DataType::Null, DataType::Null) => DataType::Null,
            (DataType::Null, other) | (other, _) => numeric_target(other, other)?,
        };
        return Ok(new_null_array(&data_type, left.len()));
    }
    let target = numeric_target(left.data_type(), right.data_type())?;
    let l = cast::cast_to(left, &target)?;
    let r = cast::cast_to(right, &target)?;
    let out = match op {
        ArithmeticOp::Add => add(&l, &r),
        ArithmeticOp::Sub => sub(&l, &r),
        ArithmeticOp::Mul => mul(&l, &r),
        ArithmeticOp::Div => div(&l, &null_out_zero_divisors(&r)?),
        ArithmeticOp::Mod => rem(&l, &null_out_zero_divisors(&r)?),
    };
    out.map_err(|e| format!("arithmetic {:?} failed: {}", op, e))
}
