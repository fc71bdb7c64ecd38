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
use arrow::array::{Array, ArrayRef, Int64Array, StringArray, new_null_array};
use arrow::datatypes::DataType;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FunctionKind {
    Upper,
    Lower,
    /// Character count, not byte count.
    Length,
}

impl FunctionKind {
    pub fn name(self) -> &'static str {
        match self {
            FunctionKind::Upper => "UPPER",
            FunctionKind::Lower => "LOWER",
            FunctionKind::Length => "LENGTH",
        }
    }
}

fn single_string_arg<'a>(
    kind: FunctionKind,
    args: &'a [ArrayRef],
) -> Result<Option<&'a StringArray>, String> {
    if args.len() != 1 {
        return Err(format!(
            "{} expects 1 argument, got {}",
            kind.name(),
            args.len()
        ));
    }
    if matches!(args[0].data_type(), DataType::Null) {
        return Ok(None);
    }
    args[0]
        .as_any()
        .downcast_ref::<StringArray>()
        .map(Some)
        .ok_or_else(|| {
            format!(
                "{} expects a string argument, got {:?}",
                kind.name(),
                args[0].data_type()
            )
        })
}

pub fn eval_function(kind: FunctionKind, args: &[ArrayRef]) -> Result<ArrayRef, String> {
    let Some(input) = single_string_arg(kind, args)? else {
        let out_type = match kind {
            FunctionKind::Length => DataType::Int64,
            _ => DataType::Utf8,
        };
        return Ok(new_null_array(&out_type, args[0].len()));
    };
    let out: ArrayRef = match kind {
        FunctionKind::Upper => Arc::new(
            input
                .iter()
                .map(|v| v.map(str::to_uppercase))
                .collect::<StringArray>(),
        ),
        FunctionKind::Lower => Arc::new(
            input
                .iter()
                .map(|v| v.map(str::to_lowercase))
                .collect::<StringArray>(),
        ),
        FunctionKind::Length => Arc::new(
            input
                .iter()
                .map(|v| v.map(|s| s.chars().count() as i64))
                .collect::<Int64Array>(),
        ),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters() {
        let input: ArrayRef = Arc::new(StringArray::from(vec![Some("äb"), None, Some("")]));
        let out = eval_function(FunctionKind::Length, &[input]).expect("length");
        let out = out.as_any().downcast_ref::<Int64Array>().expect("int64");
        assert_eq!(out.iter().collect::<Vec<_>>(), vec![Some(2), None, Some(0)]);
    }

    #[test]
    fn upper_rejects_numbers() {
        let input: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        assert!(eval_function(FunctionKind::Upper, &[input]).is_err());
    }
}
