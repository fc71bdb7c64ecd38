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
//! Per-column storage within a chunk.
//!
//! A segment is one of three closed kinds:
//! - `Value`: an uncompressed Arrow array.
//! - `Dictionary`: an Arrow dictionary array (`UInt32` keys) produced by encoding a sealed chunk.
//! - `Reference`: an indirection into a column of a registered data table.
//!
//! Consumers never branch on the physical encoding themselves; they go through
//! `storage::column_view`, which hands out either a plain array or dictionary keys+values.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, DictionaryArray, UInt32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, UInt32Type};

use crate::common::ids::{ColumnId, TableId};
use crate::storage::pos_list::PosList;

#[derive(Clone, Debug)]
pub struct ValueSegment {
    values: ArrayRef,
}

impl ValueSegment {
    pub fn try_new(values: ArrayRef) -> Result<Self, String> {
        if matches!(values.data_type(), DataType::Dictionary(_, _)) {
            return Err(format!(
                "value segment cannot hold dictionary data: {:?}",
                values.data_type()
            ));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct DictionarySegment {
    array: DictionaryArray<UInt32Type>,
}

impl DictionarySegment {
    /// Dictionary-encode an uncompressed array.
    pub fn encode(values: &ArrayRef) -> Result<Self, String> {
        let value_type = values.data_type().clone();
        if !matches!(
            value_type,
            DataType::Int32 | DataType::Int64 | DataType::Utf8
        ) {
            return Err(format!(
                "dictionary encoding is not supported for {:?}",
                value_type
            ));
        }
        let target = DataType::Dictionary(Box::new(DataType::UInt32), Box::new(value_type));
        let encoded = cast(values.as_ref(), &target)
            .map_err(|e| format!("dictionary encode failed: {e}"))?;
        let array = encoded
            .as_any()
            .downcast_ref::<DictionaryArray<UInt32Type>>()
            .cloned()
            .ok_or_else(|| "dictionary encode produced unexpected array type".to_string())?;
        Ok(Self { array })
    }

    pub fn keys(&self) -> &UInt32Array {
        self.array.keys()
    }

    pub fn dictionary(&self) -> &ArrayRef {
        self.array.values()
    }

    pub fn unique_values_count(&self) -> usize {
        self.array.values().len()
    }

    pub fn value_data_type(&self) -> &DataType {
        self.array.values().data_type()
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }
}

/// Indirection into `referenced_table.referenced_column_id` through a shared position list.
///
/// The referenced table is always a data table; reference segments never chain.
#[derive(Clone, Debug)]
pub struct ReferenceSegment {
    referenced_table: TableId,
    referenced_column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table: TableId,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Self {
        Self {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    pub fn referenced_table(&self) -> TableId {
        self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn len(&self) -> usize {
        self.pos_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
    }
}

#[derive(Clone, Debug)]
pub enum Segment {
    Value(ValueSegment),
    Dictionary(DictionarySegment),
    Reference(ReferenceSegment),
}

impl Segment {
    pub fn len(&self) -> usize {
        match self {
            Segment::Value(s) => s.len(),
            Segment::Dictionary(s) => s.len(),
            Segment::Reference(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Segment::Value(_) => "ValueSegment",
            Segment::Dictionary(_) => "DictionarySegment",
            Segment::Reference(_) => "ReferenceSegment",
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceSegment> {
        match self {
            Segment::Reference(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Segment::Reference(_))
    }
}
