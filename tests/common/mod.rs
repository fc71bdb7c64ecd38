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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use arrow::array::{Array, ArrayRef, Int32Array, StringArray};
use arrow::datatypes::DataType;

use ferroscan::common::ids::{ChunkId, ColumnId};
use ferroscan::exec::expr::{ExprArena, ExprId, ExprNode, LiteralValue, PredicateCondition};
use ferroscan::ferroscan_config;
use ferroscan::ferroscan_logging;
use ferroscan::runtime::{NodeQueueScheduler, SchedulerConfig};
use ferroscan::storage::column_view::column_view;
use ferroscan::storage::table::{ColumnDefinition, Table, TableKind};
use ferroscan::storage::TableRegistry;

/// Test configuration for integration tests.
pub struct TestConfig {
    /// Temporary directory for test artifacts
    pub temp_dir: TempDir,
    /// Test config path
    pub config_path: PathBuf,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("test_ferroscan.toml");

        let config_content = r#"
log_level = "debug"

[scheduler]
worker_threads = 2
node_queues = 1
idle_wait_us = 200

[storage]
max_chunk_size = 4

[debug]
log_scan_strategy = true
"#;

        std::fs::write(&config_path, config_content)?;

        Ok(Self {
            temp_dir,
            config_path,
        })
    }

    pub fn init_logging(&self) {
        ferroscan_logging::init_with_level("debug");
    }

    pub fn load_config(&self) -> anyhow::Result<ferroscan_config::FerroscanConfig> {
        ferroscan_config::FerroscanConfig::load_from_file(&self.config_path)
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new().expect("Failed to create test config")
    }
}

/// Register a table with one nullable Int32 column `a`, one chunk per entry of `chunks`.
pub fn int_table(registry: &TableRegistry, name: &str, chunks: &[Vec<Option<i32>>]) -> Arc<Table> {
    let mut table = Table::new(
        vec![ColumnDefinition::new("a", DataType::Int32, true)],
        TableKind::Data,
        1 << 16,
    );
    for chunk in chunks {
        table
            .append_arrays(vec![Arc::new(Int32Array::from(chunk.clone())) as ArrayRef])
            .expect("append chunk");
    }
    registry.register(name, table).expect("register table")
}

/// Register `(a Int32, b Int32, s Utf8)` split into chunks of `chunk_size` rows.
pub fn mixed_table(
    registry: &TableRegistry,
    name: &str,
    a: Vec<Option<i32>>,
    b: Vec<Option<i32>>,
    s: Vec<Option<&str>>,
    chunk_size: usize,
    encode: bool,
) -> Arc<Table> {
    let mut table = Table::new(
        vec![
            ColumnDefinition::new("a", DataType::Int32, true),
            ColumnDefinition::new("b", DataType::Int32, true),
            ColumnDefinition::new("s", DataType::Utf8, true),
        ],
        TableKind::Data,
        chunk_size,
    );
    table
        .append_arrays(vec![
            Arc::new(Int32Array::from(a)) as ArrayRef,
            Arc::new(Int32Array::from(b)) as ArrayRef,
            Arc::new(StringArray::from(s)) as ArrayRef,
        ])
        .expect("append rows");
    if encode {
        table.encode_all_chunks().expect("encode");
    }
    registry.register(name, table).expect("register table")
}

pub fn column(arena: &mut ExprArena, id: u16) -> ExprId {
    arena.push(ExprNode::Column(ColumnId(id)))
}

pub fn literal(arena: &mut ExprArena, value: LiteralValue) -> ExprId {
    arena.push(ExprNode::Literal(value))
}

pub fn binary(
    arena: &mut ExprArena,
    condition: PredicateCondition,
    left: ExprId,
    right: ExprId,
) -> ExprId {
    arena.push(ExprNode::BinaryPredicate {
        condition,
        left,
        right,
    })
}

/// `#column <condition> value`.
pub fn column_vs_int(
    arena: &mut ExprArena,
    column_id: u16,
    condition: PredicateCondition,
    value: i32,
) -> ExprId {
    let left = column(arena, column_id);
    let right = literal(arena, LiteralValue::Int32(value));
    binary(arena, condition, left, right)
}

pub fn between(arena: &mut ExprArena, column_id: u16, lower: LiteralValue, upper: LiteralValue) -> ExprId {
    let value = column(arena, column_id);
    let lower = literal(arena, lower);
    let upper = literal(arena, upper);
    arena.push(ExprNode::Between {
        value,
        lower,
        upper,
    })
}

/// Materialize an Int32 column of every chunk, concatenated in chunk order.
pub fn int_column(registry: &TableRegistry, table: &Table, column_id: u16) -> Vec<Option<i32>> {
    let mut out = Vec::new();
    for chunk in table.chunks() {
        let values = column_view(registry, chunk, ColumnId(column_id))
            .and_then(|v| v.into_plain())
            .expect("materialize column");
        let values = values
            .as_any()
            .downcast_ref::<Int32Array>()
            .expect("int32 column");
        out.extend(values.iter());
    }
    out
}

/// Same as `int_column`, sorted so results can be compared regardless of chunk order.
pub fn sorted_int_column(registry: &TableRegistry, table: &Table, column_id: u16) -> Vec<Option<i32>> {
    let mut values = int_column(registry, table, column_id);
    values.sort();
    values
}

pub fn started_scheduler(workers: usize) -> Arc<NodeQueueScheduler> {
    let scheduler = NodeQueueScheduler::new(SchedulerConfig::with_workers(workers));
    scheduler.begin().expect("start scheduler");
    scheduler
}

/// Run `f` and fail the test if it does not finish within `timeout`.
pub fn run_with_timeout<F, T>(timeout: Duration, f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(f());
    });

    match rx.recv_timeout(timeout) {
        Ok(v) => v,
        Err(_) => panic!("test timed out after {:?}", timeout),
    }
}

/// Assert that a result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}
