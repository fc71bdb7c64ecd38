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
//! Integration tests for the table scan operator and its strategies.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::common::{
    between, binary, column, column_vs_int, int_column, int_table, literal, mixed_table,
    sorted_int_column, started_scheduler, TestConfig,
};
use ferroscan::common::ids::{ChunkId, ChunkOffset, ColumnId, ParameterId};
use ferroscan::exec::expr::{
    ArithmeticOp, ExprArena, ExprId, ExprNode, FunctionKind, LiteralValue, PredicateCondition,
};
use ferroscan::exec::pruning::exclude_chunks;
use ferroscan::runtime::{QueryContext, SchedulerHandle};
use ferroscan::storage::pos_list::{PosList, RowId};
use ferroscan::storage::segment::{ReferenceSegment, Segment};
use ferroscan::storage::table::{Table, TableKind};
use ferroscan::storage::TableRegistry;
use ferroscan::{DescriptionMode, TableScan, execute_table_scan};

mod common;

fn sync_ctx(registry: &Arc<TableRegistry>) -> QueryContext {
    QueryContext::new(Arc::clone(registry), SchedulerHandle::none())
}

fn reference_pos_list(table: &Table, chunk: usize, column_id: u16) -> Arc<PosList> {
    let segment = table.chunks()[chunk]
        .get_segment(ColumnId(column_id))
        .and_then(Segment::as_reference)
        .expect("reference segment");
    Arc::clone(segment.pos_list())
}

fn offsets(table: &Table, chunk: usize) -> Vec<u32> {
    reference_pos_list(table, chunk, 0).offsets()
}

/// Matched offsets of every output chunk, keyed by the input chunk they came from.
fn offsets_by_input_chunk(table: &Table) -> BTreeMap<ChunkId, Vec<u32>> {
    (0..table.chunk_count())
        .map(|chunk| {
            let pos_list = reference_pos_list(table, chunk, 0);
            (pos_list[0].chunk_id, pos_list.offsets())
        })
        .collect()
}

fn sample_mixed(registry: &TableRegistry, name: &str, encode: bool) -> Arc<Table> {
    mixed_table(
        registry,
        name,
        vec![Some(1), Some(7), None, Some(12), Some(3), Some(9), Some(-4), None],
        vec![Some(1), Some(8), Some(2), Some(12), None, Some(0), Some(-4), Some(5)],
        vec![
            Some("apple"),
            Some("banana"),
            Some("apricot"),
            None,
            Some("cherry"),
            Some("avocado"),
            Some("grape"),
            Some("a"),
        ],
        3,
        encode,
    )
}

#[test]
fn between_over_three_chunks() {
    let registry = TableRegistry::new();
    let table = int_table(
        &registry,
        "t",
        &[
            vec![Some(1), Some(5)],
            vec![Some(10), Some(15)],
            vec![Some(20), Some(3)],
        ],
    );
    let mut arena = ExprArena::new();
    let root = between(&mut arena, 0, LiteralValue::Int32(4), LiteralValue::Int32(16));

    let scan = TableScan::new(Arc::new(arena), root);
    let out = scan.execute(table, &sync_ctx(&registry)).expect("scan");

    assert_eq!(out.kind(), TableKind::References);
    assert_eq!(out.chunk_count(), 2);
    assert_eq!(out.row_count(), 3);
    assert_eq!(offsets(&out, 0), vec![1]);
    assert_eq!(offsets(&out, 1), vec![0, 1]);
    let chunk_ids: Vec<ChunkId> = (0..2)
        .map(|c| reference_pos_list(&out, c, 0)[0].chunk_id)
        .collect();
    assert_eq!(chunk_ids, vec![ChunkId(0), ChunkId(1)]);
    assert_eq!(
        int_column(&registry, &out, 0),
        vec![Some(5), Some(10), Some(15)]
    );
}

#[test]
fn reversed_operands_match_forward_scan() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);
    for (forward, reversed) in [
        (PredicateCondition::GreaterThan, PredicateCondition::LessThan),
        (PredicateCondition::LessThanEquals, PredicateCondition::GreaterThanEquals),
        (PredicateCondition::Equals, PredicateCondition::Equals),
        (PredicateCondition::NotEquals, PredicateCondition::NotEquals),
    ] {
        let mut a = ExprArena::new();
        let root_a = column_vs_int(&mut a, 0, forward, 7);

        let mut b = ExprArena::new();
        let constant = literal(&mut b, LiteralValue::Int32(7));
        let col = column(&mut b, 0);
        let root_b = binary(&mut b, reversed, constant, col);

        let out_a = execute_table_scan(Arc::clone(&table), Arc::new(a), root_a, Vec::new(), &ctx)
            .expect("forward");
        let out_b = execute_table_scan(Arc::clone(&table), Arc::new(b), root_b, Vec::new(), &ctx)
            .expect("reversed");
        assert_eq!(
            int_column(&registry, &out_a, 0),
            int_column(&registry, &out_b, 0),
            "{forward} vs reversed {reversed}"
        );
    }
}

#[test]
fn nulls_never_match_but_is_null_selects_them() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::NotEquals, 3);
    let out = execute_table_scan(Arc::clone(&table), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("scan");
    let values = int_column(&registry, &out, 0);
    assert_eq!(
        values,
        vec![Some(1), Some(7), Some(12), Some(9), Some(-4)]
    );

    let mut arena = ExprArena::new();
    let operand = column(&mut arena, 0);
    let root = arena.push(ExprNode::IsNull {
        condition: PredicateCondition::IsNull,
        operand,
    });
    let out = execute_table_scan(Arc::clone(&table), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("scan");
    assert_eq!(out.row_count(), 2);
    assert_eq!(int_column(&registry, &out, 0), vec![None, None]);

    let mut arena = ExprArena::new();
    let operand = column(&mut arena, 1);
    let root = arena.push(ExprNode::IsNull {
        condition: PredicateCondition::IsNotNull,
        operand,
    });
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &ctx).expect("scan");
    assert_eq!(out.row_count(), 7);
}

#[test]
fn columns_of_one_chunk_share_a_position_list() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::GreaterThan, 0);
    let out = execute_table_scan(Arc::clone(&table), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("first scan");
    assert!(out.chunk_count() > 0);
    for chunk in 0..out.chunk_count() {
        let first = reference_pos_list(&out, chunk, 0);
        for column_id in 1..3 {
            assert!(Arc::ptr_eq(&first, &reference_pos_list(&out, chunk, column_id)));
        }
        let segment = out.chunks()[chunk]
            .get_segment(ColumnId(1))
            .and_then(Segment::as_reference)
            .expect("reference");
        assert_eq!(segment.referenced_table(), table.id().expect("registered"));
        assert_eq!(segment.referenced_column_id(), ColumnId(1));
    }

    // Chained scan over the references table keeps sharing and points at the data table.
    let out = Arc::new(out);
    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 1, PredicateCondition::GreaterThan, 1);
    let chained = execute_table_scan(Arc::clone(&out), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("chained scan");
    assert_eq!(int_column(&registry, &chained, 0), vec![Some(7), Some(12)]);
    for chunk in 0..chained.chunk_count() {
        let first = reference_pos_list(&chained, chunk, 0);
        assert!(Arc::ptr_eq(&first, &reference_pos_list(&chained, chunk, 2)));
        assert!(first.iter().all(|r| !r.is_null()));
    }
}

#[test]
fn distinct_upstream_lists_stay_distinct() {
    let registry = TableRegistry::new();
    let data = int_table(
        &registry,
        "t",
        &[vec![Some(10), Some(20), Some(30), Some(40)]],
    );
    let data_id = data.id().expect("registered");
    let forward = Arc::new(PosList::from(
        (0..4)
            .map(|i| RowId::new(ChunkId(0), ChunkOffset(i)))
            .collect::<Vec<_>>(),
    ));
    let backward = Arc::new(PosList::from(
        (0..4)
            .rev()
            .map(|i| RowId::new(ChunkId(0), ChunkOffset(i)))
            .collect::<Vec<_>>(),
    ));
    let mut defs = data.column_definitions().to_vec();
    let mut second = defs[0].clone();
    second.name = "a_reversed".to_string();
    let mut third = defs[0].clone();
    third.name = "a_again".to_string();
    defs.push(second);
    defs.push(third);
    let mut refs = Table::new(defs, TableKind::References, 16);
    refs.append_chunk(
        vec![
            Segment::Reference(ReferenceSegment::new(data_id, ColumnId(0), Arc::clone(&forward))),
            Segment::Reference(ReferenceSegment::new(data_id, ColumnId(0), Arc::clone(&backward))),
            Segment::Reference(ReferenceSegment::new(data_id, ColumnId(0), Arc::clone(&forward))),
        ],
        None,
    )
    .expect("append");

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::GreaterThanEquals, 30);
    let out = execute_table_scan(
        Arc::new(refs),
        Arc::new(arena),
        root,
        Vec::new(),
        &sync_ctx(&registry),
    )
    .expect("scan");

    let a = reference_pos_list(&out, 0, 0);
    let b = reference_pos_list(&out, 0, 1);
    let c = reference_pos_list(&out, 0, 2);
    assert!(Arc::ptr_eq(&a, &c));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(int_column(&registry, &out, 0), vec![Some(30), Some(40)]);
    assert_eq!(int_column(&registry, &out, 1), vec![Some(20), Some(10)]);
}

#[test]
fn excluded_chunks_do_not_change_results() {
    let registry = TableRegistry::new();
    let table = int_table(
        &registry,
        "t",
        &[
            vec![Some(1), Some(2), Some(3)],
            vec![Some(40), Some(50)],
            vec![None, None],
            vec![Some(5), Some(45)],
        ],
    );
    let ctx = sync_ctx(&registry);
    let mut arena = ExprArena::new();
    let root = between(&mut arena, 0, LiteralValue::Int32(35), LiteralValue::Float64(47.5));
    let arena = Arc::new(arena);

    let excluded = exclude_chunks(&table, &arena, root);
    assert_eq!(excluded, vec![ChunkId(0), ChunkId(2)]);

    let full = execute_table_scan(Arc::clone(&table), Arc::clone(&arena), root, Vec::new(), &ctx)
        .expect("full scan");
    let pruned = execute_table_scan(Arc::clone(&table), arena, root, excluded, &ctx)
        .expect("pruned scan");
    assert_eq!(
        int_column(&registry, &full, 0),
        int_column(&registry, &pruned, 0)
    );
    assert_eq!(int_column(&registry, &full, 0), vec![Some(40), Some(45)]);

    // Skipped chunks are never touched.
    let untouched = table.chunks()[0].access_counter().count();
    let touched = table.chunks()[1].access_counter().count();
    assert_eq!(untouched, 1);
    assert_eq!(touched, 2);
}

#[test]
fn scheduler_and_inline_execution_agree() {
    let registry = TableRegistry::new();
    let rows: Vec<Option<i32>> = (0..500).map(|v| (v % 7 != 0).then_some(v)).collect();
    let mut chunks = Vec::new();
    for chunk in rows.chunks(16) {
        chunks.push(chunk.to_vec());
    }
    let table = int_table(&registry, "t", &chunks);

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::LessThan, 250);
    let arena = Arc::new(arena);

    let inline = execute_table_scan(
        Arc::clone(&table),
        Arc::clone(&arena),
        root,
        Vec::new(),
        &sync_ctx(&registry),
    )
    .expect("inline");

    let scheduler = started_scheduler(4);
    let ctx = QueryContext::new(
        Arc::clone(&registry),
        SchedulerHandle::new(Arc::clone(&scheduler)),
    );
    let parallel = execute_table_scan(Arc::clone(&table), arena, root, Vec::new(), &ctx)
        .expect("parallel");
    scheduler.finish();

    assert_eq!(inline.chunk_count(), parallel.chunk_count());
    assert_eq!(
        sorted_int_column(&registry, &inline, 0),
        sorted_int_column(&registry, &parallel, 0)
    );
    assert_eq!(inline.row_count(), (0..250).filter(|v| v % 7 != 0).count());

    let inline_offsets = offsets_by_input_chunk(&inline);
    let parallel_offsets = offsets_by_input_chunk(&parallel);
    assert_eq!(inline_offsets.len(), inline.chunk_count());
    assert_eq!(inline_offsets, parallel_offsets);
    for offsets in parallel_offsets.values() {
        assert!(offsets.windows(2).all(|w| w[0] < w[1]), "offsets={offsets:?}");
    }
    // Chunk 0 holds 0..16 with the multiples of 7 NULL.
    assert_eq!(
        parallel_offsets.get(&ChunkId(0)),
        Some(&vec![1, 2, 3, 4, 5, 6, 8, 9, 10, 11, 12, 13, 15])
    );
}

#[test]
fn column_comparison_skips_null_operands() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let l = column(&mut arena, 0);
    let r = column(&mut arena, 1);
    let root = binary(&mut arena, PredicateCondition::LessThan, l, r);
    let scan = TableScan::new(Arc::new(arena), root);
    let out = scan.execute(Arc::clone(&table), &ctx).expect("a < b");
    assert!(scan
        .description(DescriptionMode::SingleLine)
        .contains("ColumnComparison"));
    // Rows with a NULL on either side never match.
    assert_eq!(int_column(&registry, &out, 0), vec![Some(7)]);
    assert_eq!(int_column(&registry, &out, 1), vec![Some(8)]);

    let mut arena = ExprArena::new();
    let l = column(&mut arena, 0);
    let r = column(&mut arena, 1);
    let root = binary(&mut arena, PredicateCondition::NotEquals, l, r);
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &ctx).expect("a <> b");
    assert_eq!(int_column(&registry, &out, 0), vec![Some(7), Some(9)]);
}

#[test]
fn chunks_without_matches_are_omitted() {
    let registry = TableRegistry::new();
    let table = int_table(
        &registry,
        "t",
        &[vec![Some(1), Some(2)], vec![Some(3)], vec![Some(100)]],
    );
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::GreaterThan, 500);
    let out = execute_table_scan(Arc::clone(&table), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("scan");
    assert_eq!(out.chunk_count(), 0);
    assert_eq!(out.column_definitions(), table.column_definitions());

    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::Equals, 3);
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &ctx).expect("scan");
    assert_eq!(out.chunk_count(), 1);
    assert_eq!(reference_pos_list(&out, 0, 0)[0], RowId::new(ChunkId(1), ChunkOffset(0)));
}

#[test]
fn encoded_and_plain_tables_scan_the_same() {
    let registry = TableRegistry::new();
    let plain = sample_mixed(&registry, "plain", false);
    let encoded = sample_mixed(&registry, "encoded", true);
    assert!(encoded.chunks()[0]
        .segments()
        .iter()
        .all(|s| matches!(s, Segment::Dictionary(_))));
    let ctx = sync_ctx(&registry);

    let build: [fn(&mut ExprArena) -> ExprId; 5] = [
        |a| column_vs_int(a, 0, PredicateCondition::GreaterThanEquals, 7),
        |a| between(a, 1, LiteralValue::Int32(0), LiteralValue::Int32(8)),
        |a| {
            let operand = column(a, 0);
            a.push(ExprNode::IsNull {
                condition: PredicateCondition::IsNull,
                operand,
            })
        },
        |a| {
            let s = column(a, 2);
            let p = literal(a, LiteralValue::Utf8("a%".to_string()));
            binary(a, PredicateCondition::Like, s, p)
        },
        |a| {
            let l = column(a, 0);
            let r = column(a, 1);
            binary(a, PredicateCondition::LessThan, l, r)
        },
    ];
    for make in &build {
        let mut arena = ExprArena::new();
        let root = make(&mut arena);
        let arena = Arc::new(arena);
        let p = execute_table_scan(Arc::clone(&plain), Arc::clone(&arena), root, Vec::new(), &ctx)
            .expect("plain scan");
        let e = execute_table_scan(Arc::clone(&encoded), Arc::clone(&arena), root, Vec::new(), &ctx)
            .expect("encoded scan");
        assert_eq!(
            int_column(&registry, &p, 1),
            int_column(&registry, &e, 1),
            "predicate {}",
            arena.as_column_name(root)
        );
    }
}

#[test]
fn like_and_not_like_on_strings() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let s = column(&mut arena, 2);
    let p = literal(&mut arena, LiteralValue::Utf8("a%o%".to_string()));
    let root = binary(&mut arena, PredicateCondition::Like, s, p);
    let out = execute_table_scan(Arc::clone(&table), Arc::new(arena), root, Vec::new(), &ctx)
        .expect("like");
    // apricot, avocado
    assert_eq!(int_column(&registry, &out, 0), vec![None, Some(9)]);

    let mut arena = ExprArena::new();
    let s = column(&mut arena, 2);
    let p = literal(&mut arena, LiteralValue::Utf8("a%".to_string()));
    let root = binary(&mut arena, PredicateCondition::NotLike, s, p);
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &ctx).expect("not like");
    // banana, cherry, grape; the NULL string row is excluded
    assert_eq!(
        int_column(&registry, &out, 0),
        vec![Some(7), Some(3), Some(-4)]
    );
}

#[test]
fn between_with_fractional_bounds() {
    let registry = TableRegistry::new();
    let table = int_table(
        &registry,
        "t",
        &[vec![Some(11), Some(12), Some(16), Some(17), None]],
    );
    let mut arena = ExprArena::new();
    let root = between(&mut arena, 0, LiteralValue::Float64(12.0), LiteralValue::Float64(16.5));
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &sync_ctx(&registry))
        .expect("scan");
    assert_eq!(int_column(&registry, &out, 0), vec![Some(12), Some(16)]);
}

#[test]
fn compound_predicates_use_the_evaluator() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);

    let mut arena = ExprArena::new();
    let a = column(&mut arena, 0);
    let b = column(&mut arena, 1);
    let sum = arena.push(ExprNode::Arithmetic {
        op: ArithmeticOp::Add,
        left: a,
        right: b,
    });
    let ten = literal(&mut arena, LiteralValue::Int32(10));
    let gt = binary(&mut arena, PredicateCondition::GreaterThan, sum, ten);
    let s = column(&mut arena, 2);
    let upper = arena.push(ExprNode::Function {
        kind: FunctionKind::Upper,
        args: vec![s],
    });
    let pattern = literal(&mut arena, LiteralValue::Utf8("%AN%".to_string()));
    let like = binary(&mut arena, PredicateCondition::Like, upper, pattern);
    let root = arena.push(ExprNode::Or(gt, like));

    let scan = TableScan::new(Arc::new(arena), root);
    let out = scan
        .execute(table, &sync_ctx(&registry))
        .expect("scan");
    // a+b > 10: banana(7+8), row 3 (12+12); UPPER(s) LIKE '%AN%': banana.
    assert_eq!(int_column(&registry, &out, 0), vec![Some(7), Some(12)]);
    assert!(scan
        .description(DescriptionMode::SingleLine)
        .contains("ExpressionEvaluator"));
}

#[test]
fn division_by_zero_rows_do_not_match() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);

    // a / b >= 1 where b = 0 on one row
    let mut arena = ExprArena::new();
    let a = column(&mut arena, 0);
    let b = column(&mut arena, 1);
    let div = arena.push(ExprNode::Arithmetic {
        op: ArithmeticOp::Div,
        left: a,
        right: b,
    });
    let one = literal(&mut arena, LiteralValue::Int32(1));
    let root = binary(&mut arena, PredicateCondition::GreaterThanEquals, div, one);
    let out = execute_table_scan(table, Arc::new(arena), root, Vec::new(), &sync_ctx(&registry))
        .expect("scan");
    assert_eq!(int_column(&registry, &out, 0), vec![Some(1), Some(12), Some(-4)]);
}

#[test]
fn parameters_and_deep_copy() {
    let registry = TableRegistry::new();
    let table = sample_mixed(&registry, "t", false);
    let ctx = sync_ctx(&registry);

    let mut arena = ExprArena::new();
    let a = column(&mut arena, 0);
    let param = arena.push(ExprNode::Parameter {
        id: ParameterId(0),
        value: None,
    });
    let root = binary(&mut arena, PredicateCondition::LessThan, a, param);
    let mut scan = TableScan::new(Arc::new(arena), root);
    assert!(scan
        .description(DescriptionMode::SingleLine)
        .contains("Impl unset"));

    let copy = scan.deep_copy().expect("deep copy");
    scan.set_parameters(&HashMap::from([(ParameterId(0), LiteralValue::Int32(4))]));
    let out = scan.execute(Arc::clone(&table), &ctx).expect("scan");
    assert_eq!(int_column(&registry, &out, 0), vec![Some(1), Some(3), Some(-4)]);
    assert!(scan
        .description(DescriptionMode::SingleLine)
        .contains("SingleColumnScan #0 < 4"));

    // The copy still holds an unbound placeholder; it evaluates through the fallback and fails.
    let err = copy.execute(table, &ctx).expect_err("unbound parameter");
    assert!(err.contains("not bound"), "err={err}");
    assert!(copy
        .description(DescriptionMode::MultiLine)
        .contains("ExpressionEvaluator"));
}

#[test]
fn output_chunks_share_input_access_counters() {
    let registry = TableRegistry::new();
    let table = int_table(&registry, "t", &[vec![Some(1), Some(2)], vec![Some(3)]]);
    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::GreaterThan, 0);
    let out = execute_table_scan(
        Arc::clone(&table),
        Arc::new(arena),
        root,
        Vec::new(),
        &sync_ctx(&registry),
    )
    .expect("scan");
    for (input_chunk, output_chunk) in table.chunks().iter().zip(out.chunks()) {
        assert!(Arc::ptr_eq(
            input_chunk.access_counter(),
            output_chunk.access_counter()
        ));
        assert_eq!(input_chunk.access_counter().count(), 1);
    }
}

#[test]
fn unregistered_data_table_is_rejected() {
    let registry = TableRegistry::new();
    let mut table = Table::new(
        vec![ferroscan::storage::ColumnDefinition::new(
            "a",
            arrow::datatypes::DataType::Int32,
            true,
        )],
        TableKind::Data,
        8,
    );
    table
        .append_arrays(vec![Arc::new(arrow::array::Int32Array::from(vec![1, 2]))])
        .expect("append");
    let mut arena = ExprArena::new();
    let root = column_vs_int(&mut arena, 0, PredicateCondition::GreaterThan, 0);
    let err = execute_table_scan(
        Arc::new(table),
        Arc::new(arena),
        root,
        Vec::new(),
        &sync_ctx(&registry),
    )
    .expect_err("unregistered");
    assert!(err.contains("registered"), "err={err}");
}

#[test]
fn config_file_drives_table_chunking() {
    let test_config = TestConfig::new().expect("test config");
    let config = test_config.load_config().expect("load config");
    assert_eq!(config.storage.max_chunk_size, 4);
    assert!(config.debug.log_scan_strategy);

    let mut table = Table::new(
        vec![ferroscan::storage::ColumnDefinition::new(
            "a",
            arrow::datatypes::DataType::Int32,
            false,
        )],
        TableKind::Data,
        config.storage.max_chunk_size,
    );
    table
        .append_arrays(vec![Arc::new(arrow::array::Int32Array::from(
            (0..10).collect::<Vec<i32>>(),
        ))])
        .expect("append");
    assert_eq!(table.chunk_count(), 3);
}
