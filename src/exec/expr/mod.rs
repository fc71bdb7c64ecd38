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
//! Predicate expression arena.
//!
//! Responsibilities:
//! - Stores expression trees as `ExprNode`s addressed by `ExprId`.
//! - Resolves constants (literals and bound parameters) for scan strategy selection.
//! - Evaluates any expression row-wise against the columns of one chunk.
//!
//! Key exported interfaces:
//! - Types: `ExprArena`, `ExprNode`, `ExprId`, `LiteralValue`, `PredicateCondition`.
//! - Traits: `ColumnSource`.
//! - Functions: `flip_predicate_condition`.

mod arithmetic;
pub(crate) mod cast;
pub(crate) mod comparison;
mod function;
pub mod like;
pub(crate) mod literal;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::is_null;
use arrow::compute::kernels::boolean::{and_kleene, not, or_kleene};
use std::sync::Arc;

use crate::common::ids::{ColumnId, ParameterId};

pub use self::function::FunctionKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExprId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
}

impl LiteralValue {
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    pub fn data_type(&self) -> arrow::datatypes::DataType {
        use arrow::datatypes::DataType;
        match self {
            LiteralValue::Null => DataType::Null,
            LiteralValue::Bool(_) => DataType::Boolean,
            LiteralValue::Int32(_) => DataType::Int32,
            LiteralValue::Int64(_) => DataType::Int64,
            LiteralValue::Float32(_) => DataType::Float32,
            LiteralValue::Float64(_) => DataType::Float64,
            LiteralValue::Utf8(_) => DataType::Utf8,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            LiteralValue::Int32(v) => Some(i64::from(*v)),
            LiteralValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Int32(v) => Some(f64::from(*v)),
            LiteralValue::Int64(v) => Some(*v as f64),
            LiteralValue::Float32(v) => Some(f64::from(*v)),
            LiteralValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed comparison of two non-null values. Numbers compare across widths; anything else
    /// only against its own type.
    pub fn compare(&self, other: &LiteralValue) -> Option<Ordering> {
        if let (Some(l), Some(r)) = (self.as_i64(), other.as_i64()) {
            return Some(l.cmp(&r));
        }
        if let (Some(l), Some(r)) = (self.as_f64(), other.as_f64()) {
            return l.partial_cmp(&r);
        }
        match (self, other) {
            (LiteralValue::Utf8(l), LiteralValue::Utf8(r)) => Some(l.cmp(r)),
            (LiteralValue::Bool(l), LiteralValue::Bool(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "NULL"),
            LiteralValue::Bool(v) => write!(f, "{v}"),
            LiteralValue::Int32(v) => write!(f, "{v}"),
            LiteralValue::Int64(v) => write!(f, "{v}"),
            LiteralValue::Float32(v) => write!(f, "{v}"),
            LiteralValue::Float64(v) => write!(f, "{v}"),
            LiteralValue::Utf8(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PredicateCondition {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
    Between,
}

impl PredicateCondition {
    /// `=, <>, <, <=, >, >=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            PredicateCondition::Equals
                | PredicateCondition::NotEquals
                | PredicateCondition::LessThan
                | PredicateCondition::LessThanEquals
                | PredicateCondition::GreaterThan
                | PredicateCondition::GreaterThanEquals
        )
    }

    pub fn is_like(self) -> bool {
        matches!(self, PredicateCondition::Like | PredicateCondition::NotLike)
    }

    pub fn sql(self) -> &'static str {
        match self {
            PredicateCondition::Equals => "=",
            PredicateCondition::NotEquals => "<>",
            PredicateCondition::LessThan => "<",
            PredicateCondition::LessThanEquals => "<=",
            PredicateCondition::GreaterThan => ">",
            PredicateCondition::GreaterThanEquals => ">=",
            PredicateCondition::Like => "LIKE",
            PredicateCondition::NotLike => "NOT LIKE",
            PredicateCondition::IsNull => "IS NULL",
            PredicateCondition::IsNotNull => "IS NOT NULL",
            PredicateCondition::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for PredicateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// Mirror a comparison so that `a op b` == `b flip(op) a`. `None` for conditions that have no
/// mirrored form.
pub fn flip_predicate_condition(condition: PredicateCondition) -> Option<PredicateCondition> {
    match condition {
        PredicateCondition::Equals => Some(PredicateCondition::Equals),
        PredicateCondition::NotEquals => Some(PredicateCondition::NotEquals),
        PredicateCondition::LessThan => Some(PredicateCondition::GreaterThan),
        PredicateCondition::LessThanEquals => Some(PredicateCondition::GreaterThanEquals),
        PredicateCondition::GreaterThan => Some(PredicateCondition::LessThan),
        PredicateCondition::GreaterThanEquals => Some(PredicateCondition::LessThanEquals),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    fn sql(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }
}

#[derive(Clone, Debug)]
pub enum ExprNode {
    Literal(LiteralValue),
    /// Prepared-statement placeholder; `value` is filled in by `ExprArena::set_parameters`.
    Parameter {
        id: ParameterId,
        value: Option<LiteralValue>,
    },
    Column(ColumnId),
    /// `=, <>, <, <=, >, >=, LIKE, NOT LIKE`.
    BinaryPredicate {
        condition: PredicateCondition,
        left: ExprId,
        right: ExprId,
    },
    /// `IS NULL` / `IS NOT NULL`.
    IsNull {
        condition: PredicateCondition,
        operand: ExprId,
    },
    /// Inclusive on both ends.
    Between {
        value: ExprId,
        lower: ExprId,
        upper: ExprId,
    },
    And(ExprId, ExprId),
    Or(ExprId, ExprId),
    Not(ExprId),
    Arithmetic {
        op: ArithmeticOp,
        left: ExprId,
        right: ExprId,
    },
    Function {
        kind: FunctionKind,
        args: Vec<ExprId>,
    },
}

/// Rows of one chunk, materialized per column on demand.
pub trait ColumnSource {
    fn num_rows(&self) -> usize;
    fn column(&self, column_id: ColumnId) -> Result<ArrayRef, String>;
}

#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ExprNode) -> ExprId {
        let id = ExprId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: ExprId) -> Option<&ExprNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn expect_node(&self, id: ExprId) -> Result<&ExprNode, String> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| format!("invalid ExprId {}", id.0))
    }

    /// Children of a node, in evaluation order.
    fn children(node: &ExprNode) -> Vec<ExprId> {
        match node {
            ExprNode::Literal(_) | ExprNode::Parameter { .. } | ExprNode::Column(_) => Vec::new(),
            ExprNode::BinaryPredicate { left, right, .. }
            | ExprNode::Arithmetic { left, right, .. } => vec![*left, *right],
            ExprNode::IsNull { operand, .. } => vec![*operand],
            ExprNode::Between {
                value,
                lower,
                upper,
            } => vec![*value, *lower, *upper],
            ExprNode::And(a, b) | ExprNode::Or(a, b) => vec![*a, *b],
            ExprNode::Not(child) => vec![*child],
            ExprNode::Function { args, .. } => args.clone(),
        }
    }

    /// Copy the subtree rooted at `root` into a fresh arena. The copy shares nothing with
    /// `self`; binding parameters on one does not affect the other.
    pub fn deep_copy(&self, root: ExprId) -> Result<(ExprArena, ExprId), String> {
        let mut out = ExprArena::new();
        let mut mapping: HashMap<ExprId, ExprId> = HashMap::new();
        let new_root = self.copy_into(root, &mut out, &mut mapping)?;
        Ok((out, new_root))
    }

    fn copy_into(
        &self,
        id: ExprId,
        out: &mut ExprArena,
        mapping: &mut HashMap<ExprId, ExprId>,
    ) -> Result<ExprId, String> {
        if let Some(existing) = mapping.get(&id) {
            return Ok(*existing);
        }
        let node = self.expect_node(id)?;
        let mut remapped = Vec::new();
        for child in Self::children(node) {
            remapped.push(self.copy_into(child, out, mapping)?);
        }
        let copied = match node {
            ExprNode::Literal(_) | ExprNode::Parameter { .. } | ExprNode::Column(_) => node.clone(),
            ExprNode::BinaryPredicate { condition, .. } => ExprNode::BinaryPredicate {
                condition: *condition,
                left: remapped[0],
                right: remapped[1],
            },
            ExprNode::Arithmetic { op, .. } => ExprNode::Arithmetic {
                op: *op,
                left: remapped[0],
                right: remapped[1],
            },
            ExprNode::IsNull { condition, .. } => ExprNode::IsNull {
                condition: *condition,
                operand: remapped[0],
            },
            ExprNode::Between { .. } => ExprNode::Between {
                value: remapped[0],
                lower: remapped[1],
                upper: remapped[2],
            },
            ExprNode::And(..) => ExprNode::And(remapped[0], remapped[1]),
            ExprNode::Or(..) => ExprNode::Or(remapped[0], remapped[1]),
            ExprNode::Not(_) => ExprNode::Not(remapped[0]),
            ExprNode::Function { kind, .. } => ExprNode::Function {
                kind: *kind,
                args: remapped,
            },
        };
        let new_id = out.push(copied);
        mapping.insert(id, new_id);
        Ok(new_id)
    }

    /// Bind placeholder values. Parameters absent from `parameters` keep their current value.
    pub fn set_parameters(&mut self, parameters: &HashMap<ParameterId, LiteralValue>) {
        for node in &mut self.nodes {
            if let ExprNode::Parameter { id, value } = node
                && let Some(bound) = parameters.get(id)
            {
                *value = Some(bound.clone());
            }
        }
    }

    /// Non-null constant behind `id`: a literal, or a parameter with a bound value.
    pub fn constant_value(&self, id: ExprId) -> Option<&LiteralValue> {
        let value = match self.node(id)? {
            ExprNode::Literal(v) => v,
            ExprNode::Parameter {
                value: Some(v), ..
            } => v,
            _ => return None,
        };
        (!value.is_null()).then_some(value)
    }

    pub fn column_id(&self, id: ExprId) -> Option<ColumnId> {
        match self.node(id)? {
            ExprNode::Column(column_id) => Some(*column_id),
            _ => None,
        }
    }

    /// Human-readable rendering, columns as `#<id>`.
    pub fn as_column_name(&self, id: ExprId) -> String {
        let Some(node) = self.node(id) else {
            return "<invalid>".to_string();
        };
        match node {
            ExprNode::Literal(LiteralValue::Utf8(s)) => format!("'{s}'"),
            ExprNode::Literal(v) => v.to_string(),
            ExprNode::Parameter { id, value } => match value {
                Some(LiteralValue::Utf8(s)) => format!("'{s}'"),
                Some(v) => v.to_string(),
                None => format!("Placeholder[id={id}]"),
            },
            ExprNode::Column(column_id) => format!("#{column_id}"),
            ExprNode::BinaryPredicate {
                condition,
                left,
                right,
            } => format!(
                "{} {} {}",
                self.as_column_name(*left),
                condition,
                self.as_column_name(*right)
            ),
            ExprNode::IsNull { condition, operand } => {
                format!("{} {}", self.as_column_name(*operand), condition)
            }
            ExprNode::Between {
                value,
                lower,
                upper,
            } => format!(
                "{} BETWEEN {} AND {}",
                self.as_column_name(*value),
                self.as_column_name(*lower),
                self.as_column_name(*upper)
            ),
            ExprNode::And(a, b) => format!(
                "({}) AND ({})",
                self.as_column_name(*a),
                self.as_column_name(*b)
            ),
            ExprNode::Or(a, b) => format!(
                "({}) OR ({})",
                self.as_column_name(*a),
                self.as_column_name(*b)
            ),
            ExprNode::Not(child) => format!("NOT ({})", self.as_column_name(*child)),
            ExprNode::Arithmetic { op, left, right } => format!(
                "{} {} {}",
                self.as_column_name(*left),
                op.sql(),
                self.as_column_name(*right)
            ),
            ExprNode::Function { kind, args } => {
                let rendered: Vec<String> =
                    args.iter().map(|a| self.as_column_name(*a)).collect();
                format!("{}({})", kind.name(), rendered.join(", "))
            }
        }
    }

    /// Evaluate `id` for every row of `source`. Predicates yield a `BooleanArray` where NULL
    /// means "unknown".
    pub fn eval(&self, id: ExprId, source: &dyn ColumnSource) -> Result<ArrayRef, String> {
        let rows = source.num_rows();
        match self.expect_node(id)? {
            ExprNode::Literal(v) => literal::eval(v, rows),
            ExprNode::Parameter { id, value } => match value {
                Some(v) => literal::eval(v, rows),
                None => Err(format!("parameter {id} is not bound")),
            },
            ExprNode::Column(column_id) => {
                let column = source.column(*column_id)?;
                if column.len() != rows {
                    return Err(format!(
                        "column #{} has {} rows, expected {}",
                        column_id,
                        column.len(),
                        rows
                    ));
                }
                Ok(column)
            }
            ExprNode::BinaryPredicate {
                condition,
                left,
                right,
            } => {
                let l = self.eval(*left, source)?;
                let r = self.eval(*right, source)?;
                if condition.is_like() {
                    let matched = like::eval_like_arrays(&l, &r)?;
                    return if *condition == PredicateCondition::NotLike {
                        let negated = not(&matched).map_err(|e| e.to_string())?;
                        Ok(Arc::new(negated))
                    } else {
                        Ok(Arc::new(matched))
                    };
                }
                let out = comparison::compare_arrays(*condition, &l, &r)?;
                Ok(Arc::new(out))
            }
            ExprNode::IsNull { condition, operand } => {
                let value = self.eval(*operand, source)?;
                let nulls = is_null(value.as_ref()).map_err(|e| e.to_string())?;
                if *condition == PredicateCondition::IsNotNull {
                    let negated = not(&nulls).map_err(|e| e.to_string())?;
                    return Ok(Arc::new(negated));
                }
                Ok(Arc::new(nulls))
            }
            ExprNode::Between {
                value,
                lower,
                upper,
            } => {
                let v = self.eval(*value, source)?;
                let lo = self.eval(*lower, source)?;
                let hi = self.eval(*upper, source)?;
                let ge = comparison::compare_arrays(PredicateCondition::GreaterThanEquals, &v, &lo)?;
                let le = comparison::compare_arrays(PredicateCondition::LessThanEquals, &v, &hi)?;
                let out = and_kleene(&ge, &le).map_err(|e| e.to_string())?;
                Ok(Arc::new(out))
            }
            ExprNode::And(a, b) => {
                let l = self.eval_boolean(*a, source)?;
                let r = self.eval_boolean(*b, source)?;
                let out = and_kleene(&l, &r).map_err(|e| e.to_string())?;
                Ok(Arc::new(out))
            }
            ExprNode::Or(a, b) => {
                let l = self.eval_boolean(*a, source)?;
                let r = self.eval_boolean(*b, source)?;
                let out = or_kleene(&l, &r).map_err(|e| e.to_string())?;
                Ok(Arc::new(out))
            }
            ExprNode::Not(child) => {
                let v = self.eval_boolean(*child, source)?;
                let out = not(&v).map_err(|e| e.to_string())?;
                Ok(Arc::new(out))
            }
            ExprNode::Arithmetic { op, left, right } => {
                let l = self.eval(*left, source)?;
                let r = self.eval(*right, source)?;
                arithmetic::eval_arithmetic(*op, &l, &r)
            }
            ExprNode::Function { kind, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(*arg, source)?);
                }
                function::eval_function(*kind, &evaluated)
            }
        }
    }

    /// Evaluate a predicate. A NULL-typed result (e.g. a bare NULL literal) counts as all-unknown.
    pub fn eval_boolean(
        &self,
        id: ExprId,
        source: &dyn ColumnSource,
    ) -> Result<BooleanArray, String> {
        let value = self.eval(id, source)?;
        cast::to_boolean(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray};

    struct Batch(Vec<ArrayRef>);

    impl ColumnSource for Batch {
        fn num_rows(&self) -> usize {
            self.0.first().map(|c| c.len()).unwrap_or(0)
        }

        fn column(&self, column_id: ColumnId) -> Result<ArrayRef, String> {
            self.0
                .get(column_id.as_usize())
                .cloned()
                .ok_or_else(|| format!("no column #{column_id}"))
        }
    }

    fn batch() -> Batch {
        Batch(vec![
            Arc::new(Int32Array::from(vec![Some(1), None, Some(10), Some(4)])) as ArrayRef,
            Arc::new(StringArray::from(vec!["a", "b", "c", "d"])) as ArrayRef,
        ])
    }

    #[test]
    fn flip_mirrors_inequalities_only() {
        assert_eq!(
            flip_predicate_condition(PredicateCondition::LessThan),
            Some(PredicateCondition::GreaterThan)
        );
        assert_eq!(
            flip_predicate_condition(PredicateCondition::Equals),
            Some(PredicateCondition::Equals)
        );
        assert_eq!(flip_predicate_condition(PredicateCondition::Like), None);
    }

    #[test]
    fn kleene_or_keeps_true_over_unknown() {
        let mut arena = ExprArena::new();
        let col = arena.push(ExprNode::Column(ColumnId(0)));
        let five = arena.push(ExprNode::Literal(LiteralValue::Int32(5)));
        let gt = arena.push(ExprNode::BinaryPredicate {
            condition: PredicateCondition::GreaterThan,
            left: col,
            right: five,
        });
        let null = arena.push(ExprNode::Literal(LiteralValue::Null));
        let or = arena.push(ExprNode::Or(gt, null));
        let out = arena.eval_boolean(or, &batch()).expect("eval");
        assert_eq!(
            out.iter().collect::<Vec<_>>(),
            vec![None, None, Some(true), None]
        );
    }

    #[test]
    fn deep_copy_is_independent_of_parameter_binding() {
        let mut arena = ExprArena::new();
        let col = arena.push(ExprNode::Column(ColumnId(0)));
        let param = arena.push(ExprNode::Parameter {
            id: ParameterId(0),
            value: None,
        });
        let eq = arena.push(ExprNode::BinaryPredicate {
            condition: PredicateCondition::Equals,
            left: col,
            right: param,
        });
        let (mut copy, root) = arena.deep_copy(eq).expect("deep copy");
        copy.set_parameters(&HashMap::from([(ParameterId(0), LiteralValue::Int32(4))]));
        assert_eq!(copy.as_column_name(root), "#0 = 4");
        assert_eq!(arena.as_column_name(eq), "#0 = Placeholder[id=0]");
        assert!(arena.constant_value(param).is_none());
    }

    #[test]
    fn unbound_parameter_fails_evaluation() {
        let mut arena = ExprArena::new();
        let param = arena.push(ExprNode::Parameter {
            id: ParameterId(3),
            value: None,
        });
        let err = arena.eval(param, &batch()).expect_err("unbound");
        assert!(err.contains("not bound"), "err={err}");
    }

    #[test]
    fn literal_compare_spans_numeric_widths() {
        assert_eq!(
            LiteralValue::Int32(3).compare(&LiteralValue::Float64(3.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            LiteralValue::Int64(7).compare(&LiteralValue::Int32(7)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            LiteralValue::Utf8("a".into()).compare(&LiteralValue::Int32(1)),
            None
        );
    }
}
