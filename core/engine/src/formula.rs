//! FILENAME: core/engine/src/formula.rs
//! PURPOSE: Formula Evaluator. Computes derived columns from column arithmetic.
//! CONTEXT: Each formula is parsed once per pipeline run by the `parser` crate
//! and the resulting AST is walked per row. Only numbers, `[Column]` references
//! and `+ - * / ( )` exist in the grammar, so anything else fails to parse and
//! the formula yields 0. Failures never reach the caller.

use log::{debug, warn};
use parser::{BinaryOperator, Expression, ParseError, UnaryOperator};
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::row::{IndexedRow, Row};

/// A derived column: result column name plus the expression that computes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaColumn {
    pub name: String,
    pub expression: String,
}

impl FormulaColumn {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        FormulaColumn {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Formulas in evaluation order. A later formula may read an earlier result.
pub type FormulaSpec = Vec<FormulaColumn>;

/// A formula after parsing. `expression` is None when the source did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    pub name: String,
    pub expression: Option<Expression>,
}

impl CompiledFormula {
    pub fn compile(formula: &FormulaColumn) -> Result<Self, ParseError> {
        let expression = parser::parse(&formula.expression)?;
        Ok(CompiledFormula {
            name: formula.name.clone(),
            expression: Some(expression),
        })
    }

    /// Value of this formula for one row. Malformed formulas give 0.
    pub fn evaluate(&self, row: &Row) -> f64 {
        match &self.expression {
            Some(expr) => FormulaEvaluator::new(row).evaluate_or_zero(expr),
            None => 0.0,
        }
    }
}

/// Parses every formula. Failures are logged once here, not per row.
pub fn compile_formulas(spec: &[FormulaColumn]) -> Vec<CompiledFormula> {
    spec.iter()
        .map(|formula| match CompiledFormula::compile(formula) {
            Ok(compiled) => {
                if let Some(expr) = &compiled.expression {
                    debug!(
                        target: "FORMULA",
                        "formula '{}' reads {:?}",
                        formula.name,
                        expr.columns()
                    );
                }
                compiled
            }
            Err(e) => {
                warn!(
                    target: "FORMULA",
                    "formula '{}' = '{}' is malformed ({}); column evaluates to 0",
                    formula.name, formula.expression, e
                );
                CompiledFormula {
                    name: formula.name.clone(),
                    expression: None,
                }
            }
        })
        .collect()
}

// ============================================================================
// EVALUATOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum EvalError {
    DivisionByZero,
    NotFinite,
}

type EvalResult = Result<f64, EvalError>;

/// Walks an expression against the cells of one row.
pub struct FormulaEvaluator<'a> {
    row: &'a Row,
}

impl<'a> FormulaEvaluator<'a> {
    pub fn new(row: &'a Row) -> Self {
        FormulaEvaluator { row }
    }

    /// Evaluates `expr`; division by zero and non-finite results collapse to 0.
    pub fn evaluate_or_zero(&self, expr: &Expression) -> f64 {
        self.evaluate(expr).unwrap_or(0.0)
    }

    fn evaluate(&self, expr: &Expression) -> EvalResult {
        let value = match expr {
            Expression::Number(n) => *n,
            // Missing columns read as Empty, which coerces to 0
            Expression::Column(name) => self.row.value(name).coerce_number(),
            Expression::UnaryOp { op, operand } => {
                let v = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Negate => -v,
                    UnaryOperator::Plus => v,
                }
            }
            Expression::BinaryOp { left, op, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                match op {
                    BinaryOperator::Add => l + r,
                    BinaryOperator::Subtract => l - r,
                    BinaryOperator::Multiply => l * r,
                    BinaryOperator::Divide => {
                        if r == 0.0 {
                            return Err(EvalError::DivisionByZero);
                        }
                        l / r
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NotFinite)
        }
    }
}

/// Returns copies of `rows` with every formula column written as a number.
pub fn apply_formulas(rows: &[IndexedRow], spec: &[FormulaColumn]) -> Vec<IndexedRow> {
    if spec.is_empty() {
        return rows.to_vec();
    }

    let compiled = compile_formulas(spec);
    rows.iter()
        .map(|indexed| {
            let mut row = indexed.row.clone();
            for formula in &compiled {
                let value = formula.evaluate(&row);
                row.set(formula.name.clone(), CellValue::Number(value));
            }
            IndexedRow::new(indexed.source_index, row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<IndexedRow> {
        IndexedRow::enumerate(&[
            Row::from_iter([("A", CellValue::Number(2.0)), ("B", CellValue::Number(3.0))]),
            Row::from_iter([("A", CellValue::text("10 m2")), ("B", CellValue::Number(0.0))]),
        ])
    }

    fn column(rows: &[IndexedRow], name: &str) -> Vec<CellValue> {
        rows.iter().map(|r| r.row.value(name).clone()).collect()
    }

    #[test]
    fn computes_arithmetic_with_precedence() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "[A] + [B] * 2")]);
        assert_eq!(
            column(&out, "C"),
            vec![CellValue::Number(8.0), CellValue::Number(10.0)]
        );
    }

    #[test]
    fn percent_literal_divides_by_hundred() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "[A] * 50%")]);
        assert_eq!(column(&out, "C")[0], CellValue::Number(1.0));
    }

    #[test]
    fn missing_column_reads_as_zero() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "[Nope] + 1")]);
        assert_eq!(column(&out, "C")[0], CellValue::Number(1.0));
    }

    #[test]
    fn division_by_zero_yields_zero() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "[A] / [B]")]);
        assert_eq!(
            column(&out, "C"),
            vec![CellValue::Number(2.0 / 3.0), CellValue::Number(0.0)]
        );
    }

    #[test]
    fn injection_attempt_yields_zero_for_every_row() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "[A] + [B]); DROP")]);
        assert_eq!(
            column(&out, "C"),
            vec![CellValue::Number(0.0), CellValue::Number(0.0)]
        );
    }

    #[test]
    fn runaway_nesting_yields_zero() {
        let deep = format!("{}[A]{}", "(".repeat(100_000), ")".repeat(100_000));
        let signs = format!("{}[A]", "-".repeat(100_000));
        for source in [deep, signs] {
            let out = apply_formulas(&rows(), &[FormulaColumn::new("C", source)]);
            assert_eq!(column(&out, "C")[0], CellValue::Number(0.0));
        }
    }

    #[test]
    fn non_arithmetic_text_yields_zero() {
        for source in ["alert(1)", "[A] ^ 2", "", "=[A]", "\"x\""] {
            let out = apply_formulas(&rows(), &[FormulaColumn::new("C", source)]);
            assert_eq!(column(&out, "C")[0], CellValue::Number(0.0), "{}", source);
        }
    }

    #[test]
    fn overflow_collapses_to_zero() {
        let out = apply_formulas(&rows(), &[FormulaColumn::new("C", "1e308 * 10")]);
        assert_eq!(column(&out, "C")[0], CellValue::Number(0.0));
    }

    #[test]
    fn later_formula_reads_earlier_result() {
        let spec = vec![
            FormulaColumn::new("C", "[A] * 10"),
            FormulaColumn::new("D", "[C] + 1"),
        ];
        let out = apply_formulas(&rows(), &spec);
        assert_eq!(column(&out, "D")[1], CellValue::Number(101.0));
    }

    #[test]
    fn source_rows_are_not_mutated() {
        let input = rows();
        let _ = apply_formulas(&input, &[FormulaColumn::new("C", "[A]")]);
        assert!(input[0].row.get("C").is_none());
    }

    #[test]
    fn compile_keeps_failed_formulas_as_zero() {
        let compiled = compile_formulas(&[FormulaColumn::new("X", "[A] +")]);
        assert_eq!(compiled.len(), 1);
        assert!(compiled[0].expression.is_none());
        assert_eq!(compiled[0].evaluate(&Row::new()), 0.0);
    }
}
