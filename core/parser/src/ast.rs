//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The evaluator in the engine crate
//! walks it once per row.
//!
//! SUPPORTED EXPRESSIONS:
//! - Number literals (percent literals arrive as `n / 100`)
//! - Column references: [Area]
//! - Binary operations: +, -, *, /
//! - Unary operations: -, +

/// Represents a parsed formula expression.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),

    /// A reference to another column of the same row, by exact name.
    Column(String),

    /// A binary operation: left op right (e.g., [Area] * 10).
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A unary operation: op operand (e.g., -[Descuento]).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

/// Binary operators for expressions.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
}

impl BinaryOperator {
    /// Binding strength, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

/// Unary operators.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Negate, // -
    Plus,   // +
}

impl Expression {
    /// Column names referenced by this expression, in first-appearance order
    /// and without duplicates.
    pub fn columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Number(_) => {}
            Expression::Column(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_columns(names);
                right.collect_columns(names);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_columns(names),
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Plus => write!(f, "+"),
        }
    }
}

/// Renders the expression back to formula text. Parentheses are emitted only
/// where precedence or associativity requires them.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Column(name) => write!(f, "[{}]", name),
            Expression::UnaryOp { op, operand } => match operand.as_ref() {
                Expression::BinaryOp { .. } => write!(f, "{}({})", op, operand),
                _ => write!(f, "{}{}", op, operand),
            },
            Expression::BinaryOp { left, op, right } => {
                let wrap_left = matches!(left.as_ref(),
                    Expression::BinaryOp { op: inner, .. } if inner.precedence() < op.precedence());
                // Right side also needs parentheses at equal precedence: a - (b - c)
                let wrap_right = matches!(right.as_ref(),
                    Expression::BinaryOp { op: inner, .. } if inner.precedence() <= op.precedence());

                if wrap_left {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", op)?;
                if wrap_right {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
        }
    }
}
