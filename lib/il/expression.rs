use crate::il::{Bit, WireAlist};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A unary operator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum UnaryOp {
    Not,
    Negate,
    ReduceAnd,
    ReduceOr,
    ReduceXor,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Cmpeq,
    Cmpneq,
    Cmplt,
    Cmpgt,
}

impl BinaryOp {
    /// Comparison operators always yield a single bit.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Cmpeq | BinaryOp::Cmpneq | BinaryOp::Cmplt | BinaryOp::Cmpgt
        )
    }
}

/// An expression over the wires of one module.
///
/// Expressions appear as assignment sides, conditions, gate arguments, and
/// module-instance connections. The analysis never evaluates an expression;
/// it only asks which bits the expression reads, and, for lvalues, which
/// bits it addresses.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Expression {
    /// A whole declared wire.
    Wire(String),
    /// A constant value of the given width.
    Const(u64, usize),
    /// A single-bit select, `wire[index]`.
    BitSelect(String, Box<Expression>),
    /// A constant part select, `wire[msb:lsb]`.
    PartSelect(String, usize, usize),
    /// A concatenation, msb-first.
    Concat(Vec<Expression>),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    /// `condition ? then : else`.
    Ternary(Box<Expression>, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn wire<S>(name: S) -> Expression
    where
        S: Into<String>,
    {
        Expression::Wire(name.into())
    }

    pub fn constant(value: u64, bits: usize) -> Expression {
        Expression::Const(value, bits)
    }

    pub fn bit_select<S>(wire: S, index: Expression) -> Expression
    where
        S: Into<String>,
    {
        Expression::BitSelect(wire.into(), Box::new(index))
    }

    pub fn part_select<S>(wire: S, msb: usize, lsb: usize) -> Expression
    where
        S: Into<String>,
    {
        Expression::PartSelect(wire.into(), msb, lsb)
    }

    pub fn concat(parts: Vec<Expression>) -> Expression {
        Expression::Concat(parts)
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Expression {
        Expression::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn ternary(condition: Expression, then: Expression, otherwise: Expression) -> Expression {
        Expression::Ternary(Box::new(condition), Box::new(then), Box::new(otherwise))
    }

    /// If this expression is a constant, its value.
    pub fn constant_value(&self) -> Option<u64> {
        match self {
            Expression::Const(value, _) => Some(*value),
            _ => None,
        }
    }

    /// True when this expression can be decomposed into addressable bits:
    /// a wire, a constant-indexed bit select, a part select, or a
    /// concatenation of lvalues.
    pub fn is_lvalue(&self) -> bool {
        match self {
            Expression::Wire(_) | Expression::PartSelect(..) => true,
            Expression::BitSelect(_, index) => index.constant_value().is_some(),
            Expression::Concat(parts) => parts.iter().all(|part| part.is_lvalue()),
            _ => false,
        }
    }

    /// Decompose an lvalue into its msb-first list of addressed bits.
    ///
    /// Returns `None` when the expression is not an lvalue, when a referenced
    /// wire is missing from the alist, or when a select falls outside the
    /// wire's declared range.
    pub fn lvalue_bits(&self, alist: &WireAlist) -> Option<Vec<Bit>> {
        match self {
            Expression::Wire(name) => alist.bits(name).map(|bits| bits.to_vec()),
            Expression::BitSelect(name, index) => {
                let index = index.constant_value()? as usize;
                alist
                    .bits(name)?
                    .iter()
                    .find(|bit| bit.index() == index)
                    .map(|bit| vec![bit.clone()])
            }
            Expression::PartSelect(name, msb, lsb) => {
                let lo = *msb.min(lsb);
                let hi = *msb.max(lsb);
                let bits = alist
                    .bits(name)?
                    .iter()
                    .filter(|bit| bit.index() >= lo && bit.index() <= hi)
                    .cloned()
                    .collect::<Vec<Bit>>();
                if bits.len() == hi - lo + 1 {
                    Some(bits)
                } else {
                    None
                }
            }
            Expression::Concat(parts) => {
                let mut bits = Vec::new();
                for part in parts {
                    bits.append(&mut part.lvalue_bits(alist)?);
                }
                Some(bits)
            }
            _ => None,
        }
    }

    /// Every bit read when this expression is evaluated.
    ///
    /// Constant selects are bit-exact. A variable-indexed bit select may read
    /// any bit of its base wire, so the whole wire is taken, along with
    /// whatever the index expression reads. Wires missing from the alist
    /// contribute nothing; see [`Expression::missing_wires`].
    pub fn source_bits(&self, alist: &WireAlist) -> Vec<Bit> {
        let mut bits = Vec::new();
        self.collect_source_bits(alist, &mut bits);
        bits
    }

    fn collect_source_bits(&self, alist: &WireAlist, bits: &mut Vec<Bit>) {
        match self {
            Expression::Wire(name) => {
                if let Some(wire_bits) = alist.bits(name) {
                    bits.extend(wire_bits.iter().cloned());
                }
            }
            Expression::Const(..) => {}
            Expression::BitSelect(name, index) => match index.constant_value() {
                Some(i) => {
                    if let Some(wire_bits) = alist.bits(name) {
                        bits.extend(
                            wire_bits
                                .iter()
                                .filter(|bit| bit.index() == i as usize)
                                .cloned(),
                        );
                    }
                }
                None => {
                    if let Some(wire_bits) = alist.bits(name) {
                        bits.extend(wire_bits.iter().cloned());
                    }
                    index.collect_source_bits(alist, bits);
                }
            },
            Expression::PartSelect(name, msb, lsb) => {
                let lo = *msb.min(lsb);
                let hi = *msb.max(lsb);
                if let Some(wire_bits) = alist.bits(name) {
                    bits.extend(
                        wire_bits
                            .iter()
                            .filter(|bit| bit.index() >= lo && bit.index() <= hi)
                            .cloned(),
                    );
                }
            }
            Expression::Concat(parts) => {
                for part in parts {
                    part.collect_source_bits(alist, bits);
                }
            }
            Expression::Unary(_, operand) => operand.collect_source_bits(alist, bits),
            Expression::Binary(_, lhs, rhs) => {
                lhs.collect_source_bits(alist, bits);
                rhs.collect_source_bits(alist, bits);
            }
            Expression::Ternary(condition, then, otherwise) => {
                condition.collect_source_bits(alist, bits);
                then.collect_source_bits(alist, bits);
                otherwise.collect_source_bits(alist, bits);
            }
        }
    }

    /// The name of every wire this expression references.
    pub fn wires(&self) -> Vec<&str> {
        let mut wires = Vec::new();
        self.collect_wires(&mut wires);
        wires
    }

    fn collect_wires<'a>(&'a self, wires: &mut Vec<&'a str>) {
        match self {
            Expression::Wire(name) => wires.push(name),
            Expression::Const(..) => {}
            Expression::BitSelect(name, index) => {
                wires.push(name);
                index.collect_wires(wires);
            }
            Expression::PartSelect(name, ..) => wires.push(name),
            Expression::Concat(parts) => {
                for part in parts {
                    part.collect_wires(wires);
                }
            }
            Expression::Unary(_, operand) => operand.collect_wires(wires),
            Expression::Binary(_, lhs, rhs) => {
                lhs.collect_wires(wires);
                rhs.collect_wires(wires);
            }
            Expression::Ternary(condition, then, otherwise) => {
                condition.collect_wires(wires);
                then.collect_wires(wires);
                otherwise.collect_wires(wires);
            }
        }
    }

    /// Referenced wires with no binding in the alist, deduplicated.
    pub fn missing_wires<'a>(&'a self, alist: &WireAlist) -> Vec<&'a str> {
        self.wires()
            .into_iter()
            .filter(|wire| !alist.contains(wire))
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .collect()
    }

    /// The width of this expression in bits, or `None` when a referenced
    /// wire is missing from the alist.
    pub fn bit_length(&self, alist: &WireAlist) -> Option<usize> {
        match self {
            Expression::Wire(name) => alist.bits(name).map(|bits| bits.len()),
            Expression::Const(_, bits) => Some(*bits),
            Expression::BitSelect(..) => Some(1),
            Expression::PartSelect(_, msb, lsb) => Some(msb.max(lsb) - msb.min(lsb) + 1),
            Expression::Concat(parts) => {
                let mut length = 0;
                for part in parts {
                    length += part.bit_length(alist)?;
                }
                Some(length)
            }
            Expression::Unary(op, operand) => match op {
                UnaryOp::ReduceAnd | UnaryOp::ReduceOr | UnaryOp::ReduceXor => Some(1),
                UnaryOp::Not | UnaryOp::Negate => operand.bit_length(alist),
            },
            Expression::Binary(op, lhs, rhs) => {
                if op.is_comparison() {
                    Some(1)
                } else {
                    let lhs = lhs.bit_length(alist)?;
                    let rhs = rhs.bit_length(alist)?;
                    Some(lhs.max(rhs))
                }
            }
            Expression::Ternary(_, then, otherwise) => {
                let then = then.bit_length(alist)?;
                let otherwise = otherwise.bit_length(alist)?;
                Some(then.max(otherwise))
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Wire(name) => write!(f, "{}", name),
            Expression::Const(value, bits) => write!(f, "{}'d{}", bits, value),
            Expression::BitSelect(name, index) => write!(f, "{}[{}]", name, index),
            Expression::PartSelect(name, msb, lsb) => write!(f, "{}[{}:{}]", name, msb, lsb),
            Expression::Concat(parts) => {
                write!(f, "{{")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, "}}")
            }
            Expression::Unary(op, operand) => {
                let op = match op {
                    UnaryOp::Not => "~",
                    UnaryOp::Negate => "-",
                    UnaryOp::ReduceAnd => "&",
                    UnaryOp::ReduceOr => "|",
                    UnaryOp::ReduceXor => "^",
                };
                write!(f, "{}({})", op, operand)
            }
            Expression::Binary(op, lhs, rhs) => {
                let op = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::And => "&",
                    BinaryOp::Or => "|",
                    BinaryOp::Xor => "^",
                    BinaryOp::Shl => "<<",
                    BinaryOp::Shr => ">>",
                    BinaryOp::Cmpeq => "==",
                    BinaryOp::Cmpneq => "!=",
                    BinaryOp::Cmplt => "<",
                    BinaryOp::Cmpgt => ">",
                };
                write!(f, "({} {} {})", lhs, op, rhs)
            }
            Expression::Ternary(condition, then, otherwise) => {
                write!(f, "({} ? {} : {})", condition, then, otherwise)
            }
        }
    }
}

#[test]
fn lvalue_decomposition() {
    let mut alist = WireAlist::new();
    alist.declare("a", 3, 0);
    alist.declare("b", 0, 0);

    let expr = Expression::wire("a");
    assert!(expr.is_lvalue());
    assert_eq!(expr.lvalue_bits(&alist).unwrap().len(), 4);

    let expr = Expression::bit_select("a", Expression::constant(2, 32));
    assert_eq!(expr.lvalue_bits(&alist).unwrap(), vec![Bit::new("a", 2)]);

    let expr = Expression::concat(vec![
        Expression::wire("b"),
        Expression::part_select("a", 1, 0),
    ]);
    assert!(expr.is_lvalue());
    let bits = expr.lvalue_bits(&alist).unwrap();
    assert_eq!(
        bits,
        vec![Bit::new("b", 0), Bit::new("a", 1), Bit::new("a", 0)]
    );

    let expr = Expression::binary(BinaryOp::Add, Expression::wire("a"), Expression::wire("b"));
    assert!(!expr.is_lvalue());
    assert!(expr.lvalue_bits(&alist).is_none());
}

#[test]
fn source_bits_are_bit_exact_for_constant_selects() {
    let mut alist = WireAlist::new();
    alist.declare("a", 3, 0);
    alist.declare("i", 1, 0);

    let expr = Expression::bit_select("a", Expression::constant(3, 32));
    assert_eq!(expr.source_bits(&alist), vec![Bit::new("a", 3)]);

    // A variable index may read any bit of the base wire.
    let expr = Expression::bit_select("a", Expression::wire("i"));
    let bits = expr.source_bits(&alist);
    assert_eq!(bits.len(), 6);
}

#[test]
fn bit_length() {
    let mut alist = WireAlist::new();
    alist.declare("a", 3, 0);
    alist.declare("b", 0, 0);

    assert_eq!(Expression::wire("a").bit_length(&alist), Some(4));
    assert_eq!(
        Expression::concat(vec![Expression::wire("a"), Expression::wire("b")]).bit_length(&alist),
        Some(5)
    );
    assert_eq!(
        Expression::binary(BinaryOp::Cmpeq, Expression::wire("a"), Expression::wire("a"))
            .bit_length(&alist),
        Some(1)
    );
    assert_eq!(Expression::wire("missing").bit_length(&alist), None);
}
