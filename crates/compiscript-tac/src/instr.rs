//! TAC instruction variants and their textual forms.

use std::fmt;

/// An operand slot in a TAC instruction.
#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    /// Variable or temporary name.
    Name(String),
    Int(i64),
    Float(f64),
    /// Rendered double-quoted to keep string literals apart from names.
    Str(String),
    Bool(bool),
    Null,
    /// Fresh empty array value, rendered `[]`.
    EmptyArray,
}

impl Operand {
    pub fn name(s: impl Into<String>) -> Operand {
        Operand::Name(s.into())
    }

    /// Temporaries share the `t` prefix with nothing else the generator
    /// emits; the pool keys on it.
    pub fn is_temp(&self) -> bool {
        matches!(self, Operand::Name(n) if n.starts_with('t'))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(n) => write!(f, "{n}"),
            Operand::Int(v) => write!(f, "{v}"),
            Operand::Float(v) => write!(f, "{v}"),
            Operand::Str(s) => write!(f, "\"{s}\""),
            Operand::Bool(true) => write!(f, "true"),
            Operand::Bool(false) => write!(f, "false"),
            Operand::Null => write!(f, "null"),
            Operand::EmptyArray => write!(f, "[]"),
        }
    }
}

/// Binary operators, including the pseudo-ops for arrays and members.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    /// Append an element to an array value.
    Append,
    /// Array length query.
    Length,
    /// Indexed read.
    IndexGet,
    /// Member read; the right operand is the quoted member name.
    FieldGet,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Append => "append",
            BinOp::Length => "length",
            BinOp::IndexGet => "[]",
            BinOp::FieldGet => ".",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}

/// A single TAC instruction.
#[derive(Clone, PartialEq, Debug)]
pub enum Tac {
    /// `target = source`
    Assign { target: String, source: Operand },
    /// `target = left op right`
    BinaryOp {
        target: String,
        left: Operand,
        op: BinOp,
        right: Operand,
    },
    /// `target = op source`
    UnaryOp {
        target: String,
        op: UnOp,
        source: Operand,
    },
    /// `name:`
    Label { name: String },
    /// `goto target`
    Jump { target: String },
    /// `if_false condition goto target` - fires when the condition is false.
    CondJump { condition: Operand, target: String },
    /// `param value`
    Param { value: Operand },
    /// `[target =] call name, num_params`
    Call {
        target: Option<String>,
        name: String,
        num_params: usize,
    },
    /// `return [value]`
    Return { value: Option<Operand> },
    BeginFunc,
    EndFunc,
    /// `object.field = value` - member store (object layout is a back-end stub).
    SetField {
        object: Operand,
        field: String,
        value: Operand,
    },
    /// `array[index] = value` - indexed store (back-end stub).
    SetIndex {
        array: Operand,
        index: Operand,
        value: Operand,
    },
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tac::Assign { target, source } => write!(f, "{target} = {source}"),
            Tac::BinaryOp {
                target,
                left,
                op,
                right,
            } => write!(f, "{target} = {left} {op} {right}"),
            Tac::UnaryOp { target, op, source } => write!(f, "{target} = {op} {source}"),
            Tac::Label { name } => write!(f, "{name}:"),
            Tac::Jump { target } => write!(f, "goto {target}"),
            Tac::CondJump { condition, target } => {
                write!(f, "if_false {condition} goto {target}")
            }
            Tac::Param { value } => write!(f, "param {value}"),
            Tac::Call {
                target,
                name,
                num_params,
            } => match target {
                Some(t) => write!(f, "{t} = call {name}, {num_params}"),
                None => write!(f, "call {name}, {num_params}"),
            },
            Tac::Return { value } => match value {
                Some(v) => write!(f, "return {v}"),
                None => write!(f, "return"),
            },
            Tac::BeginFunc => write!(f, "BeginFunc"),
            Tac::EndFunc => write!(f, "EndFunc"),
            Tac::SetField {
                object,
                field,
                value,
            } => write!(f, "{object}.{field} = {value}"),
            Tac::SetIndex {
                array,
                index,
                value,
            } => write!(f, "{array}[{index}] = {value}"),
        }
    }
}

/// Renders an instruction sequence to the one-per-line textual form.
pub fn render(code: &[Tac]) -> String {
    let mut out = String::new();
    for instr in code {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}
