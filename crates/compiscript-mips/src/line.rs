//! Shape recognition for textual TAC lines.
//!
//! One classifier instead of per-line regexes; the recognizable shapes are
//! exactly the instruction forms the TAC renderer produces.

/// A classified TAC line. Borrowed slices into the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacLine<'a> {
    Label(&'a str),
    BeginFunc,
    EndFunc,
    Goto(&'a str),
    IfFalse { cond: &'a str, target: &'a str },
    Param(&'a str),
    Call {
        dest: Option<&'a str>,
        name: &'a str,
        num_args: usize,
    },
    Return(Option<&'a str>),
    Binary {
        dest: &'a str,
        left: &'a str,
        op: &'a str,
        right: &'a str,
    },
    Unary {
        dest: &'a str,
        op: &'a str,
        operand: &'a str,
    },
    Copy {
        dest: &'a str,
        src: &'a str,
    },
    /// Anything else: object stores, array pseudo-ops, malformed input.
    Other(&'a str),
}

const BINARY_OPS: &[&str] = &[
    "<=", ">=", "==", "!=", "&&", "||", "<", ">", "+", "-", "*", "/", "%",
];

pub fn classify(line: &str) -> TacLine<'_> {
    let line = line.trim();

    if line == "BeginFunc" {
        return TacLine::BeginFunc;
    }
    if line == "EndFunc" {
        return TacLine::EndFunc;
    }
    if let Some(name) = line.strip_suffix(':')
        && is_ident(name)
    {
        return TacLine::Label(name);
    }
    if let Some(target) = line.strip_prefix("goto ") {
        return TacLine::Goto(target.trim());
    }
    if let Some(rest) = line.strip_prefix("if_false ") {
        if let Some((cond, target)) = rest.split_once(" goto ") {
            return TacLine::IfFalse {
                cond: cond.trim(),
                target: target.trim(),
            };
        }
        return TacLine::Other(line);
    }
    if let Some(value) = line.strip_prefix("param ") {
        return TacLine::Param(value.trim());
    }
    if line == "return" {
        return TacLine::Return(None);
    }
    if let Some(value) = line.strip_prefix("return ") {
        return TacLine::Return(Some(value.trim()));
    }
    if let Some(call) = line.strip_prefix("call ") {
        return classify_call(None, call, line);
    }

    if let Some((dest, rhs)) = line.split_once(" = ") {
        let dest = dest.trim();
        let rhs = rhs.trim();
        if !is_ident(dest) {
            // `a[0] = v`, `p.x = v` - object layout stays a stub.
            return TacLine::Other(line);
        }
        if let Some(call) = rhs.strip_prefix("call ") {
            return classify_call(Some(dest), call, line);
        }
        if let Some(operand) = rhs.strip_prefix("- ") {
            return TacLine::Unary {
                dest,
                op: "-",
                operand: operand.trim(),
            };
        }
        if let Some(operand) = rhs.strip_prefix("! ") {
            return TacLine::Unary {
                dest,
                op: "!",
                operand: operand.trim(),
            };
        }
        let parts: Vec<&str> = rhs.split(' ').collect();
        if parts.len() == 3 && BINARY_OPS.contains(&parts[1]) {
            return TacLine::Binary {
                dest,
                left: parts[0],
                op: parts[1],
                right: parts[2],
            };
        }
        if parts.len() == 1 {
            return TacLine::Copy { dest, src: parts[0] };
        }
        return TacLine::Other(line);
    }

    TacLine::Other(line)
}

fn classify_call<'a>(dest: Option<&'a str>, call: &'a str, whole: &'a str) -> TacLine<'a> {
    let Some((name, count)) = call.split_once(',') else {
        return TacLine::Other(whole);
    };
    let Ok(num_args) = count.trim().parse::<usize>() else {
        return TacLine::Other(whole);
    };
    TacLine::Call {
        dest,
        name: name.trim(),
        num_args,
    }
}

pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Temporaries are exactly `t<digits>`.
pub fn is_temp(name: &str) -> bool {
    name.strip_prefix('t')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// Integer literals, optionally negative.
pub fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
