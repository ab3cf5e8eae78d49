//! The Compiscript type lattice.
//!
//! Types are closed data: primitives, a placeholder `Unknown` that only
//! exists while analysis is in flight, arrays (covariant on the element),
//! and nominal class types. Class subtyping is decided by the analyzer,
//! which owns the `extends` chains; everything else lives here.

use std::fmt;

/// A Compiscript type.
#[derive(Clone, PartialEq, Debug)]
pub enum Ty {
    Integer,
    Boolean,
    String,
    Float,
    Void,
    Null,
    /// Unresolved placeholder. Permissive on either side of an assignment
    /// so that analysis can continue past earlier errors.
    Unknown,
    Array(Box<Ty>),
    Class(String),
}

impl Ty {
    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Box::new(elem))
    }

    /// Storage size in bytes. References (strings, arrays, objects) are 8.
    pub fn size(&self) -> i32 {
        match self {
            Ty::Integer => 4,
            Ty::Boolean => 1,
            Ty::Float => 8,
            Ty::String => 8,
            Ty::Array(_) | Ty::Class(_) => 8,
            Ty::Void | Ty::Null => 0,
            // Inferred later; reserve a word so offsets stay distinct.
            Ty::Unknown => 4,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Integer | Ty::Float)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Ty::Boolean)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Ty::String)
    }

    /// Reference types accept `null`.
    pub fn is_reference(&self) -> bool {
        matches!(self, Ty::Array(_) | Ty::Class(_))
    }

    /// Resolves a type annotation name. Unlisted names are class references.
    pub fn from_name(name: &str) -> Ty {
        match name {
            "integer" => Ty::Integer,
            "boolean" => Ty::Boolean,
            "string" => Ty::String,
            "float" => Ty::Float,
            "void" => Ty::Void,
            other => Ty::Class(other.to_owned()),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Integer => write!(f, "integer"),
            Ty::Boolean => write!(f, "boolean"),
            Ty::String => write!(f, "string"),
            Ty::Float => write!(f, "float"),
            Ty::Void => write!(f, "void"),
            Ty::Null => write!(f, "null"),
            Ty::Unknown => write!(f, "<unknown>"),
            Ty::Array(elem) => write!(f, "{elem}[]"),
            Ty::Class(name) => write!(f, "{name}"),
        }
    }
}

/// Structural equality; arrays compare element-wise.
pub fn type_equals(a: &Ty, b: &Ty) -> bool {
    match (a, b) {
        (Ty::Array(x), Ty::Array(y)) => type_equals(x, y),
        _ => a == b,
    }
}

/// Result type of an arithmetic operator, or `None` if the operands are not
/// both numeric. Any float operand promotes the result to float.
pub fn numeric_result(a: &Ty, b: &Ty) -> Option<Ty> {
    if a.is_numeric() && b.is_numeric() {
        if matches!(a, Ty::Float) || matches!(b, Ty::Float) {
            Some(Ty::Float)
        } else {
            Some(Ty::Integer)
        }
    } else {
        None
    }
}

/// `==` / `!=` accept same-typed operands or any numeric pair.
pub fn are_eq_comparable(a: &Ty, b: &Ty) -> bool {
    type_equals(a, b) || (a.is_numeric() && b.is_numeric())
}

/// `<` `>` `<=` `>=` accept numeric operands only.
pub fn are_order_comparable(a: &Ty, b: &Ty) -> bool {
    a.is_numeric() && b.is_numeric()
}

/// `+` concatenates when either side is a string.
pub fn can_concat_with_plus(a: &Ty, b: &Ty) -> bool {
    a.is_string() || b.is_string()
}

/// Whether a value of type `value` may flow into a slot of type `target`.
///
/// `Unknown` is permissive on either side at the top level. Arrays are
/// covariant, with the strict rule for unresolved elements: `array(unknown)`
/// does not flow into a typed array unless the target element is also
/// unknown. `null` flows into references but never into primitives. Numeric
/// types do not convert implicitly.
pub fn is_assignable(target: &Ty, value: &Ty) -> bool {
    if value.is_unknown() || target.is_unknown() {
        return true;
    }
    match (target, value) {
        (Ty::Array(t), Ty::Array(v)) => {
            if v.is_unknown() {
                t.is_unknown()
            } else {
                is_assignable(t, v)
            }
        }
        _ if matches!(value, Ty::Null) => target.is_reference(),
        _ => type_equals(target, value),
    }
}
