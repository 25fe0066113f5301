use std::fmt;

/// Coarse kind of a type, used for operator applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Bool,
    Int,
    Float,
    Char,
    String,
    Array,
    Dict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Int,
    Float,
    Char,
    String,
    Array(Box<Type>),
    Dict { key: Box<Type>, value: Box<Type> },
}

impl Type {
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn dict(key: Type, value: Type) -> Self {
        Type::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Type::Bool => Category::Bool,
            Type::Int => Category::Int,
            Type::Float => Category::Float,
            Type::Char => Category::Char,
            Type::String => Category::String,
            Type::Array(_) => Category::Array,
            Type::Dict { .. } => Category::Dict,
        }
    }

    pub fn is_composed(&self) -> bool {
        matches!(self, Type::Array(_) | Type::Dict { .. })
    }

    /// Structural type match: primitives by kind, composed types by kind and
    /// every type parameter, recursively.
    pub fn matches(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Array(a), Type::Array(b)) => a.matches(b),
            (
                Type::Dict { key: k1, value: v1 },
                Type::Dict { key: k2, value: v2 },
            ) => k1.matches(k2) && v1.matches(v2),
            (a, b) if a.is_composed() || b.is_composed() => false,
            (a, b) => a.category() == b.category(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Char => write!(f, "Char"),
            Type::String => write!(f, "String"),
            Type::Array(elem) => write!(f, "Array<{}>", elem),
            Type::Dict { key, value } => write!(f, "Dict<{}, {}>", key, value),
        }
    }
}
