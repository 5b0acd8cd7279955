//! # Declared Property Types
//!
//! [`DeclaredType`] is the type tag a property is declared with. Primitive
//! tags are handled by the binder directly; named types are resolved
//! against a type catalog into an enum or a class/interface when a value
//! reaches coercion.
//!
//! `Float`, `Iterable`, `Union` and `Intersection` are representable so
//! that schemas can describe them, but the binder refuses to bind them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// Dynamic (`mixed`): anything is accepted unchanged.
    Any,
    /// `bool`.
    Bool,
    /// `string`.
    String,
    /// `int`.
    Int,
    /// `float`. Not implemented by the binder.
    Float,
    /// `array`: lists and maps.
    Array,
    /// `iterable`. Not implemented by the binder.
    Iterable,
    /// A registered enum.
    Enum(String),
    /// A registered class or interface.
    Class(String),
    /// A name not yet resolved against a catalog.
    Named(String),
    /// `A|B`. Rejected by the binder.
    Union(Vec<DeclaredType>),
    /// `A&B`. Rejected by the binder.
    Intersection(Vec<DeclaredType>),
}

impl DeclaredType {
    /// Whether the binder can ever bind this type. Named types may still
    /// fail to resolve.
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            Self::Float | Self::Iterable | Self::Union(_) | Self::Intersection(_)
        )
    }

    /// The type name for named, enum and class types.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) | Self::Class(name) | Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("mixed"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Array => f.write_str("array"),
            Self::Iterable => f.write_str("iterable"),
            Self::Enum(name) | Self::Class(name) | Self::Named(name) => f.write_str(name),
            Self::Union(members) => write_joined(f, members, "|"),
            Self::Intersection(members) => write_joined(f, members, "&"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &[DeclaredType], sep: &str) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{member}")?;
    }
    Ok(())
}

/// A type expression that cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid type expression {input:?}")]
pub struct ParseTypeError {
    /// The rejected expression.
    pub input: String,
}

impl FromStr for DeclaredType {
    type Err = ParseTypeError;

    /// Parse a type expression.
    ///
    /// `mixed` and `any` are the dynamic type; `A|B` and `A&B` parse into
    /// union and intersection types; any other identifier becomes
    /// [`DeclaredType::Named`]. A `?` nullability marker is not part of
    /// the type and is rejected here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTypeError {
            input: s.to_string(),
        };
        let s = s.trim();
        if s.contains('|') {
            return parse_members(s, '|').map(Self::Union).ok_or_else(invalid);
        }
        if s.contains('&') {
            return parse_members(s, '&')
                .map(Self::Intersection)
                .ok_or_else(invalid);
        }
        if !is_identifier(s) {
            return Err(invalid());
        }
        Ok(match s {
            "mixed" | "any" => Self::Any,
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "float" => Self::Float,
            "array" => Self::Array,
            "iterable" => Self::Iterable,
            name => Self::Named(name.to_string()),
        })
    }
}

fn parse_members(s: &str, sep: char) -> Option<Vec<DeclaredType>> {
    s.split(sep)
        .map(|member| {
            let member = member.trim();
            // Members are plain names; nested composites are not allowed.
            if is_identifier(member) {
                member.parse().ok()
            } else {
                None
            }
        })
        .collect()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '\\' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '\\' || c == ':')
}
