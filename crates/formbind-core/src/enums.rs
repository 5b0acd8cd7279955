//! # Enum Descriptors
//!
//! An [`EnumDescriptor`] describes an enumeration type that properties can
//! be declared as: its name, whether it is pure or backed by string or
//! integer values, and its cases in declaration order.
//!
//! Descriptors are built once, validated on construction (case names and
//! backing values must be unique), and immutable afterwards. The cases
//! they hand out ([`EnumCase`]) are the values assigned to enum-typed
//! properties.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;

/// How an enum's cases are represented outside the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// Cases have names only.
    Pure,
    /// Each case carries a unique string backing value.
    BackedString,
    /// Each case carries a unique integer backing value.
    BackedInt,
}

impl EnumKind {
    /// Whether cases carry backing values.
    pub fn is_backed(&self) -> bool {
        !matches!(self, Self::Pure)
    }
}

/// The backing value of a case of a backed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Backing {
    /// Integer backing value.
    Int(i64),
    /// String backing value.
    String(String),
}

impl fmt::Display for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// One case of an enum.
///
/// Two cases are equal when they belong to the same enum and have the
/// same name.
#[derive(Debug, Clone)]
pub struct EnumCase {
    enum_name: Arc<str>,
    name: Arc<str>,
    backing: Option<Backing>,
}

impl EnumCase {
    /// Name of the enum this case belongs to.
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    /// Name of the case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing value, for cases of backed enums.
    pub fn backing(&self) -> Option<&Backing> {
        self.backing.as_ref()
    }

    /// Whether this case belongs to the enum called `enum_name`.
    pub fn is_case_of(&self, enum_name: &str) -> bool {
        &*self.enum_name == enum_name
    }
}

impl PartialEq for EnumCase {
    fn eq(&self, other: &Self) -> bool {
        self.enum_name == other.enum_name && self.name == other.name
    }
}

impl Eq for EnumCase {}

impl std::hash::Hash for EnumCase {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.enum_name.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for EnumCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.enum_name, self.name)
    }
}

/// Description of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: Arc<str>,
    kind: EnumKind,
    cases: Vec<EnumCase>,
}

impl EnumDescriptor {
    /// Describe a pure enum.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateEnumCase` if a case name
    /// occurs twice.
    pub fn pure<I, S>(name: &str, cases: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(
            name,
            EnumKind::Pure,
            cases.into_iter().map(|case| (case.into(), None)),
        )
    }

    /// Describe a string-backed enum from `(case name, backing value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateEnumCase` or
    /// `ConfigurationError::DuplicateBackingValue` on repeated names or
    /// values.
    pub fn backed_string<I, N, V>(name: &str, cases: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self::build(
            name,
            EnumKind::BackedString,
            cases
                .into_iter()
                .map(|(case, value)| (case.into(), Some(Backing::String(value.into())))),
        )
    }

    /// Describe an integer-backed enum from `(case name, backing value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateEnumCase` or
    /// `ConfigurationError::DuplicateBackingValue` on repeated names or
    /// values.
    pub fn backed_int<I, N>(name: &str, cases: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (N, i64)>,
        N: Into<String>,
    {
        Self::build(
            name,
            EnumKind::BackedInt,
            cases
                .into_iter()
                .map(|(case, value)| (case.into(), Some(Backing::Int(value)))),
        )
    }

    fn build(
        name: &str,
        kind: EnumKind,
        cases: impl Iterator<Item = (String, Option<Backing>)>,
    ) -> Result<Self, ConfigurationError> {
        let enum_name: Arc<str> = Arc::from(name);
        let mut built: Vec<EnumCase> = Vec::new();
        for (case_name, backing) in cases {
            if built.iter().any(|c| *c.name == *case_name) {
                return Err(ConfigurationError::DuplicateEnumCase {
                    enum_name: name.to_string(),
                    case: case_name,
                });
            }
            if let Some(value) = &backing {
                if built.iter().any(|c| c.backing.as_ref() == Some(value)) {
                    return Err(ConfigurationError::DuplicateBackingValue {
                        enum_name: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            built.push(EnumCase {
                enum_name: Arc::clone(&enum_name),
                name: Arc::from(case_name),
                backing,
            });
        }
        Ok(Self {
            name: enum_name,
            kind,
            cases: built,
        })
    }

    /// Name of the enum.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pure, string-backed or integer-backed.
    pub fn kind(&self) -> EnumKind {
        self.kind
    }

    /// Cases in declaration order.
    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    /// Look up a case by exact (case-sensitive) name.
    pub fn case(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|c| &*c.name == name)
    }

    /// Look up a case of an integer-backed enum by backing value.
    pub fn case_by_int(&self, value: i64) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|c| matches!(c.backing, Some(Backing::Int(i)) if i == value))
    }

    /// Look up a case of a string-backed enum by backing value.
    pub fn case_by_str(&self, value: &str) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|c| matches!(&c.backing, Some(Backing::String(s)) if s == value))
    }
}
