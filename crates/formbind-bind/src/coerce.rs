//! # Value Coercion
//!
//! Maps a raw value onto a property's declared type. Coercion is split in
//! two steps so that unsupported declared types fail loudly even for
//! values that would otherwise skip coercion:
//!
//! 1. [`Coercion::for_property`] resolves the declared type against the
//!    catalog. `float`, `iterable`, unions, intersections and unknown
//!    names are configuration errors here.
//! 2. [`Coercion::apply`] converts one value or reports a
//!    [`ValidationFailure`].
//!
//! | Declared type | Accepted | Result |
//! |---|---|---|
//! | dynamic | anything | unchanged |
//! | `bool` | booleans | unchanged |
//! | `string` | strings, ints, floats, objects with a string form | string |
//! | `int` | ints, strings matching `^[+-]?[0-9]+$` | int |
//! | `array` | lists and maps | unchanged |
//! | enum | cases of the enum, or see below | enum case |
//! | class/interface | instances of the type or a subtype | unchanged |
//!
//! Enums match strings against case names, unless the property opts into
//! backing values and the enum is backed. Int-backed enums then take ints
//! or unsigned digit strings, string-backed enums any stringable value.

use formbind_core::{
    ConfigurationError, DeclaredType, EnumDescriptor, EnumKind, ValidationFailure, Value,
};
use formbind_schema::{PropertySchema, ResolvedType, TypeCatalog};

const EXPECTED_STRING: &str = "string|int|float|Stringable";
const EXPECTED_INT: &str = "int or parseable string";
const EXPECTED_INT_BACKING: &str = "int|int-string";
const EXPECTED_STRING_BACKING: &str = "stringable";

/// Parse an integer with the strict grammar `^[+-]?[0-9]+$`.
///
/// Exponents, hex prefixes, whitespace and trailing garbage are rejected,
/// as are values outside the `i64` range.
pub fn parse_int_strict(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // `i64::from_str` accepts exactly this grammar, plus overflow checks.
    text.parse().ok()
}

/// Parse an unsigned run of ASCII digits, as int-backed enums accept.
pub fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[derive(Debug, Clone, Copy)]
enum Kind<'a> {
    Dynamic,
    Bool,
    String,
    Int,
    Array,
    Enum(&'a EnumDescriptor),
    Object(&'a str),
}

/// A property's resolved coercion rule.
#[derive(Debug, Clone, Copy)]
pub struct Coercion<'a> {
    kind: Kind<'a>,
    use_backing_value: bool,
}

impl<'a> Coercion<'a> {
    /// Resolve the coercion for `property`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::NotImplemented` for `float` and `iterable`.
    /// - `ConfigurationError::UnsupportedType` for unions and intersections.
    /// - `ConfigurationError::UnresolvableType` for names the catalog does
    ///   not know.
    pub fn for_property(
        property: &'a PropertySchema,
        catalog: &'a TypeCatalog,
    ) -> Result<Self, ConfigurationError> {
        let kind = match property.declared_type() {
            None => Kind::Dynamic,
            Some(declared) => match declared {
                DeclaredType::Any => Kind::Dynamic,
                DeclaredType::Bool => Kind::Bool,
                DeclaredType::String => Kind::String,
                DeclaredType::Int => Kind::Int,
                DeclaredType::Array => Kind::Array,
                DeclaredType::Float | DeclaredType::Iterable => {
                    return Err(ConfigurationError::NotImplemented {
                        property: property.name().to_string(),
                        type_name: declared.to_string(),
                    });
                }
                DeclaredType::Union(_) | DeclaredType::Intersection(_) => {
                    return Err(ConfigurationError::UnsupportedType {
                        property: property.name().to_string(),
                        type_name: declared.to_string(),
                    });
                }
                DeclaredType::Enum(name) | DeclaredType::Class(name) | DeclaredType::Named(name) => {
                    match catalog.resolve_type(declared) {
                        Some(ResolvedType::Enum(descriptor)) => Kind::Enum(descriptor),
                        Some(ResolvedType::Object(name, _)) => Kind::Object(name),
                        None => {
                            return Err(ConfigurationError::UnresolvableType {
                                property: property.name().to_string(),
                                type_name: name.clone(),
                            });
                        }
                    }
                }
            },
        };
        Ok(Self {
            kind,
            use_backing_value: property.use_backing_value(),
        })
    }

    /// Whether every value passes unchanged.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, Kind::Dynamic)
    }

    /// Coerce `value` for `property`.
    ///
    /// # Errors
    ///
    /// `ValidationFailure::InvalidType` when the value's type is not
    /// accepted, `ValidationFailure::InvalidValue` when it names no enum
    /// case.
    pub fn apply(&self, value: Value, property: &PropertySchema) -> Result<Value, ValidationFailure> {
        let invalid_type = |expected: &str, value: &Value| ValidationFailure::InvalidType {
            property: property.name().to_string(),
            key: property.key().to_string(),
            expected: expected.to_string(),
            actual: value.type_name().to_string(),
        };

        match self.kind {
            Kind::Dynamic => Ok(value),
            Kind::Bool => {
                if matches!(value, Value::Bool(_)) {
                    Ok(value)
                } else {
                    Err(invalid_type("bool", &value))
                }
            }
            Kind::String => match value.to_text() {
                Some(text) => Ok(Value::String(text)),
                None => Err(invalid_type(EXPECTED_STRING, &value)),
            },
            Kind::Int => {
                let parsed = match &value {
                    Value::Int(i) => Some(*i),
                    Value::String(_) | Value::Object(_) => {
                        value.to_text().as_deref().and_then(parse_int_strict)
                    }
                    _ => None,
                };
                parsed
                    .map(Value::Int)
                    .ok_or_else(|| invalid_type(EXPECTED_INT, &value))
            }
            Kind::Array => {
                if value.is_container() {
                    Ok(value)
                } else {
                    Err(invalid_type("array", &value))
                }
            }
            Kind::Object(type_name) => {
                if value.as_object().is_some_and(|o| o.is_instance_of(type_name)) {
                    Ok(value)
                } else {
                    Err(invalid_type(type_name, &value))
                }
            }
            Kind::Enum(descriptor) => self.apply_enum(descriptor, value, property, invalid_type),
        }
    }

    fn apply_enum(
        &self,
        descriptor: &EnumDescriptor,
        value: Value,
        property: &PropertySchema,
        invalid_type: impl Fn(&str, &Value) -> ValidationFailure,
    ) -> Result<Value, ValidationFailure> {
        if value.as_enum().is_some_and(|case| case.is_case_of(descriptor.name())) {
            return Ok(value);
        }
        let invalid_value = |shown: String| ValidationFailure::InvalidValue {
            property: property.name().to_string(),
            key: property.key().to_string(),
            value: shown,
        };

        let by_backing = self.use_backing_value && descriptor.kind().is_backed();
        let found = match (descriptor.kind(), by_backing) {
            (EnumKind::BackedInt, true) => {
                let number = match &value {
                    Value::Int(i) => Some(*i),
                    Value::String(_) | Value::Object(_) => {
                        value.to_text().as_deref().and_then(parse_digits)
                    }
                    _ => None,
                }
                .ok_or_else(|| invalid_type(EXPECTED_INT_BACKING, &value))?;
                descriptor
                    .case_by_int(number)
                    .ok_or_else(|| invalid_value(number.to_string()))?
            }
            (_, true) => {
                let text = value
                    .to_text()
                    .ok_or_else(|| invalid_type(EXPECTED_STRING_BACKING, &value))?;
                match descriptor.case_by_str(&text) {
                    Some(case) => case,
                    None => return Err(invalid_value(text)),
                }
            }
            (_, false) => {
                let Value::String(name) = &value else {
                    return Err(invalid_type("string", &value));
                };
                descriptor
                    .case(name)
                    .ok_or_else(|| invalid_value(name.clone()))?
            }
        };
        Ok(Value::Enum(found.clone()))
    }
}
