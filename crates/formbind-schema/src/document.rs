//! # Schema Documents
//!
//! A schema document declares a bind target, together with the enums and
//! object types it references, as data. Documents are written in YAML
//! (`.yaml`/`.yml`) or JSON and turn into a [`ClassSchema`] plus the
//! [`TypeCatalog`] needed to resolve its named types.
//!
//! ```yaml
//! name: Signup
//! pre_process: [drop_empty]
//! enums:
//!   - name: Plan
//!     kind: string
//!     cases:
//!       - { name: Free, value: free }
//!       - { name: Pro, value: pro }
//! properties:
//!   - name: email
//!     type: string
//!     transform: { service: trim }
//!     validate:
//!       - { service: length, args: { max: 254 } }
//!   - name: plan
//!     type: "?Plan"
//!     use_backing_value: true
//!     default: null
//! ```
//!
//! ## Type Expressions
//!
//! `type` accepts any expression [`DeclaredType`] parses. A leading `?`,
//! or a two-member union with `null`, marks the property nullable.
//! Omitting `type` declares an untyped property.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use formbind_core::{ConfigurationError, DeclaredType, EnumDescriptor};

use crate::arguments::Arguments;
use crate::catalog::TypeCatalog;
use crate::rules::{ServiceRef, TransformRule, ValidationRule};
use crate::schema::{ClassSchema, PropertyBuilder, PropertySchema};

/// Errors from loading or interpreting a schema document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document file could not be read or parsed.
    #[error("schema document load error for '{path}': {reason}")]
    Load {
        /// Path to the document.
        path: String,
        /// Why loading failed.
        reason: String,
    },

    /// An in-memory document could not be parsed.
    #[error("schema document parse error: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },

    /// The document parsed but describes something impossible.
    #[error("invalid schema document: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },

    /// The described schema fails schema construction.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Representation of an enum's cases in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumKindDocument {
    /// Cases have names only.
    #[default]
    Pure,
    /// Cases carry string backing values.
    String,
    /// Cases carry integer backing values.
    Int,
}

/// One enum case: a bare name, or a name with a backing value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CaseDocument {
    /// Case of a pure enum.
    Name(String),
    /// Case of a backed enum.
    Backed {
        /// Case name.
        name: String,
        /// Backing value.
        value: serde_json::Value,
    },
}

/// An enum declared by a document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDocument {
    /// Enum name.
    pub name: String,
    /// Pure, string-backed or int-backed.
    #[serde(default)]
    pub kind: EnumKindDocument,
    /// Cases in declaration order.
    pub cases: Vec<CaseDocument>,
}

/// A service reference with optional extra arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    /// Service name.
    pub service: String,
    /// Positional (list) or named (map) arguments.
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A property declared by a document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDocument {
    /// Property name.
    pub name: String,
    /// Type expression; absent for untyped properties.
    #[serde(rename = "type", default)]
    pub type_expr: Option<String>,
    /// Input key override.
    #[serde(default)]
    pub key: Option<String>,
    /// Bind key presence instead of the value.
    #[serde(default)]
    pub key_only: bool,
    /// Match backed enums by backing value.
    #[serde(default)]
    pub use_backing_value: bool,
    /// Default value. `default: null` is a null default, not "no default".
    #[serde(default, deserialize_with = "present")]
    pub default: Option<serde_json::Value>,
    /// Transform service.
    #[serde(default)]
    pub transform: Option<RuleDocument>,
    /// Validator services in order.
    #[serde(default)]
    pub validate: Vec<RuleDocument>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

/// A whole schema document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Target name.
    pub name: String,
    /// Pre-processor services in order.
    #[serde(default)]
    pub pre_process: Vec<String>,
    /// Enums the properties may reference.
    #[serde(default)]
    pub enums: Vec<EnumDocument>,
    /// Class names the properties may reference.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Interface names the properties may reference.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

impl SchemaDocument {
    /// Load a document, choosing the format by file extension: `.yaml` and
    /// `.yml` are YAML, anything else is JSON.
    ///
    /// # Errors
    ///
    /// `DocumentError::Load` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let load_error = |reason: String| DocumentError::Load {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| load_error(format!("cannot read file: {e}")))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}"))),
            _ => serde_json::from_str(&content)
                .map_err(|e| load_error(format!("invalid JSON: {e}"))),
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DocumentError> {
        serde_yaml::from_str(yaml).map_err(|e| DocumentError::Parse {
            reason: format!("invalid YAML: {e}"),
        })
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::Parse {
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Build the class schema and the catalog of its named types.
    ///
    /// # Errors
    ///
    /// `DocumentError::Invalid` for unparseable type expressions, argument
    /// bags that are neither lists nor maps, and backing values of the
    /// wrong kind; `DocumentError::Configuration` for anything schema or
    /// enum construction rejects.
    pub fn into_parts(self) -> Result<(ClassSchema, TypeCatalog), DocumentError> {
        let mut catalog = TypeCatalog::new();
        for enum_doc in self.enums {
            catalog.register_enum(build_enum(enum_doc)?);
        }
        for class in self.classes {
            catalog.register_class(class);
        }
        for interface in self.interfaces {
            catalog.register_interface(interface);
        }

        let mut schema = ClassSchema::builder(self.name);
        for service in self.pre_process {
            schema = schema.pre_process(service);
        }
        for property in self.properties {
            schema = schema.property(build_property(property)?);
        }
        Ok((schema.build()?, catalog))
    }
}

fn invalid(reason: String) -> DocumentError {
    DocumentError::Invalid { reason }
}

fn build_enum(doc: EnumDocument) -> Result<EnumDescriptor, DocumentError> {
    let name = doc.name;
    let descriptor = match doc.kind {
        EnumKindDocument::Pure => {
            let cases = doc
                .cases
                .into_iter()
                .map(|case| match case {
                    CaseDocument::Name(case) => Ok(case),
                    CaseDocument::Backed { name: case, .. } => Err(invalid(format!(
                        "case {case} of pure enum {name} must not have a value"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            EnumDescriptor::pure(&name, cases)?
        }
        EnumKindDocument::String => {
            let cases = doc
                .cases
                .into_iter()
                .map(|case| match case {
                    CaseDocument::Backed {
                        name: case,
                        value: serde_json::Value::String(value),
                    } => Ok((case, value)),
                    other => Err(invalid(format!(
                        "case {} of string enum {name} needs a string value",
                        case_name(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            EnumDescriptor::backed_string(&name, cases)?
        }
        EnumKindDocument::Int => {
            let cases = doc
                .cases
                .into_iter()
                .map(|case| match case {
                    CaseDocument::Backed { name: case, value } if value.is_i64() => {
                        let value = value.as_i64().unwrap_or_default();
                        Ok((case, value))
                    }
                    other => Err(invalid(format!(
                        "case {} of int enum {name} needs an integer value",
                        case_name(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            EnumDescriptor::backed_int(&name, cases)?
        }
    };
    Ok(descriptor)
}

fn case_name(case: &CaseDocument) -> &str {
    match case {
        CaseDocument::Name(name) | CaseDocument::Backed { name, .. } => name,
    }
}

/// Split a type expression into its declared type and nullability.
fn parse_type_expr(expr: &str) -> Result<(DeclaredType, bool), DocumentError> {
    let expr = expr.trim();
    let bad = |e: formbind_core::ParseTypeError| invalid(e.to_string());
    if let Some(inner) = expr.strip_prefix('?') {
        return Ok((inner.parse().map_err(bad)?, true));
    }
    let parsed: DeclaredType = expr.parse().map_err(bad)?;
    if let DeclaredType::Union(members) = &parsed {
        let null = DeclaredType::Named("null".to_string());
        if members.len() == 2 && members.contains(&null) {
            if let Some(other) = members.iter().find(|m| **m != null) {
                return Ok((other.clone(), true));
            }
        }
    }
    Ok((parsed, false))
}

fn service_ref(doc: RuleDocument) -> Result<ServiceRef, DocumentError> {
    let arguments = Arguments::try_from(doc.args).map_err(|args| {
        invalid(format!(
            "arguments of service {} must be a list or a map, got {args}",
            doc.service
        ))
    })?;
    Ok(ServiceRef::new(doc.service).with_arguments(arguments))
}

fn build_property(doc: PropertyDocument) -> Result<PropertyBuilder, DocumentError> {
    let mut property = match doc.type_expr.as_deref() {
        Some(expr) => {
            let (declared, nullable) = parse_type_expr(expr)?;
            PropertySchema::typed(doc.name, declared).set_nullable(nullable)
        }
        None => PropertySchema::untyped(doc.name),
    };
    if let Some(key) = doc.key {
        property = property.key(key);
    }
    if doc.key_only {
        property = property.key_only();
    }
    if doc.use_backing_value {
        property = property.use_backing_value();
    }
    if let Some(default) = doc.default {
        property = property.default(default);
    }
    if let Some(transform) = doc.transform {
        property = property.transform(TransformRule::Service(service_ref(transform)?));
    }
    for validator in doc.validate {
        property = property.validate(ValidationRule::Service(service_ref(validator)?));
    }
    Ok(property)
}
