//! # Service Argument Bags
//!
//! Extra arguments declared next to a service reference are passed to the
//! service verbatim. An [`Arguments`] bag keeps them in declaration order,
//! each either positional or named, exactly as the schema author wrote
//! them.

use formbind_core::Value;

/// One argument: positional when `name` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument name, for named arguments.
    pub name: Option<String>,
    /// Argument value.
    pub value: Value,
}

/// Ordered collection of positional and named arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    items: Vec<Argument>,
}

impl Arguments {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bag of positional arguments.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut args = Self::new();
        for value in values {
            args.push(value);
        }
        args
    }

    /// A bag of named arguments.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut args = Self::new();
        for (name, value) in pairs {
            args.push_named(name, value);
        }
        args
    }

    /// Append a positional argument.
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.items.push(Argument {
            name: None,
            value: value.into(),
        });
        self
    }

    /// Append a named argument.
    pub fn push_named(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.items.push(Argument {
            name: Some(name.into()),
            value: value.into(),
        });
        self
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.items.iter()
    }

    /// Positional argument values, in order.
    pub fn positional_values(&self) -> impl Iterator<Item = &Value> {
        self.items
            .iter()
            .filter(|arg| arg.name.is_none())
            .map(|arg| &arg.value)
    }

    /// The `index`-th positional argument.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional_values().nth(index)
    }

    /// The first argument named `name`.
    pub fn named_value(&self, name: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }
}

impl TryFrom<serde_json::Value> for Arguments {
    type Error = serde_json::Value;

    /// A JSON array becomes positional arguments, a JSON object named ones
    /// (in document order), and `null` an empty bag. Anything else is
    /// handed back.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Self::new()),
            serde_json::Value::Array(items) => Ok(Self::positional(items.into_iter().map(Value::from))),
            serde_json::Value::Object(map) => {
                Ok(Self::named(map.into_iter().map(|(k, v)| (k, Value::from(v)))))
            }
            other => Err(other),
        }
    }
}
