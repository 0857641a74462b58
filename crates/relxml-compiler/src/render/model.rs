//! Flat key/value models handed to templating backends.

use indexmap::IndexMap;

use super::RenderError;

/// A model value: text, a flag, or an ordered list of texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "a string",
            Self::Bool(_) => "a boolean",
            Self::List(_) => "a list",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Resolved query model. Keys keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model(IndexMap<String, Value>);

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn str(&self, key: &str) -> Result<&str, RenderError> {
        match self.required(key)? {
            Value::Str(s) => Ok(s),
            other => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Like [`Model::str`], but an absent key is `None`.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, RenderError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(wrong_type(key, "a string", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, RenderError> {
        match self.required(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(wrong_type(key, "a boolean", other)),
        }
    }

    pub fn list(&self, key: &str) -> Result<&[String], RenderError> {
        match self.required(key)? {
            Value::List(items) => Ok(items),
            other => Err(wrong_type(key, "a list", other)),
        }
    }

    fn required(&self, key: &str) -> Result<&Value, RenderError> {
        self.0
            .get(key)
            .ok_or_else(|| RenderError::MissingKey(key.to_string()))
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Value) -> RenderError {
    RenderError::WrongType {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}
