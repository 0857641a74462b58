//! Relation identifiers and identifier normalization.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;

/// How the database folds unquoted identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// Unquoted identifiers are stored uppercase (Oracle, DB2).
    Upper,
    /// Unquoted identifiers are stored lowercase (PostgreSQL).
    #[default]
    Lower,
    /// Identifiers are stored as written.
    Preserve,
}

impl CaseSensitivity {
    /// Normalize a user-supplied identifier the way the database would.
    ///
    /// A double-quoted identifier keeps its case and loses the quotes.
    pub fn normalize(self, ident: &str) -> String {
        if let Some(quoted) = ident
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return quoted.to_string();
        }
        match self {
            Self::Upper => ident.to_uppercase(),
            Self::Lower => ident.to_lowercase(),
            Self::Preserve => ident.to_string(),
        }
    }
}

/// Schema-qualified relation name.
///
/// Equality and hashing ignore ASCII case, so ids built from user input
/// match ids read from metadata regardless of how either was spelled.
#[derive(Clone, Debug, Deserialize)]
pub struct RelationId {
    #[serde(default)]
    schema: Option<String>,
    name: String,
}

impl RelationId {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Relation without schema qualification.
    pub fn unqualified(name: &str) -> Self {
        Self::new(None, name)
    }

    /// Parse `schema.name` or `name`.
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once('.') {
            Some((schema, name)) => Self::new(Some(schema), name),
            None => Self::unqualified(text),
        }
    }

    /// Apply the database's identifier folding to both parts.
    pub fn normalized(&self, case: CaseSensitivity) -> Self {
        Self {
            schema: self.schema.as_deref().map(|s| case.normalize(s)),
            name: case.normalize(&self.name),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both ids name the same relation, ignoring schema qualification.
    pub fn same_bare_name(&self, other: &RelationId) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl PartialEq for RelationId {
    fn eq(&self, other: &Self) -> bool {
        let schemas_match = match (&self.schema, &other.schema) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        schemas_match && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for RelationId {}

impl Hash for RelationId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.schema {
            Some(schema) => {
                state.write_u8(1);
                for b in schema.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
            None => state.write_u8(0),
        }
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
