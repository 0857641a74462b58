//! Row ordering for output specifications.

use std::fmt;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One `field direction` term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderingTerm {
    pub field: String,
    pub direction: Direction,
}

/// Ordered list of sort terms applied to a relation's rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowOrdering(Vec<OrderingTerm>);

impl RowOrdering {
    pub fn by(field: &str, direction: Direction) -> Self {
        Self(vec![OrderingTerm {
            field: field.to_string(),
            direction,
        }])
    }

    pub fn then(mut self, field: &str, direction: Direction) -> Self {
        self.0.push(OrderingTerm {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Parse comma-separated terms like `id desc, name`.
    ///
    /// Direction defaults to ascending; keywords are case-insensitive.
    pub fn parse(text: &str) -> Result<Self> {
        let mut terms = Vec::new();
        for raw in text.split(',') {
            let mut words = raw.split_whitespace();
            let Some(field) = words.next() else {
                return Err(Error::InvalidOrdering(format!("empty term in '{text}'")));
            };
            let direction = match words.next() {
                None => Direction::Asc,
                Some(w) if w.eq_ignore_ascii_case("asc") => Direction::Asc,
                Some(w) if w.eq_ignore_ascii_case("desc") => Direction::Desc,
                Some(w) => {
                    return Err(Error::InvalidOrdering(format!(
                        "unknown direction '{w}' for field '{field}'"
                    )));
                }
            };
            if let Some(extra) = words.next() {
                return Err(Error::InvalidOrdering(format!(
                    "unexpected '{extra}' after field '{field}'"
                )));
            }
            terms.push(OrderingTerm {
                field: field.to_string(),
                direction,
            });
        }
        Ok(Self(terms))
    }

    pub fn terms(&self) -> &[OrderingTerm] {
        &self.0
    }

    /// Render as `alias.field dir, ...` items.
    pub fn sql_terms(&self, alias: &str) -> Vec<String> {
        self.0
            .iter()
            .map(|t| format!("{alias}.{} {}", t.field, t.direction.as_sql()))
            .collect()
    }
}

impl fmt::Display for RowOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .0
            .iter()
            .map(|t| format!("{} {}", t.field, t.direction.as_sql()))
            .collect();
        f.write_str(&terms.join(", "))
    }
}
