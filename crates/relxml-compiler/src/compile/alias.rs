//! Table aliases for correlated subqueries.

use std::collections::BTreeSet;

use relxml_core::RelationId;
use relxml_core::utils::initials;

/// Keywords an initials-based alias could spell out.
const RESERVED: &[&str] = &[
    "all", "and", "any", "as", "asc", "at", "by", "do", "end", "for", "if", "in", "is", "key",
    "no", "not", "of", "on", "or", "set", "to",
];

/// Aliases visible at one point of the generated query.
///
/// Each nesting level works on its own clone, so sibling subqueries may reuse
/// an alias while nested ones never shadow an outer one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasScope {
    in_use: BTreeSet<String>,
}

impl AliasScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.in_use.contains(alias)
    }

    fn is_free(&self, alias: &str) -> bool {
        !self.in_use.contains(alias) && !RESERVED.contains(&alias.to_ascii_lowercase().as_str())
    }

    /// Initials of the relation name, suffixed with the smallest positive
    /// integer that makes it unused (`d`, `d1`, `d2`, ...). SQL keywords count
    /// as used.
    pub fn allocate(&mut self, relation: &RelationId) -> String {
        let base = initials(relation.name());
        let mut alias = base.clone();
        let mut counter = 1;
        while !self.is_free(&alias) {
            alias = format!("{base}{counter}");
            counter += 1;
        }
        tracing::trace!(relation = %relation, alias = %alias, "allocated alias");
        self.in_use.insert(alias.clone());
        alias
    }

    /// Use `alias` as given when present, otherwise allocate one.
    pub fn claim(&mut self, alias: Option<&str>, relation: &RelationId) -> String {
        match alias {
            Some(alias) => {
                self.in_use.insert(alias.to_string());
                alias.to_string()
            }
            None => self.allocate(relation),
        }
    }
}
