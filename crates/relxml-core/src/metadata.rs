//! In-memory schema metadata: relations, their fields, and foreign keys.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::{CaseSensitivity, RelationId, SchemaGraph};

/// A column of a relation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    /// Database type name as reported by the catalog (`integer`, `varchar`, ...).
    pub db_type: Option<String>,
    pub nullable: bool,
    /// 1-based position within the primary key, if part of it.
    pub primary_key_part: Option<u32>,
}

impl Field {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            db_type: None,
            nullable: true,
            primary_key_part: None,
        }
    }

    pub fn db_type(mut self, db_type: &str) -> Self {
        self.db_type = Some(db_type.to_string());
        self
    }

    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    pub fn primary_key_part(mut self, part: u32) -> Self {
        self.primary_key_part = Some(part);
        self.nullable = false;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    #[default]
    Table,
    View,
}

/// Metadata for one relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationMetadata {
    pub id: RelationId,
    pub kind: RelationKind,
    pub fields: Vec<Field>,
}

impl RelationMetadata {
    pub fn table(id: RelationId, fields: Vec<Field>) -> Self {
        Self {
            id,
            kind: RelationKind::Table,
            fields,
        }
    }

    pub fn view(id: RelationId, fields: Vec<Field>) -> Self {
        Self {
            id,
            kind: RelationKind::View,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Unordered, case-insensitive set of field names.
///
/// Used to pick one foreign key out of several joining the same relations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSet(BTreeSet<String>);

impl FieldSet {
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for FieldSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Directed foreign-key edge from a child (source) relation to a parent (target).
///
/// Identity is the source, the target, and the set of source field names;
/// the pairing order only matters for rendering join conditions.
#[derive(Clone, Debug)]
pub struct ForeignKey {
    source: RelationId,
    target: RelationId,
    /// (source field, target field) in declaration order.
    field_pairs: Vec<(String, String)>,
}

impl ForeignKey {
    pub fn new<I, A, B>(source: RelationId, target: RelationId, field_pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            source,
            target,
            field_pairs: field_pairs
                .into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        }
    }

    pub fn source(&self) -> &RelationId {
        &self.source
    }

    pub fn target(&self) -> &RelationId {
        &self.target
    }

    pub fn field_pairs(&self) -> &[(String, String)] {
        &self.field_pairs
    }

    pub fn source_field_names(&self) -> impl Iterator<Item = &str> {
        self.field_pairs.iter().map(|(s, _)| s.as_str())
    }

    pub fn target_field_names(&self) -> impl Iterator<Item = &str> {
        self.field_pairs.iter().map(|(_, t)| t.as_str())
    }

    pub fn source_field_set(&self) -> FieldSet {
        FieldSet::of(self.source_field_names())
    }

    /// Whether the source fields are exactly `fields`, ignoring order and case.
    pub fn has_source_fields(&self, fields: &FieldSet) -> bool {
        self.source_field_set() == *fields
    }
}

impl PartialEq for ForeignKey {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_field_set() == other.source_field_set()
    }
}

impl Eq for ForeignKey {}

impl Hash for ForeignKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
        self.source_field_set().hash(state);
    }
}

impl std::fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<&str> = self.source_field_names().collect();
        let targets: Vec<&str> = self.target_field_names().collect();
        write!(
            f,
            "{}({}) -> {}({})",
            self.source,
            sources.join(", "),
            self.target,
            targets.join(", ")
        )
    }
}

/// Schema graph held fully in memory.
#[derive(Clone, Debug, Default)]
pub struct SchemaMetadata {
    case_sensitivity: CaseSensitivity,
    relations: IndexMap<RelationId, RelationMetadata>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaMetadata {
    pub fn builder(case_sensitivity: CaseSensitivity) -> SchemaMetadataBuilder {
        SchemaMetadataBuilder::new(case_sensitivity)
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    pub fn relation(&self, id: &RelationId) -> Option<&RelationMetadata> {
        self.relations.get(id)
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationMetadata> {
        self.relations.values()
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Build a relation id from user-supplied text, folding case like the database.
    pub fn relation_id(&self, text: &str) -> RelationId {
        RelationId::parse(text).normalized(self.case_sensitivity)
    }
}

impl SchemaGraph for SchemaMetadata {
    fn relation_ids(&self) -> Vec<&RelationId> {
        self.relations.keys().collect()
    }

    fn contains(&self, relation: &RelationId) -> bool {
        self.relations.contains_key(relation)
    }

    fn fields(&self, relation: &RelationId) -> Option<&[Field]> {
        self.relations.get(relation).map(|r| r.fields.as_slice())
    }

    fn foreign_keys_between(&self, child: &RelationId, parent: &RelationId) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.source() == child && fk.target() == parent)
            .collect()
    }

    fn foreign_keys_from_child(&self, child: &RelationId) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.source() == child)
            .collect()
    }

    fn foreign_keys_to_parent(&self, parent: &RelationId) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.target() == parent)
            .collect()
    }

    fn normalize(&self, ident: &str) -> String {
        self.case_sensitivity.normalize(ident)
    }
}

/// Accumulates relations and foreign keys, validating them on `build`.
#[derive(Debug)]
pub struct SchemaMetadataBuilder {
    case_sensitivity: CaseSensitivity,
    relations: Vec<RelationMetadata>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaMetadataBuilder {
    pub fn new(case_sensitivity: CaseSensitivity) -> Self {
        Self {
            case_sensitivity,
            relations: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn relation(mut self, relation: RelationMetadata) -> Self {
        self.relations.push(relation);
        self
    }

    /// Shorthand for a table whose fields carry no type information.
    pub fn table(self, id: RelationId, field_names: &[&str]) -> Self {
        let fields = field_names.iter().map(|n| Field::new(n)).collect();
        self.relation(RelationMetadata::table(id, fields))
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Foreign keys may point at relations that were not registered (partial
    /// metadata); only endpoints that are registered get their fields checked.
    pub fn build(self) -> Result<SchemaMetadata, SchemaError> {
        let mut relations = IndexMap::with_capacity(self.relations.len());
        for relation in self.relations {
            let id = relation.id.clone();
            if relations.insert(id.clone(), relation).is_some() {
                return Err(SchemaError::DuplicateRelation(id));
            }
        }

        for fk in &self.foreign_keys {
            if let Some(source) = relations.get(fk.source()) {
                check_fields(source, fk.source_field_names())?;
            }
            if let Some(target) = relations.get(fk.target()) {
                check_fields(target, fk.target_field_names())?;
            }
        }

        Ok(SchemaMetadata {
            case_sensitivity: self.case_sensitivity,
            relations,
            foreign_keys: self.foreign_keys,
        })
    }
}

fn check_fields<'a>(
    relation: &RelationMetadata,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), SchemaError> {
    for name in names {
        if relation.field(name).is_none() {
            return Err(SchemaError::UnknownField {
                relation: relation.id.clone(),
                field: name.to_string(),
            });
        }
    }
    Ok(())
}
