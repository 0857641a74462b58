//! JSON deserialization for schema metadata documents.
//!
//! Relations carry their fields inline; foreign keys name both endpoints and
//! pair up source and target fields in order:
//!
//! ```json
//! {
//!   "caseSensitivity": "lower",
//!   "relations": [
//!     { "schema": "public", "name": "drug",
//!       "fields": [{ "name": "id", "type": "integer", "nullable": false, "pkPart": 1 }] }
//!   ],
//!   "foreignKeys": [
//!     { "source": { "schema": "public", "name": "drug_link" },
//!       "target": { "schema": "public", "name": "drug" },
//!       "fields": [{ "source": "drug_id", "target": "id" }] }
//!   ]
//! }
//! ```

use serde::Deserialize;

use crate::error::SchemaError;
use crate::metadata::{Field, ForeignKey, RelationKind, RelationMetadata, SchemaMetadata};
use crate::{CaseSensitivity, RelationId};

impl SchemaMetadata {
    /// Parse schema metadata from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(json)?;
        raw.into_metadata()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(default)]
    case_sensitivity: CaseSensitivity,
    #[serde(default)]
    relations: Vec<RawRelation>,
    #[serde(default)]
    foreign_keys: Vec<RawForeignKey>,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    #[serde(default)]
    schema: Option<String>,
    name: String,
    #[serde(default)]
    kind: RelationKind,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(default, rename = "type")]
    db_type: Option<String>,
    #[serde(default = "default_nullable")]
    nullable: bool,
    #[serde(default)]
    pk_part: Option<u32>,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawForeignKey {
    source: RelationId,
    target: RelationId,
    fields: Vec<RawFieldPair>,
}

#[derive(Debug, Deserialize)]
struct RawFieldPair {
    source: String,
    target: String,
}

impl RawSchema {
    fn into_metadata(self) -> Result<SchemaMetadata, SchemaError> {
        let mut builder = SchemaMetadata::builder(self.case_sensitivity);
        for raw in self.relations {
            let fields = raw
                .fields
                .into_iter()
                .map(|f| Field {
                    name: f.name,
                    db_type: f.db_type,
                    nullable: f.nullable && f.pk_part.is_none(),
                    primary_key_part: f.pk_part,
                })
                .collect();
            let id = RelationId::new(raw.schema.as_deref(), &raw.name);
            builder = builder.relation(RelationMetadata {
                id,
                kind: raw.kind,
                fields,
            });
        }
        for raw in self.foreign_keys {
            let pairs = raw.fields.into_iter().map(|p| (p.source, p.target));
            builder = builder.foreign_key(ForeignKey::new(raw.source, raw.target, pairs));
        }
        builder.build()
    }
}
