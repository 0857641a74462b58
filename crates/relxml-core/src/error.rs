//! Errors raised while assembling schema metadata.

use crate::RelationId;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relation {0} is defined more than once")]
    DuplicateRelation(RelationId),

    #[error("relation {relation} has no field named {field}")]
    UnknownField { relation: RelationId, field: String },
}
