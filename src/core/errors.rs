/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::data_structures::InlineString;
use super::types::NodeKind;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by graph mutations and configuration loading
///
/// Detection and resolution never fail: "no deadlock" is a normal result,
/// and malformed priority/runtime text silently falls back to defaults.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RagError {
    #[error("Unknown {kind}: {id}")]
    #[diagnostic(
        code(rag::unknown_entity),
        help("Add the process or resource before allocating or requesting it.")
    )]
    UnknownEntity { kind: NodeKind, id: InlineString },

    #[error("Identifier {id} is already used by a {existing}")]
    #[diagnostic(
        code(rag::kind_conflict),
        help("Processes and resources share one identifier space. Pick a distinct name.")
    )]
    KindConflict { id: InlineString, existing: NodeKind },

    #[error("Invalid identifier: {0:?}")]
    #[diagnostic(
        code(rag::invalid_identifier),
        help("Identifiers must contain at least one non-whitespace character.")
    )]
    InvalidIdentifier(InlineString),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(rag::configuration_error),
        help("Invalid configuration. Review RAG_* environment variables.")
    )]
    Configuration(InlineString),
}

impl RagError {
    pub(crate) fn unknown(kind: NodeKind, id: &str) -> Self {
        RagError::UnknownEntity {
            kind,
            id: id.into(),
        }
    }
}

/// Result type for graph operations
pub type RagResult<T> = std::result::Result<T, RagError>;
