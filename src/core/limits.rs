/*!
 * Defaults and Limits
 *
 * Centralized location for the default values applied when a caller omits
 * or mistypes process attributes, plus the environment variable names read
 * by configuration.
 */

use super::types::{Priority, Runtime};

// =============================================================================
// PROCESS METADATA DEFAULTS
// =============================================================================

/// Priority assigned when none is given or the input is not an integer
pub const DEFAULT_PRIORITY: Priority = 5;

/// Remaining runtime assigned when none is given or the input is not an integer
pub const DEFAULT_RUNTIME: Runtime = 5;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// `reject` or `ignore`
pub const ENV_UNKNOWN_ENTITY: &str = "RAG_UNKNOWN_ENTITY";

/// `wait` or `grant_if_free`
pub const ENV_REQUEST_POLICY: &str = "RAG_REQUEST_POLICY";

/// `longest` or `shortest`
pub const ENV_RUNTIME_TIE_BREAK: &str = "RAG_RUNTIME_TIE_BREAK";

/// `1` or `true` switches the subscriber to JSON output
pub const ENV_TRACE_JSON: &str = "RAG_TRACE_JSON";
