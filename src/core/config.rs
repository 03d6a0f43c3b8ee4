/*!
 * Configuration
 * Explicit policy choices for the graph store and the resolver
 */

use super::errors::{RagError, RagResult};
use super::limits::{ENV_REQUEST_POLICY, ENV_RUNTIME_TIE_BREAK, ENV_UNKNOWN_ENTITY};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What `allocate`/`request` do when an identifier was never added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEntityPolicy {
    /// Fail with `RagError::UnknownEntity`
    #[default]
    Reject,
    /// Log and leave the graph untouched
    Ignore,
}

/// What `request` does when the resource is currently free
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPolicy {
    /// Always record a request edge; only `allocate` grants
    #[default]
    Wait,
    /// Grant a free resource immediately, as if `allocate` had been called
    GrantIfFree,
}

/// Direction of the runtime tie-break among equal-priority cycle members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeTieBreak {
    /// Preempt the process with the greatest remaining runtime
    #[default]
    LongestRuntimeFirst,
    /// Preempt the process with the smallest remaining runtime
    ShortestRuntimeFirst,
}

impl FromStr for UnknownEntityPolicy {
    type Err = RagError;

    fn from_str(s: &str) -> RagResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "error" => Ok(Self::Reject),
            "ignore" | "noop" => Ok(Self::Ignore),
            other => Err(RagError::Configuration(
                format!("{}: unsupported value '{}'", ENV_UNKNOWN_ENTITY, other).into(),
            )),
        }
    }
}

impl FromStr for RequestPolicy {
    type Err = RagError;

    fn from_str(s: &str) -> RagResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wait" => Ok(Self::Wait),
            "grant_if_free" | "grant" => Ok(Self::GrantIfFree),
            other => Err(RagError::Configuration(
                format!("{}: unsupported value '{}'", ENV_REQUEST_POLICY, other).into(),
            )),
        }
    }
}

impl FromStr for RuntimeTieBreak {
    type Err = RagError;

    fn from_str(s: &str) -> RagResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "longest" => Ok(Self::LongestRuntimeFirst),
            "shortest" => Ok(Self::ShortestRuntimeFirst),
            other => Err(RagError::Configuration(
                format!("{}: unsupported value '{}'", ENV_RUNTIME_TIE_BREAK, other).into(),
            )),
        }
    }
}

/// Policy bundle shared by the graph store and resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagConfig {
    pub unknown_entity: UnknownEntityPolicy,
    pub request: RequestPolicy,
    pub tie_break: RuntimeTieBreak,
}

impl RagConfig {
    /// Load configuration from the process environment
    ///
    /// Environment variables:
    /// - RAG_UNKNOWN_ENTITY: `reject` (default) or `ignore`
    /// - RAG_REQUEST_POLICY: `wait` (default) or `grant_if_free`
    /// - RAG_RUNTIME_TIE_BREAK: `longest` (default) or `shortest`
    pub fn from_env() -> RagResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (unset keys keep defaults)
    pub fn from_lookup<F>(lookup: F) -> RagResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_UNKNOWN_ENTITY) {
            config.unknown_entity = v.parse()?;
        }
        if let Some(v) = lookup(ENV_REQUEST_POLICY) {
            config.request = v.parse()?;
        }
        if let Some(v) = lookup(ENV_RUNTIME_TIE_BREAK) {
            config.tie_break = v.parse()?;
        }
        Ok(config)
    }

    pub fn with_unknown_entity(mut self, policy: UnknownEntityPolicy) -> Self {
        self.unknown_entity = policy;
        self
    }

    pub fn with_request_policy(mut self, policy: RequestPolicy) -> Self {
        self.request = policy;
        self
    }

    pub fn with_tie_break(mut self, tie_break: RuntimeTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}
