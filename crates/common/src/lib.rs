//! Common types and utilities for proto-renderer
//!
//! This crate contains the error type, render configuration, the typed
//! `google.api.http` annotation model and the serializable file summary
//! shared by the parser, generator, and CLI components.

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::{CustomHttpPattern, HttpMethodOptions, HttpRule, HTTP_EXTENSION_NUMBER};

/// Errors that can occur while loading descriptors or rendering proto source
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Descriptor error: {0}")]
    Descriptor(String),

    #[error("Extension decode error: {0}")]
    ExtensionDecode(String),

    #[error("HTTP rule on method {0} has no pattern set")]
    UnsetHttpRule(String),

    #[error("Schema integrity error: {0}")]
    SchemaIntegrity(String),

    #[error("FileDescriptorSet contains no files")]
    EmptyDescriptorSet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Rendering strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Walk the target file as given
    #[default]
    Direct,
    /// Prepend synthesized well-known dependencies, then print
    Synthesizing,
}

/// Render configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Strategy used to prepare the descriptor pool
    #[serde(default)]
    pub strategy: Strategy,

    /// Spaces per nesting level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

fn default_indent_width() -> usize {
    2
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            indent_width: default_indent_width(),
        }
    }
}

/// Digest of a rendered file, used by `inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub package: String,
    pub imports: Vec<String>,
    pub services: Vec<ServiceSummary>,
    pub messages: Vec<String>,
    pub enums: Vec<String>,
}

/// gRPC service with its methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub methods: Vec<MethodSummary>,
}

/// RPC method signature and HTTP binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpBindingSummary>,
}

/// Verb and path of a `google.api.http` annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBindingSummary {
    pub verb: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
