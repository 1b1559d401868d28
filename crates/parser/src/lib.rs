//! Descriptor loading for proto-renderer
//!
//! This crate turns an encoded `FileDescriptorSet` into a `prost-reflect`
//! descriptor pool ready for rendering.
//!
//! ## Loading Strategy
//!
//! The file to render is always the last file of the set. Two ways in:
//! - As given: the set must carry its own dependency closure
//! - Synthesized: `descriptor.proto`, `empty.proto` and `annotations.proto`
//!   are prepended when missing, so the `google.api.http` extension resolves
//!
//! Methods without a request or response type are pointed at
//! `google.protobuf.Empty` before either path builds the pool.
//!
//! Method options are decoded into the typed `HttpRule` model by the
//! `extension` module.

pub mod extension;
mod protobuf;
pub mod rpc_types;
pub mod synthesis;

pub use extension::{decode_http_rule, decode_http_rule_bytes, method_http_rule};
pub use protobuf::{convert_file_to_summary, ProtobufParser};
pub use rpc_types::{fill_empty_rpc_types, EMPTY_TYPE_NAME};
pub use synthesis::{synthesize_dependencies, synthesize_encoded};

use proto_renderer_common::{FileSummary, Result};

/// Summarize the last file of an encoded FileDescriptorSet
///
/// # Arguments
/// * `bytes` - Encoded FileDescriptorSet
/// * `synthesize` - Prepend missing well-known dependencies first
pub fn summarize_descriptor_set(bytes: &[u8], synthesize: bool) -> Result<FileSummary> {
    let parser = if synthesize {
        ProtobufParser::with_synthesized_dependencies(bytes)?
    } else {
        ProtobufParser::from_file_descriptor_set(bytes)?
    };
    parser.parse()
}
