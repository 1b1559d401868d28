//! Protobuf FileDescriptorSet parser

use crate::rpc_types::fill_empty_rpc_types;
use crate::synthesis::synthesize_encoded;
use prost::Message;
use prost_reflect::{DescriptorPool, FileDescriptor};
use prost_types::FileDescriptorSet;
use proto_renderer_common::{FileSummary, RenderError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads an encoded FileDescriptorSet into a descriptor pool
///
/// The file to render is the last file of the set; every other file is
/// treated as part of its dependency closure.
#[derive(Debug)]
pub struct ProtobufParser {
    /// Descriptor pool for reflection
    pool: DescriptorPool,

    /// Name of the target file (e.g., "demo/greeter.proto")
    target: String,
}

impl ProtobufParser {
    /// Load FileDescriptorSet from binary file
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = ProtobufParser::from_file("greeter.pb", false)?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, synthesize: bool) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;

        if synthesize {
            Self::with_synthesized_dependencies(&bytes)
        } else {
            Self::from_file_descriptor_set(&bytes)
        }
    }

    /// Parse FileDescriptorSet from bytes, as given
    ///
    /// Fails with `RenderError::Descriptor` if the set is not self-contained.
    /// Only `empty.proto` is supplied, and only for methods without a
    /// request or response type.
    pub fn from_file_descriptor_set(bytes: &[u8]) -> Result<Self> {
        let target = target_file_name(bytes)?;
        let filled = fill_empty_rpc_types(bytes)?;
        let pool = decode_pool(&filled)?;

        Ok(Self { pool, target })
    }

    /// Parse FileDescriptorSet from bytes after prepending the synthesized
    /// `empty.proto`, `annotations.proto` and `descriptor.proto` files
    pub fn with_synthesized_dependencies(bytes: &[u8]) -> Result<Self> {
        let target = target_file_name(bytes)?;
        let filled = fill_empty_rpc_types(bytes)?;
        let augmented = synthesize_encoded(&filled)?;
        let pool = decode_pool(&augmented)?;

        Ok(Self { pool, target })
    }

    /// The file to render
    pub fn target_file(&self) -> Result<FileDescriptor> {
        self.pool.get_file_by_name(&self.target).ok_or_else(|| {
            RenderError::Descriptor(format!("File {} not found in pool", self.target))
        })
    }

    /// Name of the file to render
    pub fn target_name(&self) -> &str {
        &self.target
    }

    /// Summarize the target file
    pub fn parse(&self) -> Result<FileSummary> {
        super::converter::convert_file_to_summary(&self.target_file()?)
    }

    /// Get reference to the underlying descriptor pool
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

fn target_file_name(bytes: &[u8]) -> Result<String> {
    let file_descriptor_set = FileDescriptorSet::decode(bytes).map_err(|e| {
        RenderError::Descriptor(format!("Failed to decode FileDescriptorSet: {}", e))
    })?;

    file_descriptor_set
        .file
        .last()
        .map(|file| file.name().to_string())
        .ok_or(RenderError::EmptyDescriptorSet)
}

fn decode_pool(bytes: &[u8]) -> Result<DescriptorPool> {
    // `decode` keeps the raw option bytes, so extensions unknown to the pool survive.
    let pool = DescriptorPool::decode(bytes).map_err(|e| {
        RenderError::Descriptor(format!("Failed to create DescriptorPool: {}", e))
    })?;

    debug!(files = pool.files().count(), "decoded descriptor pool");
    Ok(pool)
}
