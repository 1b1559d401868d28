//! Request and response types for payload-less RPCs
//!
//! A method may leave its input or output type unset. The descriptor pool
//! rejects the empty reference, so before decoding such methods are pointed
//! at `google.protobuf.Empty` and their file imports `empty.proto`. The set
//! is edited as a `DynamicMessage`, which keeps unknown fields such as the
//! `google.api.http` option bytes intact.

use crate::synthesis::{empty_file, EMPTY_PROTO};
use prost::Message;
use prost_reflect::{DynamicMessage, ReflectMessage, Value};
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use proto_renderer_common::{RenderError, Result};
use std::borrow::Cow;
use tracing::debug;

/// Fully-qualified name substituted for an empty RPC type
pub const EMPTY_TYPE_NAME: &str = ".google.protobuf.Empty";

/// Point empty method input/output types at `google.protobuf.Empty`.
///
/// Returns `bytes` unchanged when no method needs it. Otherwise each
/// affected file gains the `empty.proto` import, and `empty.proto` is
/// prepended when the set does not carry it.
pub fn fill_empty_rpc_types(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    let set = FileDescriptorSet::decode(bytes).map_err(decode_error)?;
    let affected: Vec<bool> = set.file.iter().map(has_empty_rpc_type).collect();
    if !affected.contains(&true) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut dynamic = DynamicMessage::decode(FileDescriptorSet::default().descriptor(), bytes)
        .map_err(decode_error)?;
    if let Some(files) = dynamic.get_field_by_name_mut("file").and_then(Value::as_list_mut) {
        for (file, _) in files
            .iter_mut()
            .zip(&affected)
            .filter(|(_, affected)| **affected)
        {
            if let Some(file) = file.as_message_mut() {
                fill_file(file);
            }
        }
    }

    let mut encoded = if set.file.iter().any(|f| f.name() == EMPTY_PROTO) {
        Vec::new()
    } else {
        FileDescriptorSet {
            file: vec![empty_file()],
        }
        .encode_to_vec()
    };
    encoded.extend_from_slice(&dynamic.encode_to_vec());

    debug!(
        files = affected.iter().filter(|a| **a).count(),
        "filled empty rpc types"
    );
    Ok(Cow::Owned(encoded))
}

fn has_empty_rpc_type(file: &FileDescriptorProto) -> bool {
    file.service
        .iter()
        .flat_map(|service| &service.method)
        .any(|method| method.input_type().is_empty() || method.output_type().is_empty())
}

fn fill_file(file: &mut DynamicMessage) {
    let services = file
        .get_field_by_name_mut("service")
        .and_then(Value::as_list_mut);
    for service in services.into_iter().flatten().filter_map(Value::as_message_mut) {
        let methods = service
            .get_field_by_name_mut("method")
            .and_then(Value::as_list_mut);
        for method in methods.into_iter().flatten().filter_map(Value::as_message_mut) {
            for field in ["input_type", "output_type"] {
                let empty = method
                    .get_field_by_name(field)
                    .map_or(true, |value| value.as_str().map_or(true, str::is_empty));
                if empty {
                    method.set_field_by_name(field, Value::String(EMPTY_TYPE_NAME.to_string()));
                }
            }
        }
    }

    if let Some(dependencies) = file
        .get_field_by_name_mut("dependency")
        .and_then(Value::as_list_mut)
    {
        if !dependencies.iter().any(|d| d.as_str() == Some(EMPTY_PROTO)) {
            dependencies.push(Value::String(EMPTY_PROTO.to_string()));
        }
    }
}

fn decode_error(e: prost::DecodeError) -> RenderError {
    RenderError::Descriptor(format!("Failed to decode FileDescriptorSet: {}", e))
}
