//! `google.api.http` extension decoding
//!
//! The options bag is re-encoded and decoded into [`HttpMethodOptions`], so
//! the extension is found whether or not the pool knows its descriptor.

use prost::Message;
use prost_reflect::{DynamicMessage, MethodDescriptor};
use proto_renderer_common::{HttpMethodOptions, HttpRule, RenderError, Result};

/// Decode the HTTP rule from a method's options, if the extension is set
pub fn method_http_rule(method: &MethodDescriptor) -> Result<Option<HttpRule>> {
    decode_http_rule(&method.options()).map_err(|e| match e {
        RenderError::ExtensionDecode(msg) => {
            RenderError::ExtensionDecode(format!("{}: {}", method.full_name(), msg))
        }
        other => other,
    })
}

/// Decode the HTTP rule from a `google.protobuf.MethodOptions` message
pub fn decode_http_rule(options: &DynamicMessage) -> Result<Option<HttpRule>> {
    decode_http_rule_bytes(&options.encode_to_vec())
}

/// Decode the HTTP rule from encoded `google.protobuf.MethodOptions`
pub fn decode_http_rule_bytes(bytes: &[u8]) -> Result<Option<HttpRule>> {
    HttpMethodOptions::decode(bytes)
        .map(|options| options.http)
        .map_err(|e| RenderError::ExtensionDecode(e.to_string()))
}
