//! Dependency synthesis for descriptor sets
//!
//! A descriptor set compiled without `--include_imports` references
//! `google.protobuf.Empty` and the `google.api.http` extension without
//! carrying their files. Resolution needs them, so they are manufactured here:
//!
//! - `google/protobuf/descriptor.proto` (extendee of the HTTP option)
//! - `google/protobuf/empty.proto` (request/response of payload-less RPCs)
//! - `google/api/annotations.proto` (the `http` extension and `HttpRule`)
//!
//! The synthesized files are prepended in that order, so the file to render
//! stays the last entry of the set.

use prost::Message;
use prost_reflect::ReflectMessage;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    OneofDescriptorProto,
};
use proto_renderer_common::{RenderError, Result, HTTP_EXTENSION_NUMBER};
use tracing::debug;

pub const DESCRIPTOR_PROTO: &str = "google/protobuf/descriptor.proto";
pub const EMPTY_PROTO: &str = "google/protobuf/empty.proto";
pub const ANNOTATIONS_PROTO: &str = "google/api/annotations.proto";
pub const HTTP_PROTO: &str = "google/api/http.proto";

const GOOGLE_API_PACKAGE: &str = "google.api";
const METHOD_OPTIONS: &str = ".google.protobuf.MethodOptions";
const HTTP_RULE: &str = ".google.api.HttpRule";

/// Return a new set with the missing dependencies prepended.
///
/// `set` is left untouched.
pub fn synthesize_dependencies(set: &FileDescriptorSet) -> FileDescriptorSet {
    let mut file = missing_dependencies(set);
    file.extend(set.file.iter().cloned());
    FileDescriptorSet { file }
}

/// [`synthesize_dependencies`] on an encoded set.
///
/// The caller's bytes are appended unchanged: repeated fields concatenate on
/// the wire, and re-encoding through `prost-types` would drop extension
/// option values.
pub fn synthesize_encoded(bytes: &[u8]) -> Result<Vec<u8>> {
    let set = FileDescriptorSet::decode(bytes).map_err(|e| {
        RenderError::Descriptor(format!("Failed to decode FileDescriptorSet: {}", e))
    })?;

    let mut encoded = FileDescriptorSet {
        file: missing_dependencies(&set),
    }
    .encode_to_vec();
    encoded.extend_from_slice(bytes);
    Ok(encoded)
}

/// Synthesized files not already present in `set`, in dependency order
pub fn missing_dependencies(set: &FileDescriptorSet) -> Vec<FileDescriptorProto> {
    let mut files = Vec::new();

    if !contains_file(set, DESCRIPTOR_PROTO) {
        files.push(descriptor_file());
    }
    if !contains_file(set, EMPTY_PROTO) {
        files.push(empty_file());
    }
    if !contains_file(set, ANNOTATIONS_PROTO) {
        let bundle_http_types = !defines_message(set, GOOGLE_API_PACKAGE, "HttpRule");
        files.push(annotations_file(bundle_http_types));
    }

    debug!(
        synthesized = ?files.iter().map(|f| f.name()).collect::<Vec<_>>(),
        "synthesized descriptor dependencies"
    );
    files
}

fn contains_file(set: &FileDescriptorSet, name: &str) -> bool {
    set.file.iter().any(|file| file.name() == name)
}

fn defines_message(set: &FileDescriptorSet, package: &str, message: &str) -> bool {
    set.file
        .iter()
        .filter(|file| file.package() == package)
        .any(|file| file.message_type.iter().any(|m| m.name() == message))
}

/// `google/protobuf/descriptor.proto`, as registered for the well-known types
pub fn descriptor_file() -> FileDescriptorProto {
    prost_types::FileDescriptorProto::default()
        .descriptor()
        .parent_file()
        .file_descriptor_proto()
        .clone()
}

/// `google/protobuf/empty.proto`, as registered for the well-known types.
///
/// `prost-types` maps `google.protobuf.Empty` to `()`.
pub fn empty_file() -> FileDescriptorProto {
    ().descriptor()
        .parent_file()
        .file_descriptor_proto()
        .clone()
}

/// `google/api/annotations.proto` with the `http` method extension.
///
/// With `bundle_http_types` the `HttpRule` messages are declared in the
/// same file, otherwise they are imported from `google/api/http.proto`.
pub fn annotations_file(bundle_http_types: bool) -> FileDescriptorProto {
    let mut file = if bundle_http_types {
        http_file()
    } else {
        FileDescriptorProto {
            package: Some(GOOGLE_API_PACKAGE.to_string()),
            dependency: vec![HTTP_PROTO.to_string()],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    };

    // Callers import the extension through annotations.proto, not http.proto.
    file.name = Some(ANNOTATIONS_PROTO.to_string());
    file.extension.push(http_extension());
    file.dependency.push(DESCRIPTOR_PROTO.to_string());
    file
}

/// `extend google.protobuf.MethodOptions { HttpRule http = 72295728; }`
pub fn http_extension() -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some("http".to_string()),
        number: Some(HTTP_EXTENSION_NUMBER as i32),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(HTTP_RULE.to_string()),
        extendee: Some(METHOD_OPTIONS.to_string()),
        json_name: Some("http".to_string()),
        ..Default::default()
    }
}

/// `google/api/http.proto`: `Http`, `HttpRule` and `CustomHttpPattern`
pub fn http_file() -> FileDescriptorProto {
    let http = DescriptorProto {
        name: Some("Http".to_string()),
        field: vec![
            field("rules", 1, Label::Repeated, Type::Message, Some(HTTP_RULE)),
            field(
                "fully_decode_reserved_expansion",
                2,
                Label::Optional,
                Type::Bool,
                None,
            ),
        ],
        ..Default::default()
    };

    let pattern = |name: &str, number: i32| FieldDescriptorProto {
        oneof_index: Some(0),
        ..field(name, number, Label::Optional, Type::String, None)
    };
    let http_rule = DescriptorProto {
        name: Some("HttpRule".to_string()),
        field: vec![
            field("selector", 1, Label::Optional, Type::String, None),
            pattern("get", 2),
            pattern("put", 3),
            pattern("post", 4),
            pattern("delete", 5),
            pattern("patch", 6),
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..field(
                    "custom",
                    8,
                    Label::Optional,
                    Type::Message,
                    Some(".google.api.CustomHttpPattern"),
                )
            },
            field("body", 7, Label::Optional, Type::String, None),
            field("response_body", 12, Label::Optional, Type::String, None),
            field(
                "additional_bindings",
                11,
                Label::Repeated,
                Type::Message,
                Some(HTTP_RULE),
            ),
        ],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("pattern".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let custom = DescriptorProto {
        name: Some("CustomHttpPattern".to_string()),
        field: vec![
            field("kind", 1, Label::Optional, Type::String, None),
            field("path", 2, Label::Optional, Type::String, None),
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some(HTTP_PROTO.to_string()),
        package: Some(GOOGLE_API_PACKAGE.to_string()),
        message_type: vec![http, http_rule, custom],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn field(
    name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_string),
        json_name: Some(json_name(name)),
        ..Default::default()
    }
}

fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
