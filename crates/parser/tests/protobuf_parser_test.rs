//! Integration test for FileDescriptorSet loading

use prost::Message;
use prost_types::{
    field_descriptor_proto, DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};
use proto_renderer_common::{HttpBindingSummary, RenderError};
use proto_renderer_parser::{summarize_descriptor_set, synthesize_encoded, ProtobufParser};
use std::io::Write;
use std::path::{Path, PathBuf};

fn proto_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/proto")
        .canonicalize()
        .unwrap()
}

fn compile(file: &str, include_imports: bool) -> Vec<u8> {
    let root = proto_root();
    let mut compiler = protox::Compiler::new([&root]).unwrap();
    compiler.include_imports(include_imports);
    compiler.open_file(root.join(file)).unwrap();
    compiler.encode_file_descriptor_set()
}

/// Create a sample FileDescriptorSet with a Storage service
fn create_sample_storage_service() -> FileDescriptorSet {
    let bucket_message = DescriptorProto {
        name: Some("Bucket".to_string()),
        field: vec![
            FieldDescriptorProto {
                name: Some("name".to_string()),
                number: Some(1),
                label: Some(field_descriptor_proto::Label::Optional as i32),
                r#type: Some(field_descriptor_proto::Type::String as i32),
                ..Default::default()
            },
            FieldDescriptorProto {
                name: Some("location".to_string()),
                number: Some(2),
                label: Some(field_descriptor_proto::Label::Optional as i32),
                r#type: Some(field_descriptor_proto::Type::String as i32),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let get_bucket_request = DescriptorProto {
        name: Some("GetBucketRequest".to_string()),
        field: vec![FieldDescriptorProto {
            name: Some("name".to_string()),
            number: Some(1),
            label: Some(field_descriptor_proto::Label::Optional as i32),
            r#type: Some(field_descriptor_proto::Type::String as i32),
            ..Default::default()
        }],
        ..Default::default()
    };

    let storage_service = ServiceDescriptorProto {
        name: Some("Storage".to_string()),
        method: vec![
            MethodDescriptorProto {
                name: Some("GetBucket".to_string()),
                input_type: Some(".storage.GetBucketRequest".to_string()),
                output_type: Some(".storage.Bucket".to_string()),
                ..Default::default()
            },
            MethodDescriptorProto {
                name: Some("ListBuckets".to_string()),
                input_type: Some(".storage.GetBucketRequest".to_string()),
                output_type: Some(".storage.Bucket".to_string()),
                server_streaming: Some(true),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("storage.proto".to_string()),
            package: Some("storage".to_string()),
            message_type: vec![bucket_message, get_bucket_request],
            service: vec![storage_service],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }],
    }
}

#[test]
fn test_parse_storage_service() {
    let bytes = create_sample_storage_service().encode_to_vec();

    let parser = ProtobufParser::from_file_descriptor_set(&bytes).unwrap();
    assert_eq!(parser.target_name(), "storage.proto");

    let summary = parser.parse().unwrap();
    assert_eq!(summary.package, "storage");
    assert_eq!(summary.messages, vec!["Bucket", "GetBucketRequest"]);
    assert!(summary.imports.is_empty());

    let service = &summary.services[0];
    assert_eq!(service.name, "Storage");
    assert_eq!(service.methods.len(), 2);

    let get = &service.methods[0];
    assert_eq!(get.input_type, "storage.GetBucketRequest");
    assert_eq!(get.output_type, "storage.Bucket");
    assert!(get.http.is_none());

    let list = &service.methods[1];
    assert!(!list.client_streaming);
    assert!(list.server_streaming);
}

#[test]
fn test_summarize_catalog() {
    let summary = summarize_descriptor_set(&compile("demo/catalog.proto", true), false).unwrap();

    assert_eq!(summary.name, "demo/catalog.proto");
    assert_eq!(summary.package, "demo.catalog");
    assert_eq!(
        summary.imports,
        vec!["google/api/annotations.proto", "google/protobuf/empty.proto"]
    );
    assert_eq!(summary.messages, vec!["Item", "GetItemRequest", "WatchRequest"]);
    assert_eq!(summary.enums, vec!["Color"]);

    let methods = &summary.services[0].methods;
    let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["GetItem", "CreateItem", "Purge", "Watch", "Check"]);

    assert_eq!(
        methods[0].http,
        Some(HttpBindingSummary {
            verb: "GET".to_string(),
            path: "/v1/items/{id}".to_string(),
            body: None,
        })
    );
    assert_eq!(methods[1].http.as_ref().unwrap().body.as_deref(), Some("*"));
    assert_eq!(methods[2].input_type, "google.protobuf.Empty");
    assert!(methods[2].http.is_none());
    assert!(methods[3].server_streaming);
    assert_eq!(methods[4].http.as_ref().unwrap().verb, "HEAD");
}

#[test]
fn test_summary_serializes_to_json() {
    let summary = summarize_descriptor_set(&compile("demo/greeter.proto", true), false).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["package"], "demo");
    let method = &json["services"][0]["methods"][0];
    assert_eq!(method["name"], "SayHello");
    assert_eq!(method["http"]["verb"], "POST");
    assert_eq!(method["http"]["path"], "/v1/hello");
    assert!(method["http"].get("body").is_none());
}

#[test]
fn test_bare_set_needs_synthesis() {
    let bare = compile("demo/catalog.proto", false);

    assert!(matches!(
        summarize_descriptor_set(&bare, false),
        Err(RenderError::Descriptor(_))
    ));

    let summary = summarize_descriptor_set(&bare, true).unwrap();
    assert_eq!(summary.name, "demo/catalog.proto");
    assert_eq!(summary.services[0].methods[0].http.as_ref().unwrap().verb, "GET");
}

#[test]
fn test_synthesis_keeps_target_last() {
    let bare = compile("demo/greeter.proto", false);
    let set = FileDescriptorSet::decode(synthesize_encoded(&bare).unwrap().as_slice()).unwrap();

    let names: Vec<&str> = set.file.iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "google/protobuf/descriptor.proto",
            "google/protobuf/empty.proto",
            "google/api/annotations.proto",
            "demo/greeter.proto",
        ]
    );
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&compile("demo/greeter.proto", false)).unwrap();

    assert!(ProtobufParser::from_file(file.path(), false).is_err());

    let parser = ProtobufParser::from_file(file.path(), true).unwrap();
    assert_eq!(parser.target_name(), "demo/greeter.proto");
    assert!(parser
        .pool()
        .get_file_by_name("google/api/annotations.proto")
        .is_some());
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ProtobufParser::from_file(dir.path().join("missing.pb"), false);
    assert!(matches!(result, Err(RenderError::Io(_))));
}
