//! Integration tests for proto3 rendering

use prost::encoding::{encode_key, encode_varint, WireType};
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};
use proto_renderer_common::{RenderError, RenderOptions, Strategy};
use proto_renderer_generator::{
    renderer_for, DirectRenderer, ProtoRenderer, SynthesizingRenderer,
};
use std::path::{Path, PathBuf};

fn proto_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/proto")
        .canonicalize()
        .unwrap()
}

/// Compile a fixture into an encoded FileDescriptorSet
fn compile(file: &str, include_imports: bool) -> Vec<u8> {
    let root = proto_root();
    let mut compiler = protox::Compiler::new([&root]).unwrap();
    compiler.include_imports(include_imports);
    compiler.open_file(root.join(file)).unwrap();
    compiler.encode_file_descriptor_set()
}

fn render_direct(bytes: &[u8]) -> String {
    let renderer = DirectRenderer::new(&RenderOptions::default());
    String::from_utf8(renderer.render(bytes).unwrap()).unwrap()
}

/// Append a length-delimited field to an encoded message
fn with_field(mut message: Vec<u8>, tag: u32, payload: &[u8]) -> Vec<u8> {
    encode_key(tag, WireType::LengthDelimited, &mut message);
    encode_varint(payload.len() as u64, &mut message);
    message.extend_from_slice(payload);
    message
}

/// A self-contained set whose only method carries `options_bytes`
fn set_with_method_options(options_bytes: &[u8]) -> Vec<u8> {
    set_with_method(".demo.Pong", ".demo.Pong", options_bytes)
}

fn set_with_method(input_type: &str, output_type: &str, options_bytes: &[u8]) -> Vec<u8> {
    let method = with_field(
        MethodDescriptorProto {
            name: Some("GetPong".to_string()),
            input_type: Some(input_type.to_string()),
            output_type: Some(output_type.to_string()),
            ..Default::default()
        }
        .encode_to_vec(),
        4,
        options_bytes,
    );
    let service = with_field(
        ServiceDescriptorProto {
            name: Some("Pinger".to_string()),
            ..Default::default()
        }
        .encode_to_vec(),
        2,
        &method,
    );
    let file = with_field(
        FileDescriptorProto {
            name: Some("demo/pong.proto".to_string()),
            package: Some("demo".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Pong".to_string()),
                ..Default::default()
            }],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
        .encode_to_vec(),
        6,
        &service,
    );
    with_field(Vec::new(), 1, &file)
}

#[test]
fn test_render_greeter() {
    let source = render_direct(&compile("demo/greeter.proto", true));

    let expected = r#"// Code generated by proto-renderer. DO NOT EDIT.
// source: demo/greeter.proto

syntax = "proto3";

import "google/api/annotations.proto";

package demo;

service Greeter {
  rpc SayHello (HelloRequest) returns (HelloReply) {
    option (google.api.http) = {
      post: "/v1/hello"
    };
  }
}

message HelloRequest {
  string name = 1;
}

message HelloReply {
  string message = 1;
}
"#;
    assert_eq!(source, expected);
}

#[test]
fn test_render_catalog_services() {
    let source = render_direct(&compile("demo/catalog.proto", true));

    assert!(source.contains("import \"google/api/annotations.proto\";\nimport \"google/protobuf/empty.proto\";\n"));
    assert!(source.contains("\npackage demo.catalog;\n"));
    assert!(source.contains(
        "  rpc GetItem (GetItemRequest) returns (Item) {\n    option (google.api.http) = {\n      get: \"/v1/items/{id}\"\n    };\n  }\n"
    ));
    assert!(source.contains(
        "      post: \"/v1/items\"\n      body: \"*\"\n      additional_bindings {\n        put: \"/v1/items/{id}\"\n        body: \"*\"\n      }\n    };\n"
    ));
    assert!(source.contains(
        "  rpc Purge (google.protobuf.Empty) returns (google.protobuf.Empty) {}\n"
    ));
    assert!(source.contains("  rpc Watch (WatchRequest) returns (stream Item) {}\n"));
    assert!(source.contains(
        "      custom {\n        kind: \"HEAD\"\n        path: \"/v1/items\"\n      }\n"
    ));
}

#[test]
fn test_render_catalog_messages() {
    let source = render_direct(&compile("demo/catalog.proto", true));

    let expected_item = r#"message Item {
  string id = 1;
  repeated string tags = 2;
  map<string, int64> counters = 3;
  Item.Dimensions dimensions = 4;
  Item.Status status = 5;
  oneof price {
    int64 cents = 6;
    string quote = 7;
  }
  optional string note = 8;
  reserved 10, 12 to 15;
  reserved "legacy";

  enum Status {
    STATUS_UNSPECIFIED = 0;
    STATUS_ACTIVE = 1;
  }

  message Dimensions {
    double width = 1;
    double height = 2;
    Item.Dimensions.Unit unit = 3;

    message Unit {
      string symbol = 1;
    }
  }
}
"#;
    assert!(source.contains(expected_item), "got:\n{}", source);
    assert!(!source.contains("CountersEntry"));
}

#[test]
fn test_enum_aliases_keep_declaration_order() {
    let source = render_direct(&compile("demo/catalog.proto", true));

    assert!(source.ends_with(
        "enum Color {\n  option allow_alias = true;\n  COLOR_UNSPECIFIED = 0;\n  RED = 1;\n  CRIMSON = 1;\n}\n"
    ));
}

#[test]
fn test_block_order() {
    let source = render_direct(&compile("demo/catalog.proto", true));

    let service = source.find("service Catalog {").unwrap();
    let item = source.find("message Item {").unwrap();
    let request = source.find("message GetItemRequest {").unwrap();
    let color = source.find("enum Color {").unwrap();
    assert!(service < item && item < request && request < color);
}

#[test]
fn test_render_scalars() {
    let source = render_direct(&compile("demo/scalars.proto", true));

    for (keyword, number) in [
        ("double", 1),
        ("float", 2),
        ("int32", 3),
        ("int64", 4),
        ("uint32", 5),
        ("uint64", 6),
        ("sint32", 7),
        ("sint64", 8),
        ("fixed32", 9),
        ("fixed64", 10),
        ("sfixed32", 11),
        ("sfixed64", 12),
        ("bool", 13),
        ("string", 14),
        ("bytes", 15),
    ] {
        let line = format!("  {} f_{} = {};\n", keyword, keyword, number);
        assert!(source.contains(&line), "missing {:?}", line);
    }
    assert!(!source.contains("import "));
}

#[test]
fn test_indent_width_option() {
    let renderer = DirectRenderer::new(&RenderOptions {
        indent_width: 4,
        ..Default::default()
    });
    let source =
        String::from_utf8(renderer.render(&compile("demo/greeter.proto", true)).unwrap()).unwrap();

    assert!(source.contains("\n            post: \"/v1/hello\"\n"));
}

#[test]
fn test_strategies_agree_on_self_contained_set() {
    let bytes = compile("demo/catalog.proto", true);

    let direct = renderer_for(&RenderOptions::default()).render(&bytes).unwrap();
    let synthesizing = renderer_for(&RenderOptions {
        strategy: Strategy::Synthesizing,
        ..Default::default()
    })
    .render(&bytes)
    .unwrap();

    assert_eq!(direct, synthesizing);
}

#[test]
fn test_synthesized_dependencies_match_real_imports() {
    let complete = compile("demo/catalog.proto", true);
    let bare = compile("demo/catalog.proto", false);

    let direct = DirectRenderer::new(&RenderOptions::default());
    assert!(matches!(direct.render(&bare), Err(RenderError::Descriptor(_))));

    let synthesizing = SynthesizingRenderer::new(&RenderOptions::default());
    assert_eq!(
        synthesizing.render(&bare).unwrap(),
        direct.render(&complete).unwrap()
    );
}

#[test]
fn test_extension_without_annotations_file() {
    // (google.api.http) = { get: "/v1/pong" }, unknown to the pool
    let rule = with_field(Vec::new(), 2, b"/v1/pong");
    let options = with_field(Vec::new(), 72295728, &rule);

    let source = render_direct(&set_with_method_options(&options));
    assert!(source.contains(
        "  rpc GetPong (Pong) returns (Pong) {\n    option (google.api.http) = {\n      get: \"/v1/pong\"\n    };\n  }\n"
    ));
}

#[test]
fn test_malformed_extension_fails_whole_file() {
    // HttpRule { get: <invalid utf-8> }
    let options = with_field(Vec::new(), 72295728, &[0x12, 0x01, 0xff]);

    let renderer = DirectRenderer::new(&RenderOptions::default());
    let err = renderer
        .render(&set_with_method_options(&options))
        .unwrap_err();
    assert!(matches!(err, RenderError::ExtensionDecode(ref msg) if msg.contains("demo.Pinger.GetPong")));
}

#[test]
fn test_unset_http_rule_fails_whole_file() {
    // (google.api.http) = { body: "*" }
    let rule = with_field(Vec::new(), 7, b"*");
    let options = with_field(Vec::new(), 72295728, &rule);

    let renderer = DirectRenderer::new(&RenderOptions::default());
    let err = renderer
        .render(&set_with_method_options(&options))
        .unwrap_err();
    assert!(matches!(err, RenderError::UnsetHttpRule(ref method) if method == "demo.Pinger.GetPong"));
}

#[test]
fn test_empty_rpc_types_render_as_empty() {
    // (google.api.http) = { delete: "/v1/pong" }
    let rule = with_field(Vec::new(), 5, b"/v1/pong");
    let options = with_field(Vec::new(), 72295728, &rule);
    let bytes = set_with_method("", "", &options);

    for strategy in [Strategy::Direct, Strategy::Synthesizing] {
        let renderer = renderer_for(&RenderOptions {
            strategy,
            ..Default::default()
        });
        let source = String::from_utf8(renderer.render(&bytes).unwrap()).unwrap();

        assert!(source.contains("import \"google/protobuf/empty.proto\";\n"));
        assert!(source.contains(
            "  rpc GetPong (google.protobuf.Empty) returns (google.protobuf.Empty) {\n    option (google.api.http) = {\n      delete: \"/v1/pong\"\n    };\n  }\n"
        ), "{:?}:\n{}", strategy, source);
    }
}

fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::String as i32),
        ..Default::default()
    }
}

#[test]
fn test_nested_type_does_not_capture_reference() {
    let inner = |field: FieldDescriptorProto| DescriptorProto {
        name: Some("Inner".to_string()),
        field: vec![field],
        ..Default::default()
    };
    let outer = DescriptorProto {
        name: Some("Outer".to_string()),
        field: vec![FieldDescriptorProto {
            name: Some("ref".to_string()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Message as i32),
            type_name: Some(".demo.Inner".to_string()),
            ..Default::default()
        }],
        nested_type: vec![inner(string_field("nested", 1))],
        ..Default::default()
    };
    let bytes = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("demo/shadow.proto".to_string()),
            package: Some("demo".to_string()),
            message_type: vec![inner(string_field("top", 1)), outer],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }],
    }
    .encode_to_vec();

    let source = render_direct(&bytes);
    assert!(source.contains(
        "message Outer {\n  demo.Inner ref = 1;\n\n  message Inner {\n    string nested = 1;\n  }\n}\n"
    ), "got:\n{}", source);
}

#[test]
fn test_render_standard_options() {
    let source = render_direct(&compile("demo/options.proto", true));

    let expected = r#"// Code generated by proto-renderer. DO NOT EDIT.
// source: demo/options.proto

syntax = "proto3";

package demo.options;

option java_package = "com.example.demo";
option optimize_for = SPEED;
option java_multiple_files = true;
option go_package = "example.com/demo/options";

service Legacy {
  option deprecated = true;
  rpc Fetch (Record) returns (Record) {
    option deprecated = true;
    option idempotency_level = NO_SIDE_EFFECTS;
  }
}

message Record {
  option deprecated = true;
  string display_name = 1 [json_name = "label", deprecated = true];
  repeated int32 samples = 2 [packed = false];
  State state = 3;
}

enum State {
  STATE_UNSPECIFIED = 0;
  STATE_OLD = 1 [deprecated = true];
}
"#;
    assert_eq!(source, expected);
}
