//! Protobuf FileDescriptorSet loading
//!
//! Decodes an encoded FileDescriptorSet into a `prost-reflect` descriptor pool
//! and selects the file to render.
//!
//! ## Sources
//! - **protoc**: `protoc --include_imports --descriptor_set_out=set.pb greeter.proto`
//! - **buf**: `buf build -o set.pb`
//! - **gRPC Reflection**: descriptors retrieved from live gRPC services
//!
//! ## Example
//! ```rust,ignore
//! use proto_renderer_parser::ProtobufParser;
//!
//! let parser = ProtobufParser::from_file_descriptor_set(include_bytes!("set.pb"))?;
//! let summary = parser.parse()?;
//! ```

mod converter;
mod parser;

pub use converter::convert_file_to_summary;
pub use parser::ProtobufParser;
