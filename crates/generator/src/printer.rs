//! Structural proto3 printer
//!
//! Walks a file descriptor and writes proto3 source line by line:
//! header, syntax, imports, package, then services, messages and enums in
//! declaration order. Nothing is reordered or deduplicated.

use crate::line_writer::LineWriter;
use crate::type_mapper::{Scope, TypeMapper};
use crate::DescriptorPrinter;
use prost_reflect::{FieldDescriptor, FileDescriptor, MethodDescriptor, ReflectMessage, ServiceDescriptor, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto};
use proto_renderer_common::http::http_rule::Pattern;
use proto_renderer_common::{HttpRule, RenderError, RenderOptions, Result};
use proto_renderer_parser::method_http_rule;
use tracing::{debug, trace};

pub const GENERATED_HEADER: &str = "// Code generated by proto-renderer. DO NOT EDIT.";

/// Highest field number; `reserved N to max` ends here
const MAX_FIELD_NUMBER: i32 = 536_870_911;

/// Option fields rendered by other syntax, or not expressible as a scalar
const SKIPPED_OPTIONS: &[&str] = &["map_entry", "uninterpreted_option", "features"];

/// Renders a single file descriptor as proto3 source
#[derive(Debug, Clone)]
pub struct StructuralPrinter {
    indent_width: usize,
}

impl StructuralPrinter {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            indent_width: options.indent_width,
        }
    }

    /// Render `file` as proto3 source
    pub fn render_file(&self, file: &FileDescriptor) -> Result<String> {
        let proto = file.file_descriptor_proto();
        let package = proto.package();
        let scope = Scope::new(file.parent_pool(), package);
        debug!(file = proto.name(), package, "rendering file");

        let mut w = LineWriter::new(self.indent_width);
        w.write_line(GENERATED_HEADER);
        w.write_line(format!("// source: {}", proto.name()));
        w.blank_line();
        w.write_line("syntax = \"proto3\";");

        if !proto.dependency.is_empty() {
            w.blank_line();
            for (index, dependency) in proto.dependency.iter().enumerate() {
                let index = index as i32;
                let modifier = if proto.public_dependency.contains(&index) {
                    "public "
                } else if proto.weak_dependency.contains(&index) {
                    "weak "
                } else {
                    ""
                };
                w.write_line(format!("import {}{};", modifier, quote(dependency)));
            }
        }

        if !package.is_empty() {
            w.blank_line();
            w.write_line(format!("package {};", package));
        }

        let file_options = standard_options(proto.options.as_ref());
        if !file_options.is_empty() {
            w.blank_line();
            write_options(&mut w, &file_options);
        }

        for service in file.services() {
            w.blank_line();
            self.render_service(&mut w, &service, &scope)?;
        }

        for message in &proto.message_type {
            w.blank_line();
            self.render_message(&mut w, message, &scope)?;
        }

        for enum_type in &proto.enum_type {
            w.blank_line();
            self.render_enum(&mut w, enum_type)?;
        }

        Ok(w.into_string())
    }

    fn render_service(
        &self,
        w: &mut LineWriter,
        service: &ServiceDescriptor,
        scope: &Scope<'_>,
    ) -> Result<()> {
        require_name("service", service.name())?;
        let scope = scope.nested(service.name());

        w.open(format!("service {}", service.name()));
        write_options(
            w,
            &standard_options(service.service_descriptor_proto().options.as_ref()),
        );
        for method in service.methods() {
            self.render_method(w, &method, &scope)?;
        }
        w.close("");
        Ok(())
    }

    fn render_method(
        &self,
        w: &mut LineWriter,
        method: &MethodDescriptor,
        scope: &Scope<'_>,
    ) -> Result<()> {
        let proto = method.method_descriptor_proto();
        require_name("method", proto.name())?;
        trace!(method = method.full_name(), "rendering method");

        // Types resolve relative to the method, as protoc does.
        let scope = scope.nested(proto.name());
        let signature = format!(
            "rpc {} ({}{}) returns ({}{})",
            proto.name(),
            if proto.client_streaming() { "stream " } else { "" },
            scope.reference(proto.input_type()),
            if proto.server_streaming() { "stream " } else { "" },
            scope.reference(proto.output_type()),
        );

        let options = standard_options(proto.options.as_ref());
        let rule = method_http_rule(method)?;
        if options.is_empty() && rule.is_none() {
            w.write_line(format!("{} {{}}", signature));
            return Ok(());
        }

        w.open(signature);
        write_options(w, &options);
        if let Some(rule) = rule {
            w.open("option (google.api.http) =");
            render_http_rule(w, &rule, method.full_name())?;
            w.close(";");
        }
        w.close("");
        Ok(())
    }

    fn render_message(
        &self,
        w: &mut LineWriter,
        message: &DescriptorProto,
        parent: &Scope<'_>,
    ) -> Result<()> {
        require_name("message", message.name())?;
        let scope = parent.nested(message.name());

        w.open(format!("message {}", message.name()));
        write_options(w, &standard_options(message.options.as_ref()));

        self.render_fields(w, message, &scope)?;

        let ranges = message
            .reserved_range
            .iter()
            .map(|range| (range.start(), range.end() - 1));
        render_reserved(w, ranges, MAX_FIELD_NUMBER, &message.reserved_name);

        for enum_type in &message.enum_type {
            w.blank_line();
            self.render_enum(w, enum_type)?;
        }

        for nested in message.nested_type.iter().filter(|m| !is_map_entry(m)) {
            w.blank_line();
            self.render_message(w, nested, &scope)?;
        }

        w.close("");
        Ok(())
    }

    /// Fields in declaration order. A oneof is written whole where its
    /// first member appears, so members need not be adjacent.
    fn render_fields(
        &self,
        w: &mut LineWriter,
        message: &DescriptorProto,
        scope: &Scope<'_>,
    ) -> Result<()> {
        let mut written_oneofs = Vec::new();

        for field in &message.field {
            let Some(index) = real_oneof(field) else {
                w.write_line(self.field_line(field, message, scope)?);
                continue;
            };
            if written_oneofs.contains(&index) {
                continue;
            }
            written_oneofs.push(index);

            let decl = message.oneof_decl.get(index as usize).ok_or_else(|| {
                RenderError::SchemaIntegrity(format!(
                    "field {} of {} refers to missing oneof {}",
                    field.name(),
                    message.name(),
                    index
                ))
            })?;
            require_name("oneof", decl.name())?;

            w.open(format!("oneof {}", decl.name()));
            write_options(w, &standard_options(decl.options.as_ref()));
            for member in message
                .field
                .iter()
                .filter(|member| real_oneof(member) == Some(index))
            {
                w.write_line(self.field_line(member, message, scope)?);
            }
            w.close("");
        }
        Ok(())
    }

    fn field_line(
        &self,
        field: &FieldDescriptorProto,
        message: &DescriptorProto,
        scope: &Scope<'_>,
    ) -> Result<String> {
        require_name("field", field.name())?;
        let suffix = field_options_suffix(field);

        if let Some(entry) = map_entry(message, field) {
            let key = entry_field(entry, 1)?;
            let value = entry_field(entry, 2)?;
            return Ok(format!(
                "map<{}, {}> {} = {}{};",
                TypeMapper::type_token(key, scope)?,
                TypeMapper::type_token(value, scope)?,
                field.name(),
                field.number(),
                suffix
            ));
        }

        let ty = TypeMapper::type_token(field, scope)?;
        let label = if field.proto3_optional() {
            "optional"
        } else {
            TypeMapper::label_keyword(field.label())
        };

        Ok(if label.is_empty() {
            format!("{} {} = {}{};", ty, field.name(), field.number(), suffix)
        } else {
            format!(
                "{} {} {} = {}{};",
                label,
                ty,
                field.name(),
                field.number(),
                suffix
            )
        })
    }

    fn render_enum(&self, w: &mut LineWriter, enum_type: &EnumDescriptorProto) -> Result<()> {
        require_name("enum", enum_type.name())?;
        w.open(format!("enum {}", enum_type.name()));
        write_options(w, &standard_options(enum_type.options.as_ref()));

        for value in &enum_type.value {
            require_name("enum value", value.name())?;
            let options = standard_options(value.options.as_ref());
            w.write_line(format!(
                "{} = {}{};",
                value.name(),
                value.number(),
                bracketed(&options)
            ));
        }

        let ranges = enum_type
            .reserved_range
            .iter()
            .map(|range| (range.start(), range.end()));
        render_reserved(w, ranges, i32::MAX, &enum_type.reserved_name);

        w.close("");
        Ok(())
    }
}

impl DescriptorPrinter for StructuralPrinter {
    fn print(&self, file: &FileDescriptor) -> Result<String> {
        self.render_file(file)
    }
}

/// Oneof index of a field, ignoring the synthetic oneof of proto3 `optional`
fn real_oneof(field: &FieldDescriptorProto) -> Option<i32> {
    field.oneof_index.filter(|_| !field.proto3_optional())
}

/// Set fields of a `google.protobuf.*Options` message as `(name, value)`
/// pairs in field-number order. Extensions are not included.
fn standard_options<M: ReflectMessage>(options: Option<&M>) -> Vec<(String, String)> {
    let Some(options) = options else {
        return Vec::new();
    };

    options
        .transcode_to_dynamic()
        .fields()
        .filter(|(field, _)| !SKIPPED_OPTIONS.contains(&field.name()))
        .filter_map(|(field, value)| {
            option_value(&field, value).map(|value| (field.name().to_string(), value))
        })
        .collect()
}

fn option_value(field: &FieldDescriptor, value: &Value) -> Option<String> {
    match value {
        Value::Bool(v) => Some(v.to_string()),
        Value::I32(v) => Some(v.to_string()),
        Value::I64(v) => Some(v.to_string()),
        Value::U32(v) => Some(v.to_string()),
        Value::U64(v) => Some(v.to_string()),
        Value::F32(v) => Some(v.to_string()),
        Value::F64(v) => Some(v.to_string()),
        Value::String(v) => Some(quote(v)),
        Value::EnumNumber(number) => Some(
            field
                .kind()
                .as_enum()
                .and_then(|e| e.get_value(*number))
                .map_or_else(|| number.to_string(), |v| v.name().to_string()),
        ),
        _ => None,
    }
}

fn write_options(w: &mut LineWriter, options: &[(String, String)]) {
    for (name, value) in options {
        w.write_line(format!("option {} = {};", name, value));
    }
}

/// ` [a = x, b = y]`, or nothing
fn bracketed(options: &[(String, String)]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let options: Vec<String> = options
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    format!(" [{}]", options.join(", "))
}

/// `json_name` when it differs from the default, then standard options
fn field_options_suffix(field: &FieldDescriptorProto) -> String {
    let mut options = Vec::new();
    if let Some(json_name) = field.json_name.as_deref() {
        if json_name != default_json_name(field.name()) {
            options.push(("json_name".to_string(), quote(json_name)));
        }
    }
    options.extend(standard_options(field.options.as_ref()));
    bracketed(&options)
}

/// protoc's lowerCamelCase: drop underscores, capitalize what follows
fn default_json_name(name: &str) -> String {
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

/// Body of an `option (google.api.http)` block
fn render_http_rule(w: &mut LineWriter, rule: &HttpRule, method: &str) -> Result<()> {
    match rule.require_pattern(method)? {
        Pattern::Custom(custom) => {
            w.open("custom");
            w.write_line(format!("kind: {}", quote(&custom.kind)));
            w.write_line(format!("path: {}", quote(&custom.path)));
            w.close("");
        }
        pattern => w.write_line(format!("{}: {}", pattern.keyword(), quote(pattern.path()))),
    }

    if !rule.body.is_empty() {
        w.write_line(format!("body: {}", quote(&rule.body)));
    }
    if !rule.response_body.is_empty() {
        w.write_line(format!("response_body: {}", quote(&rule.response_body)));
    }

    for binding in &rule.additional_bindings {
        w.open("additional_bindings");
        render_http_rule(w, binding, method)?;
        w.close("");
    }
    Ok(())
}

/// `reserved` statements from inclusive ranges and names
fn render_reserved(
    w: &mut LineWriter,
    ranges: impl Iterator<Item = (i32, i32)>,
    max: i32,
    names: &[String],
) {
    let ranges: Vec<String> = ranges
        .map(|(start, end)| {
            if start == end {
                start.to_string()
            } else if end == max {
                format!("{} to max", start)
            } else {
                format!("{} to {}", start, end)
            }
        })
        .collect();
    if !ranges.is_empty() {
        w.write_line(format!("reserved {};", ranges.join(", ")));
    }

    if !names.is_empty() {
        let names: Vec<String> = names.iter().map(|name| quote(name)).collect();
        w.write_line(format!("reserved {};", names.join(", ")));
    }
}

fn is_map_entry(message: &DescriptorProto) -> bool {
    message
        .options
        .as_ref()
        .is_some_and(|options| options.map_entry())
}

/// Synthetic entry message backing a map field
fn map_entry<'a>(
    message: &'a DescriptorProto,
    field: &FieldDescriptorProto,
) -> Option<&'a DescriptorProto> {
    if field.label() != Label::Repeated || field.r#type() != Type::Message {
        return None;
    }
    let entry_name = field.type_name().rsplit('.').next()?;
    message
        .nested_type
        .iter()
        .find(|nested| is_map_entry(nested) && nested.name() == entry_name)
}

fn entry_field(entry: &DescriptorProto, number: i32) -> Result<&FieldDescriptorProto> {
    entry
        .field
        .iter()
        .find(|field| field.number() == number)
        .ok_or_else(|| {
            RenderError::SchemaIntegrity(format!(
                "map entry {} has no field {}",
                entry.name(),
                number
            ))
        })
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RenderError::SchemaIntegrity(format!("{} with empty name", kind)));
    }
    Ok(())
}

/// Double-quoted proto string literal; control characters are octal-escaped
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{:03o}", byte));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
