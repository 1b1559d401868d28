//! Converts a file descriptor to a FileSummary

use crate::extension::method_http_rule;
use prost_reflect::{FileDescriptor, MethodDescriptor, ServiceDescriptor};
use proto_renderer_common::{FileSummary, MethodSummary, Result, ServiceSummary};

/// Convert a file descriptor to its summary
pub fn convert_file_to_summary(file: &FileDescriptor) -> Result<FileSummary> {
    let services = file
        .services()
        .map(|service| convert_service(&service))
        .collect::<Result<Vec<_>>>()?;

    Ok(FileSummary {
        name: file.name().to_string(),
        package: file.package_name().to_string(),
        imports: file.file_descriptor_proto().dependency.clone(),
        services,
        messages: file.messages().map(|m| m.name().to_string()).collect(),
        enums: file.enums().map(|e| e.name().to_string()).collect(),
    })
}

fn convert_service(service: &ServiceDescriptor) -> Result<ServiceSummary> {
    let methods = service
        .methods()
        .map(|method| convert_method(&method))
        .collect::<Result<Vec<_>>>()?;

    Ok(ServiceSummary {
        name: service.name().to_string(),
        methods,
    })
}

fn convert_method(method: &MethodDescriptor) -> Result<MethodSummary> {
    let http = match method_http_rule(method)? {
        Some(rule) => Some(rule.summary(method.full_name())?),
        None => None,
    };

    Ok(MethodSummary {
        name: method.name().to_string(),
        input_type: method.input().full_name().to_string(),
        output_type: method.output().full_name().to_string(),
        client_streaming: method.is_client_streaming(),
        server_streaming: method.is_server_streaming(),
        http,
    })
}
