//! Typed model of the `google.api.http` method option
//!
//! Mirrors `google/api/http.proto`. Only the messages reachable from the
//! method extension are modelled.

use crate::{HttpBindingSummary, RenderError, Result};

/// Field number of `google.api.http` on `google.protobuf.MethodOptions`
pub const HTTP_EXTENSION_NUMBER: u32 = 72295728;

/// View of `google.protobuf.MethodOptions` that keeps only the HTTP extension.
///
/// Every other option field is skipped when decoding.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpMethodOptions {
    #[prost(message, optional, tag = "72295728")]
    pub http: ::core::option::Option<HttpRule>,
}

/// `google.api.HttpRule`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpRule {
    #[prost(string, tag = "1")]
    pub selector: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub body: ::prost::alloc::string::String,
    #[prost(string, tag = "12")]
    pub response_body: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "11")]
    pub additional_bindings: ::prost::alloc::vec::Vec<HttpRule>,
    #[prost(oneof = "http_rule::Pattern", tags = "2, 3, 4, 5, 6, 8")]
    pub pattern: ::core::option::Option<http_rule::Pattern>,
}

/// Nested types of `HttpRule`
pub mod http_rule {
    /// The verb and URL template of a rule. `None` on the rule means unset.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Pattern {
        #[prost(string, tag = "2")]
        Get(::prost::alloc::string::String),
        #[prost(string, tag = "3")]
        Put(::prost::alloc::string::String),
        #[prost(string, tag = "4")]
        Post(::prost::alloc::string::String),
        #[prost(string, tag = "5")]
        Delete(::prost::alloc::string::String),
        #[prost(string, tag = "6")]
        Patch(::prost::alloc::string::String),
        #[prost(message, tag = "8")]
        Custom(super::CustomHttpPattern),
    }

    impl Pattern {
        /// Text-format key of the pattern (`get`, `post`, ..., `custom`)
        pub fn keyword(&self) -> &'static str {
            match self {
                Pattern::Get(_) => "get",
                Pattern::Put(_) => "put",
                Pattern::Post(_) => "post",
                Pattern::Delete(_) => "delete",
                Pattern::Patch(_) => "patch",
                Pattern::Custom(_) => "custom",
            }
        }

        /// HTTP verb; the declared kind for custom patterns
        pub fn verb(&self) -> &str {
            match self {
                Pattern::Custom(custom) => &custom.kind,
                other => other.keyword(),
            }
        }

        /// URL path template
        pub fn path(&self) -> &str {
            match self {
                Pattern::Get(path)
                | Pattern::Put(path)
                | Pattern::Post(path)
                | Pattern::Delete(path)
                | Pattern::Patch(path) => path,
                Pattern::Custom(custom) => &custom.path,
            }
        }
    }
}

/// `google.api.CustomHttpPattern`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CustomHttpPattern {
    #[prost(string, tag = "1")]
    pub kind: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub path: ::prost::alloc::string::String,
}

impl HttpRule {
    /// Pattern of the rule, or `UnsetHttpRule` naming `method`
    pub fn require_pattern(&self, method: &str) -> Result<&http_rule::Pattern> {
        self.pattern
            .as_ref()
            .ok_or_else(|| RenderError::UnsetHttpRule(method.to_string()))
    }

    /// Summarize the primary binding of the rule
    pub fn summary(&self, method: &str) -> Result<HttpBindingSummary> {
        let pattern = self.require_pattern(method)?;
        Ok(HttpBindingSummary {
            verb: pattern.verb().to_uppercase(),
            path: pattern.path().to_string(),
            body: (!self.body.is_empty()).then(|| self.body.clone()),
        })
    }
}
