//! Type and label mapping from descriptor tags to proto3 keywords

use prost_reflect::DescriptorPool;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::FieldDescriptorProto;
use proto_renderer_common::{RenderError, Result};

/// Maps descriptor type tags and labels to their IDL keywords
pub struct TypeMapper;

impl TypeMapper {
    /// Keyword of a scalar type; empty for message, enum and group types
    ///
    /// # Examples
    /// ```
    /// use prost_types::field_descriptor_proto::Type;
    /// use proto_renderer_generator::TypeMapper;
    ///
    /// assert_eq!(TypeMapper::scalar_keyword(Type::Sfixed64), "sfixed64");
    /// assert_eq!(TypeMapper::scalar_keyword(Type::Message), "");
    /// ```
    pub fn scalar_keyword(ty: Type) -> &'static str {
        match ty {
            Type::Double => "double",
            Type::Float => "float",
            Type::Int64 => "int64",
            Type::Uint64 => "uint64",
            Type::Int32 => "int32",
            Type::Fixed64 => "fixed64",
            Type::Fixed32 => "fixed32",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Bytes => "bytes",
            Type::Uint32 => "uint32",
            Type::Sfixed32 => "sfixed32",
            Type::Sfixed64 => "sfixed64",
            Type::Sint32 => "sint32",
            Type::Sint64 => "sint64",
            Type::Group | Type::Message | Type::Enum => "",
        }
    }

    /// Modifier of a label; proto3 implicit presence has none
    pub fn label_keyword(label: Label) -> &'static str {
        match label {
            Label::Optional => "",
            Label::Repeated => "repeated",
            Label::Required => "required",
        }
    }

    /// Type token of a field: its scalar keyword, or its type name as
    /// written from `scope`
    pub fn type_token(field: &FieldDescriptorProto, scope: &Scope<'_>) -> Result<String> {
        // The getter falls back to `double` when the tag is unset.
        let keyword = field
            .r#type
            .and_then(|ty| Type::try_from(ty).ok())
            .map(Self::scalar_keyword)
            .unwrap_or_default();
        if !keyword.is_empty() {
            return Ok(keyword.to_string());
        }

        if field.type_name().is_empty() {
            return Err(RenderError::SchemaIntegrity(format!(
                "field {} has neither a scalar type nor a type name",
                field.name()
            )));
        }

        Ok(scope.reference(field.type_name()))
    }
}

/// Symbols that can start a qualified type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Package,
    Service,
    Message,
    Enum,
}

impl Symbol {
    fn is_type(self) -> bool {
        matches!(self, Symbol::Message | Symbol::Enum)
    }
}

/// The fully-qualified scope a type reference is written in
///
/// References are shortened to the package-relative name, or the name
/// without the leading dot, only when protoc's lookup from this scope
/// lands on the same type. Otherwise the `.`-prefixed name is kept.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    pool: &'a DescriptorPool,
    package: &'a str,
    name: String,
}

impl<'a> Scope<'a> {
    /// File-level scope of `package`
    pub fn new(pool: &'a DescriptorPool, package: &'a str) -> Self {
        Self {
            pool,
            package,
            name: package.to_string(),
        }
    }

    /// Scope of a message, service or method declared in this one
    pub fn nested(&self, name: &str) -> Self {
        Self {
            pool: self.pool,
            package: self.package,
            name: join(&self.name, name),
        }
    }

    /// Shortest safe spelling of `type_name`; relative names pass through
    pub fn reference(&self, type_name: &str) -> String {
        let Some(full_name) = type_name.strip_prefix('.') else {
            return type_name.to_string();
        };

        let relative = if self.package.is_empty() {
            None
        } else {
            full_name
                .strip_prefix(self.package)
                .and_then(|rest| rest.strip_prefix('.'))
        };

        relative
            .into_iter()
            .chain([full_name])
            .find(|candidate| self.resolve(candidate).as_deref() == Some(full_name))
            .unwrap_or(type_name)
            .to_string()
    }

    /// Full name `name` refers to when written here.
    ///
    /// The first component is looked up from the innermost scope outward.
    /// A lone name must hit a message or enum; a qualified one must hit an
    /// aggregate, and the rest is then taken relative to it.
    fn resolve(&self, name: &str) -> Option<String> {
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        let mut scope = self.name.as_str();
        loop {
            let candidate = join(scope, first);
            match (self.symbol(&candidate), rest) {
                (Some(symbol), None) if symbol.is_type() => return Some(candidate),
                (Some(_), Some(rest)) => return Some(join(&candidate, rest)),
                _ => {}
            }

            if scope.is_empty() {
                return None;
            }
            scope = scope.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
    }

    fn symbol(&self, full_name: &str) -> Option<Symbol> {
        if self.pool.get_message_by_name(full_name).is_some() {
            Some(Symbol::Message)
        } else if self.pool.get_enum_by_name(full_name).is_some() {
            Some(Symbol::Enum)
        } else if self.pool.get_service_by_name(full_name).is_some() {
            Some(Symbol::Service)
        } else if self
            .pool
            .files()
            .any(|file| is_package_prefix(file.package_name(), full_name))
        {
            Some(Symbol::Package)
        } else {
            None
        }
    }
}

fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn is_package_prefix(package: &str, name: &str) -> bool {
    package
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
