//! Descriptor model consumed by the converter.
//!
//! These types mirror the subset of `google.protobuf.descriptor` the converter
//! needs. Source comments are attached directly to each descriptor instead of
//! living in a separate path-indexed table, so a message resolved through the
//! registry carries its own documentation with it.
//!
//! The loader builds them from protoc output; tests build them with the
//! `with_*` helpers.

use std::fmt;

use crate::naming::to_lower_camel_case;

/// Comments protoc attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub leading_comments: Option<String>,
    pub trailing_comments: Option<String>,
    pub leading_detached_comments: Vec<String>,
}

impl SourceLocation {
    /// Location with only a leading comment.
    pub fn leading(comment: impl Into<String>) -> Self {
        Self {
            leading_comments: Some(comment.into()),
            ..Self::default()
        }
    }

    pub fn with_trailing(mut self, comment: impl Into<String>) -> Self {
        self.trailing_comments = Some(comment.into());
        self
    }

    pub fn with_detached(mut self, comment: impl Into<String>) -> Self {
        self.leading_detached_comments.push(comment.into());
        self
    }
}

/// Declared protobuf type of a field.
///
/// `Unknown` carries a raw type number that has no mapping; converting such a
/// field fails with `ConvertError::UnrecognizedFieldKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Unknown(i32),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Int64 => "int64",
            FieldKind::Uint64 => "uint64",
            FieldKind::Int32 => "int32",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Group => "group",
            FieldKind::Message => "message",
            FieldKind::Bytes => "bytes",
            FieldKind::Uint32 => "uint32",
            FieldKind::Enum => "enum",
            FieldKind::Sfixed32 => "sfixed32",
            FieldKind::Sfixed64 => "sfixed64",
            FieldKind::Sint32 => "sint32",
            FieldKind::Sint64 => "sint64",
            FieldKind::Unknown(raw) => return write!(f, "unknown type {}", raw),
        };
        f.write_str(name)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldLabel {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub json_name: String,
    pub number: i32,
    pub kind: FieldKind,
    pub label: FieldLabel,
    /// Referenced type for message, group and enum fields (e.g. `.pkg.Msg`).
    pub type_name: String,
    pub source: Option<SourceLocation>,
}

impl FieldDescriptor {
    /// Optional field whose JSON name is derived the way protoc does it.
    pub fn new(name: impl Into<String>, number: i32, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            json_name: to_lower_camel_case(&name),
            name,
            number,
            kind,
            label: FieldLabel::Optional,
            type_name: String::new(),
            source: None,
        }
    }

    pub fn with_label(mut self, label: FieldLabel) -> Self {
        self.label = label;
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
    pub source: Option<SourceLocation>,
}

impl EnumValueDescriptor {
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
            source: None,
        }
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Trimmed leading comment, if there is a non-empty one.
    pub fn comment(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.leading_comments.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<EnumValueDescriptor>,
    pub source: Option<SourceLocation>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            source: None,
        }
    }

    pub fn with_value(mut self, value: EnumValueDescriptor) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub nested_types: Vec<MessageDescriptor>,
    pub enum_types: Vec<EnumDescriptor>,
    /// Set on the entry types protoc synthesizes for `map<K, V>` fields.
    pub map_entry: bool,
    pub source: Option<SourceLocation>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            nested_types: Vec::new(),
            enum_types: Vec::new(),
            map_entry: false,
            source: None,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested_type(mut self, nested: MessageDescriptor) -> Self {
        self.nested_types.push(nested);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumDescriptor) -> Self {
        self.enum_types.push(enum_type);
        self
    }

    pub fn with_map_entry(mut self, map_entry: bool) -> Self {
        self.map_entry = map_entry;
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }
}

/// One `.proto` file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub name: String,
    pub package: Option<String>,
    pub message_types: Vec<MessageDescriptor>,
    pub enum_types: Vec<EnumDescriptor>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            message_types: Vec::new(),
            enum_types: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.message_types.push(message);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumDescriptor) -> Self {
        self.enum_types.push(enum_type);
        self
    }

    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_json_name_defaults_to_lower_camel() {
        let field = FieldDescriptor::new("first_name", 1, FieldKind::String);
        assert_eq!(field.json_name, "firstName");
        assert_eq!(field.label, FieldLabel::Optional);
        assert!(!field.is_repeated());
    }

    #[test]
    fn enum_value_comment_ignores_blank() {
        let value =
            EnumValueDescriptor::new("ACTIVE", 1).with_source(SourceLocation::leading("  \n "));
        assert_eq!(value.comment(), None);

        let value = EnumValueDescriptor::new("ACTIVE", 1)
            .with_source(SourceLocation::leading(" Currently active\n"));
        assert_eq!(value.comment(), Some("Currently active"));
    }

    #[test]
    fn field_kind_display() {
        assert_eq!(FieldKind::Sfixed64.to_string(), "sfixed64");
        assert_eq!(FieldKind::Unknown(42).to_string(), "unknown type 42");
    }
}
