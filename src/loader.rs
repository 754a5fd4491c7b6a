//! Descriptor loading from protoc output.
//!
//! Handles `FileDescriptorSet` files (`protoc --descriptor_set_out`) and plugin
//! `CodeGeneratorRequest`s, translating them into the crate's descriptor model.
//! Source comments are only present when protoc ran with
//! `--include_source_info` (always the case for plugin requests).

use std::collections::HashMap;
use std::path::Path;

use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::source_code_info::Location;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet, SourceCodeInfo,
};

use crate::descriptor::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldKind, FieldLabel, FileDescriptor,
    MessageDescriptor, SourceLocation,
};
use crate::error::LoadError;
use crate::naming::to_lower_camel_case;

// Field numbers from descriptor.proto, used in SourceCodeInfo paths.
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;
const ENUM_VALUE: i32 = 2;

/// A decoded protoc plugin request.
#[derive(Debug, Clone)]
pub struct PluginRequest {
    /// Every file protoc parsed, dependencies first.
    pub files: Vec<FileDescriptor>,
    /// Files named on the protoc command line.
    pub files_to_generate: Vec<String>,
    /// The `--jsonschema_out=<parameter>:dir` parameter string.
    pub parameter: String,
}

/// Load a binary `FileDescriptorSet` from a file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::ReadError` if it can't be read, or `LoadError::Decode` if it
/// isn't a descriptor set.
pub fn load_descriptor_set(path: &Path) -> Result<Vec<FileDescriptor>, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    decode_descriptor_set(&bytes)
}

/// Decode a binary `FileDescriptorSet`.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<Vec<FileDescriptor>, LoadError> {
    let set = FileDescriptorSet::decode(bytes).map_err(|source| LoadError::Decode { source })?;
    Ok(set.file.iter().map(file_from_proto).collect())
}

/// Decode a `CodeGeneratorRequest` as protoc writes it to a plugin's stdin.
pub fn decode_plugin_request(bytes: &[u8]) -> Result<PluginRequest, LoadError> {
    let request =
        CodeGeneratorRequest::decode(bytes).map_err(|source| LoadError::Decode { source })?;

    Ok(PluginRequest {
        files: request.proto_file.iter().map(file_from_proto).collect(),
        files_to_generate: request.file_to_generate.clone(),
        parameter: request.parameter().to_string(),
    })
}

/// Translate one `FileDescriptorProto`, attaching comments from its
/// `SourceCodeInfo`.
pub fn file_from_proto(file: &FileDescriptorProto) -> FileDescriptor {
    let sources = SourceIndex::new(file.source_code_info.as_ref());

    FileDescriptor {
        name: file.name().to_string(),
        package: file.package.clone(),
        message_types: file
            .message_type
            .iter()
            .enumerate()
            .map(|(i, m)| message_from_proto(m, &[FILE_MESSAGE_TYPE, i as i32], &sources))
            .collect(),
        enum_types: file
            .enum_type
            .iter()
            .enumerate()
            .map(|(i, e)| enum_from_proto(e, &[FILE_ENUM_TYPE, i as i32], &sources))
            .collect(),
    }
}

/// Source locations of one file keyed by descriptor path.
struct SourceIndex<'p> {
    locations: HashMap<&'p [i32], &'p Location>,
}

impl<'p> SourceIndex<'p> {
    fn new(info: Option<&'p SourceCodeInfo>) -> Self {
        let locations = info
            .map(|info| {
                info.location
                    .iter()
                    .map(|loc| (loc.path.as_slice(), loc))
                    .collect()
            })
            .unwrap_or_default();
        Self { locations }
    }

    fn get(&self, path: &[i32]) -> Option<SourceLocation> {
        self.locations.get(path).map(|loc| SourceLocation {
            leading_comments: loc.leading_comments.clone(),
            trailing_comments: loc.trailing_comments.clone(),
            leading_detached_comments: loc.leading_detached_comments.clone(),
        })
    }
}

fn child_path(parent: &[i32], field: i32, index: usize) -> Vec<i32> {
    let mut path = parent.to_vec();
    path.push(field);
    path.push(index as i32);
    path
}

fn message_from_proto(
    message: &DescriptorProto,
    path: &[i32],
    sources: &SourceIndex<'_>,
) -> MessageDescriptor {
    MessageDescriptor {
        name: message.name().to_string(),
        fields: message
            .field
            .iter()
            .enumerate()
            .map(|(i, f)| field_from_proto(f, &child_path(path, MESSAGE_FIELD, i), sources))
            .collect(),
        nested_types: message
            .nested_type
            .iter()
            .enumerate()
            .map(|(i, m)| {
                message_from_proto(m, &child_path(path, MESSAGE_NESTED_TYPE, i), sources)
            })
            .collect(),
        enum_types: message
            .enum_type
            .iter()
            .enumerate()
            .map(|(i, e)| enum_from_proto(e, &child_path(path, MESSAGE_ENUM_TYPE, i), sources))
            .collect(),
        map_entry: message
            .options
            .as_ref()
            .map(|o| o.map_entry())
            .unwrap_or(false),
        source: sources.get(path),
    }
}

fn field_from_proto(
    field: &FieldDescriptorProto,
    path: &[i32],
    sources: &SourceIndex<'_>,
) -> FieldDescriptor {
    let name = field.name().to_string();
    let json_name = field
        .json_name
        .clone()
        .unwrap_or_else(|| to_lower_camel_case(&name));

    FieldDescriptor {
        name,
        json_name,
        number: field.number(),
        kind: field_kind(field.r#type),
        label: match field.label() {
            Label::Optional => FieldLabel::Optional,
            Label::Required => FieldLabel::Required,
            Label::Repeated => FieldLabel::Repeated,
        },
        type_name: field.type_name().to_string(),
        source: sources.get(path),
    }
}

/// Map a raw `FieldDescriptorProto.type` to a [`FieldKind`]; anything protoc
/// did not set or that this version does not know becomes `Unknown`.
fn field_kind(raw: Option<i32>) -> FieldKind {
    let Some(raw) = raw else {
        return FieldKind::Unknown(0);
    };

    match Type::try_from(raw) {
        Ok(Type::Double) => FieldKind::Double,
        Ok(Type::Float) => FieldKind::Float,
        Ok(Type::Int64) => FieldKind::Int64,
        Ok(Type::Uint64) => FieldKind::Uint64,
        Ok(Type::Int32) => FieldKind::Int32,
        Ok(Type::Fixed64) => FieldKind::Fixed64,
        Ok(Type::Fixed32) => FieldKind::Fixed32,
        Ok(Type::Bool) => FieldKind::Bool,
        Ok(Type::String) => FieldKind::String,
        Ok(Type::Group) => FieldKind::Group,
        Ok(Type::Message) => FieldKind::Message,
        Ok(Type::Bytes) => FieldKind::Bytes,
        Ok(Type::Uint32) => FieldKind::Uint32,
        Ok(Type::Enum) => FieldKind::Enum,
        Ok(Type::Sfixed32) => FieldKind::Sfixed32,
        Ok(Type::Sfixed64) => FieldKind::Sfixed64,
        Ok(Type::Sint32) => FieldKind::Sint32,
        Ok(Type::Sint64) => FieldKind::Sint64,
        Err(_) => FieldKind::Unknown(raw),
    }
}

fn enum_from_proto(
    enum_type: &EnumDescriptorProto,
    path: &[i32],
    sources: &SourceIndex<'_>,
) -> EnumDescriptor {
    EnumDescriptor {
        name: enum_type.name().to_string(),
        values: enum_type
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| EnumValueDescriptor {
                name: v.name().to_string(),
                number: v.number(),
                source: sources.get(&child_path(path, ENUM_VALUE, i)),
            })
            .collect(),
        source: sources.get(path),
    }
}
