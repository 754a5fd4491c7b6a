//! Message and field conversion.
//!
//! [`Converter::convert_message`] and [`Converter::convert_field`] recurse into
//! each other for every message-typed field. Referenced messages are resolved
//! through the [`PackageRegistry`] and converted inline; there are no `$ref`s
//! in the output.

use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::{EnumDescriptor, FieldDescriptor, FieldKind, FieldLabel, MessageDescriptor};
use crate::directives::{apply_directives, directives_for};
use crate::error::ConvertError;
use crate::registry::{PackageId, PackageRegistry};
use crate::schema::{SchemaKind, SchemaNode, SchemaType};
use crate::types::ConverterOptions;

/// Converts descriptors registered in a [`PackageRegistry`] into schema nodes.
pub struct Converter<'a> {
    registry: &'a PackageRegistry<'a>,
    options: ConverterOptions,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a PackageRegistry<'a>, options: ConverterOptions) -> Self {
        Self { registry, options }
    }

    /// Convert a message into an object node.
    ///
    /// `package` is the namespace relative type names are resolved from.
    /// `outer_enums` are enums declared in enclosing scopes that enum fields
    /// may refer to.
    ///
    /// # Errors
    ///
    /// Returns the first `ConvertError` raised by any field, directly or
    /// through a referenced message.
    pub fn convert_message(
        &self,
        package: PackageId,
        message: &'a MessageDescriptor,
        outer_enums: &[EnumDescriptor],
    ) -> Result<SchemaNode, ConvertError> {
        let mut in_progress = Vec::new();
        self.message_node(package, message, outer_enums, &mut in_progress)
    }

    /// Convert one field of `message` into a schema node.
    ///
    /// Comment directives and the field order are applied by
    /// [`convert_message`](Self::convert_message), not here.
    ///
    /// # Errors
    ///
    /// `UnrecognizedFieldKind` for kinds without a JSON Schema mapping,
    /// `UnresolvedTypeReference` when a message type cannot be found and
    /// `CyclicTypeReference` when a message contains itself.
    pub fn convert_field(
        &self,
        package: PackageId,
        field: &FieldDescriptor,
        message: &'a MessageDescriptor,
        outer_enums: &[EnumDescriptor],
    ) -> Result<SchemaNode, ConvertError> {
        let mut in_progress = vec![message];
        self.field_node(package, field, message, outer_enums, &mut in_progress)
    }

    /// Convert a top-level enum into an integer node listing its values.
    ///
    /// Labels are the value comments, falling back to the value names.
    pub fn convert_enum(&self, enum_type: &EnumDescriptor) -> SchemaNode {
        let mut node = SchemaNode::new(SchemaKind::Integer);
        for value in &enum_type.values {
            node.enum_values.push(Value::from(value.number));
            node.option_labels.push(Value::String(
                value.comment().unwrap_or(&value.name).to_string(),
            ));
        }
        apply_directives(
            &directives_for(enum_type.source.as_ref()),
            &mut node,
            &enum_type.name,
        );
        node
    }

    fn message_node(
        &self,
        package: PackageId,
        message: &'a MessageDescriptor,
        outer_enums: &[EnumDescriptor],
        in_progress: &mut Vec<&'a MessageDescriptor>,
    ) -> Result<SchemaNode, ConvertError> {
        tracing::trace!(descriptor = ?message, "converting message");

        let mut node = SchemaNode::new(SchemaKind::Object);
        node.additional_properties = Some(!self.options.disallow_additional_properties);
        apply_directives(
            &directives_for(message.source.as_ref()),
            &mut node,
            &message.name,
        );

        in_progress.push(message);
        let result = self.fill_properties(&mut node, package, message, outer_enums, in_progress);
        in_progress.pop();

        result.map(|()| node)
    }

    fn fill_properties(
        &self,
        node: &mut SchemaNode,
        package: PackageId,
        message: &'a MessageDescriptor,
        outer_enums: &[EnumDescriptor],
        in_progress: &mut Vec<&'a MessageDescriptor>,
    ) -> Result<(), ConvertError> {
        for field in &message.fields {
            let mut property =
                match self.field_node(package, field, message, outer_enums, in_progress) {
                    Ok(property) => property,
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            field_name = %field.name,
                            message_name = %message.name,
                            "failed to convert field"
                        );
                        return Err(err);
                    }
                };
            tracing::debug!(
                field_name = %field.name,
                schema_type = ?property.schema_type,
                "converted field"
            );

            apply_directives(
                &directives_for(field.source.as_ref()),
                &mut property,
                &field.name,
            );
            property.order = Some(field.number);

            let property = Arc::new(property);
            if self.options.use_proto_and_json_fieldnames && field.json_name != field.name {
                node.properties
                    .insert(field.json_name.clone(), Arc::clone(&property));
            }
            node.properties.insert(field.name.clone(), property);
        }
        Ok(())
    }

    fn field_node(
        &self,
        package: PackageId,
        field: &FieldDescriptor,
        message: &'a MessageDescriptor,
        outer_enums: &[EnumDescriptor],
        in_progress: &mut Vec<&'a MessageDescriptor>,
    ) -> Result<SchemaNode, ConvertError> {
        let kind = match field.kind {
            FieldKind::Double | FieldKind::Float => SchemaKind::Number,

            FieldKind::Int32
            | FieldKind::Uint32
            | FieldKind::Fixed32
            | FieldKind::Sfixed32
            | FieldKind::Sint32
            | FieldKind::Int64
            | FieldKind::Uint64
            | FieldKind::Fixed64
            | FieldKind::Sfixed64
            | FieldKind::Sint64 => SchemaKind::Integer,

            FieldKind::String | FieldKind::Bytes => SchemaKind::String,
            FieldKind::Bool => SchemaKind::Boolean,
            FieldKind::Group | FieldKind::Message => SchemaKind::Object,
            FieldKind::Enum => SchemaKind::Integer,

            FieldKind::Unknown(_) => {
                return Err(ConvertError::UnrecognizedFieldKind {
                    field: field.name.clone(),
                    message: message.name.clone(),
                    kind: field.kind,
                })
            }
        };

        let mut node = SchemaNode::new(kind);

        if field.kind == FieldKind::Enum {
            fill_enum_values(&mut node, field, message, outer_enums);
        }

        if kind != SchemaKind::Object {
            if field.is_repeated() {
                return Ok(self.repeated(node));
            }
            return Ok(node);
        }

        node.additional_properties = match field.label {
            FieldLabel::Optional => Some(true),
            FieldLabel::Required => Some(false),
            FieldLabel::Repeated => None,
        };

        let Some((record, found_in)) = self.registry.lookup_type(package, &field.type_name)
        else {
            return Err(ConvertError::UnresolvedTypeReference {
                type_name: field.type_name.clone(),
                field: field.name.clone(),
                message: message.name.clone(),
            });
        };

        if in_progress.iter().any(|m| std::ptr::eq(*m, record)) {
            return Err(ConvertError::CyclicTypeReference {
                type_name: field.type_name.clone(),
                field: field.name.clone(),
                message: message.name.clone(),
            });
        }

        let converted = self.message_node(found_in, record, outer_enums, in_progress)?;

        if record.map_entry || field.is_repeated() {
            tracing::trace!(
                field_name = %field.name,
                record_name = %record.name,
                map_entry = record.map_entry,
                "converting field to array of objects"
            );
            node.schema_type = SchemaKind::Array.into();
            node.items = Some(Box::new(converted));
        } else {
            node.properties = converted.properties;
        }

        Ok(node)
    }

    /// Move a scalar or enum node into the items of an array node.
    fn repeated(&self, mut node: SchemaNode) -> SchemaNode {
        let mut item = SchemaNode::new(node.schema_type.clone());
        item.enum_values = std::mem::take(&mut node.enum_values);
        item.option_labels = std::mem::take(&mut node.option_labels);

        node.items = Some(Box::new(item));
        node.schema_type = if self.options.allow_null_values {
            SchemaType::Union(vec![SchemaKind::Null, SchemaKind::Array])
        } else {
            SchemaKind::Array.into()
        };
        node
    }
}

/// Collect the values of every enum whose name is a suffix of the field's
/// type name.
///
/// Suffix matching can pick up unrelated enums (`FooStatus` matches a field of
/// type `BarFooStatus`); all matches are concatenated and the overlap is
/// logged.
fn fill_enum_values(
    node: &mut SchemaNode,
    field: &FieldDescriptor,
    message: &MessageDescriptor,
    outer_enums: &[EnumDescriptor],
) {
    let matching: Vec<&EnumDescriptor> = message
        .enum_types
        .iter()
        .chain(outer_enums)
        .filter(|e| field.type_name.ends_with(e.name.as_str()))
        .collect();

    match matching.len() {
        0 => tracing::warn!(
            field_name = %field.name,
            type_name = %field.type_name,
            message_name = %message.name,
            "no enum declaration found for field; converting without allowed values"
        ),
        1 => {}
        _ => tracing::warn!(
            field_name = %field.name,
            type_name = %field.type_name,
            candidates = ?matching.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            "several enums match field type; concatenating their values"
        ),
    }

    for enum_type in matching {
        for value in &enum_type.values {
            node.enum_values.push(Value::from(value.number));
            node.option_labels.push(match value.comment() {
                Some(comment) => Value::String(comment.to_string()),
                None => Value::from(value.number),
            });
        }
    }
}
