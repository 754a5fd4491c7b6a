//! File-level generation: one schema document per top-level message.

use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use serde::Serialize;
use serde_json::Value;

use crate::converter::Converter;
use crate::descriptor::FileDescriptor;
use crate::error::{GenerateError, LoadError};
use crate::loader::PluginRequest;
use crate::registry::PackageRegistry;
use crate::types::ConverterOptions;

/// `CodeGeneratorResponse.Feature.FEATURE_PROTO3_OPTIONAL`; proto3 `optional`
/// fields convert like any other field.
const FEATURE_PROTO3_OPTIONAL: u64 = 1;

/// Extension of generated schema files.
pub const SCHEMA_FILE_EXTENSION: &str = "jsonschema";

/// A generated schema document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputFile {
    /// Relative output path, e.g. `Order.jsonschema`.
    pub name: String,
    pub content: Value,
}

impl OutputFile {
    pub fn render(&self, pretty: bool) -> String {
        if pretty {
            format!("{:#}", self.content)
        } else {
            self.content.to_string()
        }
    }
}

/// Registers every message of a file set and converts files from it.
pub struct Generator<'a> {
    files: &'a [FileDescriptor],
    registry: PackageRegistry<'a>,
    options: ConverterOptions,
}

impl<'a> Generator<'a> {
    /// Register the top-level messages of all `files`.
    ///
    /// Registration covers dependencies too, so files being generated can
    /// refer to messages imported from them.
    pub fn new(files: &'a [FileDescriptor], options: ConverterOptions) -> Self {
        let mut registry = PackageRegistry::new();
        for file in files {
            for message in &file.message_types {
                registry.register(file.package_name(), message);
            }
        }
        Self {
            files,
            registry,
            options,
        }
    }

    /// Convert one file by name.
    ///
    /// Each top-level message becomes a document, with the file's top-level
    /// enums available to its enum fields. A file without messages yields a
    /// document per top-level enum instead.
    ///
    /// # Errors
    ///
    /// `LoadError::UnknownFile` if no file has this name, otherwise the first
    /// conversion error.
    pub fn convert_file(&self, name: &str) -> Result<Vec<OutputFile>, GenerateError> {
        let file = self
            .files
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LoadError::UnknownFile {
                name: name.to_string(),
            })?;

        let converter = Converter::new(&self.registry, self.options.clone());

        if file.message_types.is_empty() {
            return Ok(file
                .enum_types
                .iter()
                .map(|enum_type| OutputFile {
                    name: self.schema_file_name(file, &enum_type.name),
                    content: converter.convert_enum(enum_type).to_document(),
                })
                .collect());
        }

        if file.message_types.len() > 1 {
            tracing::warn!(
                file = %file.name,
                messages = file.message_types.len(),
                "file declares several messages; writing one schema per message"
            );
        }

        let package = self
            .registry
            .lookup_package(self.registry.root(), file.package_name())
            .unwrap_or_else(|| self.registry.root());

        let mut outputs = Vec::with_capacity(file.message_types.len());
        for message in &file.message_types {
            let node = converter
                .convert_message(package, message, &file.enum_types)
                .map_err(|source| GenerateError::Convert {
                    file: file.name.clone(),
                    source,
                })?;
            outputs.push(OutputFile {
                name: self.schema_file_name(file, &message.name),
                content: node.to_document(),
            });
        }
        Ok(outputs)
    }

    /// Convert the named files in order, stopping at the first failure.
    pub fn generate(
        &self,
        files_to_generate: &[String],
    ) -> Result<Vec<OutputFile>, GenerateError> {
        let mut outputs = Vec::new();
        for name in files_to_generate {
            outputs.extend(self.convert_file(name)?);
        }
        Ok(outputs)
    }

    fn schema_file_name(&self, file: &FileDescriptor, type_name: &str) -> String {
        let package = file.package_name();
        if self.options.prefix_schema_files_with_package && !package.is_empty() {
            format!("{}/{}.{}", package, type_name, SCHEMA_FILE_EXTENSION)
        } else {
            format!("{}.{}", type_name, SCHEMA_FILE_EXTENSION)
        }
    }
}

/// Answer a protoc plugin request.
///
/// Conversion failures are reported through the response's `error` field, as
/// protoc expects, rather than as an `Err`.
pub fn respond(request: &PluginRequest, options: ConverterOptions) -> CodeGeneratorResponse {
    let generator = Generator::new(&request.files, options);

    match generator.generate(&request.files_to_generate) {
        Ok(outputs) => CodeGeneratorResponse {
            file: outputs
                .iter()
                .map(|output| code_generator_response::File {
                    name: Some(output.name.clone()),
                    content: Some(output.render(true)),
                    ..Default::default()
                })
                .collect(),
            supported_features: Some(FEATURE_PROTO3_OPTIONAL),
            ..Default::default()
        },
        Err(err) => {
            tracing::error!(error = %err, "failed to generate schemas");
            CodeGeneratorResponse {
                error: Some(err.to_string()),
                supported_features: Some(FEATURE_PROTO3_OPTIONAL),
                ..Default::default()
            }
        }
    }
}
