//! Protobuf to JSON Schema
//!
//! Converts protobuf message descriptors into draft-04 JSON Schema documents.
//!
//! Referenced messages are resolved through a package registry and inlined,
//! so every document is self-contained. Comments on messages, fields and
//! enums may carry `@` directives that add schema keywords.
//!
//! # Example
//!
//! ```
//! use protoc_gen_jsonschema::{
//!     ConverterOptions, FieldDescriptor, FieldKind, FieldLabel, FileDescriptor, Generator,
//!     MessageDescriptor, SourceLocation,
//! };
//!
//! let files = vec![FileDescriptor::new("geo.proto").with_package("geo").with_message(
//!     MessageDescriptor::new("Point")
//!         .with_field(
//!             FieldDescriptor::new("x", 1, FieldKind::Int32)
//!                 .with_source(SourceLocation::leading(" @required @min=0")),
//!         )
//!         .with_field(
//!             FieldDescriptor::new("tags", 2, FieldKind::String)
//!                 .with_label(FieldLabel::Repeated),
//!         ),
//! )];
//!
//! let generator = Generator::new(&files, ConverterOptions::new());
//! let outputs = generator.convert_file("geo.proto").unwrap();
//!
//! assert_eq!(outputs[0].name, "Point.jsonschema");
//! let schema = &outputs[0].content;
//! assert_eq!(schema["properties"]["x"]["minimum"], 0);
//! assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
//! assert_eq!(schema["properties"]["x"]["required"], true);
//! ```
//!
//! # Comment Directives
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `@title=`, `@name=` | `title` |
//! | `@description=`, `@desc=` | `description` |
//! | `@format=`, `@fmt=` | `format` |
//! | `@pattern=` | `pattern` |
//! | `@min=`, `@max=` | `minimum`/`maximum` on integers, `minLength`/`maxLength` on strings |
//! | `@required` | `required: true` on the node |
//! | `@id`, `@autoincrement`, `@index`, `@query` | `primaryKey`, `autoIncrement`, `index`, `query` flags |
//!
//! Without `@title`, a node's title is the split-case form of its name.

mod converter;
mod descriptor;
mod directives;
mod error;
mod generator;
mod loader;
mod naming;
mod registry;
mod schema;
mod types;

pub use converter::Converter;
pub use descriptor::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldKind, FieldLabel, FileDescriptor,
    MessageDescriptor, SourceLocation,
};
pub use directives::{
    apply_directives, comment_lines, directives_for, extract_directives, parse_directive_line,
    DirectiveSet,
};
pub use error::{ConvertError, GenerateError, LoadError};
pub use generator::{respond, Generator, OutputFile, SCHEMA_FILE_EXTENSION};
pub use loader::{
    decode_descriptor_set, decode_plugin_request, file_from_proto, load_descriptor_set,
    PluginRequest,
};
pub use naming::{to_lower_camel_case, to_pascal_case, to_snake_case, to_split_case};
pub use registry::{lookup_nested_type, PackageId, PackageNode, PackageRegistry};
pub use schema::{SchemaKind, SchemaNode, SchemaType, SCHEMA_VERSION};
pub use types::{ConverterOptions, PLUGIN_PARAMETERS};
