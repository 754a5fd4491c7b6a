//! CLI integration tests for the protoc-gen-jsonschema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::source_code_info::Location;
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, SourceCodeInfo,
};
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("protoc-gen-jsonschema"))
}

fn field(name: &str, number: i32, kind: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(kind as i32),
        ..Default::default()
    }
}

/// `geo/point.proto`: a `Point` whose `x` field carries `@required @min=3`.
fn point_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("geo/point.proto".into()),
        package: Some("geo".into()),
        message_type: vec![DescriptorProto {
            name: Some("Point".into()),
            field: vec![field("x", 1, Type::Int32), field("label_text", 2, Type::String)],
            ..Default::default()
        }],
        source_code_info: Some(SourceCodeInfo {
            location: vec![Location {
                path: vec![4, 0, 2, 0],
                leading_comments: Some(" @required @min=3\n".into()),
                ..Default::default()
            }],
        }),
        ..Default::default()
    }
}

/// `broken.proto`: a message referring to a type nobody declares.
fn broken_file() -> FileDescriptorProto {
    let mut ghost = field("ghost", 1, Type::Message);
    ghost.type_name = Some(".nowhere.Ghost".into());
    FileDescriptorProto {
        name: Some("broken.proto".into()),
        message_type: vec![DescriptorProto {
            name: Some("Broken".into()),
            field: vec![ghost],
            ..Default::default()
        }],
        ..Default::default()
    }
}

// Helper to write an encoded descriptor set into a temp dir
fn write_descriptor_set(dir: &TempDir, files: Vec<FileDescriptorProto>) -> std::path::PathBuf {
    let path = dir.path().join("descriptors.pb");
    let set = FileDescriptorSet { file: files };
    fs::write(&path, set.encode_to_vec()).unwrap();
    path
}

mod convert_command {
    use super::*;

    #[test]
    fn prints_schemas_to_stdout() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);

        cmd()
            .args(["convert", set.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"Point.jsonschema""#))
            .stdout(predicate::str::contains(r#""minimum":3"#))
            .stdout(predicate::str::contains(r#""required":true"#));
    }

    #[test]
    fn stdout_output_is_a_json_array() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);

        let output = cmd()
            .args(["convert", set.to_str().unwrap(), "--pretty"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let files = parsed.as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0]["content"]["$schema"],
            "http://json-schema.org/draft-04/schema#"
        );
        assert_eq!(
            files[0]["content"]["properties"]["label_text"]["type"],
            "string"
        );
    }

    #[test]
    fn writes_files_to_output_dir() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "convert",
                set.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains("Wrote 1 schema file(s)"));

        let written = fs::read_to_string(out.join("Point.jsonschema")).unwrap();
        let schema: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(schema["title"], "Point");
        assert_eq!(schema["properties"]["x"]["propertyOrder"], 1);
    }

    #[test]
    fn package_prefix_creates_directories() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "convert",
                set.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
                "--prefix-with-package",
            ])
            .assert()
            .success();

        assert!(out.join("geo").join("Point.jsonschema").exists());
    }

    #[test]
    fn conversion_flags() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);

        cmd()
            .args([
                "convert",
                set.to_str().unwrap(),
                "--disallow-additional-properties",
                "--proto-and-json-fieldnames",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""additionalProperties":false"#))
            .stdout(predicate::str::contains(r#""labelText""#));
    }

    #[test]
    fn selects_files_by_name() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file(), broken_file()]);

        cmd()
            .args(["convert", set.to_str().unwrap(), "--file", "geo/point.proto"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Point.jsonschema"));
    }

    #[test]
    fn unresolved_reference_exits_2() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file(), broken_file()]);

        cmd()
            .args(["convert", set.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "no such message type named .nowhere.Ghost",
            ));
    }

    #[test]
    fn unknown_file_exits_2() {
        let dir = TempDir::new().unwrap();
        let set = write_descriptor_set(&dir, vec![point_file()]);

        cmd()
            .args(["convert", set.to_str().unwrap(), "--file", "missing.proto"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("missing.proto"));
    }

    #[test]
    fn missing_descriptor_set_exits_3() {
        cmd()
            .args(["convert", "/nonexistent/descriptors.pb"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn garbage_descriptor_set_exits_2() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.pb");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();

        cmd()
            .args(["convert", path.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid descriptor data"));
    }
}

mod plugin_mode {
    use super::*;

    fn request(files: Vec<FileDescriptorProto>, generate: &[&str], parameter: &str) -> Vec<u8> {
        CodeGeneratorRequest {
            file_to_generate: generate.iter().map(|s| s.to_string()).collect(),
            parameter: Some(parameter.to_string()),
            proto_file: files,
            ..Default::default()
        }
        .encode_to_vec()
    }

    fn run(input: Vec<u8>) -> CodeGeneratorResponse {
        let output = cmd().write_stdin(input).output().unwrap();
        assert!(output.status.success());
        CodeGeneratorResponse::decode(output.stdout.as_slice()).unwrap()
    }

    #[test]
    fn responds_with_schema_files() {
        let response = run(request(vec![point_file()], &["geo/point.proto"], ""));

        assert!(response.error.is_none());
        assert_eq!(response.supported_features(), 1);
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name(), "Point.jsonschema");

        let schema: serde_json::Value = serde_json::from_str(response.file[0].content()).unwrap();
        assert_eq!(schema["properties"]["x"]["minimum"], 3);
    }

    #[test]
    fn honors_parameters() {
        let response = run(request(
            vec![point_file()],
            &["geo/point.proto"],
            "prefix_schema_files_with_package,disallow_additional_properties",
        ));

        assert_eq!(response.file[0].name(), "geo/Point.jsonschema");
        assert!(response.file[0]
            .content()
            .contains(r#""additionalProperties": false"#));
    }

    #[test]
    fn reports_conversion_errors_in_response() {
        let response = run(request(vec![broken_file()], &["broken.proto"], ""));

        assert!(response.file.is_empty());
        assert!(response.error().contains(".nowhere.Ghost"));
    }

    #[test]
    fn garbage_request_fails() {
        cmd()
            .write_stdin(vec![0xff, 0xff, 0xff])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid descriptor data"));
    }
}
