//! protoc-gen-jsonschema CLI
//!
//! Runs as a protoc plugin when invoked without a subcommand, or converts a
//! descriptor set file directly with `convert`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use prost::Message;
use protoc_gen_jsonschema::{
    decode_plugin_request, load_descriptor_set, respond, ConverterOptions, Generator, OutputFile,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "protoc-gen-jsonschema")]
#[command(about = "Generate JSON Schemas from protobuf descriptors")]
#[command(version)]
struct Cli {
    /// Without a subcommand, read a CodeGeneratorRequest from stdin (protoc plugin mode)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a FileDescriptorSet (protoc --descriptor_set_out)
    Convert {
        /// Descriptor set file
        descriptor_set: PathBuf,

        /// Proto file to convert, as named in the set (default: every file)
        #[arg(long = "file", short)]
        files: Vec<String>,

        /// Directory to write schema files into (stdout if not specified)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Allow null for repeated fields
        #[arg(long)]
        allow_null_values: bool,

        /// Reject properties not declared in the proto
        #[arg(long)]
        disallow_additional_properties: bool,

        /// Expose fields under both their proto and JSON names
        #[arg(long)]
        proto_and_json_fieldnames: bool,

        /// Write schemas as <package>/<Message>.jsonschema
        #[arg(long)]
        prefix_with_package: bool,

        /// Verbose logging to stderr
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_plugin(),

        Some(Commands::Convert {
            descriptor_set,
            files,
            output_dir,
            pretty,
            allow_null_values,
            disallow_additional_properties,
            proto_and_json_fieldnames,
            prefix_with_package,
            debug,
        }) => {
            let options = ConverterOptions::new()
                .allow_null_values(allow_null_values)
                .disallow_additional_properties(disallow_additional_properties)
                .use_proto_and_json_fieldnames(proto_and_json_fieldnames)
                .prefix_schema_files_with_package(prefix_with_package)
                .debug(debug);
            run_convert(&descriptor_set, &files, output_dir, pretty, options)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr; stdout belongs to protoc or to the schema output.
fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_plugin() -> Result<(), u8> {
    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input).map_err(|e| {
        eprintln!("Error reading request from stdin: {}", e);
        3u8
    })?;

    let request = decode_plugin_request(&input).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let options = ConverterOptions::from_parameter(&request.parameter);
    init_logging(options.debug);
    tracing::debug!(
        files = request.files.len(),
        files_to_generate = ?request.files_to_generate,
        "received plugin request"
    );

    let response = respond(&request, options);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .and_then(|()| stdout.flush())
        .map_err(|e| {
            eprintln!("Error writing response to stdout: {}", e);
            3u8
        })
}

fn run_convert(
    descriptor_set: &Path,
    files: &[String],
    output_dir: Option<PathBuf>,
    pretty: bool,
    options: ConverterOptions,
) -> Result<(), u8> {
    init_logging(options.debug);

    let descriptors = load_descriptor_set(descriptor_set).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let files_to_generate: Vec<String> = if files.is_empty() {
        descriptors.iter().map(|f| f.name.clone()).collect()
    } else {
        files.to_vec()
    };

    let generator = Generator::new(&descriptors, options);
    let outputs = generator.generate(&files_to_generate).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output_dir {
        Some(dir) => write_outputs(&dir, &outputs, pretty),
        None => {
            let json_output = if pretty {
                serde_json::to_string_pretty(&outputs)
            } else {
                serde_json::to_string(&outputs)
            }
            .map_err(|e| {
                eprintln!("Error serializing output: {}", e);
                2u8
            })?;
            println!("{}", json_output);
            Ok(())
        }
    }
}

fn write_outputs(dir: &Path, outputs: &[OutputFile], pretty: bool) -> Result<(), u8> {
    for output in outputs {
        let path = dir.join(&output.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                eprintln!("Error creating {}: {}", parent.display(), e);
                3u8
            })?;
        }
        std::fs::write(&path, output.render(pretty)).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        })?;
        tracing::debug!(path = %path.display(), "wrote schema");
    }

    eprintln!("Wrote {} schema file(s) to {}", outputs.len(), dir.display());
    Ok(())
}
