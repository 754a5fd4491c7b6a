//! Converter configuration.

/// Plugin parameters understood by [`ConverterOptions::from_parameter`].
pub const PLUGIN_PARAMETERS: &[&str] = &[
    "allow_null_values",
    "debug",
    "disallow_additional_properties",
    "prefix_schema_files_with_package",
    "proto_and_json_fieldnames",
];

/// Switches controlling schema conversion and output naming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Repeated fields accept `null` as well as an array.
    pub allow_null_values: bool,
    /// Message objects reject properties not declared in the proto.
    pub disallow_additional_properties: bool,
    /// Expose each field under its JSON name as well as its proto name.
    pub use_proto_and_json_fieldnames: bool,
    /// Write schemas as `<package>/<Message>.jsonschema`.
    pub prefix_schema_files_with_package: bool,
    /// Verbose logging.
    pub debug: bool,
}

impl ConverterOptions {
    /// Create options with every switch off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_null_values(mut self, allow: bool) -> Self {
        self.allow_null_values = allow;
        self
    }

    pub fn disallow_additional_properties(mut self, disallow: bool) -> Self {
        self.disallow_additional_properties = disallow;
        self
    }

    pub fn use_proto_and_json_fieldnames(mut self, both: bool) -> Self {
        self.use_proto_and_json_fieldnames = both;
        self
    }

    pub fn prefix_schema_files_with_package(mut self, prefix: bool) -> Self {
        self.prefix_schema_files_with_package = prefix;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parse protoc's comma-separated plugin parameter
    /// (`--jsonschema_out=allow_null_values,debug:out/`).
    ///
    /// Unknown entries are logged and ignored.
    pub fn from_parameter(parameter: &str) -> Self {
        let mut options = Self::new();

        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry {
                "allow_null_values" => options.allow_null_values = true,
                "debug" => options.debug = true,
                "disallow_additional_properties" => options.disallow_additional_properties = true,
                "prefix_schema_files_with_package" => {
                    options.prefix_schema_files_with_package = true
                }
                "proto_and_json_fieldnames" => options.use_proto_and_json_fieldnames = true,
                other => {
                    tracing::warn!(
                        parameter = other,
                        known = ?PLUGIN_PARAMETERS,
                        "ignoring unknown plugin parameter"
                    );
                }
            }
        }

        options
    }
}
