//! Error handling for the annotrack CLI

use std::path::PathBuf;
use thiserror::Error;

/// User-facing failures of CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid region '{region}': {message}")]
    InvalidRegion { region: String, message: String },

    #[error("Tileset error: {message}")]
    Tileset { message: String },

    #[error("Rendering error: {message}")]
    Rendering { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_region<S: Into<String>, M: Into<String>>(region: S, message: M) -> Self {
        Self::InvalidRegion {
            region: region.into(),
            message: message.into(),
        }
    }

    pub fn tileset<S: Into<String>>(message: S) -> Self {
        Self::Tileset { message: message.into() }
    }

    pub fn rendering<S: Into<String>>(message: S) -> Self {
        Self::Rendering { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<annotrack_core::TilesetError> for CliError {
    fn from(err: annotrack_core::TilesetError) -> Self {
        Self::tileset(err.to_string())
    }
}

impl From<annotrack_render::StyleError> for CliError {
    fn from(err: annotrack_render::StyleError) -> Self {
        Self::config(format!("invalid [track] style: {}", err))
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Gzipped tilesets must end in .gz",
                path.display()
            ));
        }

        CliError::InvalidRegion { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use 'start-end' in genome coordinates (e.g. '1.5M-2M')\n\
                 • Use 'chr:start-end' together with --chrom-sizes\n\
                 • Sizes accept k, M and G suffixes",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your annotrack.toml configuration file\n\
                 • Use 'annotrack config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Tileset { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the file is a tileset JSON document\n\
                 • Rebuild it with 'annotrack tile'",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("genes.json"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_region_suggestions() {
        let err = CliError::invalid_region("chr1:x-y", "bad start");
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.starts_with("Invalid region 'chr1:x-y': bad start"));
        assert!(formatted.contains("--chrom-sizes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }
}
