//! File processing API
//!
//! Processes a document at a given stage (tokens or scene) into a given output format:
//!
//!     token-simple    one `<kind>(text)` entry per token
//!     token-json      the token stream as JSON
//!     scene-treeviz   the parsed scene as an indented tree
//!     scene-json      the parsed scene arena as JSON
//!
//! Usage:
//!
//!     let spec = ProcessingSpec::from_string("scene-treeviz")?;
//!     let output = process_file("world.wrl", &spec, &load_defaults()?)?;

use crate::vrml::ast::ParseError;
use crate::vrml::config::VrmlConfig;
use crate::vrml::ast::Scene;
use crate::vrml::formats::{FormatError, FormatRegistry};
use crate::vrml::lexing::tokenize;
use crate::vrml::parsing::parse_document;
use crate::vrml::token::{Token, TokenKind};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// What data to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Token,
    Scene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Simple,
    Json,
    Treeviz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSpec {
    pub stage: ProcessingStage,
    pub format: OutputFormat,
}

impl ProcessingSpec {
    /// Parse a format string like "token-simple" or "scene-treeviz"
    pub fn from_string(format_str: &str) -> Result<Self, ProcessingError> {
        let Some((stage, format)) = format_str.split_once('-') else {
            return Err(ProcessingError::InvalidFormat(format_str.to_string()));
        };

        let stage = match stage {
            "token" => ProcessingStage::Token,
            "scene" => ProcessingStage::Scene,
            _ => return Err(ProcessingError::InvalidStage(stage.to_string())),
        };

        let format = match format {
            "simple" => OutputFormat::Simple,
            "json" => OutputFormat::Json,
            "treeviz" => OutputFormat::Treeviz,
            _ => return Err(ProcessingError::InvalidFormatType(format.to_string())),
        };

        match (stage, format) {
            (ProcessingStage::Token, OutputFormat::Treeviz) => Err(
                ProcessingError::InvalidFormatType("treeviz only works with the scene stage".into()),
            ),
            (ProcessingStage::Scene, OutputFormat::Simple) => Err(
                ProcessingError::InvalidFormatType("simple only works with the token stage".into()),
            ),
            _ => Ok(ProcessingSpec { stage, format }),
        }
    }

    pub fn available_specs() -> Vec<ProcessingSpec> {
        vec![
            ProcessingSpec {
                stage: ProcessingStage::Token,
                format: OutputFormat::Simple,
            },
            ProcessingSpec {
                stage: ProcessingStage::Token,
                format: OutputFormat::Json,
            },
            ProcessingSpec {
                stage: ProcessingStage::Scene,
                format: OutputFormat::Treeviz,
            },
            ProcessingSpec {
                stage: ProcessingStage::Scene,
                format: OutputFormat::Json,
            },
        ]
    }

    pub fn name(&self) -> String {
        format!(
            "{}-{}",
            match self.stage {
                ProcessingStage::Token => "token",
                ProcessingStage::Scene => "scene",
            },
            match self.format {
                OutputFormat::Simple => "simple",
                OutputFormat::Json => "json",
                OutputFormat::Treeviz => "treeviz",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid stage: {0}")]
    InvalidStage(String),
    #[error("invalid format type: {0}")]
    InvalidFormatType(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input is {size} bytes, over the configured limit of {limit}")]
    InputTooLarge { size: u64, limit: u64 },
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Process a file according to `spec`
pub fn process_file<P: AsRef<Path>>(
    file_path: P,
    spec: &ProcessingSpec,
    config: &VrmlConfig,
) -> Result<String, ProcessingError> {
    let file_path = file_path.as_ref();
    if let Some(limit) = config.parse.input_limit() {
        let size = fs::metadata(file_path)?.len();
        check_size(size, limit)?;
    }
    let content = fs::read_to_string(file_path)?;
    process_source(&content, spec, config)
}

/// Process an in-memory document according to `spec`
pub fn process_source(
    source: &str,
    spec: &ProcessingSpec,
    config: &VrmlConfig,
) -> Result<String, ProcessingError> {
    if let Some(limit) = config.parse.input_limit() {
        check_size(source.len() as u64, limit)?;
    }

    match spec.stage {
        ProcessingStage::Token => {
            let tokens = tokenize(source)?;
            format_tokens(&tokens, spec.format, config.output.pretty_json)
        }
        ProcessingStage::Scene => {
            let scene = parse_document(source)?;
            let format = match spec.format {
                OutputFormat::Treeviz => "treeviz",
                OutputFormat::Json => "json",
                OutputFormat::Simple => {
                    return Err(ProcessingError::InvalidFormatType(spec.name()))
                }
            };
            let registry = FormatRegistry::for_output(&config.output);
            Ok(registry.serialize(&scene, format)?)
        }
    }
}

/// Parse a file into a scene, honouring the configured input limit
pub fn parse_file<P: AsRef<Path>>(
    file_path: P,
    config: &VrmlConfig,
) -> Result<Scene, ProcessingError> {
    let file_path = file_path.as_ref();
    if let Some(limit) = config.parse.input_limit() {
        check_size(fs::metadata(file_path)?.len(), limit)?;
    }
    let content = fs::read_to_string(file_path)?;
    Ok(parse_document(&content)?)
}

fn check_size(size: u64, limit: u64) -> Result<(), ProcessingError> {
    if size > limit {
        return Err(ProcessingError::InputTooLarge { size, limit });
    }
    Ok(())
}

/// Format a token stream. Only token formats are accepted.
pub fn format_tokens(
    tokens: &[Token],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, ProcessingError> {
    match format {
        OutputFormat::Simple => {
            let mut result = String::new();
            for token in tokens.iter().filter(|t| t.kind != TokenKind::EndOfInput) {
                result.push_str(&token.to_string());
                result.push('\n');
            }
            Ok(result)
        }
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(tokens)
            } else {
                serde_json::to_string(tokens)
            };
            json.map_err(|e| FormatError::SerializationError(e.to_string()).into())
        }
        OutputFormat::Treeviz => Err(ProcessingError::InvalidFormatType(
            "treeviz only works with the scene stage".to_string(),
        )),
    }
}

/// Get all available format strings
pub fn available_formats() -> Vec<String> {
    ProcessingSpec::available_specs()
        .iter()
        .map(ProcessingSpec::name)
        .collect()
}
