use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

/// Optical recognition toolchain settings. The binaries are resolved
/// at startup; a missing tool is a fatal initialization error, never a
/// per-request one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
    /// Recognition language passed to the engine (`-l`).
    pub language: String,
    /// Engine mode (`--oem`).
    pub engine_mode: u8,
    /// Page segmentation mode (`--psm`). 6 assumes a uniform block of
    /// text, which fits invoices and bills.
    pub page_seg_mode: u8,
    /// Rasterization resolution in dots per inch.
    pub dpi: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Native text layers shorter than this are treated as absent and
    /// the document goes through optical recognition instead.
    pub min_native_text_chars: usize,
    /// Enables the entity-recognizer fallback of the monetary-total
    /// extractor. When disabled that strategy is skipped entirely.
    pub ner_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with VERIFATURA prefix
            .add_source(Environment::with_prefix("VERIFATURA").separator("__"));

        config.build()?.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: 16 * 1024 * 1024, // 16MB
            },
            ocr: OcrConfig {
                tesseract_cmd: "tesseract".to_string(),
                pdftoppm_cmd: "pdftoppm".to_string(),
                language: "por".to_string(),
                engine_mode: 3,
                page_seg_mode: 6,
                dpi: 300,
            },
            extraction: ExtractionConfig {
                min_native_text_chars: 150,
                ner_enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                file_path: None,
            },
        }
    }
}
