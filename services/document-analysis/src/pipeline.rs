//! Hybrid text acquisition and per-request orchestration.
//!
//! PDFs are extremely heterogeneous: some carry a real embedded text
//! layer, some are photographed pages. The analyzer tries the text
//! layer first and falls back to optical recognition when the yield is
//! too small to be a real document body, without the caller declaring
//! which kind it has.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};
use verifatura_models::{AddressQuery, FinancialRecord, MatchOutcome};
use verifatura_utils::{normalize, AnalysisError, AppConfig};

use crate::address;
use crate::fields;
use crate::ner::{EntityRecognizer, LexicalMoneyRecognizer};
use crate::ocr::{preprocess_page, OcrEngine, PageRasterizer, PdftoppmRasterizer, TesseractCli};

/// Reads a PDF's embedded text layer, concatenated in page order.
pub trait TextLayerReader: Send + Sync {
    fn read(&self, pdf_bytes: &[u8]) -> anyhow::Result<String>;
}

/// Native extraction through `pdf-extract`.
pub struct PdfTextLayerReader;

impl TextLayerReader for PdfTextLayerReader {
    fn read(&self, pdf_bytes: &[u8]) -> anyhow::Result<String> {
        Ok(pdf_extract::extract_text_from_mem(pdf_bytes)?)
    }
}

/// Immutable per-process analyzer shared across requests. Cheap to
/// clone; never mutated after construction.
#[derive(Clone)]
pub struct DocumentAnalyzer {
    reader: Arc<dyn TextLayerReader>,
    rasterizer: Arc<dyn PageRasterizer>,
    engine: Arc<dyn OcrEngine>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    min_native_text_chars: usize,
}

impl DocumentAnalyzer {
    pub fn new(config: &AppConfig) -> Self {
        let recognizer: Option<Arc<dyn EntityRecognizer>> = if config.extraction.ner_enabled {
            Some(Arc::new(LexicalMoneyRecognizer::new()))
        } else {
            None
        };
        Self {
            reader: Arc::new(PdfTextLayerReader),
            rasterizer: Arc::new(PdftoppmRasterizer::from_config(&config.ocr)),
            engine: Arc::new(TesseractCli::from_config(&config.ocr)),
            recognizer,
            min_native_text_chars: config.extraction.min_native_text_chars,
        }
    }

    /// Assembles an analyzer from explicit parts, letting tests swap in
    /// fake readers, rasterizers and engines.
    pub fn with_parts(
        reader: Arc<dyn TextLayerReader>,
        rasterizer: Arc<dyn PageRasterizer>,
        engine: Arc<dyn OcrEngine>,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
        min_native_text_chars: usize,
    ) -> Self {
        Self {
            reader,
            rasterizer,
            engine,
            recognizer,
            min_native_text_chars,
        }
    }

    /// Hybrid text extraction. Fails closed: any infrastructure
    /// trouble yields an empty string, which callers must treat as an
    /// unusable document rather than "no matches found".
    pub fn extract_text(&self, pdf_bytes: &[u8]) -> String {
        // Native extraction is a best-effort optimization; its errors
        // are swallowed, never propagated.
        let native = match self.reader.read(pdf_bytes) {
            Ok(text) => text,
            Err(error) => {
                debug!(error = %error, "text layer unreadable");
                String::new()
            }
        };

        // Character count, not byte length: accented text would
        // otherwise clear the gate early.
        if native.trim().chars().count() >= self.min_native_text_chars {
            debug!(chars = native.chars().count(), "native text layer accepted");
            return normalize(&native);
        }

        // A short yield suggests a scanned or photographed document
        // with at most stray metadata text.
        match self.recognize_pages(pdf_bytes) {
            Ok(text) => normalize(&text),
            Err(error) => {
                warn!(error = %error, "optical recognition failed");
                String::new()
            }
        }
    }

    fn recognize_pages(&self, pdf_bytes: &[u8]) -> anyhow::Result<String> {
        let pages = self.rasterizer.rasterize(pdf_bytes)?;
        let mut full_text = String::new();
        for (index, page) in pages.iter().enumerate() {
            let prepared = preprocess_page(page);
            let page_text = self.engine.recognize(&prepared)?;
            debug!(page = index + 1, chars = page_text.len(), "page recognized");
            full_text.push_str(&page_text);
            full_text.push('\n');
        }
        Ok(full_text)
    }

    /// Financial mode. Both mandatory fields must be present; a
    /// partial record is never returned.
    pub fn financial_record(&self, text: &str) -> Result<FinancialRecord, AnalysisError> {
        self.financial_record_at(text, Local::now().date_naive())
    }

    pub fn financial_record_at(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<FinancialRecord, AnalysisError> {
        let record = fields::extract_financial_data(text, today, self.recognizer.as_deref());
        if record.total_amount.is_none() || record.due_date.is_none() {
            return Err(AnalysisError::unprocessable_content(
                "Não foi possível extrair os dados essenciais (valor e vencimento). \
                 Verifique a qualidade do documento.",
            ));
        }
        Ok(record)
    }

    /// Address mode: a verdict, never an error.
    pub fn validate_address(&self, text: &str, query: &AddressQuery) -> MatchOutcome {
        address::match_address(text, query)
    }
}
