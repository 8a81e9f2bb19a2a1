use serde::{Deserialize, Serialize};

/// Caller-selected analysis mode. Wire values match the upload form
/// field `tipo_analise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    #[serde(rename = "extracao_conta")]
    FinancialExtraction,
    #[serde(rename = "validacao_endereco")]
    AddressValidation,
}

impl AnalysisMode {
    /// Absent or unrecognized values fall back to address validation.
    pub fn from_form(value: Option<&str>) -> Self {
        match value {
            Some("extracao_conta") => Self::FinancialExtraction,
            _ => Self::AddressValidation,
        }
    }
}

/// Financial fields inferred from one document. Assembled once from
/// the independent extractor outputs and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Decimal string with two fractional digits and a dot separator,
    /// e.g. `"1234.56"`.
    #[serde(rename = "valor_total")]
    pub total_amount: Option<String>,
    /// `DD/MM/YYYY` (or `DD/MM/YY` when the source used a two-digit
    /// year), verbatim from the document.
    #[serde(rename = "data_vencimento")]
    pub due_date: Option<String>,
    #[serde(rename = "categoria")]
    pub category: String,
}

/// Address data supplied by the caller for validation. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressQuery {
    pub address: Option<String>,
    pub postal_code: Option<String>,
}

/// Verdict of matching an [`AddressQuery`] against document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[serde(rename = "cep")]
    MatchedByPostalCode,
    #[serde(rename = "logradouro")]
    MatchedByStreet,
    #[serde(rename = "nenhum")]
    NoMatch,
}

impl MatchOutcome {
    pub fn is_match(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}
