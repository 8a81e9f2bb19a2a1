//! Verifatura Document Analysis Service
//!
//! Accepts a PDF upload plus an analysis mode and returns either the
//! extracted financial data (amount, due date, category) or an address
//! match verdict.

mod address;
mod fields;
mod ner;
mod ocr;
mod pipeline;

use std::net::SocketAddr;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;
use verifatura_models::{AnalysisMode, FinancialRecord, MatchOutcome};
use verifatura_utils::{init_logging, AnalysisError, AppConfig, ErrorResponse, ServerConfig};

use crate::pipeline::DocumentAnalyzer;

#[derive(Debug, Serialize)]
struct FinancialResponse {
    #[serde(rename = "mensagem")]
    message: String,
    #[serde(rename = "dados")]
    data: FinancialRecord,
}

#[derive(Debug, Serialize)]
struct AddressResponse {
    #[serde(rename = "mensagem")]
    message: String,
    #[serde(rename = "corresponde")]
    matched: bool,
    #[serde(rename = "validado_por")]
    validated_by: MatchOutcome,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Financial(FinancialResponse),
    Address(AddressResponse),
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(err: AnalysisError) -> ApiError {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().unwrap_or_else(|error| {
        eprintln!("Failed to load configuration: {error}. Using defaults.");
        AppConfig::default()
    });

    init_logging(&config.logging)?;

    info!("Starting Verifatura Document Analysis Service...");

    // Recognition binaries are a hard dependency; refuse to serve
    // requests that would all fail on scanned documents.
    ocr::verify_toolchain(&config.ocr)?;

    let analyzer = DocumentAnalyzer::new(&config);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/documents/analyze", post(analyze_document))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(analyzer);

    let addr = bind_addr(&config.server)?;
    info!("Document Analysis Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, AnalysisError> {
    let host: std::net::IpAddr = config.host.parse().map_err(|_| {
        AnalysisError::configuration(format!("invalid server host '{}'", config.host))
    })?;
    Ok(SocketAddr::new(host, config.port))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "document-analysis",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze_document(
    State(analyzer): State<DocumentAnalyzer>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut pdf_bytes: Option<Vec<u8>> = None;
    let mut mode_field: Option<String> = None;
    let mut form_address: Option<String> = None;
    let mut form_postal_code: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        reject(AnalysisError::validation(
            "multipart",
            format!("Requisição multipart inválida: {error}"),
        ))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("arquivo") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|error| {
                    reject(AnalysisError::validation(
                        "arquivo",
                        format!("Falha ao ler o arquivo enviado: {error}"),
                    ))
                })?;
                pdf_bytes = Some(bytes.to_vec());
            }
            Some("tipo_analise") => {
                mode_field = field.text().await.ok();
            }
            Some("endereco_formulario") => {
                form_address = field.text().await.ok();
            }
            Some("cep_formulario") => {
                form_postal_code = field.text().await.ok();
            }
            _ => {}
        }
    }

    let pdf_bytes = pdf_bytes.ok_or_else(|| {
        reject(AnalysisError::validation(
            "arquivo",
            "Campo 'arquivo' não encontrado na requisição.",
        ))
    })?;

    let file_name = file_name.unwrap_or_default();
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(reject(AnalysisError::validation(
            "arquivo",
            "Apenas arquivos no formato PDF são aceitos.",
        )));
    }

    let mode = AnalysisMode::from_form(mode_field.as_deref());
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        file = %file_name,
        size = pdf_bytes.len(),
        ?mode,
        "document received"
    );

    // Rasterization and recognition are CPU-bound subprocess work;
    // keep them off the async runtime.
    let worker = analyzer.clone();
    let text = tokio::task::spawn_blocking(move || worker.extract_text(&pdf_bytes))
        .await
        .map_err(|error| {
            error!(%request_id, error = %error, "extraction task panicked");
            reject(AnalysisError::internal("extraction task failed"))
        })?;

    if text.is_empty() {
        warn!(%request_id, "no text could be recognized");
        return Err(reject(AnalysisError::unreadable_document(
            "Nenhum texto pôde ser reconhecido no documento.",
        )));
    }

    match mode {
        AnalysisMode::FinancialExtraction => {
            let record = analyzer.financial_record(&text).map_err(reject)?;
            info!(%request_id, category = %record.category, "financial data extracted");
            Ok(Json(AnalyzeResponse::Financial(FinancialResponse {
                message: "Dados extraídos com sucesso.".to_string(),
                data: record,
            })))
        }
        AnalysisMode::AddressValidation => {
            let query = verifatura_models::AddressQuery {
                address: form_address,
                postal_code: form_postal_code,
            };
            let outcome = analyzer.validate_address(&text, &query);
            info!(%request_id, ?outcome, "address validated");
            let message = match outcome {
                MatchOutcome::MatchedByPostalCode => "Endereço validado com sucesso via CEP.",
                MatchOutcome::MatchedByStreet => "Endereço validado com sucesso via logradouro.",
                MatchOutcome::NoMatch => "O endereço fornecido não corresponde ao do documento.",
            };
            Ok(Json(AnalyzeResponse::Address(AddressResponse {
                message: message.to_string(),
                matched: outcome.is_match(),
                validated_by: outcome,
            })))
        }
    }
}
