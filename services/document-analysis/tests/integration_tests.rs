//! End-to-end tests against a running service instance.
//!
//! Run with a live service and the recognition toolchain installed:
//! `cargo test -- --ignored`

use std::time::Duration;

pub struct TestConfig {
    pub base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("VERIFATURA_TEST_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        }
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap()
}

/// Minimal single-page PDF with an embedded text layer carrying a due
/// date, a total and a postal code.
fn sample_bill_pdf() -> Vec<u8> {
    let text = "Conta de Energia Eletrica - CEMIG \
                Endereco: Rua das Flores, 123 - CEP 12345-678 \
                VENCIMENTO: 15/08/2025 VALOR TOTAL R$ 189,90 \
                Unidade consumidora residencial, leitura de junho, \
                consumo de 250 kWh no periodo de referencia.";
    let stream = format!("BT /F1 10 Tf 40 700 Td ({text}) Tj ET");
    let mut pdf = String::new();
    pdf.push_str("%PDF-1.4\n");
    let objects = [
        "1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n".to_string(),
        "2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n".to_string(),
        "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n"
            .to_string(),
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            stream.len(),
            stream
        ),
        "5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n".to_string(),
    ];
    let mut offsets = Vec::new();
    for object in &objects {
        offsets.push(pdf.len());
        pdf.push_str(object);
    }
    let xref_start = pdf.len();
    pdf.push_str("xref\n0 6\n0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer << /Size 6 /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n"
    ));
    pdf.into_bytes()
}

fn bill_form(mode: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(sample_bill_pdf())
        .file_name("conta.pdf")
        .mime_str("application/pdf")
        .unwrap();
    reqwest::multipart::Form::new()
        .part("arquivo", part)
        .text("tipo_analise", mode.to_string())
}

#[tokio::test]
#[ignore] // Requires a running service
async fn health_endpoint_reports_service_identity() {
    let config = TestConfig::default();
    let response = client()
        .get(format!("{}/health", config.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service"], "document-analysis");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn financial_extraction_returns_portuguese_payload() {
    let config = TestConfig::default();
    let response = client()
        .post(format!("{}/api/v1/documents/analyze", config.base_url))
        .multipart(bill_form("extracao_conta"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["dados"]["valor_total"], "189.90");
    assert_eq!(body["dados"]["data_vencimento"], "15/08/2025");
    assert_eq!(body["dados"]["categoria"], "Energia");
}

#[tokio::test]
#[ignore]
async fn address_validation_matches_by_postal_code() {
    let config = TestConfig::default();
    let form = bill_form("validacao_endereco").text("cep_formulario", "12345-678");
    let response = client()
        .post(format!("{}/api/v1/documents/analyze", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["corresponde"], true);
    assert_eq!(body["validado_por"], "cep");
}

#[tokio::test]
#[ignore]
async fn address_mismatch_is_a_verdict_not_an_error() {
    let config = TestConfig::default();
    let form = bill_form("validacao_endereco")
        .text("endereco_formulario", "Avenida Brasil, 999")
        .text("cep_formulario", "99999-999");
    let response = client()
        .post(format!("{}/api/v1/documents/analyze", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["corresponde"], false);
    assert_eq!(body["validado_por"], "nenhum");
}

#[tokio::test]
#[ignore]
async fn non_pdf_upload_is_rejected() {
    let config = TestConfig::default();
    let part = reqwest::multipart::Part::bytes(b"plain text".to_vec())
        .file_name("conta.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("arquivo", part);

    let response = client()
        .post(format!("{}/api/v1/documents/analyze", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
#[ignore]
async fn missing_file_field_is_rejected() {
    let config = TestConfig::default();
    let form = reqwest::multipart::Form::new().text("tipo_analise", "extracao_conta");

    let response = client()
        .post(format!("{}/api/v1/documents/analyze", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
