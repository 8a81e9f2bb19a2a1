//! Field inference over normalized document text.

pub mod amount;
pub mod category;
pub mod due_date;

use chrono::NaiveDate;
use verifatura_models::FinancialRecord;

use crate::ner::EntityRecognizer;

/// Populates a financial record from normalized text. The extractors
/// run independently; an absent field is represented as `None`, never
/// as an error at this level.
pub fn extract_financial_data(
    text: &str,
    today: NaiveDate,
    recognizer: Option<&dyn EntityRecognizer>,
) -> FinancialRecord {
    FinancialRecord {
        total_amount: amount::extract_total(text, recognizer),
        due_date: due_date::extract_due_date(text, today),
        category: category::classify(text).to_string(),
    }
}
