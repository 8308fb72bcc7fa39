use serde_json::Value;

use crate::models::{AnalysisKind, AnalysisRequest};

pub fn system_prompt(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::DenialAnalysis => {
            "You are a revenue cycle specialist reviewing a denied healthcare claim. \
             Identify the most likely root cause from the CARC/RARC codes and payer notes, \
             say whether the denial is appealable, and list the concrete corrections or \
             documentation needed before resubmission."
        }
        AnalysisKind::AppealLetter => {
            "You are a medical billing appeals writer. Draft a concise, professional appeal \
             letter to the payer citing the claim details, the denial reason, and the \
             supporting clinical documentation. Do not invent facts that are not in the record."
        }
        AnalysisKind::ClaimReview => {
            "You are a coding and billing auditor. Review the claim for coding errors, missing \
             modifiers, eligibility problems and documentation gaps that could lead to a denial, \
             and rate the overall denial risk as low, medium or high."
        }
    }
}

pub fn user_prompt(kind: AnalysisKind, request: &AnalysisRequest) -> String {
    let subject = match kind {
        AnalysisKind::DenialAnalysis => "denial",
        AnalysisKind::AppealLetter => "denied claim to appeal",
        AnalysisKind::ClaimReview => "claim",
    };

    let record = match &request.payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    match request.context.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => {
            format!("Here is the {}:\n{}\n\nAdditional notes from the biller:\n{}", subject, record, notes)
        }
        _ => format!("Here is the {}:\n{}", subject, record),
    }
}
