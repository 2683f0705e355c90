use serde::{Deserialize, Serialize};

use crate::error::{CounselError, CounselResult};
use crate::models::{non_empty, ExtractedFields, KeyDate, NewCase};

pub const CASE_TYPES: [&str; 9] = [
    "Contract Dispute",
    "Intellectual Property",
    "Employment",
    "Fraud",
    "Trade Secrets",
    "Personal Injury",
    "Real Estate",
    "Corporate",
    "Other",
];

pub const JURISDICTIONS: [&str; 8] = [
    "California",
    "New York",
    "Texas",
    "Delaware",
    "Florida",
    "Illinois",
    "Federal",
    "Other",
];

pub const CASE_STATUSES: [&str; 6] = [
    "Pre-litigation",
    "Ongoing Litigation",
    "Appeal",
    "Settlement Negotiations",
    "Discovery Phase",
    "Other",
];

pub const OTHER: &str = "Other";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakesRange {
    #[serde(rename = "under-100k")]
    Under100k,
    #[serde(rename = "100k-500k")]
    From100kTo500k,
    #[serde(rename = "500k-1m")]
    From500kTo1m,
    #[serde(rename = "1m-5m")]
    From1mTo5m,
    #[serde(rename = "5m-10m")]
    From5mTo10m,
    #[serde(rename = "over-10m")]
    Over10m,
}

impl StakesRange {
    pub const ALL: [StakesRange; 6] = [
        StakesRange::Under100k,
        StakesRange::From100kTo500k,
        StakesRange::From500kTo1m,
        StakesRange::From1mTo5m,
        StakesRange::From5mTo10m,
        StakesRange::Over10m,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            StakesRange::Under100k => "under-100k",
            StakesRange::From100kTo500k => "100k-500k",
            StakesRange::From500kTo1m => "500k-1m",
            StakesRange::From1mTo5m => "1m-5m",
            StakesRange::From5mTo10m => "5m-10m",
            StakesRange::Over10m => "over-10m",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StakesRange::Under100k => "Under $100K",
            StakesRange::From100kTo500k => "$100K - $500K",
            StakesRange::From500kTo1m => "$500K - $1M",
            StakesRange::From1mTo5m => "$1M - $5M",
            StakesRange::From5mTo10m => "$5M - $10M",
            StakesRange::Over10m => "Over $10M",
        }
    }

    pub fn from_value(value: &str) -> Option<StakesRange> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.value().eq_ignore_ascii_case(value) || r.label().eq_ignore_ascii_case(value))
    }

    pub fn from_amount(amount: u64) -> StakesRange {
        match amount {
            a if a < 100_000 => StakesRange::Under100k,
            a if a < 500_000 => StakesRange::From100kTo500k,
            a if a < 1_000_000 => StakesRange::From500kTo1m,
            a if a < 5_000_000 => StakesRange::From1mTo5m,
            a if a < 10_000_000 => StakesRange::From5mTo10m,
            _ => StakesRange::Over10m,
        }
    }
}

impl std::fmt::Display for StakesRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses a user-entered amount such as `2,500,000` or `$750000`.
pub fn parse_amount(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '_'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<u64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
}

/// Required inputs of the summary step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    CaseTitle,
    PlaintiffName,
    DefendantName,
    CaseType,
    Jurisdiction,
    Stakes,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::CaseTitle => "case title",
            FormField::PlaintiffName => "plaintiff",
            FormField::DefendantName => "defendant",
            FormField::CaseType => "case type",
            FormField::Jurisdiction => "jurisdiction",
            FormField::Stakes => "amount at stake or stakes range",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything the user entered (or extraction filled in) about a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CaseForm {
    pub uploaded_files: Vec<String>,
    pub case_title: String,
    pub case_type: String,
    pub plaintiff_name: String,
    pub defendant_name: String,
    pub other_parties: String,
    pub jurisdiction: String,
    pub jurisdiction_other: String,
    pub case_description: String,
    pub money_at_stake: String,
    pub stakes_range: String,
    pub case_status: String,
    pub key_dates: Vec<KeyDate>,
    pub confirmed: bool,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn override_with(target: &mut String, incoming: &Option<String>) {
    if let Some(value) = non_empty(incoming) {
        *target = value.to_string();
    }
}

impl CaseForm {
    pub fn missing_fields(&self) -> Vec<FormField> {
        let mut missing = Vec::new();
        if blank(&self.case_title) {
            missing.push(FormField::CaseTitle);
        }
        if blank(&self.plaintiff_name) {
            missing.push(FormField::PlaintiffName);
        }
        if blank(&self.defendant_name) {
            missing.push(FormField::DefendantName);
        }
        if blank(&self.case_type) {
            missing.push(FormField::CaseType);
        }
        if blank(&self.jurisdiction) {
            missing.push(FormField::Jurisdiction);
        }
        if blank(&self.money_at_stake) && blank(&self.stakes_range) {
            missing.push(FormField::Stakes);
        }
        missing
    }

    pub fn is_missing(&self, field: FormField) -> bool {
        self.missing_fields().contains(&field)
    }

    /// Submission requires every required field and the confirmation.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty() && self.confirmed
    }

    pub fn validate(&self) -> CounselResult<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(FormField::label).collect();
            return Err(CounselError::FormIncomplete(format!(
                "missing {}",
                names.join(", ")
            )));
        }
        if !self.confirmed {
            return Err(CounselError::FormIncomplete(
                "case details have not been confirmed".to_string(),
            ));
        }
        Ok(())
    }

    /// Folds extracted fields in: non-empty values win, everything else
    /// keeps what the form already had.
    pub fn apply_extraction(&mut self, fields: &ExtractedFields) {
        override_with(&mut self.case_title, &fields.case_title);
        override_with(&mut self.case_type, &fields.case_type);
        override_with(&mut self.plaintiff_name, &fields.plaintiff_name);
        override_with(&mut self.defendant_name, &fields.defendant_name);
        override_with(&mut self.other_parties, &fields.other_parties);
        override_with(&mut self.jurisdiction, &fields.jurisdiction);
        if let Some(description) = fields.description() {
            self.case_description = description.to_string();
        }
        override_with(&mut self.money_at_stake, &fields.money_at_stake);
        override_with(&mut self.stakes_range, &fields.stakes_range);
        override_with(&mut self.case_status, &fields.case_status);
        if let Some(dates) = &fields.key_dates {
            self.key_dates = dates.clone();
        }
        self.fill_range_from_amount();
    }

    /// Derives the stakes bucket when only an amount is known.
    pub fn fill_range_from_amount(&mut self) {
        if !blank(&self.stakes_range) {
            return;
        }
        if let Some(amount) = parse_amount(&self.money_at_stake) {
            self.stakes_range = StakesRange::from_amount(amount).value().to_string();
        }
    }

    pub fn resolved_jurisdiction(&self) -> String {
        if self.jurisdiction == OTHER && !blank(&self.jurisdiction_other) {
            return self.jurisdiction_other.trim().to_string();
        }
        if !blank(&self.jurisdiction) {
            return self.jurisdiction.trim().to_string();
        }
        if !blank(&self.jurisdiction_other) {
            return self.jurisdiction_other.trim().to_string();
        }
        UNKNOWN.to_string()
    }

    pub fn resolved_stakes(&self) -> String {
        if !blank(&self.money_at_stake) {
            return self.money_at_stake.trim().to_string();
        }
        if !blank(&self.stakes_range) {
            return StakesRange::from_value(&self.stakes_range)
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| self.stakes_range.trim().to_string());
        }
        UNKNOWN.to_string()
    }

    pub fn resolved_facts(&self) -> String {
        if !blank(&self.case_description) {
            return self.case_description.clone();
        }
        format!(
            "{} v. {}. No description provided.",
            self.plaintiff_name.trim(),
            self.defendant_name.trim()
        )
    }

    /// Creation payload for `POST /api/cases`.
    pub fn to_new_case(&self) -> NewCase {
        NewCase {
            title: self.case_title.trim().to_string(),
            facts: self.resolved_facts(),
            jurisdiction: self.resolved_jurisdiction(),
            stakes: self.resolved_stakes(),
        }
    }
}
