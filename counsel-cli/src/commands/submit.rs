use clap::Args;
use colored::Colorize;
use counsel_core::{
    CaseForm, CounselConfig, CounselError, FormField, IntakeFlow, StakesRange, UploadDocument,
    CASE_STATUSES, CASE_TYPES, JURISDICTIONS,
};
use std::path::PathBuf;
use tracing::{info, warn};

use super::watch::watch_case;
use crate::config::api_client;
use crate::output::heading;

#[derive(Args, Default)]
pub struct SubmitArgs {
    #[arg(short, long = "file", help = "PDF document to extract case details from (repeatable)")]
    files: Vec<PathBuf>,

    #[arg(long, help = "Case title")]
    title: Option<String>,

    #[arg(long, help = "Case type, e.g. \"Contract Dispute\"")]
    case_type: Option<String>,

    #[arg(long, help = "Plaintiff name")]
    plaintiff: Option<String>,

    #[arg(long, help = "Defendant name")]
    defendant: Option<String>,

    #[arg(long, help = "Other parties involved")]
    other_parties: Option<String>,

    #[arg(long, help = "Jurisdiction, e.g. \"California\" or \"Other\"")]
    jurisdiction: Option<String>,

    #[arg(long, help = "Jurisdiction name when --jurisdiction is \"Other\"")]
    jurisdiction_other: Option<String>,

    #[arg(long, help = "Case description and key facts")]
    description: Option<String>,

    #[arg(long, help = "Amount at stake, e.g. \"$2,500,000\"")]
    amount: Option<String>,

    #[arg(long, help = "Stakes range (under-100k, 100k-500k, 500k-1m, 1m-5m, 5m-10m, over-10m)")]
    range: Option<String>,

    #[arg(long, help = "Current case status")]
    status: Option<String>,

    #[arg(long, help = "Confirm the case details are accurate and submit")]
    confirm: bool,

    #[arg(long, help = "Follow the analysis after submitting")]
    watch: bool,
}

pub async fn handle_submit_command(config: &CounselConfig, args: SubmitArgs) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let mut flow = IntakeFlow::new();

    if args.files.is_empty() {
        flow.skip_upload()?;
    } else {
        let mut documents = Vec::with_capacity(args.files.len());
        for path in &args.files {
            documents.push(UploadDocument::from_path(path).await?);
        }
        for doc in documents.iter().filter(|d| !d.is_pdf()) {
            warn!(file = %doc.file_name, "Uploading a file without a .pdf extension");
        }

        println!(
            "{} Analyzing {} document(s)...",
            "→".blue(),
            documents.len()
        );
        flow.upload(client.as_ref(), documents).await?;

        if let Some(err) = flow.extraction_error() {
            println!("{} {}", "!".yellow().bold(), err.yellow());
            println!(
                "  {}",
                "Please fill in the case details manually.".dimmed()
            );
        }
    }

    apply_overrides(flow.form_mut(), &args)?;

    print_summary(flow.form());

    let missing = flow.form().missing_fields();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(FormField::label).collect();
        return Err(CounselError::FormIncomplete(format!("missing {}", names.join(", "))).into());
    }

    if !flow.form().confirmed {
        println!();
        println!(
            "{}",
            "Review the details above, then re-run with --confirm to start the analysis.".yellow()
        );
        return Ok(());
    }

    let handoff = flow.submit(client.as_ref()).await?;
    info!(case_id = %handoff.case_id, "Case submitted");

    if let Err(e) = handoff.save() {
        warn!(error = %e, "Could not save handoff; pass the case id explicitly");
    }

    println!();
    println!(
        "{} Case submitted: {}",
        "✓".green().bold(),
        handoff.case_id.bold()
    );

    if args.watch {
        println!();
        return watch_case(config, client, &handoff.case_id, true).await;
    }

    println!(
        "{}",
        format!("Follow the analysis with 'counsel watch {}'.", handoff.case_id).dimmed()
    );
    Ok(())
}

/// Command-line values win over anything extraction filled in.
fn apply_overrides(form: &mut CaseForm, args: &SubmitArgs) -> anyhow::Result<()> {
    let set = |target: &mut String, value: &Option<String>| {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *target = v.to_string();
        }
    };

    set(&mut form.case_title, &args.title);
    set(&mut form.case_type, &args.case_type);
    set(&mut form.plaintiff_name, &args.plaintiff);
    set(&mut form.defendant_name, &args.defendant);
    set(&mut form.other_parties, &args.other_parties);
    set(&mut form.jurisdiction, &args.jurisdiction);
    set(&mut form.jurisdiction_other, &args.jurisdiction_other);
    set(&mut form.case_description, &args.description);
    set(&mut form.money_at_stake, &args.amount);
    set(&mut form.case_status, &args.status);

    if let Some(range) = args.range.as_deref() {
        if StakesRange::from_value(range).is_none() {
            let values: Vec<&str> = StakesRange::ALL.iter().map(|r| r.value()).collect();
            return Err(CounselError::ValidationError(format!(
                "Unknown stakes range '{}'. Expected one of: {}",
                range,
                values.join(", ")
            ))
            .into());
        }
        form.stakes_range = range.to_string();
    }

    for (value, known, flag) in [
        (&form.case_type, &CASE_TYPES[..], "case type"),
        (&form.jurisdiction, &JURISDICTIONS[..], "jurisdiction"),
        (&form.case_status, &CASE_STATUSES[..], "case status"),
    ] {
        if !value.is_empty() && !known.contains(&value.as_str()) {
            warn!(value = %value, "Unlisted {}", flag);
        }
    }

    form.fill_range_from_amount();
    if args.confirm {
        form.confirmed = true;
    }
    Ok(())
}

fn print_summary(form: &CaseForm) {
    println!();
    heading("Case Summary");
    for line in summary_lines(form) {
        println!("{}", line);
    }
}

fn summary_lines(form: &CaseForm) -> Vec<String> {
    let mut lines = Vec::new();

    if !form.uploaded_files.is_empty() {
        lines.push(format!(
            "  {:<18} {}",
            "Documents:".bold(),
            form.uploaded_files.join(", ")
        ));
    }

    let field = |label: &str, value: &str, required: Option<FormField>| {
        let shown = if value.trim().is_empty() {
            match required {
                Some(f) if form.is_missing(f) => format!("missing {}", f.label()).red().to_string(),
                _ => "-".dimmed().to_string(),
            }
        } else {
            value.trim().to_string()
        };
        format!("  {:<18} {}", format!("{}:", label).bold(), shown)
    };

    lines.push(field("Title", &form.case_title, Some(FormField::CaseTitle)));
    lines.push(field("Case Type", &form.case_type, Some(FormField::CaseType)));
    lines.push(field("Plaintiff", &form.plaintiff_name, Some(FormField::PlaintiffName)));
    lines.push(field("Defendant", &form.defendant_name, Some(FormField::DefendantName)));
    lines.push(field("Other Parties", &form.other_parties, None));
    lines.push(field("Jurisdiction", &jurisdiction_display(form), Some(FormField::Jurisdiction)));
    lines.push(field("Amount at Stake", &form.money_at_stake, Some(FormField::Stakes)));
    let range = StakesRange::from_value(&form.stakes_range)
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| form.stakes_range.clone());
    lines.push(field("Stakes Range", &range, None));
    lines.push(field("Status", &form.case_status, None));

    if !form.key_dates.is_empty() {
        lines.push(format!("  {}", "Key Dates:".bold()));
        for date in &form.key_dates {
            lines.push(format!("    • {} {}", date.label, format!("({})", date.date).dimmed()));
        }
    }

    if !form.case_description.trim().is_empty() {
        lines.push(format!("  {}", "Description:".bold()));
        for line in form.case_description.lines() {
            lines.push(format!("    {}", line));
        }
    }

    lines
}

fn jurisdiction_display(form: &CaseForm) -> String {
    if form.jurisdiction.trim().is_empty() {
        String::new()
    } else {
        form.resolved_jurisdiction()
    }
}
