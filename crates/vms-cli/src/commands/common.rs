use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vms_core::dates::format_display_date;
use vms_core::sync::{CycleOutcome, PushReport};
use vms_core::{
    DiagnosticLog, LocalStore, SheetClient, SyncConfig, Visitor, VisitorDraft, VisitorId,
    VisitorService,
};

use crate::cli::VisitorArgs;
use crate::error::CliError;

pub type Service = VisitorService<SheetClient, SheetClient>;

pub const STORE_FILE: &str = "state.db";
pub const CONFIG_FILE: &str = "config.json";

pub fn resolve_data_dir(cli_data_dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_data_dir
        .or_else(|| env::var_os("VMS_DATA_DIR").map(PathBuf::from))
        .or_else(default_data_dir)
        .ok_or_else(|| {
            CliError::Config("Cannot resolve a data directory; pass --data-dir".to_string())
        })
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("vms"))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn load_config(data_dir: &Path) -> Result<SyncConfig, CliError> {
    Ok(SyncConfig::load_from_path(&config_path(data_dir))?)
}

pub async fn open_service(data_dir: &Path) -> Result<Service, CliError> {
    let config = load_config(data_dir)?;
    let store = LocalStore::open(data_dir.join(STORE_FILE)).await?;
    let client = SheetClient::new(config);
    Ok(VisitorService::new(
        Arc::new(store),
        client.clone(),
        client,
        DiagnosticLog::new(),
    ))
}

/// Resolve a full id or a unique id prefix against `visitors`.
pub fn resolve_visitor_id(query: &str, visitors: &[Visitor]) -> Result<VisitorId, CliError> {
    let query = normalize_visitor_identifier(query)?;
    if let Some(visitor) = visitors.iter().find(|visitor| visitor.id.as_str() == query) {
        return Ok(visitor.id.clone());
    }

    let matching = visitors
        .iter()
        .filter(|visitor| visitor.id.as_str().starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::VisitorNotFound(query)),
        [visitor] => Ok(visitor.id.clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|visitor| format!("{} ({})", short_id(&visitor.id), visitor.name))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousVisitorId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub async fn resolve_in_service(query: &str, service: &Service) -> Result<VisitorId, CliError> {
    resolve_visitor_id(query, &service.list().await)
}

pub fn normalize_visitor_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyVisitorId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_search_term(term: &str) -> Result<String, CliError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchTerm)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Overlay the given form fields onto `base`.
pub fn apply_visitor_args(mut base: VisitorDraft, args: VisitorArgs) -> VisitorDraft {
    let overlay = |field: &mut String, value: Option<String>| {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    };

    overlay(&mut base.name, args.name);
    overlay(&mut base.gender, args.gender);
    overlay(&mut base.age, args.age);
    overlay(&mut base.place, args.place);
    overlay(&mut base.national_id, args.national_id);
    overlay(&mut base.group_leader, args.group_leader);
    overlay(&mut base.secondary_id, args.secondary_id);
    overlay(&mut base.from_date, args.from_date);
    overlay(&mut base.to_date, args.to_date);
    overlay(&mut base.am_pm, args.am_pm.map(|value| value.as_str().to_string()));
    overlay(&mut base.phone, args.phone);
    overlay(&mut base.event, args.event);
    base
}

pub fn short_id(id: &VisitorId) -> String {
    id.as_str().chars().take(16).collect()
}

pub fn format_visitor_lines(visitors: &[Visitor]) -> Vec<String> {
    visitors
        .iter()
        .map(|visitor| {
            let id = short_id(&visitor.id);
            let name = truncate(&visitor.name, 24);
            format!(
                "{id:<16}  {name:<24}  {:<11}  {:<12}  {} to {}  {:<5}  {:>8.2}",
                visitor.status.label(),
                visitor.phone,
                format_display_date(&visitor.from_date),
                format_display_date(&visitor.to_date),
                visitor.event,
                visitor.amount
            )
        })
        .collect()
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn describe_push(report: &PushReport) -> String {
    match &report.result {
        Ok(channel) => match &report.follow_up {
            Some(outcome) => format!("Pushed via {channel}; follow-up sync {outcome}"),
            None => format!("Pushed via {channel}"),
        },
        Err(error) => format!("Saved locally only; remote write failed: {error}"),
    }
}

/// Fail the command for failed cycles so scripts see a non-zero exit.
pub fn check_outcome(outcome: CycleOutcome) -> Result<CycleOutcome, CliError> {
    match outcome {
        CycleOutcome::Failed(_, message) => Err(CliError::SyncFailed(message)),
        outcome => Ok(outcome),
    }
}

pub fn print_log(log: &DiagnosticLog) {
    for entry in log.entries() {
        println!("{entry}");
    }
}
