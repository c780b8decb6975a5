use std::path::PathBuf;

use clap_complete::shells;
use pretty_assertions::assert_eq;
use vms_core::analytics::RegisterStats;
use vms_core::remote::SyncErrorKind;
use vms_core::sync::CycleOutcome;
use vms_core::{SyncConfig, Visitor, VisitorDraft, VisitorId, VisitorStatus};

use crate::cli::{ConfigCommands, Meridiem, VisitorArgs};
use crate::commands::common::{
    apply_visitor_args, check_outcome, config_path, format_visitor_lines, normalize_search_term,
    normalize_visitor_identifier, open_service, resolve_data_dir, resolve_visitor_id, truncate,
};
use crate::commands::completions::generate_for_shell;
use crate::commands::config::{normalize_url, parse_mappings, run_config};
use crate::commands::stats::format_stats_lines;
use crate::error::CliError;

fn visitor(id: &str, name: &str) -> Visitor {
    Visitor {
        id: VisitorId::from(id),
        name: name.to_string(),
        phone: "9999999999".to_string(),
        from_date: "05/03/2024".to_string(),
        to_date: "06/03/2024".to_string(),
        event: "HP".to_string(),
        amount: 2250.0,
        status: VisitorStatus::In,
        ..Visitor::default()
    }
}

#[test]
fn resolve_visitor_id_prefers_exact_match() {
    let visitors = vec![visitor("local-1", "Asha"), visitor("local-12", "Ravi")];
    assert_eq!(
        resolve_visitor_id("local-1", &visitors).unwrap(),
        VisitorId::from("local-1")
    );
}

#[test]
fn resolve_visitor_id_accepts_unique_prefix() {
    let visitors = vec![
        visitor("v-05-03-2024-asha", "Asha"),
        visitor("local-0191", "Ravi"),
    ];
    assert_eq!(
        resolve_visitor_id("  local ", &visitors).unwrap(),
        VisitorId::from("local-0191")
    );
}

#[test]
fn resolve_visitor_id_reports_ambiguous_and_missing_prefixes() {
    let visitors = vec![visitor("local-aa", "Asha"), visitor("local-ab", "Ravi")];

    match resolve_visitor_id("local-a", &visitors) {
        Err(CliError::AmbiguousVisitorId(message)) => {
            assert!(message.contains("local-aa (Asha)"));
            assert!(message.contains("local-ab (Ravi)"));
        }
        other => panic!("expected ambiguous id error, got {other:?}"),
    }
    assert!(matches!(
        resolve_visitor_id("v-", &visitors),
        Err(CliError::VisitorNotFound(_))
    ));
    assert!(matches!(
        resolve_visitor_id("  ", &visitors),
        Err(CliError::EmptyVisitorId)
    ));
}

#[test]
fn normalizers_trim_and_reject_empty() {
    assert_eq!(normalize_visitor_identifier(" abc ").unwrap(), "abc");
    assert_eq!(normalize_search_term(" asha ").unwrap(), "asha");
    assert!(matches!(
        normalize_search_term("\t"),
        Err(CliError::EmptySearchTerm)
    ));
}

#[test]
fn visitor_args_overlay_only_given_fields() {
    let base = VisitorDraft::from_visitor(&visitor("local-1", "Asha"));
    let args = VisitorArgs {
        name: Some("  Asha Rao ".to_string()),
        am_pm: Some(Meridiem::Pm),
        ..VisitorArgs::default()
    };

    let draft = apply_visitor_args(base.clone(), args);

    assert_eq!(draft.name, "Asha Rao");
    assert_eq!(draft.am_pm, "PM");
    assert_eq!(draft.phone, base.phone);
    assert_eq!(draft.event, "HP");
}

#[test]
fn visitor_lines_show_status_and_stay() {
    let lines = format_visitor_lines(&[visitor("local-0191aaaa-bbbb-cccc", "Asha")]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("local-0191aaaa-b  Asha"));
    assert!(lines[0].contains("In-Building"));
    assert!(lines[0].contains("05/03/2024 to 06/03/2024"));
    assert!(lines[0].ends_with("2250.00"));
}

#[test]
fn truncate_marks_long_values() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long visitor name", 10), "a very ...");
}

#[test]
fn failed_cycles_become_errors() {
    assert!(matches!(
        check_outcome(CycleOutcome::Failed(
            SyncErrorKind::Configuration,
            "Missing sheet id".to_string()
        )),
        Err(CliError::SyncFailed(message)) if message == "Missing sheet id"
    ));
    assert!(matches!(
        check_outcome(CycleOutcome::EmptySnapshot),
        Ok(CycleOutcome::EmptySnapshot)
    ));
}

#[test]
fn parse_mappings_accepts_field_aliases() {
    let patch = parse_mappings(&[
        "name=entry.1".to_string(),
        "aadhar=entry.2".to_string(),
        "no-of-days = entry.3".to_string(),
    ])
    .unwrap()
    .unwrap();

    assert_eq!(patch.name.as_deref(), Some("entry.1"));
    assert_eq!(patch.national_id.as_deref(), Some("entry.2"));
    assert_eq!(patch.stay_days.as_deref(), Some("entry.3"));
    assert!(patch.phone.is_none());
    assert!(parse_mappings(&[]).unwrap().is_none());
}

#[test]
fn parse_mappings_rejects_bad_specs() {
    assert!(parse_mappings(&["name".to_string()]).is_err());
    assert!(parse_mappings(&["name=".to_string()]).is_err());
    assert!(parse_mappings(&["height=entry.9".to_string()]).is_err());
}

#[test]
fn normalize_url_requires_http_scheme() {
    assert_eq!(normalize_url("x", None).unwrap(), None);
    assert_eq!(
        normalize_url("x", Some(" https://script.example.com/exec ".to_string())).unwrap(),
        Some("https://script.example.com/exec".to_string())
    );
    assert_eq!(
        normalize_url("x", Some("  ".to_string())).unwrap(),
        Some(String::new())
    );
    assert!(normalize_url("x", Some("script.example.com".to_string())).is_err());
}

#[test]
fn explicit_data_dir_wins() {
    let dir = PathBuf::from("/tmp/vms-explicit");
    assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
}

#[test]
fn stats_lines_include_event_breakdown() {
    let stats = RegisterStats::from_visitors(&[visitor("local-1", "Asha")]);
    let lines = format_stats_lines(&stats);
    assert_eq!(lines[0], "Footfall:     1");
    assert!(lines.iter().any(|line| line.starts_with("  HP")));
    assert!(lines.iter().any(|line| line.starts_with("  05/03/2024")));
}

#[test]
fn completions_use_binary_name() {
    let mut buffer = Vec::new();
    generate_for_shell(shells::Bash, &mut buffer);
    let script = String::from_utf8(buffer).unwrap();
    assert!(script.contains("vms"));
    assert!(script.contains("checkin"));
}

#[test]
fn config_set_persists_sheet_id_from_url() {
    let dir = tempfile::tempdir().unwrap();

    run_config(
        ConfigCommands::Set {
            sheet: Some("https://docs.google.com/spreadsheets/d/abc_123/edit#gid=0".to_string()),
            form_id: Some("form-9".to_string()),
            apps_script_url: None,
            sheet_base_url: None,
            form_base_url: None,
            mappings: vec!["phone=entry.42".to_string()],
        },
        dir.path(),
    )
    .unwrap();

    let saved = SyncConfig::load_from_path(&config_path(dir.path())).unwrap();
    assert_eq!(saved.sheet_id, "abc_123");
    assert_eq!(saved.form_id, "form-9");
    assert_eq!(saved.mappings.phone, "entry.42");

    run_config(ConfigCommands::Reset, dir.path()).unwrap();
    let reset = SyncConfig::load_from_path(&config_path(dir.path())).unwrap();
    assert_eq!(reset, SyncConfig::default());
}

#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_check_in_stays_local() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(dir.path()).await.unwrap();

    let draft = apply_visitor_args(
        VisitorDraft::default(),
        VisitorArgs {
            name: Some("Asha".to_string()),
            phone: Some("999".to_string()),
            ..VisitorArgs::default()
        },
    );
    let submission = service.check_in(draft, None).await.unwrap();
    let report = submission.push.await.unwrap();

    assert!(report.result.is_err());
    drop(service);

    let reopened = open_service(dir.path()).await.unwrap();
    let visitors = reopened.list().await;
    assert_eq!(visitors.len(), 1);
    assert_eq!(visitors[0].name, "Asha");
}
