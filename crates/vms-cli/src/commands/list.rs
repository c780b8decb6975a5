use std::path::Path;

use vms_core::{Visitor, VisitorStatus};

use crate::commands::common::{format_visitor_lines, normalize_search_term, open_service};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    in_building: bool,
    as_json: bool,
    data_dir: &Path,
) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let visitors = service
        .list()
        .await
        .into_iter()
        .filter(|visitor| !in_building || visitor.status == VisitorStatus::In)
        .take(limit)
        .collect::<Vec<_>>();

    print_visitors(&visitors, as_json)
}

pub async fn run_search(term: &str, as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let term = normalize_search_term(term)?;
    let service = open_service(data_dir).await?;
    let visitors = service.search(&term).await;

    if visitors.is_empty() && !as_json {
        println!("No visitors match '{term}'.");
        return Ok(());
    }
    print_visitors(&visitors, as_json)
}

fn print_visitors(visitors: &[Visitor], as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(visitors)?);
    } else {
        for line in format_visitor_lines(visitors) {
            println!("{line}");
        }
    }
    Ok(())
}
