use std::path::Path;

use vms_core::VisitorDraft;

use crate::cli::VisitorArgs;
use crate::commands::common::{apply_visitor_args, describe_push, open_service, resolve_in_service};
use crate::error::CliError;

pub async fn run_checkin(args: VisitorArgs, data_dir: &Path) -> Result<(), CliError> {
    let draft = apply_visitor_args(VisitorDraft::default(), args);
    if draft.name.is_empty() {
        return Err(CliError::EmptyName);
    }

    let service = open_service(data_dir).await?;
    let submission = service.check_in(draft, None).await?;
    println!("{}", submission.visitor.id);

    let report = submission.push.await?;
    eprintln!("{}", describe_push(&report));
    Ok(())
}

pub async fn run_edit(id: &str, args: VisitorArgs, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let id = resolve_in_service(id, &service).await?;
    let existing = service
        .store()
        .find(&id)
        .await
        .ok_or_else(|| CliError::VisitorNotFound(id.to_string()))?;

    let draft = apply_visitor_args(VisitorDraft::from_visitor(&existing), args);
    if draft.name.is_empty() {
        return Err(CliError::EmptyName);
    }

    let submission = service.check_in(draft, Some(&id)).await?;
    println!("{}", submission.visitor.id);

    let report = submission.push.await?;
    eprintln!("{}", describe_push(&report));
    Ok(())
}
