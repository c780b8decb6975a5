use std::path::Path;

use crate::commands::common::{open_service, resolve_in_service};
use crate::error::CliError;

pub async fn run_hide(id: &str, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let id = resolve_in_service(id, &service).await?;
    service.hide(&id).await?;

    println!("Hidden visitor {id}");
    Ok(())
}

pub async fn run_checkout(id: &str, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let id = resolve_in_service(id, &service).await?;
    let visitor = service.check_out(&id).await?;

    println!("{} checked out", visitor.name);
    Ok(())
}
