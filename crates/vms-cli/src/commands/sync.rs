use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::commands::common::{check_outcome, open_service, print_log};
use crate::error::CliError;

pub async fn run_sync(show_log: bool, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let outcome = service.sync_now().await?;

    if show_log {
        print_log(service.log());
    }
    let outcome = check_outcome(outcome)?;
    println!("Sync {outcome}");
    Ok(())
}

/// Run the scheduler until Ctrl-C.
pub async fn run_watch(show_log: bool, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let scheduler = service.scheduler().clone();
    tracing::info!("Watching sheet; press Ctrl-C to stop");

    tokio::select! {
        () = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    if show_log {
        print_log(service.log());
    }
    println!("Stopped");
    Ok(())
}

pub async fn run_import(path: &Path, data_dir: &Path) -> Result<(), CliError> {
    let text = read_import_text(path)?;
    let service = open_service(data_dir).await?;
    let outcome = check_outcome(service.import_csv(&text).await?)?;

    println!("Import {outcome}");
    Ok(())
}

fn read_import_text(path: &Path) -> Result<String, CliError> {
    if path != Path::new("-") {
        return Ok(std::fs::read_to_string(path)?);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::Config(
            "Pipe CSV text into `vms import -`".to_string(),
        ));
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(buffer)
}
