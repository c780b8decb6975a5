use std::path::Path;

use serde::Serialize;
use vms_core::print_queue::LabelFields;

use crate::cli::QueueCommands;
use crate::commands::common::{open_service, resolve_in_service, short_id};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct LabelItem {
    pub id: String,
    #[serde(flatten)]
    pub label: LabelFields,
}

pub async fn run_queue(command: QueueCommands, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;

    match command {
        QueueCommands::Add { id } => {
            let id = resolve_in_service(&id, &service).await?;
            if service.queue_add(id.clone()).await? {
                println!("Queued {id}");
            } else {
                println!("{id} is already queued");
            }
        }
        QueueCommands::Remove { id } => {
            let id = resolve_in_service(&id, &service).await?;
            if service.queue_remove(&id).await? {
                println!("Removed {id}");
            } else {
                println!("{id} was not queued");
            }
        }
        QueueCommands::Clear => {
            service.queue_clear().await?;
            println!("Print queue cleared");
        }
        QueueCommands::Show { json } => {
            let labels = service.queue_labels().await?;
            if json {
                let items = labels
                    .into_iter()
                    .map(|(id, label)| LabelItem {
                        id: id.to_string(),
                        label,
                    })
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if labels.is_empty() {
                println!("Print queue is empty.");
            } else {
                for (id, label) in &labels {
                    println!(
                        "{:<16}  {}  {}  {}  {}  {}  {}",
                        short_id(id),
                        label.name,
                        label.place,
                        label.masked_national_id,
                        label.phone,
                        label.stay,
                        label.event
                    );
                }
            }
        }
    }

    Ok(())
}
