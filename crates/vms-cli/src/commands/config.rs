use std::path::Path;

use serde::Serialize;
use vms_core::config::{FieldMappingsPatch, SyncConfigPatch};
use vms_core::util::{is_http_url, normalize_text_option};
use vms_core::SyncConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::{config_path, load_config};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    #[serde(flatten)]
    config: &'a SyncConfig,
    spreadsheet_url: Option<String>,
    form_response_url: Option<String>,
}

pub fn run_config(command: ConfigCommands, data_dir: &Path) -> Result<(), CliError> {
    let path = config_path(data_dir);

    match command {
        ConfigCommands::Show => {
            let config = load_config(data_dir)?;
            let view = ConfigView {
                config: &config,
                spreadsheet_url: config.spreadsheet_url(),
                form_response_url: config.form_response_url(),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ConfigCommands::Set {
            sheet,
            form_id,
            apps_script_url,
            sheet_base_url,
            form_base_url,
            mappings,
        } => {
            let patch = SyncConfigPatch {
                sheet_id: sheet,
                form_id,
                apps_script_url: normalize_url("apps script URL", apps_script_url)?,
                sheet_base_url: normalize_url("sheet base URL", sheet_base_url)?,
                form_base_url: normalize_url("form base URL", form_base_url)?,
                mappings: parse_mappings(&mappings)?,
            };
            let config = load_config(data_dir)?.merge(patch);
            config.save_to_path(&path)?;
            println!("Saved {}", path.display());
        }
        ConfigCommands::Reset => {
            SyncConfig::default().save_to_path(&path)?;
            println!("Reset {}", path.display());
        }
    }

    Ok(())
}

/// Validate an optional URL flag. An explicitly blank value clears the field.
pub fn normalize_url(label: &str, value: Option<String>) -> Result<Option<String>, CliError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match normalize_text_option(Some(raw)) {
        None => Ok(Some(String::new())),
        Some(url) if is_http_url(&url) => Ok(Some(url)),
        Some(url) => Err(CliError::Config(format!(
            "Invalid {label} '{url}': expected http:// or https://"
        ))),
    }
}

/// Parse repeated `field=entry.id` overrides into a mapping patch.
pub fn parse_mappings(specs: &[String]) -> Result<Option<FieldMappingsPatch>, CliError> {
    if specs.is_empty() {
        return Ok(None);
    }

    let mut patch = FieldMappingsPatch::default();
    for spec in specs {
        let (field, entry) = spec
            .split_once('=')
            .ok_or_else(|| CliError::Config(format!("Invalid mapping '{spec}': expected FIELD=ENTRY")))?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(CliError::Config(format!("Mapping for '{field}' is empty")));
        }

        let slot = match field.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "name" => &mut patch.name,
            "gender" => &mut patch.gender,
            "age" => &mut patch.age,
            "place" => &mut patch.place,
            "nationalid" | "aadhar" => &mut patch.national_id,
            "groupleader" => &mut patch.group_leader,
            "secondaryid" | "jkpid" => &mut patch.secondary_id,
            "fromdate" => &mut patch.from_date,
            "todate" => &mut patch.to_date,
            "ampm" => &mut patch.am_pm,
            "phone" => &mut patch.phone,
            "event" => &mut patch.event,
            "staydays" | "noofdays" => &mut patch.stay_days,
            "amount" => &mut patch.amount,
            other => {
                return Err(CliError::Config(format!("Unknown mapping field '{other}'")));
            }
        };
        *slot = Some(entry.to_string());
    }

    Ok(Some(patch))
}
