//! Best-effort record writes: script endpoint first, form post as fallback.

use std::fmt;

use crate::config::FieldMappings;
use crate::dates::format_display_date;
use crate::models::Visitor;

use super::{RecordWriter, SheetClient, SyncError};

/// Channel that accepted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteChannel {
    AppsScript,
    Form,
}

impl fmt::Display for WriteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AppsScript => "apps script",
            Self::Form => "form",
        })
    }
}

impl RecordWriter for SheetClient {
    async fn submit(&self, visitor: &Visitor) -> Result<WriteChannel, SyncError> {
        let mut last_error = None;

        if let Some(endpoint) = self.config.apps_script_endpoint() {
            tracing::info!("Sending {} to Apps Script", visitor.name);
            match self.post_script(endpoint, visitor).await {
                Ok(()) => return Ok(WriteChannel::AppsScript),
                Err(error) => {
                    tracing::warn!("Apps Script write failed for {}: {error}", visitor.name);
                    last_error = Some(error);
                }
            }
        }

        if let Some(url) = self.config.form_response_url() {
            tracing::info!("Sending {} through form fallback", visitor.name);
            let fields = form_fields(visitor, &self.config.mappings);
            let response = self.http.post(&url).form(&fields).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::Status(status.as_u16()));
            }
            return Ok(WriteChannel::Form);
        }

        Err(last_error.unwrap_or(SyncError::NoWriteChannel))
    }
}

impl SheetClient {
    async fn post_script(&self, endpoint: &str, visitor: &Visitor) -> Result<(), SyncError> {
        // Script endpoints reject preflighted JSON; the JSON body goes as text/plain.
        let response = self
            .http
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .json(visitor)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Form field pairs for a record, keyed by the configured field ids.
#[must_use]
pub fn form_fields(visitor: &Visitor, mappings: &FieldMappings) -> Vec<(String, String)> {
    [
        (&mappings.name, visitor.name.clone()),
        (&mappings.gender, visitor.gender.clone()),
        (&mappings.age, visitor.age.clone()),
        (&mappings.place, visitor.place.clone()),
        (&mappings.national_id, visitor.national_id.clone()),
        (&mappings.group_leader, visitor.group_leader.clone()),
        (&mappings.secondary_id, visitor.secondary_id.clone()),
        (&mappings.from_date, format_display_date(&visitor.from_date)),
        (&mappings.to_date, format_display_date(&visitor.to_date)),
        (&mappings.am_pm, visitor.am_pm.clone()),
        (&mappings.phone, visitor.phone.clone()),
        (&mappings.event, visitor.event.clone()),
        (&mappings.stay_days, visitor.stay_days.to_string()),
        (&mappings.amount, visitor.amount.to_string()),
    ]
    .into_iter()
    .map(|(field, value)| (field.clone(), value))
    .collect()
}
