//! Keyed JSON blob storage for the local register.

use libsql::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Visitor, VisitorId};
use crate::reconcile::{sort_canonical, DirtyIndex, HiddenIds};
use crate::store::LocalState;
use crate::util::unix_millis_now;

const VISITORS_KEY: &str = "visitors_v2";
const LEGACY_VISITORS_KEY: &str = "visitors_v1";
const HIDDEN_IDS_KEY: &str = "hidden_ids_v2";
const DIRTY_IDS_KEY: &str = "dirty_ids_v2";
const PRINT_QUEUE_KEY: &str = "print_queue";

/// Trait for local state storage operations (async)
#[allow(async_fn_in_trait)]
pub trait StateRepository {
    /// Load records, hidden ids and dirty index
    ///
    /// Each blob decodes independently; a missing or corrupt blob yields its
    /// empty structure.
    async fn load_state(&self) -> Result<LocalState>;

    /// Overwrite all three blobs in one transaction
    async fn replace_all(&self, state: &LocalState) -> Result<()>;

    /// Load the print queue id list
    async fn load_print_queue(&self) -> Result<Vec<VisitorId>>;

    /// Save the print queue id list
    async fn save_print_queue(&self, ids: &[VisitorId]) -> Result<()>;
}

/// libSQL implementation of `StateRepository`
pub struct LibSqlStateRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlStateRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl StateRepository for LibSqlStateRepository<'_> {
    async fn load_state(&self) -> Result<LocalState> {
        let visitors_raw = match self.get_blob(VISITORS_KEY).await? {
            Some(raw) => Some(raw),
            None => {
                let legacy = self.get_blob(LEGACY_VISITORS_KEY).await?;
                if legacy.is_some() {
                    tracing::info!("Loading visitors from legacy records-only storage");
                }
                legacy
            }
        };

        let mut visitors: Vec<Visitor> = decode_or_default(VISITORS_KEY, visitors_raw);
        sort_canonical(&mut visitors);
        let hidden: HiddenIds =
            decode_or_default(HIDDEN_IDS_KEY, self.get_blob(HIDDEN_IDS_KEY).await?);
        let dirty: DirtyIndex =
            decode_or_default(DIRTY_IDS_KEY, self.get_blob(DIRTY_IDS_KEY).await?);

        Ok(LocalState {
            visitors,
            hidden,
            dirty,
        })
    }

    async fn replace_all(&self, state: &LocalState) -> Result<()> {
        let blobs = [
            (VISITORS_KEY, encode(&state.visitors)?),
            (HIDDEN_IDS_KEY, encode(&state.hidden)?),
            (DIRTY_IDS_KEY, encode(&state.dirty)?),
        ];
        let now = unix_millis_now();

        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        for (key, value) in blobs {
            if let Err(e) = self.set_blob(key, value, now).await {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        }
        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn load_print_queue(&self) -> Result<Vec<VisitorId>> {
        Ok(decode_or_default(
            PRINT_QUEUE_KEY,
            self.get_blob(PRINT_QUEUE_KEY).await?,
        ))
    }

    async fn save_print_queue(&self, ids: &[VisitorId]) -> Result<()> {
        self.set_blob(PRINT_QUEUE_KEY, encode(ids)?, unix_millis_now())
            .await
    }
}

impl LibSqlStateRepository<'_> {
    async fn get_blob(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM state_blobs WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set_blob(&self, key: &str, value: String, updated_at: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO state_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)",
                libsql::params![key, value, updated_at],
            )
            .await?;
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode_or_default<T: DeserializeOwned + Default>(key: &str, raw: Option<String>) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!("Discarding corrupt {key} blob: {error}");
        T::default()
    })
}
