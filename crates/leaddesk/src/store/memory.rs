use crate::{
    Counter, CounterStore, Lead, LeadId, LeadStore, LeadUpdate, NewLead, Page, PageQuery,
    SortOrder, StoreError, StoreResult, UpdateOutcome,
};
use chrono::Utc;
use core::future::Future;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Debug, Default)]
struct Collections {
    counters: BTreeMap<String, Counter>,
    leads: BTreeMap<LeadId, Lead>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    counters: Vec<&'a Counter>,
    leads: Vec<&'a Lead>,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    counters: Vec<Counter>,
    #[serde(default)]
    leads: Vec<Lead>,
}

/// A document store kept in process memory.
///
/// Both collections live behind one async read/write lock. Every mutating
/// trait method holds the write lock for its whole duration, which makes each
/// operation atomic with respect to the others. In particular
/// [`CounterStore::increment`] cannot hand the same value to two callers.
///
/// A store created with [`MemoryStore::open`] also keeps a JSON snapshot on
/// disk. The snapshot is rewritten after every mutation while the write lock
/// is still held: the bytes go to a temp file that is synced to disk and then
/// renamed over the snapshot. All file I/O goes through `tokio::fs`, so it
/// happens when the returned future is polled and never blocks a runtime
/// worker. If the write fails, the in-memory change is undone and the
/// operation fails, except for counter increments: an increment that could
/// not be persisted is kept in memory and reported as a failure, leaving a gap
/// in the sequence rather than risking a reissue.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store with no snapshot file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by the snapshot at `path`, loading it if the file
    /// exists.
    ///
    /// # Errors
    /// - [`StoreError::Io`] if the file exists but cannot be read.
    /// - [`StoreError::Snapshot`] if its contents are not a valid snapshot.
    /// - [`StoreError::DuplicateKey`] if the snapshot repeats a counter name
    ///   or lead ID.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let collections = if fs::try_exists(&path).await? {
            let bytes = fs::read(&path).await?;
            Self::load(serde_json::from_slice(&bytes)?)?
        } else {
            Collections::default()
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            counters = collections.counters.len(),
            leads = collections.leads.len(),
            "opened snapshot store"
        );

        Ok(Self {
            state: RwLock::new(collections),
            snapshot: Some(path),
        })
    }

    /// The snapshot file, if the store persists one.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    fn load(snapshot: Snapshot) -> StoreResult<Collections> {
        let mut collections = Collections::default();
        for counter in snapshot.counters {
            let name = counter.name.clone();
            if collections.counters.insert(name.clone(), counter).is_some() {
                return Err(StoreError::DuplicateKey {
                    collection: "counter",
                    key: name,
                });
            }
        }
        for lead in snapshot.leads {
            let id = lead.id;
            if collections.leads.insert(id, lead).is_some() {
                return Err(StoreError::DuplicateKey {
                    collection: "lead",
                    key: id.to_string(),
                });
            }
        }
        Ok(collections)
    }

    async fn persist(&self, collections: &Collections) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let snapshot = SnapshotRef {
            counters: collections.counters.values().collect(),
            leads: collections.leads.values().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(".tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    async fn increment_now(&self, name: &str) -> StoreResult<Counter> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let counter = state
            .counters
            .entry(name.to_owned())
            .or_insert_with(|| Counter::new(name, now));
        if counter.advance(now).is_none() {
            return Err(StoreError::SequenceExhausted {
                name: name.to_owned(),
            });
        }
        let counter = counter.clone();

        self.persist(&state).await?;
        Ok(counter)
    }

    async fn insert_now(&self, new: NewLead) -> StoreResult<Lead> {
        let mut state = self.state.write().await;
        if state.leads.contains_key(&new.id) {
            return Err(StoreError::DuplicateKey {
                collection: "lead",
                key: new.id.to_string(),
            });
        }

        let lead = Lead::from_new(new, Utc::now());
        state.leads.insert(lead.id, lead.clone());

        if let Err(err) = self.persist(&state).await {
            state.leads.remove(&lead.id);
            return Err(err);
        }
        Ok(lead)
    }

    async fn find_page_now(&self, query: PageQuery) -> Page<Lead> {
        let state = self.state.read().await;

        let mut leads: Vec<&Lead> = state.leads.values().collect();
        leads.sort_by_key(|lead| (lead.created_at, lead.id));
        if query.order == SortOrder::Descending {
            leads.reverse();
        }

        let count = leads.len() as u64;
        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = match query.limit {
            0 => usize::MAX,
            limit => usize::try_from(limit).unwrap_or(usize::MAX),
        };
        let data = leads.into_iter().skip(skip).take(take).cloned().collect();

        Page { count, data }
    }

    async fn update_now(&self, id: LeadId, update: LeadUpdate) -> StoreResult<UpdateOutcome> {
        let mut state = self.state.write().await;
        let Some(lead) = state.leads.get_mut(&id) else {
            return Ok(UpdateOutcome::default());
        };

        if let Some(expected) = update.expected_version {
            if lead.version != expected {
                return Err(StoreError::VersionConflict { id });
            }
        }

        let previous = lead.clone();
        let modified = lead.apply(&update, Utc::now());
        if modified {
            if let Err(err) = self.persist(&state).await {
                state.leads.insert(id, previous);
                return Err(err);
            }
        }

        Ok(UpdateOutcome {
            matched: true,
            modified,
        })
    }

    async fn delete_now(&self, id: LeadId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(removed) = state.leads.remove(&id) else {
            return Ok(false);
        };

        if let Err(err) = self.persist(&state).await {
            state.leads.insert(id, removed);
            return Err(err);
        }
        Ok(true)
    }
}

impl CounterStore for MemoryStore {
    fn increment(&self, name: &str) -> impl Future<Output = StoreResult<Counter>> + Send {
        self.increment_now(name)
    }
}

impl LeadStore for MemoryStore {
    fn insert(&self, lead: NewLead) -> impl Future<Output = StoreResult<Lead>> + Send {
        self.insert_now(lead)
    }

    async fn find_by_id(&self, id: LeadId) -> StoreResult<Option<Lead>> {
        Ok(self.state.read().await.leads.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Lead>> {
        Ok(self.state.read().await.leads.values().cloned().collect())
    }

    async fn find_page(&self, query: PageQuery) -> StoreResult<Page<Lead>> {
        Ok(self.find_page_now(query).await)
    }

    fn update_by_id(
        &self,
        id: LeadId,
        update: LeadUpdate,
    ) -> impl Future<Output = StoreResult<UpdateOutcome>> + Send {
        self.update_now(id, update)
    }

    fn delete_by_id(&self, id: LeadId) -> impl Future<Output = StoreResult<bool>> + Send {
        self.delete_now(id)
    }
}
