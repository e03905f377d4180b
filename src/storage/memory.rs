use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{JobRecord, Storage};
use crate::error::{Error, Result};
use crate::types::{JobId, SearchId};
use crate::value::Value;

/// In-process job storage (the default).
///
/// Records live in nested ordered maps behind a single read-write lock, so
/// id counters and data always move together. Nothing survives the
/// process; this backend exists to give every evaluator a uniform storage
/// interface when no persistent backend is configured.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    search_counter: u64,
    searches: BTreeMap<u64, SearchEntry>,
}

#[derive(Default)]
struct SearchEntry {
    job_counter: u64,
    jobs: BTreeMap<u64, JobRecord>,
}

impl MemoryInner {
    fn search_mut(&mut self, search_id: SearchId) -> Result<&mut SearchEntry> {
        self.searches
            .get_mut(&search_id.value())
            .ok_or(Error::UnknownSearch(search_id))
    }

    fn record_mut(&mut self, job_id: JobId) -> Result<&mut JobRecord> {
        self.search_mut(job_id.search_id())?
            .jobs
            .get_mut(&job_id.partial_id())
            .ok_or(Error::UnknownJob(job_id))
    }
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn create_new_search(&self) -> SearchId {
        let mut inner = self.inner.write();
        let id = inner.search_counter;
        inner.search_counter += 1;
        inner.searches.insert(id, SearchEntry::default());
        SearchId::new(id)
    }

    fn create_new_job(&self, search_id: SearchId) -> Result<JobId> {
        let mut inner = self.inner.write();
        let entry = inner.search_mut(search_id)?;
        let partial = entry.job_counter;
        entry.job_counter += 1;
        entry.jobs.insert(partial, JobRecord::default());
        Ok(JobId::new(search_id, partial))
    }

    fn store_job(&self, job_id: JobId, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.write();
        let record = inner.record_mut(job_id)?;
        match key {
            "in" => record.input = Some(value),
            "out" => record.output = Some(value),
            "metadata" => match value {
                Value::Map(map) => record.metadata = map,
                _ => return Err(Error::InvalidMetadata),
            },
            _ => {
                record.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    fn store_job_metadata(&self, job_id: JobId, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.write();
        let record = inner.record_mut(job_id)?;
        record.metadata.insert(key.to_string(), value);
        Ok(())
    }

    fn load_all_search_ids(&self) -> Vec<SearchId> {
        self.inner
            .read()
            .searches
            .keys()
            .map(|&id| SearchId::new(id))
            .collect()
    }

    fn load_all_job_ids(&self, search_id: SearchId) -> Result<Vec<JobId>> {
        let inner = self.inner.read();
        let entry = inner
            .searches
            .get(&search_id.value())
            .ok_or(Error::UnknownSearch(search_id))?;
        Ok(entry
            .jobs
            .keys()
            .map(|&partial| JobId::new(search_id, partial))
            .collect())
    }

    fn load_search(&self, search_id: SearchId) -> Result<BTreeMap<u64, JobRecord>> {
        let inner = self.inner.read();
        let entry = inner
            .searches
            .get(&search_id.value())
            .ok_or(Error::UnknownSearch(search_id))?;
        Ok(entry.jobs.clone())
    }

    fn load_job(&self, job_id: JobId) -> Result<JobRecord> {
        let inner = self.inner.read();
        inner
            .searches
            .get(&job_id.search_id().value())
            .ok_or(Error::UnknownSearch(job_id.search_id()))?
            .jobs
            .get(&job_id.partial_id())
            .cloned()
            .ok_or(Error::UnknownJob(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ids_increment_from_zero() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.create_new_search(), SearchId::new(0));
        assert_eq!(storage.create_new_search(), SearchId::new(1));
    }

    #[test]
    fn job_counters_are_per_search() {
        let storage = MemoryStorage::new();
        let first = storage.create_new_search();
        let second = storage.create_new_search();

        assert_eq!(storage.create_new_job(first).unwrap().to_string(), "0.0");
        assert_eq!(storage.create_new_job(first).unwrap().to_string(), "0.1");
        assert_eq!(storage.create_new_job(second).unwrap().to_string(), "1.0");
    }

    #[test]
    fn record_slots_exist_immediately() {
        let storage = MemoryStorage::new();
        let search_id = storage.create_new_search();
        let job_id = storage.create_new_job(search_id).unwrap();

        let record = storage.load_job(job_id).unwrap();
        assert_eq!(record, JobRecord::default());
    }

    #[test]
    fn unknown_ids_surface_lookup_errors() {
        let storage = MemoryStorage::new();
        let search_id = storage.create_new_search();

        let missing_search = SearchId::new(42);
        assert!(matches!(
            storage.create_new_job(missing_search),
            Err(Error::UnknownSearch(_))
        ));

        let missing_job = JobId::new(search_id, 7);
        assert!(matches!(
            storage.load_job(missing_job),
            Err(Error::UnknownJob(_))
        ));
        assert!(matches!(
            storage.store_job_out(missing_job, Value::Int(1)),
            Err(Error::UnknownJob(_))
        ));
    }

    #[test]
    fn metadata_slot_rejects_non_map() {
        let storage = MemoryStorage::new();
        let search_id = storage.create_new_search();
        let job_id = storage.create_new_job(search_id).unwrap();

        assert!(matches!(
            storage.store_job(job_id, "metadata", Value::Int(1)),
            Err(Error::InvalidMetadata)
        ));
    }
}
