use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::{Bid, Job},
    error::{duplicate_bid_error, job_closed_error, not_found_error, Error},
    store::{BidStore, JobStore},
};

/// In-memory store with the same contract as `PgStore`. The mutex stands in
/// for the database row lock: the award check-and-set runs under a single
/// guard. Backs the engine tests and local development without Postgres.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<Uuid, Job>,
    bids: HashMap<Uuid, Vec<Bid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_job(&self, job_id: Uuid) -> Result<Job, Error> {
        let inner = self.inner.lock().unwrap();

        inner
            .jobs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| not_found_error())
    }

    async fn create_job(&self, job: &Job) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();

        inner.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn conditional_award_update(
        &self,
        job_id: Uuid,
        winning_bid_id: Uuid,
    ) -> Result<(bool, Job), Error> {
        let mut inner = self.inner.lock().unwrap();

        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| not_found_error())?;

        if job.is_awarded() {
            return Ok((false, job.clone()));
        }

        job.award(winning_bid_id)?;

        Ok((true, job.clone()))
    }
}

#[async_trait]
impl BidStore for MemoryStore {
    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
        let inner = self.inner.lock().unwrap();

        if !inner.jobs.contains_key(&job_id) {
            return Err(not_found_error());
        }

        Ok(inner.bids.get(&job_id).cloned().unwrap_or_default())
    }

    async fn create_bid(&self, bid: Bid) -> Result<Bid, Error> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;

        let job = inner
            .jobs
            .get_mut(&bid.job_id)
            .ok_or_else(|| not_found_error())?;

        if !job.accepts_bids() {
            return Err(job_closed_error());
        }

        let entries = inner.bids.entry(bid.job_id).or_default();
        if entries.iter().any(|b| b.business_id == bid.business_id) {
            return Err(duplicate_bid_error());
        }

        entries.push(bid.clone());

        if job.is_open() {
            job.receive_first_bid()?;
        }

        Ok(bid)
    }
}
