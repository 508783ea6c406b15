pub mod award;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::{BidAPI, JobAPI, API},
    entities::{Award, Bid, Job},
    error::{invalid_input_error, no_bids_error, unexpected_error, Error},
    external::notifier,
    store::{BidStore, JobStore},
};

use self::award::select_winner;

#[derive(Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

/// Resolves the award already recorded on a job from its (immutable) bid
/// set. Used both for idempotent repeats and for callers that lose the
/// award race.
fn recorded_award(job: &Job, bids: &[Bid]) -> Result<Award, Error> {
    let recorded = job.winning_bid_id.ok_or_else(|| unexpected_error())?;
    let bid = bids
        .iter()
        .find(|b| b.id == recorded)
        .ok_or_else(|| unexpected_error())?;

    Ok(Award::new(job, bid))
}

#[async_trait]
impl<S> JobAPI for Engine<S>
where
    S: JobStore + BidStore + Send + Sync,
{
    #[tracing::instrument(skip(self))]
    async fn find_job(&self, id: Uuid) -> Result<Job, Error> {
        self.store.get_job(id).await
    }

    #[tracing::instrument(skip(self, title, description))]
    async fn create_job(
        &self,
        customer_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Job, Error> {
        let job = Job::new(customer_id, title, description);
        self.store.create_job(&job).await?;

        Ok(job)
    }

    #[tracing::instrument(skip(self))]
    async fn award_job(&self, id: Uuid) -> Result<Award, Error> {
        let job = self.store.get_job(id).await?;

        if job.is_awarded() {
            // duplicate submission or retried request: report the recorded
            // winner, touch nothing
            let bids = self.store.list_bids_for_job(id).await?;
            return recorded_award(&job, &bids);
        }

        let bids = self.store.list_bids_for_job(id).await?;
        if bids.is_empty() {
            return Err(no_bids_error());
        }

        let winner = match select_winner(&bids) {
            Some(bid) => bid.clone(),
            None => return Err(no_bids_error()),
        };

        let (applied, current) = self.store.conditional_award_update(id, winner.id).await?;

        if !applied {
            // lost the race; the rival's winner may have been submitted
            // after our listing, so resolve it from a fresh one. The bid
            // set is fixed once the job is awarded, so the fresh listing
            // always carries the winner.
            let bids = self.store.list_bids_for_job(id).await?;
            return recorded_award(&current, &bids);
        }

        tracing::info!(job_id = %id, winning_bid_id = %winner.id, amount = winner.amount, "job awarded");

        // fire and forget; a failed notification must never fail the award
        let notice_job = current.clone();
        let notice_bid = winner.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier::send_award_notice(&notice_job, &notice_bid).await {
                tracing::warn!(job_id = %notice_job.id, "award notification failed: {:?}", err);
            }
        });

        Ok(Award::new(&current, &winner))
    }
}

#[async_trait]
impl<S> BidAPI for Engine<S>
where
    S: JobStore + BidStore + Send + Sync,
{
    #[tracing::instrument(skip(self, notes))]
    async fn submit_bid(
        &self,
        job_id: Uuid,
        business_id: Uuid,
        amount: i64,
        notes: Option<String>,
    ) -> Result<Bid, Error> {
        if amount <= 0 {
            return Err(invalid_input_error());
        }

        let bid = Bid::new(job_id, business_id, amount, notes);
        self.store.create_bid(bid).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
        self.store.list_bids_for_job(job_id).await
    }
}

impl<S> API for Engine<S> where S: JobStore + BidStore + Send + Sync {}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};
    use tokio_test::block_on;

    use super::*;
    use crate::entities::job::Status;
    use crate::error::Kind;
    use crate::store::MemoryStore;

    /// `MemoryStore` wrapper that counts applied conditional updates, so
    /// tests can assert that awarding mutates the job exactly once.
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        applied: AtomicUsize,
    }

    #[async_trait]
    impl JobStore for CountingStore {
        async fn get_job(&self, job_id: Uuid) -> Result<Job, Error> {
            self.inner.get_job(job_id).await
        }

        async fn create_job(&self, job: &Job) -> Result<(), Error> {
            self.inner.create_job(job).await
        }

        async fn conditional_award_update(
            &self,
            job_id: Uuid,
            winning_bid_id: Uuid,
        ) -> Result<(bool, Job), Error> {
            let (applied, job) = self
                .inner
                .conditional_award_update(job_id, winning_bid_id)
                .await?;

            if applied {
                self.applied.fetch_add(1, Ordering::SeqCst);
            }

            Ok((applied, job))
        }
    }

    #[async_trait]
    impl BidStore for CountingStore {
        async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
            self.inner.list_bids_for_job(job_id).await
        }

        async fn create_bid(&self, bid: Bid) -> Result<Bid, Error> {
            self.inner.create_bid(bid).await
        }
    }

    /// `MemoryStore` wrapper that lets a rival bid land and win right
    /// before the caller's own award attempt reaches the store.
    #[derive(Debug, Default)]
    struct ContendedStore {
        inner: MemoryStore,
        pending: Mutex<Option<Bid>>,
    }

    #[async_trait]
    impl JobStore for ContendedStore {
        async fn get_job(&self, job_id: Uuid) -> Result<Job, Error> {
            self.inner.get_job(job_id).await
        }

        async fn create_job(&self, job: &Job) -> Result<(), Error> {
            self.inner.create_job(job).await
        }

        async fn conditional_award_update(
            &self,
            job_id: Uuid,
            winning_bid_id: Uuid,
        ) -> Result<(bool, Job), Error> {
            let rival = self.pending.lock().unwrap().take();
            if let Some(bid) = rival {
                let bid = self.inner.create_bid(bid).await?;
                self.inner.conditional_award_update(job_id, bid.id).await?;
            }

            self.inner
                .conditional_award_update(job_id, winning_bid_id)
                .await
        }
    }

    #[async_trait]
    impl BidStore for ContendedStore {
        async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
            self.inner.list_bids_for_job(job_id).await
        }

        async fn create_bid(&self, bid: Bid) -> Result<Bid, Error> {
            self.inner.create_bid(bid).await
        }
    }

    async fn seed_job<S>(engine: &Engine<S>, amounts: &[i64]) -> Job
    where
        S: JobStore + BidStore + Send + Sync,
    {
        let job = engine
            .create_job(Uuid::new_v4(), "staircase repair".into(), "".into())
            .await
            .unwrap();

        for &amount in amounts {
            engine
                .submit_bid(job.id, Uuid::new_v4(), amount, None)
                .await
                .unwrap();
        }

        job
    }

    #[test]
    fn awards_bid_closest_to_mean() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[100_00, 200_00, 300_00]).await;

            let award = engine.award_job(job.id).await.unwrap();
            assert_eq!(award.amount, 200_00);

            let job = engine.find_job(job.id).await.unwrap();
            assert_eq!(job.status, Status::Awarded);
            assert_eq!(job.winning_bid_id, Some(award.winning_bid_id));
        });
    }

    #[test]
    fn repeated_awards_return_recorded_winner_without_mutation() {
        block_on(async {
            let engine = Engine::new(CountingStore::default());
            let job = seed_job(&engine, &[100_00, 180_00, 320_00]).await;

            let first = engine.award_job(job.id).await.unwrap();
            let second = engine.award_job(job.id).await.unwrap();

            assert_eq!(first.winning_bid_id, second.winning_bid_id);
            assert_eq!(first.business_id, second.business_id);
            assert_eq!(first.amount, second.amount);
            assert_eq!(engine.store.applied.load(Ordering::SeqCst), 1);
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_awards_agree_on_one_winner() {
        let engine = Arc::new(Engine::new(CountingStore::default()));
        let job = seed_job(&engine, &[110_00, 145_00, 199_99, 240_00, 305_50]).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let job_id = job.id;
            handles.push(tokio::spawn(
                async move { engine.award_job(job_id).await },
            ));
        }

        let mut winners = Vec::new();
        for handle in handles {
            winners.push(handle.await.unwrap().unwrap().winning_bid_id);
        }

        winners.dedup();
        assert_eq!(winners.len(), 1);
        assert_eq!(engine.store.applied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn losing_the_award_race_reports_the_recorded_winner() {
        block_on(async {
            let engine = Engine::new(ContendedStore::default());
            let job = seed_job(&engine, &[100_00, 300_00]).await;

            // a late bid lands and wins between this caller's listing and
            // its award attempt; the caller must report that winner, not
            // fail on its stale listing
            let rival = Bid::new(job.id, Uuid::new_v4(), 200_00, None);
            let rival_id = rival.id;
            *engine.store.pending.lock().unwrap() = Some(rival);

            let award = engine.award_job(job.id).await.unwrap();
            assert_eq!(award.winning_bid_id, rival_id);
            assert_eq!(award.amount, 200_00);

            let job = engine.find_job(job.id).await.unwrap();
            assert_eq!(job.winning_bid_id, Some(rival_id));
        });
    }

    #[test]
    fn awarding_without_bids_is_rejected() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[]).await;

            let err = engine.award_job(job.id).await.unwrap_err();
            assert_eq!(err.kind, Kind::NoBids);
        });
    }

    #[test]
    fn awarding_missing_job_is_rejected() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());

            let err = engine.award_job(Uuid::new_v4()).await.unwrap_err();
            assert_eq!(err.kind, Kind::NotFound);
        });
    }

    #[test]
    fn awarded_job_rejects_further_bids() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[90_00, 120_00]).await;
            engine.award_job(job.id).await.unwrap();

            let err = engine
                .submit_bid(job.id, Uuid::new_v4(), 100_00, None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, Kind::JobClosed);
        });
    }

    #[test]
    fn second_bid_from_same_business_is_rejected() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[]).await;

            let business_id = Uuid::new_v4();
            engine
                .submit_bid(job.id, business_id, 150_00, None)
                .await
                .unwrap();

            let err = engine
                .submit_bid(job.id, business_id, 140_00, None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, Kind::DuplicateBid);
        });
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[]).await;

            let err = engine
                .submit_bid(job.id, Uuid::new_v4(), 0, None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, Kind::InvalidInput);
        });
    }

    #[test]
    fn first_bid_moves_job_to_bidding() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[175_00]).await;

            let job = engine.find_job(job.id).await.unwrap();
            assert_eq!(job.status, Status::Bidding);
        });
    }

    #[test]
    fn equidistant_bids_fall_to_earliest_submission() {
        block_on(async {
            let engine = Engine::new(MemoryStore::new());
            let job = seed_job(&engine, &[]).await;

            // mean is 175.00; both bids sit 75.00 away, the 250.00 bid
            // was submitted first
            let t = Utc::now();
            let mut early = Bid::new(job.id, Uuid::new_v4(), 250_00, None);
            early.submitted_at = t;
            let mut late = Bid::new(job.id, Uuid::new_v4(), 100_00, None);
            late.submitted_at = t + Duration::seconds(5);

            engine.store.create_bid(late).await.unwrap();
            engine.store.create_bid(early.clone()).await.unwrap();

            let award = engine.award_job(job.id).await.unwrap();
            assert_eq!(award.winning_bid_id, early.id);
            assert_eq!(award.amount, 250_00);
        });
    }
}
