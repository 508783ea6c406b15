mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Bid, Job};
use crate::error::Error;

#[async_trait]
pub trait JobStore {
    async fn get_job(&self, job_id: Uuid) -> Result<Job, Error>;

    async fn create_job(&self, job: &Job) -> Result<(), Error>;

    /// Marks the job awarded with `winning_bid_id`, but only if it has not
    /// been awarded yet. Returns whether the update was applied together
    /// with the current record; when another caller got there first the
    /// record carries the winner they fixed. This is the single
    /// serialization point for awarding.
    async fn conditional_award_update(
        &self,
        job_id: Uuid,
        winning_bid_id: Uuid,
    ) -> Result<(bool, Job), Error>;
}

#[async_trait]
pub trait BidStore {
    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error>;

    /// Inserts the bid, rejecting a second bid from the same business and
    /// any bid on an awarded or completed job. The job's first bid moves it
    /// to bidding within the same transaction as the insert.
    async fn create_bid(&self, bid: Bid) -> Result<Bid, Error>;
}
