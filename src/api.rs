use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Award, Bid, Job};
use crate::error::Error;

#[async_trait]
pub trait JobAPI {
    async fn find_job(&self, id: Uuid) -> Result<Job, Error>;

    async fn create_job(
        &self,
        customer_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Job, Error>;

    async fn award_job(&self, id: Uuid) -> Result<Award, Error>;
}

#[async_trait]
pub trait BidAPI {
    async fn submit_bid(
        &self,
        job_id: Uuid,
        business_id: Uuid,
        amount: i64,
        notes: Option<String>,
    ) -> Result<Bid, Error>;

    async fn list_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, Error>;
}

pub trait API: JobAPI + BidAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
