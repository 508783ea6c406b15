use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Bid, Job};

/// The outcome of resolving a job's award: the recorded winner and its
/// price. Returned identically by a fresh award and by idempotent repeats.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Award {
    pub job_id: Uuid,
    pub winning_bid_id: Uuid,
    pub business_id: Uuid,
    pub amount: i64,
}

impl Award {
    pub fn new(job: &Job, winning_bid: &Bid) -> Self {
        Self {
            job_id: job.id,
            winning_bid_id: winning_bid.id,
            business_id: winning_bid.business_id,
            amount: winning_bid.amount,
        }
    }
}
