use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business's priced offer on a job. Amounts are integer cents so that
/// mean and distance arithmetic stays exact. Bids are immutable once
/// submitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub job_id: Uuid,
    pub business_id: Uuid,
    pub amount: i64,
    pub notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Bid {
    pub fn new(job_id: Uuid, business_id: Uuid, amount: i64, notes: Option<String>) -> Self {
        Bid {
            id: Uuid::new_v4(),
            job_id,
            business_id,
            amount,
            notes,
            submitted_at: Utc::now(),
        }
    }
}
