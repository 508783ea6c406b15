use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{job_closed_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub winning_bid_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    Bidding,
    Awarded,
    Completed,
}

impl Job {
    pub fn new(customer_id: Uuid, title: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            title,
            description,
            status: Status::Open,
            winning_bid_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn status_string(&self) -> String {
        match self.status {
            Status::Open => "OPEN".into(),
            Status::Bidding => "BIDDING".into(),
            Status::Awarded => "AWARDED".into(),
            Status::Completed => "COMPLETED".into(),
        }
    }

    pub fn is_open(&self) -> bool {
        match self.status {
            Status::Open => true,
            _ => false,
        }
    }

    pub fn accepts_bids(&self) -> bool {
        match self.status {
            Status::Open | Status::Bidding => true,
            _ => false,
        }
    }

    pub fn is_awarded(&self) -> bool {
        match self.status {
            Status::Awarded | Status::Completed => true,
            _ => false,
        }
    }

    #[tracing::instrument]
    pub fn receive_first_bid(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Open => {
                self.status = Status::Bidding;
                Ok(())
            }
            Status::Bidding => Ok(()),
            _ => Err(job_closed_error()),
        }
    }

    #[tracing::instrument]
    pub fn award(&mut self, bid_id: Uuid) -> Result<(), Error> {
        match self.status {
            Status::Open | Status::Bidding => {
                self.status = Status::Awarded;
                self.winning_bid_id = Some(bid_id);
                Ok(())
            }
            _ => Err(job_closed_error()),
        }
    }
}
