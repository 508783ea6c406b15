use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::{
    entities::{Bid, Job},
    error::{upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AwardNotice {
    pub job_id: Uuid,
    pub customer_id: Uuid,
    pub business_id: Uuid,
    pub amount: i64,
}

/// Posts an award notice to the platform's notification webhook, which fans
/// it out to the winning business and the customer. Best effort: callers
/// must never let a failure here fail the award itself.
#[tracing::instrument(skip_all, fields(job_id = %job.id))]
pub async fn send_award_notice(job: &Job, winning_bid: &Bid) -> Result<(), Error> {
    let api_base = env::var("NOTIFY_WEBHOOK_BASE")?;
    let url = format!("https://{}/notifications/award", api_base);

    let notice = AwardNotice {
        job_id: job.id,
        customer_id: job.customer_id,
        business_id: winning_bid.business_id,
        amount: winning_bid.amount,
    };

    let res = reqwest::Client::new().post(url).json(&notice).send().await?;

    if res.status().as_u16() != 200 {
        return Err(upstream_error());
    }

    Ok(())
}
