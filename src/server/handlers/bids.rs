use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::Bid;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    business_id: Uuid,
    amount: i64,
    notes: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Path(job_id): Path<Uuid>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Bid>, Error> {
    let bid = api
        .submit_bid(job_id, params.business_id, params.amount, params.notes)
        .await?;

    Ok(bid.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = api.list_bids(job_id).await?;

    Ok(bids.into())
}
