use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::{Award, Job};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    customer_id: Uuid,
    title: String,
    description: String,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Job>, Error> {
    let job = api
        .create_job(params.customer_id, params.title, params.description)
        .await?;

    Ok(job.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, Error> {
    let job = api.find_job(id).await?;

    Ok(job.into())
}

pub async fn award(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Award>, Error> {
    let award = api.award_job(id).await?;

    Ok(award.into())
}
