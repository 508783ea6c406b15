use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{types::Json, Acquire, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    entities::{Bid, Job},
    error::{duplicate_bid_error, job_closed_error, not_found_error, Error},
    store::{BidStore, JobStore},
};

#[derive(Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip_all)]
    pub async fn new(pool: Pool<Postgres>) -> Result<Self, Error> {
        // TODO: move this to migrations
        pool.execute(
            "CREATE TABLE IF NOT EXISTS jobs (id UUID PRIMARY KEY, status VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;
        pool.execute(
            "CREATE TABLE IF NOT EXISTS bids (id UUID PRIMARY KEY, job_id UUID NOT NULL, business_id UUID NOT NULL, amount INT8 NOT NULL, submitted_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL, CONSTRAINT fk_bid_job FOREIGN KEY(job_id) REFERENCES jobs(id), CONSTRAINT uq_bid_job_business UNIQUE(job_id, business_id))",
        )
        .await?;

        Ok(Self { pool })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(e) => e.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl JobStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn get_job(&self, job_id: Uuid) -> Result<Job, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM jobs WHERE id = $1").bind(&job_id))
            .await?;

        let result = maybe_result.ok_or_else(|| not_found_error())?;
        let Json(job) = result.try_get("data")?;

        Ok(job)
    }

    #[tracing::instrument(skip(self, job))]
    async fn create_job(&self, job: &Job) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO jobs (id, status, data) VALUES ($1, $2, $3)")
                .bind(&job.id)
                .bind(&job.status_string())
                .bind(Json(job)),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn conditional_award_update(
        &self,
        job_id: Uuid,
        winning_bid_id: Uuid,
    ) -> Result<(bool, Job), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let maybe_result = tx
            .fetch_optional(
                sqlx::query("SELECT data FROM jobs WHERE id = $1 FOR UPDATE").bind(&job_id),
            )
            .await?;

        let result = maybe_result.ok_or_else(|| not_found_error())?;
        let Json::<Job>(mut job) = result.try_get("data")?;

        // the row lock makes this check-and-set atomic; a concurrent caller
        // blocks on the SELECT above until this transaction commits
        if job.is_awarded() {
            return Ok((false, job));
        }

        job.award(winning_bid_id)?;

        tx.execute(
            sqlx::query("UPDATE jobs SET status = $2, data = $3 WHERE id = $1")
                .bind(&job_id)
                .bind(&job.status_string())
                .bind(Json(&job)),
        )
        .await?;

        tx.commit().await?;

        Ok((true, job))
    }
}

#[async_trait]
impl BidStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_job = conn
            .fetch_optional(sqlx::query("SELECT id FROM jobs WHERE id = $1").bind(&job_id))
            .await?;
        maybe_job.ok_or_else(|| not_found_error())?;

        let mut results =
            conn.fetch(sqlx::query("SELECT data FROM bids WHERE job_id = $1").bind(&job_id));

        let mut bids = Vec::new();
        while let Some(row) = results.try_next().await? {
            let Json(bid) = row.try_get("data")?;
            bids.push(bid);
        }

        Ok(bids)
    }

    #[tracing::instrument(skip(self, bid))]
    async fn create_bid(&self, bid: Bid) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let maybe_result = tx
            .fetch_optional(
                sqlx::query("SELECT data FROM jobs WHERE id = $1 FOR UPDATE").bind(&bid.job_id),
            )
            .await?;

        let result = maybe_result.ok_or_else(|| not_found_error())?;
        let Json::<Job>(mut job) = result.try_get("data")?;

        if !job.accepts_bids() {
            return Err(job_closed_error());
        }

        let inserted = tx
            .execute(
                sqlx::query(
                    "INSERT INTO bids (id, job_id, business_id, amount, submitted_at, data) VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(&bid.id)
                .bind(&bid.job_id)
                .bind(&bid.business_id)
                .bind(&bid.amount)
                .bind(&bid.submitted_at)
                .bind(Json(&bid)),
            )
            .await;

        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(duplicate_bid_error());
            }
            return Err(err.into());
        }

        if job.is_open() {
            job.receive_first_bid()?;

            tx.execute(
                sqlx::query("UPDATE jobs SET status = $2, data = $3 WHERE id = $1")
                    .bind(&bid.job_id)
                    .bind(&job.status_string())
                    .bind(Json(&job)),
            )
            .await?;
        }

        tx.commit().await?;

        Ok(bid)
    }
}
