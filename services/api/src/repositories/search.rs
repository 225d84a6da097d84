//! Execution of compiled search plans

use common::error::DatabaseResult;
use sqlx::{FromRow, PgPool, postgres::PgRow};

use crate::search::{SearchPlan, SearchResults};

/// Runs search plans against the pool
#[derive(Clone)]
pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    /// Create a new search repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of rows in the plan's projection, plus the total match count
    pub async fn fetch<T>(&self, plan: &SearchPlan) -> DatabaseResult<SearchResults<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut select = plan.select_query();
        let results = select.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok(SearchResults {
            results,
            count: self.count(plan).await?,
        })
    }

    /// Keys of one page of matches, plus the total match count
    pub async fn fetch_ids(&self, plan: &SearchPlan) -> DatabaseResult<(Vec<i64>, i64)> {
        let mut select = plan.select_query();
        let ids = select
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok((ids, self.count(plan).await?))
    }

    async fn count(&self, plan: &SearchPlan) -> DatabaseResult<i64> {
        let mut count = plan.count_query();
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
