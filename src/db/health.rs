use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheck {
    pub success: bool,
}

#[derive(Clone)]
pub struct HealthRepository {
    pool: SqlitePool,
}

impl HealthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn check(&self) -> Result<HealthCheck, Error> {
        let result: i64 = sqlx::query_scalar("SELECT 1+1")
            .fetch_one(&self.pool)
            .await?;

        Ok(HealthCheck {
            success: result == 2,
        })
    }
}
