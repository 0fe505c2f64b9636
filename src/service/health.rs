use sqlx::SqlitePool;

use crate::{
    db::{health::HealthCheck, HealthRepository},
    error::Error,
};

#[derive(Clone)]
pub struct HealthCheckService {
    health: HealthRepository,
}

impl HealthCheckService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            health: HealthRepository::new(pool),
        }
    }

    pub async fn check(&self) -> Result<HealthCheck, Error> {
        self.health.check().await
    }
}
