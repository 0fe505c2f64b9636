use sqlx::SqlitePool;

use crate::{
    error::{Entity, Error},
    topic::Topic,
};

#[derive(Clone)]
pub struct TopicRepository {
    pool: SqlitePool,
}

impl TopicRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip_all, fields(topic_id = %topic.id))]
    pub async fn create(&self, topic: &Topic) -> Result<(), Error> {
        sqlx::query("INSERT INTO topics (id, created_at) VALUES ($1, $2)")
            .bind(&topic.id)
            .bind(topic.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Topic, &topic.id))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Topic, Error> {
        sqlx::query_as("SELECT * FROM topics WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Topic, id))
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Topic>, Error> {
        let (offset, limit) = super::page(offset, limit);

        Ok(
            sqlx::query_as("SELECT * FROM topics ORDER BY id ASC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Topic, id))?;

        if result.rows_affected() == 0 {
            return Err(Error::topic_not_found(id));
        }

        Ok(())
    }
}
