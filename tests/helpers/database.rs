use sqlx::PgPool;

/// Pool for the database named by `DATABASE_URL`, or `None` to skip the test.
pub async fn test_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    Some(
        pgdelta::db::connect_to_database(&url, "test database")
            .await
            .expect("Failed to connect to test database"),
    )
}

/// A uniquely named scratch schema, dropped when the test is done.
pub struct ScratchSchema {
    pub pool: PgPool,
    pub name: String,
}

impl ScratchSchema {
    pub async fn create(pool: PgPool, prefix: &str) -> Self {
        let name = format!("{prefix}_{}", std::process::id());
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{name}\" CASCADE"))
            .execute(&pool)
            .await
            .expect("Failed to clear scratch schema");
        sqlx::query(&format!("CREATE SCHEMA \"{name}\""))
            .execute(&pool)
            .await
            .expect("Failed to create scratch schema");
        Self { pool, name }
    }

    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to run {sql}: {e}"));
    }

    pub async fn drop(self) {
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", self.name))
            .execute(&self.pool)
            .await
            .expect("Failed to drop scratch schema");
        self.pool.close().await;
    }
}
