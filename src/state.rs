use crate::{
    config::RuntimeConfiguration,
    data::{StudentStore, postgres::PgStudentStore},
    error::RollcallResult,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone)]
pub struct RollcallState {
    students: Arc<dyn StudentStore>,
}

impl RollcallState {
    pub async fn new(
        options: PgPoolOptions,
        config: &RuntimeConfiguration,
    ) -> RollcallResult<Self> {
        let store = PgStudentStore::connect(options, &config.db_config()).await?;
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: impl StudentStore + 'static) -> Self {
        Self {
            students: Arc::new(store),
        }
    }

    pub fn students(&self) -> &dyn StudentStore {
        self.students.as_ref()
    }

    pub async fn sensible_shutdown(&self) {
        self.students.close().await;
    }
}
