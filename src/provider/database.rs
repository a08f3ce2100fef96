use std::sync::Arc;

use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{Proposal, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub proposal: Arc<Table<Proposal>>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(config.database_max_connections)
            .connect(config.database_url.as_str())
            .await?;

        Ok(DatabasePool {
            proposal: Arc::new(Table::new(pool.clone())),
            pool,
        })
    }
}
