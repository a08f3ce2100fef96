//! Startup schema setup
//!
//! Each file holds a single idempotent statement and is applied in order on
//! every start.

use tracing::info;

use crate::{dao::PoolType, error::Error};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "proposal.sql",
        include_str!("../migration/postgresql/proposal.sql"),
    ),
    (
        "proposal_addr_donation_index.sql",
        include_str!("../migration/postgresql/proposal_addr_donation_index.sql"),
    ),
];

pub async fn run_migrations(pool: &PoolType) -> Result<(), Error> {
    info!("Running database migrations...");

    for (name, sql) in MIGRATIONS {
        sqlx::query(sql).execute(pool).await?;
        info!("Applied migration: {}", name);
    }

    Ok(())
}
