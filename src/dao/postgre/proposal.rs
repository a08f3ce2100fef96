use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::{
    dao::ProposalStore,
    error::Error,
    model::{NewProposal, Proposal, Table},
};

impl Table<Proposal> {
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Proposal>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "Proposal"
        WHERE "id" = $1
        "#;

        let data = sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    pub async fn insert(&self, data: NewProposal) -> Result<Proposal, Error> {
        const SQL: &str = r#"
        INSERT INTO "Proposal" (
            "headline",
            "funds_target",
            "status"
        )
        VALUES ($1, $2, $3)
        RETURNING *
        "#;

        data.validate()?;
        let status: i16 = data.status.into();

        let proposal = sqlx::query_as(SQL)
            .bind(&data.headline)
            .bind(&data.funds_target)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(proposal)
    }

    pub async fn update_donation_address(
        &self,
        id: i64,
        address: &str,
        payment_id: Option<&str>,
    ) -> Result<bool, Error> {
        const SQL: &str = r#"
        UPDATE "Proposal"
        SET
            "addr_donation" = $2,
            "payment_id" = $3
        WHERE "id" = $1 AND "addr_donation" IS NULL
        "#;

        let result = sqlx::query(SQL)
            .bind(id)
            .bind(address)
            .bind(payment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn update_funds_progress(
        &self,
        id: i64,
        progress: &BigDecimal,
    ) -> Result<(), Error> {
        const SQL: &str = r#"
        UPDATE "Proposal"
        SET "funds_progress" = $2
        WHERE "id" = $1
        "#;

        sqlx::query(SQL)
            .bind(id)
            .bind(progress)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProposalStore for Table<Proposal> {
    async fn get(&self, id: i64) -> Result<Option<Proposal>, Error> {
        self.get_by_id(id).await
    }

    async fn create(&self, data: NewProposal) -> Result<Proposal, Error> {
        self.insert(data).await
    }

    async fn set_donation_address(
        &self,
        id: i64,
        address: &str,
        payment_id: Option<&str>,
    ) -> Result<bool, Error> {
        self.update_donation_address(id, address, payment_id).await
    }

    async fn set_funds_progress(
        &self,
        id: i64,
        progress: &BigDecimal,
    ) -> Result<(), Error> {
        self.update_funds_progress(id, progress).await
    }
}
