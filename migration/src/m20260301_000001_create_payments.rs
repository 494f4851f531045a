//! Migration to create the payments table

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Payments::Id))
                    .col(string(Payments::ContractId))
                    .col(decimal(Payments::Amount))
                    .col(string_len(Payments::Status, 16))
                    .col(string_null(Payments::PaymentMethod))
                    .col(string_null(Payments::TransactionId))
                    .col(
                        timestamp_with_time_zone(Payments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Payments::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup by contract
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_contract_id")
                    .table(Payments::Table)
                    .col(Payments::ContractId)
                    .to_owned(),
            )
            .await?;

        // Listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_created_at")
                    .table(Payments::Table)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ContractId,
    Amount,
    Status,
    PaymentMethod,
    TransactionId,
    CreatedAt,
    UpdatedAt,
}
