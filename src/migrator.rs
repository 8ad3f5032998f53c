use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_reservations_table::Migration),
            Box::new(m20250301_000002_create_pos_orders_table::Migration),
            Box::new(m20250301_000003_create_pos_order_items_table::Migration),
            Box::new(m20250301_000004_create_sales_imports_table::Migration),
            Box::new(m20250301_000005_create_dish_predictions_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_reservations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_reservations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::OrgId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reservations::ReservationDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::PartySize).integer().not_null())
                        .col(ColumnDef::new(Reservations::Status).string().not_null())
                        .col(ColumnDef::new(Reservations::GuestName).string().null())
                        .col(
                            ColumnDef::new(Reservations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservations_org_date")
                        .table(Reservations::Table)
                        .col(Reservations::OrgId)
                        .col(Reservations::ReservationDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservations_status")
                        .table(Reservations::Table)
                        .col(Reservations::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reservations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Reservations {
        Table,
        Id,
        OrgId,
        ReservationDate,
        PartySize,
        Status,
        GuestName,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_pos_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_pos_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PosOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PosOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PosOrders::OrgId).uuid().not_null())
                        .col(ColumnDef::new(PosOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(PosOrders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PosOrders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(PosOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pos_orders_org_created")
                        .table(PosOrders::Table)
                        .col(PosOrders::OrgId)
                        .col(PosOrders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pos_orders_status")
                        .table(PosOrders::Table)
                        .col(PosOrders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PosOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PosOrders {
        Table,
        Id,
        OrgId,
        Status,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_pos_order_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_pos_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PosOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PosOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PosOrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(PosOrderItems::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(PosOrderItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PosOrderItems::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PosOrderItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pos_order_items_order_id")
                        .table(PosOrderItems::Table)
                        .col(PosOrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PosOrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PosOrderItems {
        Table,
        Id,
        OrderId,
        ItemName,
        Quantity,
        UnitPrice,
        CreatedAt,
    }
}

mod m20250301_000004_create_sales_imports_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_sales_imports_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesImports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesImports::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesImports::OrgId).uuid().not_null())
                        .col(ColumnDef::new(SalesImports::SaleDate).date().not_null())
                        .col(ColumnDef::new(SalesImports::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(SalesImports::QuantitySold)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesImports::Covers).integer().null())
                        .col(ColumnDef::new(SalesImports::Source).string().null())
                        .col(
                            ColumnDef::new(SalesImports::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_imports_org_date")
                        .table(SalesImports::Table)
                        .col(SalesImports::OrgId)
                        .col(SalesImports::SaleDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesImports::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum SalesImports {
        Table,
        Id,
        OrgId,
        SaleDate,
        ItemName,
        QuantitySold,
        Covers,
        Source,
        CreatedAt,
    }
}

mod m20250301_000005_create_dish_predictions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_dish_predictions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DishPredictions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DishPredictions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DishPredictions::OrgId).uuid().not_null())
                        .col(
                            ColumnDef::new(DishPredictions::ItemName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::AvgQtyPerCover)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::TotalHistoricalQty)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::TotalHistoricalCovers)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::Confidence)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::DayOfWeekWeights)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::DataPoints)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DishPredictions::LastTrainedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // The upsert key: one cached prediction per (org, item)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dish_predictions_org_item")
                        .table(DishPredictions::Table)
                        .col(DishPredictions::OrgId)
                        .col(DishPredictions::ItemName)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DishPredictions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum DishPredictions {
        Table,
        Id,
        OrgId,
        ItemName,
        AvgQtyPerCover,
        TotalHistoricalQty,
        TotalHistoricalCovers,
        Confidence,
        DayOfWeekWeights,
        DataPoints,
        LastTrainedAt,
    }
}
