use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Adds the UUID primary key column, with a server-side default on Postgres.
fn uuid_pk(table: &mut TableCreateStatement, column: impl IntoIden, backend: sea_orm::DatabaseBackend) {
    match backend {
        sea_orm::DatabaseBackend::Postgres => {
            table.col(
                ColumnDef::new(column)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("uuid_generate_v4()")),
            );
        }
        _ => {
            table.col(ColumnDef::new(column).uuid().not_null().primary_key());
        }
    }
}

fn timestamps(table: &mut TableCreateStatement, created: impl IntoIden, updated: impl IntoIden) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        if backend == sea_orm::DatabaseBackend::Postgres {
            manager
                .get_connection()
                .execute_unprepared("CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";")
                .await?;
        }

        // Users table. Roles are stored as short strings rather than a native
        // enum so the same schema runs on SQLite in tests.
        let mut users_table = Table::create()
            .table(Users::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Users::Username)
                    .string_len(150)
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(Users::Email)
                    .string_len(254)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Users::FirstName).string_len(150).not_null().default(""))
            .col(ColumnDef::new(Users::LastName).string_len(150).not_null().default(""))
            .col(
                ColumnDef::new(Users::Role)
                    .string_len(20)
                    .not_null()
                    .default("enumerator"),
            )
            .to_owned();
        uuid_pk(&mut users_table, Users::Id, backend);
        timestamps(&mut users_table, Users::CreatedAt, Users::UpdatedAt);
        manager.create_table(users_table).await?;

        // Survey routes, each assigned to one enumerator. Deleting the user
        // deletes the routes (intentional cascade).
        let mut routes_table = Table::create()
            .table(Routes::Table)
            .if_not_exists()
            .col(ColumnDef::new(Routes::Name).string_len(255).not_null())
            .col(ColumnDef::new(Routes::AssignedTo).uuid().not_null())
            .col(ColumnDef::new(Routes::DateAssigned).date().not_null())
            .col(
                ColumnDef::new(Routes::Status)
                    .string_len(20)
                    .not_null()
                    .default("pending"),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_routes_assigned_to")
                    .from(Routes::Table, Routes::AssignedTo)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut routes_table, Routes::Id, backend);
        timestamps(&mut routes_table, Routes::CreatedAt, Routes::UpdatedAt);
        manager.create_table(routes_table).await?;

        let mut farms_table = Table::create()
            .table(Farms::Table)
            .if_not_exists()
            .col(ColumnDef::new(Farms::RouteId).uuid().not_null())
            .col(ColumnDef::new(Farms::Name).string_len(255).not_null())
            .col(ColumnDef::new(Farms::OwnerName).string_len(255).not_null())
            .col(
                ColumnDef::new(Farms::SizeHa)
                    .decimal_len(10, 2)
                    .not_null(),
            )
            .col(ColumnDef::new(Farms::Location).text())
            .col(ColumnDef::new(Farms::Address).string_len(500))
            .col(ColumnDef::new(Farms::Latitude).decimal_len(10, 7))
            .col(ColumnDef::new(Farms::Longitude).decimal_len(10, 7))
            .col(ColumnDef::new(Farms::BoundaryGeo).json())
            .col(ColumnDef::new(Farms::Photo).string_len(500))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_farms_route")
                    .from(Farms::Table, Farms::RouteId)
                    .to(Routes::Table, Routes::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut farms_table, Farms::Id, backend);
        timestamps(&mut farms_table, Farms::CreatedAt, Farms::UpdatedAt);
        manager.create_table(farms_table).await?;

        let mut crops_table = Table::create()
            .table(Crops::Table)
            .if_not_exists()
            .col(ColumnDef::new(Crops::FarmId).uuid().not_null())
            .col(ColumnDef::new(Crops::CropType).string_len(100).not_null())
            .col(ColumnDef::new(Crops::Variety).string_len(100))
            .col(ColumnDef::new(Crops::PlantingDate).date().not_null())
            .col(ColumnDef::new(Crops::ExpectedHarvest).date())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_crops_farm")
                    .from(Crops::Table, Crops::FarmId)
                    .to(Farms::Table, Farms::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut crops_table, Crops::Id, backend);
        timestamps(&mut crops_table, Crops::CreatedAt, Crops::UpdatedAt);
        manager.create_table(crops_table).await?;

        let mut soil_table = Table::create()
            .table(SoilSamples::Table)
            .if_not_exists()
            .col(ColumnDef::new(SoilSamples::FarmId).uuid().not_null())
            .col(ColumnDef::new(SoilSamples::SampleDate).date().not_null())
            .col(ColumnDef::new(SoilSamples::Ph).decimal_len(4, 2).not_null())
            .col(ColumnDef::new(SoilSamples::MoisturePct).decimal_len(5, 2))
            .col(ColumnDef::new(SoilSamples::NutrientN).decimal_len(6, 2))
            .col(ColumnDef::new(SoilSamples::NutrientP).decimal_len(6, 2))
            .col(ColumnDef::new(SoilSamples::NutrientK).decimal_len(6, 2))
            .col(ColumnDef::new(SoilSamples::Notes).text())
            .col(ColumnDef::new(SoilSamples::Photo).string_len(500))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_soil_samples_farm")
                    .from(SoilSamples::Table, SoilSamples::FarmId)
                    .to(Farms::Table, Farms::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut soil_table, SoilSamples::Id, backend);
        timestamps(&mut soil_table, SoilSamples::CreatedAt, SoilSamples::UpdatedAt);
        manager.create_table(soil_table).await?;

        let mut water_table = Table::create()
            .table(WaterSamples::Table)
            .if_not_exists()
            .col(ColumnDef::new(WaterSamples::FarmId).uuid().not_null())
            .col(ColumnDef::new(WaterSamples::SampleDate).date().not_null())
            .col(ColumnDef::new(WaterSamples::Source).string_len(255).not_null())
            .col(ColumnDef::new(WaterSamples::Ph).decimal_len(4, 2).not_null())
            .col(ColumnDef::new(WaterSamples::Turbidity).decimal_len(7, 2))
            .col(ColumnDef::new(WaterSamples::Notes).text())
            .col(ColumnDef::new(WaterSamples::Photo).string_len(500))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_water_samples_farm")
                    .from(WaterSamples::Table, WaterSamples::FarmId)
                    .to(Farms::Table, Farms::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut water_table, WaterSamples::Id, backend);
        timestamps(&mut water_table, WaterSamples::CreatedAt, WaterSamples::UpdatedAt);
        manager.create_table(water_table).await?;

        let mut pest_table = Table::create()
            .table(PestDiseaseReports::Table)
            .if_not_exists()
            .col(ColumnDef::new(PestDiseaseReports::FarmId).uuid().not_null())
            .col(ColumnDef::new(PestDiseaseReports::ReportDate).date().not_null())
            .col(
                ColumnDef::new(PestDiseaseReports::Category)
                    .string_len(20)
                    .not_null()
                    .default("pest"),
            )
            .col(ColumnDef::new(PestDiseaseReports::Name).string_len(255).not_null())
            .col(
                ColumnDef::new(PestDiseaseReports::Severity)
                    .string_len(20)
                    .not_null()
                    .default("medium"),
            )
            .col(ColumnDef::new(PestDiseaseReports::Description).text())
            .col(ColumnDef::new(PestDiseaseReports::LocationLat).decimal_len(9, 6))
            .col(ColumnDef::new(PestDiseaseReports::LocationLng).decimal_len(9, 6))
            .col(ColumnDef::new(PestDiseaseReports::Photo).string_len(500))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_pest_disease_reports_farm")
                    .from(PestDiseaseReports::Table, PestDiseaseReports::FarmId)
                    .to(Farms::Table, Farms::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned();
        uuid_pk(&mut pest_table, PestDiseaseReports::Id, backend);
        timestamps(
            &mut pest_table,
            PestDiseaseReports::CreatedAt,
            PestDiseaseReports::UpdatedAt,
        );
        manager.create_table(pest_table).await?;

        // Indexes on the foreign keys the scope resolver and aggregator join on.
        manager
            .create_index(
                Index::create()
                    .name("idx_routes_assigned_to")
                    .table(Routes::Table)
                    .col(Routes::AssignedTo)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_farms_route_id")
                    .table(Farms::Table)
                    .col(Farms::RouteId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_crops_farm_id")
                    .table(Crops::Table)
                    .col(Crops::FarmId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_soil_samples_farm_id")
                    .table(SoilSamples::Table)
                    .col(SoilSamples::FarmId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_water_samples_farm_id")
                    .table(WaterSamples::Table)
                    .col(WaterSamples::FarmId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_pest_disease_reports_farm_id")
                    .table(PestDiseaseReports::Table)
                    .col(PestDiseaseReports::FarmId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PestDiseaseReports::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WaterSamples::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SoilSamples::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Crops::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Farms::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Routes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Routes {
    Table,
    Id,
    Name,
    AssignedTo,
    DateAssigned,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Farms {
    Table,
    Id,
    RouteId,
    Name,
    OwnerName,
    SizeHa,
    Location,
    Address,
    Latitude,
    Longitude,
    BoundaryGeo,
    Photo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Crops {
    Table,
    Id,
    FarmId,
    CropType,
    Variety,
    PlantingDate,
    ExpectedHarvest,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SoilSamples {
    Table,
    Id,
    FarmId,
    SampleDate,
    Ph,
    MoisturePct,
    NutrientN,
    NutrientP,
    NutrientK,
    Notes,
    Photo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WaterSamples {
    Table,
    Id,
    FarmId,
    SampleDate,
    Source,
    Ph,
    Turbidity,
    Notes,
    Photo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PestDiseaseReports {
    Table,
    Id,
    FarmId,
    ReportDate,
    Category,
    Name,
    Severity,
    Description,
    LocationLat,
    LocationLng,
    Photo,
    CreatedAt,
    UpdatedAt,
}
