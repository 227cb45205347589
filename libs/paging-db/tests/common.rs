#![allow(dead_code)]
use anyhow::Result;
use chrono::{TimeZone, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set};

pub mod track {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "tracks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub title: String,
        pub plays: i64,
        pub created_at: ChronoDateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

paging_core::sortable!(track::Model {
    "Id" => id,
    "Title" => title,
    "Plays" => plays,
    "CreatedAt" => created_at,
});

pub const ROWS: [(i64, &str, i64); 7] = [
    (1, "Zephyr", 10),
    (2, "Aria", 30),
    (3, "Nocturne", 10),
    (4, "Bolero", 20),
    (5, "Canon", 30),
    (6, "Etude", 10),
    (7, "Fugue", 5),
];

pub fn models() -> Vec<track::Model> {
    ROWS.iter()
        .map(|&(id, title, plays)| track::Model {
            id,
            title: title.to_owned(),
            plays,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp")
                + chrono::Duration::hours(id),
        })
        .collect()
}

/// Single-connection in-memory SQLite; every pooled connection would otherwise
/// see its own empty database.
pub async fn connect_memory() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Ok(Database::connect(opts).await?)
}

pub async fn bring_up_tracks() -> Result<DatabaseConnection> {
    let db = connect_memory().await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(track::Entity)))
        .await?;

    let rows = models().into_iter().map(|m| track::ActiveModel {
        id: Set(m.id),
        title: Set(m.title),
        plays: Set(m.plays),
        created_at: Set(m.created_at),
    });
    track::Entity::insert_many(rows).exec(&db).await?;
    Ok(db)
}
