use sea_orm::entity::prelude::*;

use crate::domain::TaskStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    /// Calendar date only; stored as `YYYY-MM-DD`.
    pub due_date: Option<Date>,

    pub status: TaskStatus,

    /// Owning user, as issued by the credential store.
    pub user_id: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
