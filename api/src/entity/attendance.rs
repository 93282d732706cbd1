use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub status: String,
    pub work_hours: f64,
    pub sales_amount: f64,
    pub check_in: Option<Time>,
    pub check_out: Option<Time>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub marked_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
