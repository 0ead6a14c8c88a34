use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub address: Option<Json>,
    pub total_orders: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub average_order_value: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub segment: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub language: String,
    pub marketing_consent: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id"
    )]
    Shops,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shops.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
