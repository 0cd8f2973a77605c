use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub line1: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    label: &str,
    line1: &str,
    city: &str,
    postal_code: Option<&str>,
    phone: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Model, errors::ModelError> {
    if line1.trim().is_empty() {
        return Err(errors::ModelError::Validation("address line required".into()));
    }
    if city.trim().is_empty() {
        return Err(errors::ModelError::Validation("city required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        label: Set(if label.trim().is_empty() { "home".into() } else { label.to_string() }),
        line1: Set(line1.to_string()),
        city: Set(city.to_string()),
        postal_code: Set(postal_code.map(|p| p.to_string())),
        phone: Set(phone.map(|p| p.to_string())),
        latitude: Set(latitude),
        longitude: Set(longitude),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Single-line rendering used to denormalize onto orders at checkout.
pub fn format_single_line(addr: &Model) -> String {
    match addr.postal_code.as_deref() {
        Some(pc) => format!("{}, {} {}", addr.line1, addr.city, pc),
        None => format!("{}, {}", addr.line1, addr.city),
    }
}
