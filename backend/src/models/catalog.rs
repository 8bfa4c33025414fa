use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{property_tags, property_types};

fn default_sequence() -> i32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = property_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyType {
    pub id: i32,
    pub name: String,
    pub sequence: i32,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[diesel(table_name = property_types)]
pub struct NewPropertyType {
    pub name: String,
    #[serde(default = "default_sequence")]
    pub sequence: i32,
}

impl NewPropertyType {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), sequence: default_sequence() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyTypeDetails {
    #[serde(flatten)]
    pub property_type: PropertyType,
    pub offer_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = property_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyTag {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[diesel(table_name = property_tags)]
pub struct NewPropertyTag {
    pub name: String,
}
