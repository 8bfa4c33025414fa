use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{partners, users};

/// A contact who can place offers and become a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = partners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Partner {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[diesel(table_name = partners)]
pub struct NewPartner {
    pub name: String,
}

/// Agency user acting as salesperson on properties.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub login: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub login: String,
    pub name: String,
}
