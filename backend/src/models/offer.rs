use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{OfferStatus, Property};
use crate::schema::offers;

#[derive(
    Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable, Associations, AsChangeset,
)]
#[diesel(table_name = offers)]
#[diesel(belongs_to(Property))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Offer {
    pub id: i32,
    pub price: f64,
    pub status: OfferStatus,
    pub partner_id: i32,
    pub property_id: i32,
    pub validity: i32,
    pub date_deadline: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = offers)]
pub struct NewOffer {
    pub price: f64,
    pub partner_id: i32,
    pub property_id: i32,
    pub validity: i32,
    pub date_deadline: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Request body for `createOffer`. When both `validity` and `date_deadline`
/// are given, the deadline wins.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferDraft {
    pub property_id: i32,
    pub price: f64,
    pub partner_id: i32,
    #[serde(default)]
    pub validity: Option<i32>,
    #[serde(default)]
    pub date_deadline: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferChanges {
    pub price: Option<f64>,
    pub validity: Option<i32>,
    pub date_deadline: Option<NaiveDateTime>,
}
