use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{nullable, GardenOrientation, PropertyState};
use crate::schema::{properties, property_tag_rel};

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub postcode: Option<String>,
    pub date_availability: Option<NaiveDate>,
    pub expected_price: f64,
    pub selling_price: f64,
    pub bedrooms: i32,
    pub living_area: i32,
    pub facades: i32,
    pub garage: bool,
    pub garden: bool,
    pub garden_area: i32,
    pub garden_orientation: Option<GardenOrientation>,
    pub total_area: i32,
    pub active: bool,
    pub state: PropertyState,
    pub property_type_id: Option<i32>,
    pub buyer_id: Option<i32>,
    pub salesperson_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub name: String,
    pub description: Option<String>,
    pub postcode: Option<String>,
    pub date_availability: Option<NaiveDate>,
    pub expected_price: f64,
    pub bedrooms: i32,
    pub living_area: i32,
    pub facades: i32,
    pub garage: bool,
    pub garden: bool,
    pub garden_area: i32,
    pub garden_orientation: Option<GardenOrientation>,
    pub total_area: i32,
    pub active: bool,
    pub property_type_id: Option<i32>,
    pub salesperson_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = property_tag_rel)]
pub struct PropertyTagLink {
    pub property_id: i32,
    pub tag_id: i32,
}

/// Request body for listing a new property.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDraft {
    pub name: String,
    pub expected_price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub date_availability: Option<NaiveDate>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub living_area: i32,
    #[serde(default)]
    pub facades: i32,
    #[serde(default)]
    pub garage: bool,
    #[serde(default)]
    pub garden: bool,
    #[serde(default)]
    pub garden_area: Option<i32>,
    #[serde(default)]
    pub garden_orientation: Option<GardenOrientation>,
    #[serde(default)]
    pub property_type_id: Option<i32>,
    #[serde(default)]
    pub salesperson_id: Option<i32>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

impl PropertyDraft {
    pub fn new(name: impl Into<String>, expected_price: f64) -> Self {
        Self {
            name: name.into(),
            expected_price,
            description: None,
            postcode: None,
            date_availability: None,
            bedrooms: None,
            living_area: 0,
            facades: 0,
            garage: false,
            garden: false,
            garden_area: None,
            garden_orientation: None,
            property_type_id: None,
            salesperson_id: None,
            tag_ids: Vec::new(),
        }
    }
}

/// User-writable fields. State, selling price and buyer only move through
/// the lifecycle actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyChanges {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub postcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_availability: Option<Option<NaiveDate>>,
    pub expected_price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub living_area: Option<i32>,
    pub facades: Option<i32>,
    pub garage: Option<bool>,
    pub garden: Option<bool>,
    pub garden_area: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub garden_orientation: Option<Option<GardenOrientation>>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub property_type_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub salesperson_id: Option<Option<i32>>,
    pub tag_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    pub state: Option<PropertyState>,
    #[serde(default)]
    pub include_archived: bool,
}

/// A property as returned by the API, with its computed fields.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: Property,
    pub best_price: f64,
    pub tag_ids: Vec<i32>,
}
