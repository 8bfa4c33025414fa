use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::error::{EstateError, EstateResult};
use crate::models::{
    NewProperty, Property, PropertyChanges, PropertyDetails, PropertyDraft, PropertyFilter,
    PropertyState, PropertyTagLink,
};
use crate::rules;
use crate::schema::{offers, properties, property_tag_rel};

pub(crate) fn find_property(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Property> {
    properties::table
        .find(property_id)
        .select(Property::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| EstateError::not_found("property", property_id))
}

/// Current best offer price of one property.
pub fn best_price(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<f64> {
    let prices = offers::table
        .filter(offers::property_id.eq(property_id))
        .select(offers::price)
        .load::<f64>(conn)?;
    Ok(rules::best_price(prices))
}

/// Attaches best price and tags, with one query each for the whole batch.
fn with_details(conn: &mut SqliteConnection, rows: Vec<Property>) -> EstateResult<Vec<PropertyDetails>> {
    let ids: Vec<i32> = rows.iter().map(|p| p.id).collect();

    let mut prices: HashMap<i32, Vec<f64>> = HashMap::new();
    for (property_id, price) in offers::table
        .filter(offers::property_id.eq_any(&ids))
        .select((offers::property_id, offers::price))
        .load::<(i32, f64)>(conn)?
    {
        prices.entry(property_id).or_default().push(price);
    }

    let mut tags: HashMap<i32, Vec<i32>> = HashMap::new();
    for (property_id, tag_id) in property_tag_rel::table
        .filter(property_tag_rel::property_id.eq_any(&ids))
        .select((property_tag_rel::property_id, property_tag_rel::tag_id))
        .order(property_tag_rel::tag_id)
        .load::<(i32, i32)>(conn)?
    {
        tags.entry(property_id).or_default().push(tag_id);
    }

    Ok(rows
        .into_iter()
        .map(|property| PropertyDetails {
            best_price: rules::best_price(prices.remove(&property.id).unwrap_or_default()),
            tag_ids: tags.remove(&property.id).unwrap_or_default(),
            property,
        })
        .collect())
}

fn details(conn: &mut SqliteConnection, property: Property) -> EstateResult<PropertyDetails> {
    let property_id = property.id;
    let mut batch = with_details(conn, vec![property])?;
    batch.pop().ok_or_else(|| EstateError::not_found("property", property_id))
}

fn replace_tags(conn: &mut SqliteConnection, property_id: i32, tag_ids: &[i32]) -> EstateResult<()> {
    let mut tag_ids = tag_ids.to_vec();
    tag_ids.sort_unstable();
    tag_ids.dedup();

    diesel::delete(property_tag_rel::table.filter(property_tag_rel::property_id.eq(property_id)))
        .execute(conn)?;
    let links: Vec<PropertyTagLink> = tag_ids
        .into_iter()
        .map(|tag_id| PropertyTagLink { property_id, tag_id })
        .collect();
    if !links.is_empty() {
        diesel::insert_into(property_tag_rel::table).values(&links).execute(conn)?;
    }
    Ok(())
}

pub fn create_property(conn: &mut SqliteConnection, draft: PropertyDraft) -> EstateResult<PropertyDetails> {
    conn.immediate_transaction(|conn| {
        let (mut garden_area, mut garden_orientation) = (draft.garden_area.unwrap_or(0), draft.garden_orientation);
        if draft.garden {
            let (area, orientation) = rules::garden_defaults(true);
            garden_area = draft.garden_area.unwrap_or(area);
            garden_orientation = draft.garden_orientation.or(orientation);
        }

        let now = Utc::now().naive_utc();
        let new_property = NewProperty {
            name: draft.name,
            description: draft.description,
            postcode: draft.postcode,
            date_availability: Some(
                draft.date_availability.unwrap_or_else(|| rules::default_availability(now.date())),
            ),
            expected_price: draft.expected_price,
            bedrooms: draft.bedrooms.unwrap_or(2),
            living_area: draft.living_area,
            facades: draft.facades,
            garage: draft.garage,
            garden: draft.garden,
            garden_area,
            garden_orientation,
            total_area: rules::total_area(draft.living_area, garden_area)?,
            active: true,
            property_type_id: draft.property_type_id,
            salesperson_id: draft.salesperson_id,
            created_at: now,
        };

        let property = diesel::insert_into(properties::table)
            .values(&new_property)
            .returning(Property::as_returning())
            .get_result(conn)?;
        replace_tags(conn, property.id, &draft.tag_ids)?;

        info!("Created property {} ({})", property.id, property.name);
        details(conn, property)
    })
}

pub fn get_property(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<PropertyDetails> {
    let property = find_property(conn, property_id)?;
    details(conn, property)
}

/// Newest first. Archived properties are skipped unless asked for.
pub fn list_properties(conn: &mut SqliteConnection, filter: &PropertyFilter) -> EstateResult<Vec<PropertyDetails>> {
    let mut query = properties::table.select(Property::as_select()).into_boxed();
    if !filter.include_archived {
        query = query.filter(properties::active.eq(true));
    }
    if let Some(state) = filter.state {
        query = query.filter(properties::state.eq(state));
    }
    let rows = query.order(properties::id.desc()).load(conn)?;
    info!("Fetched {} properties", rows.len());
    with_details(conn, rows)
}

pub fn list_salesperson_properties(conn: &mut SqliteConnection, user_id: i32) -> EstateResult<Vec<PropertyDetails>> {
    let rows = properties::table
        .filter(properties::salesperson_id.eq(user_id))
        .select(Property::as_select())
        .order(properties::id.desc())
        .load(conn)?;
    with_details(conn, rows)
}

fn apply_changes(property: &mut Property, changes: PropertyChanges) -> EstateResult<()> {
    if let Some(name) = changes.name {
        property.name = name;
    }
    if let Some(description) = changes.description {
        property.description = description;
    }
    if let Some(postcode) = changes.postcode {
        property.postcode = postcode;
    }
    if let Some(date_availability) = changes.date_availability {
        property.date_availability = date_availability;
    }
    if let Some(expected_price) = changes.expected_price {
        property.expected_price = expected_price;
    }
    if let Some(bedrooms) = changes.bedrooms {
        property.bedrooms = bedrooms;
    }
    if let Some(living_area) = changes.living_area {
        property.living_area = living_area;
    }
    if let Some(facades) = changes.facades {
        property.facades = facades;
    }
    if let Some(garage) = changes.garage {
        property.garage = garage;
    }
    if let Some(garden) = changes.garden {
        if garden != property.garden {
            let (area, orientation) = rules::garden_defaults(garden);
            property.garden_area = area;
            property.garden_orientation = orientation;
        }
        property.garden = garden;
    }
    // Explicit values beat the garden toggle suggestion.
    if let Some(garden_area) = changes.garden_area {
        property.garden_area = garden_area;
    }
    if let Some(garden_orientation) = changes.garden_orientation {
        property.garden_orientation = garden_orientation;
    }
    if let Some(active) = changes.active {
        property.active = active;
    }
    if let Some(property_type_id) = changes.property_type_id {
        property.property_type_id = property_type_id;
    }
    if let Some(salesperson_id) = changes.salesperson_id {
        property.salesperson_id = salesperson_id;
    }
    property.total_area = rules::total_area(property.living_area, property.garden_area)?;
    Ok(())
}

pub fn update_property(
    conn: &mut SqliteConnection,
    property_id: i32,
    mut changes: PropertyChanges,
) -> EstateResult<PropertyDetails> {
    conn.immediate_transaction(|conn| {
        let mut property = find_property(conn, property_id)?;
        let tag_ids = changes.tag_ids.take();
        apply_changes(&mut property, changes)?;
        rules::check_selling_price(property.selling_price, property.expected_price)?;

        diesel::update(properties::table.find(property_id))
            .set(&property)
            .execute(conn)?;
        if let Some(tag_ids) = tag_ids {
            replace_tags(conn, property_id, &tag_ids)?;
        }

        info!("Updated property {}", property_id);
        details(conn, property)
    })
}

pub fn set_property_tags(conn: &mut SqliteConnection, property_id: i32, tag_ids: &[i32]) -> EstateResult<PropertyDetails> {
    conn.immediate_transaction(|conn| {
        let property = find_property(conn, property_id)?;
        replace_tags(conn, property_id, tag_ids)?;
        info!("Property {} now has {} tags", property_id, tag_ids.len());
        details(conn, property)
    })
}

pub fn delete_property(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<()> {
    conn.immediate_transaction(|conn| {
        let property = find_property(conn, property_id)?;
        property.state.ensure_deletable()?;
        diesel::delete(properties::table.find(property_id)).execute(conn)?;
        info!("Deleted property {} ({})", property_id, property.name);
        Ok(())
    })
}

fn set_state(conn: &mut SqliteConnection, property_id: i32, state: PropertyState) -> EstateResult<()> {
    diesel::update(properties::table.find(property_id))
        .set(properties::state.eq(state))
        .execute(conn)?;
    Ok(())
}

fn sell_in(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Property> {
    let mut property = find_property(conn, property_id)?;
    property.state = property.state.sell()?;
    set_state(conn, property_id, property.state)?;
    info!("Sold property {}", property_id);
    Ok(property)
}

fn cancel_in(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Property> {
    let mut property = find_property(conn, property_id)?;
    property.state = property.state.cancel()?;
    set_state(conn, property_id, property.state)?;
    info!("Canceled property {}", property_id);
    Ok(property)
}

/// `sellProperty`: refused for canceled properties.
pub fn sell_property(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Property> {
    conn.immediate_transaction(|conn| sell_in(conn, property_id))
}

/// `cancelProperty`: refused for sold properties.
pub fn cancel_property(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Property> {
    conn.immediate_transaction(|conn| cancel_in(conn, property_id))
}

/// Sells every listed property or none of them.
pub fn sell_properties(conn: &mut SqliteConnection, property_ids: &[i32]) -> EstateResult<Vec<Property>> {
    conn.immediate_transaction(|conn| property_ids.iter().map(|&id| sell_in(conn, id)).collect())
}

/// Cancels every listed property or none of them.
pub fn cancel_properties(conn: &mut SqliteConnection, property_ids: &[i32]) -> EstateResult<Vec<Property>> {
    conn.immediate_transaction(|conn| property_ids.iter().map(|&id| cancel_in(conn, id)).collect())
}
