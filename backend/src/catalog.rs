//! Property types and tags.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::error::{EstateError, EstateResult};
use crate::models::{NewPropertyTag, NewPropertyType, Offer, PropertyTag, PropertyType, PropertyTypeDetails};
use crate::schema::{offers, properties, property_tags, property_types};

fn find_type(conn: &mut SqliteConnection, type_id: i32) -> EstateResult<PropertyType> {
    property_types::table
        .find(type_id)
        .select(PropertyType::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| EstateError::not_found("property type", type_id))
}

pub fn create_type(conn: &mut SqliteConnection, new_type: NewPropertyType) -> EstateResult<PropertyType> {
    let property_type = diesel::insert_into(property_types::table)
        .values(&new_type)
        .returning(PropertyType::as_returning())
        .get_result(conn)?;
    info!("Created property type {} ({})", property_type.id, property_type.name);
    Ok(property_type)
}

pub fn list_types(conn: &mut SqliteConnection) -> EstateResult<Vec<PropertyType>> {
    Ok(property_types::table
        .select(PropertyType::as_select())
        .order((property_types::sequence, property_types::name))
        .load(conn)?)
}

pub fn get_type(conn: &mut SqliteConnection, type_id: i32) -> EstateResult<PropertyTypeDetails> {
    let property_type = find_type(conn, type_id)?;
    let offer_count = offers::table
        .inner_join(properties::table)
        .filter(properties::property_type_id.eq(type_id))
        .count()
        .get_result::<i64>(conn)?;
    Ok(PropertyTypeDetails { property_type, offer_count })
}

/// Every offer made on a property of this type.
pub fn type_offers(conn: &mut SqliteConnection, type_id: i32) -> EstateResult<Vec<Offer>> {
    find_type(conn, type_id)?;
    Ok(offers::table
        .inner_join(properties::table)
        .filter(properties::property_type_id.eq(type_id))
        .select(Offer::as_select())
        .order(offers::id)
        .load(conn)?)
}

/// Properties of a deleted type become untyped.
pub fn delete_type(conn: &mut SqliteConnection, type_id: i32) -> EstateResult<()> {
    let deleted = diesel::delete(property_types::table.find(type_id)).execute(conn)?;
    if deleted == 0 {
        return Err(EstateError::not_found("property type", type_id));
    }
    info!("Deleted property type {}", type_id);
    Ok(())
}

pub fn create_tag(conn: &mut SqliteConnection, new_tag: NewPropertyTag) -> EstateResult<PropertyTag> {
    let tag = diesel::insert_into(property_tags::table)
        .values(&new_tag)
        .returning(PropertyTag::as_returning())
        .get_result(conn)?;
    info!("Created tag {} ({})", tag.id, tag.name);
    Ok(tag)
}

pub fn list_tags(conn: &mut SqliteConnection) -> EstateResult<Vec<PropertyTag>> {
    Ok(property_tags::table.select(PropertyTag::as_select()).order(property_tags::name).load(conn)?)
}

pub fn delete_tag(conn: &mut SqliteConnection, tag_id: i32) -> EstateResult<()> {
    let deleted = diesel::delete(property_tags::table.find(tag_id)).execute(conn)?;
    if deleted == 0 {
        return Err(EstateError::not_found("tag", tag_id));
    }
    info!("Deleted tag {}", tag_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{NewPartner, OfferDraft, PropertyDraft};
    use crate::offer::create_offer;
    use crate::partner::create_partner;
    use crate::property::{create_property, get_property};

    #[test]
    fn types_are_ordered_by_sequence_then_name() {
        let pool = db::in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        create_type(&mut conn, NewPropertyType::named("House")).unwrap();
        create_type(&mut conn, NewPropertyType { name: "Castle".into(), sequence: 1 }).unwrap();
        create_type(&mut conn, NewPropertyType::named("Apartment")).unwrap();

        let names: Vec<String> = list_types(&mut conn).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Castle", "Apartment", "House"]);
    }

    #[test]
    fn offer_count_covers_properties_of_the_type() {
        let pool = db::in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        let house = create_type(&mut conn, NewPropertyType::named("House")).unwrap();
        let buyer = create_partner(&mut conn, NewPartner { name: "Bo".into() }).unwrap();

        for (name, typed) in [("Typed", true), ("Untyped", false)] {
            let mut draft = PropertyDraft::new(name, 1_000.0);
            draft.property_type_id = typed.then_some(house.id);
            let id = create_property(&mut conn, draft).unwrap().property.id;
            for price in [100.0, 200.0] {
                create_offer(
                    &mut conn,
                    OfferDraft { property_id: id, price, partner_id: buyer.id, validity: None, date_deadline: None },
                )
                .unwrap();
            }
        }

        assert_eq!(get_type(&mut conn, house.id).unwrap().offer_count, 2);
        assert_eq!(type_offers(&mut conn, house.id).unwrap().len(), 2);
    }

    #[test]
    fn deleting_a_type_leaves_properties_untyped() {
        let pool = db::in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        let house = create_type(&mut conn, NewPropertyType::named("House")).unwrap();
        let mut draft = PropertyDraft::new("Typed", 1_000.0);
        draft.property_type_id = Some(house.id);
        let id = create_property(&mut conn, draft).unwrap().property.id;

        delete_type(&mut conn, house.id).unwrap();
        assert_eq!(get_property(&mut conn, id).unwrap().property.property_type_id, None);
        assert!(matches!(delete_type(&mut conn, house.id), Err(EstateError::NotFound { .. })));
    }

    #[test]
    fn tag_names_are_unique() {
        let pool = db::in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        create_tag(&mut conn, NewPropertyTag { name: "cozy".into() }).unwrap();
        let err = create_tag(&mut conn, NewPropertyTag { name: "cozy".into() }).unwrap_err();
        assert_eq!(err.to_string(), "Tag name must be unique");
        assert_eq!(list_tags(&mut conn).unwrap().len(), 1);
    }
}
