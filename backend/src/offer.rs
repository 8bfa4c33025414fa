use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::error::{EstateError, EstateResult};
use crate::models::{NewOffer, Offer, OfferChanges, OfferDraft, OfferStatus, PropertyState};
use crate::partner::find_partner;
use crate::property::{best_price, find_property};
use crate::rules;
use crate::schema::{offers, properties};

pub(crate) fn find_offer(conn: &mut SqliteConnection, offer_id: i32) -> EstateResult<Offer> {
    offers::table
        .find(offer_id)
        .select(Offer::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| EstateError::not_found("offer", offer_id))
}

/// `createOffer`: the price must beat the current best offer. A `new`
/// property moves to `offer_received`.
pub fn create_offer(conn: &mut SqliteConnection, draft: OfferDraft) -> EstateResult<Offer> {
    conn.immediate_transaction(|conn| {
        let property = find_property(conn, draft.property_id)?;
        find_partner(conn, draft.partner_id)?;
        rules::check_offer_price(draft.price, best_price(conn, property.id)?)?;

        let now = Utc::now().naive_utc();
        let (validity, date_deadline) = rules::offer_window(now, (0, None), draft.validity, draft.date_deadline)?;
        let offer = diesel::insert_into(offers::table)
            .values(&NewOffer {
                price: draft.price,
                partner_id: draft.partner_id,
                property_id: property.id,
                validity,
                date_deadline,
                created_at: now,
            })
            .returning(Offer::as_returning())
            .get_result(conn)?;

        // Only a fresh listing moves forward; later states are kept.
        if property.state == PropertyState::New {
            diesel::update(properties::table.find(property.id))
                .set(properties::state.eq(PropertyState::OfferReceived))
                .execute(conn)?;
        }

        info!("Created offer {} of {} on property {}", offer.id, offer.price, property.id);
        Ok(offer)
    })
}

/// `acceptOffer`: the property takes the offer's partner as buyer and its
/// price as selling price. Other offers are left untouched.
pub fn accept_offer(conn: &mut SqliteConnection, offer_id: i32) -> EstateResult<Offer> {
    conn.immediate_transaction(|conn| {
        let mut offer = find_offer(conn, offer_id)?;
        let property = find_property(conn, offer.property_id)?;
        rules::check_selling_price(offer.price, property.expected_price)?;

        offer.status = OfferStatus::Accepted;
        diesel::update(offers::table.find(offer.id))
            .set(offers::status.eq(offer.status))
            .execute(conn)?;
        diesel::update(properties::table.find(property.id))
            .set((
                properties::state.eq(PropertyState::OfferAccepted),
                properties::buyer_id.eq(Some(offer.partner_id)),
                properties::selling_price.eq(offer.price),
            ))
            .execute(conn)?;

        info!("Accepted offer {} on property {}", offer.id, property.id);
        Ok(offer)
    })
}

/// `refuseOffer`: only the offer changes.
pub fn refuse_offer(conn: &mut SqliteConnection, offer_id: i32) -> EstateResult<Offer> {
    conn.immediate_transaction(|conn| {
        let mut offer = find_offer(conn, offer_id)?;
        offer.status = OfferStatus::Refused;
        diesel::update(offers::table.find(offer.id))
            .set(offers::status.eq(offer.status))
            .execute(conn)?;
        info!("Refused offer {}", offer.id);
        Ok(offer)
    })
}

pub fn update_offer(conn: &mut SqliteConnection, offer_id: i32, changes: OfferChanges) -> EstateResult<Offer> {
    conn.immediate_transaction(|conn| {
        let mut offer = find_offer(conn, offer_id)?;
        if let Some(price) = changes.price {
            offer.price = price;
        }
        let (validity, date_deadline) = rules::offer_window(
            offer.created_at,
            (offer.validity, offer.date_deadline),
            changes.validity,
            changes.date_deadline,
        )?;
        offer.validity = validity;
        offer.date_deadline = date_deadline;

        diesel::update(offers::table.find(offer.id)).set(&offer).execute(conn)?;
        info!("Updated offer {}", offer.id);
        Ok(offer)
    })
}

/// Offers on a property, best first.
pub fn list_property_offers(conn: &mut SqliteConnection, property_id: i32) -> EstateResult<Vec<Offer>> {
    find_property(conn, property_id)?;
    let rows = offers::table
        .filter(offers::property_id.eq(property_id))
        .select(Offer::as_select())
        .order((offers::price.desc(), offers::id))
        .load(conn)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{NewPartner, PropertyDraft};
    use crate::partner::create_partner;
    use crate::property::{cancel_property, create_property, get_property, sell_property};

    struct Fixture {
        pool: db::DbPool,
        property_id: i32,
        partner_id: i32,
    }

    fn fixture(expected_price: f64) -> Fixture {
        let pool = db::in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        let property_id = create_property(&mut conn, PropertyDraft::new("Seaside", expected_price))
            .unwrap()
            .property
            .id;
        let partner_id = create_partner(&mut conn, NewPartner { name: "Ada".into() }).unwrap().id;
        drop(conn);
        Fixture { pool, property_id, partner_id }
    }

    fn draft(f: &Fixture, price: f64) -> OfferDraft {
        OfferDraft {
            property_id: f.property_id,
            price,
            partner_id: f.partner_id,
            validity: Some(7),
            date_deadline: None,
        }
    }

    #[test]
    fn offers_must_outbid_and_mark_the_property() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();

        let first = create_offer(&mut conn, draft(&f, 50_000.0)).unwrap();
        assert_eq!(first.status, OfferStatus::Pending);
        let property = get_property(&mut conn, f.property_id).unwrap();
        assert_eq!(property.property.state, PropertyState::OfferReceived);
        assert_eq!(property.best_price, 50_000.0);

        let err = create_offer(&mut conn, draft(&f, 40_000.0)).unwrap_err();
        assert!(matches!(err, EstateError::OfferTooLow { .. }));
        let err = create_offer(&mut conn, draft(&f, 50_000.0)).unwrap_err();
        assert!(matches!(err, EstateError::OfferTooLow { .. }));

        create_offer(&mut conn, draft(&f, 60_000.0)).unwrap();
        assert_eq!(best_price(&mut conn, f.property_id).unwrap(), 60_000.0);
    }

    #[test]
    fn offers_never_move_a_property_backwards() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let accepted = create_offer(&mut conn, draft(&f, 95_000.0)).unwrap();
        accept_offer(&mut conn, accepted.id).unwrap();

        create_offer(&mut conn, draft(&f, 96_000.0)).unwrap();
        let state = get_property(&mut conn, f.property_id).unwrap().property.state;
        assert_eq!(state, PropertyState::OfferAccepted);

        sell_property(&mut conn, f.property_id).unwrap();
        create_offer(&mut conn, draft(&f, 97_000.0)).unwrap();
        let state = get_property(&mut conn, f.property_id).unwrap().property.state;
        assert_eq!(state, PropertyState::Sold);
        assert!(matches!(
            cancel_property(&mut conn, f.property_id),
            Err(EstateError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn best_price_follows_offer_price_changes() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let low = create_offer(&mut conn, draft(&f, 10.0)).unwrap();
        create_offer(&mut conn, draft(&f, 20.0)).unwrap();

        update_offer(&mut conn, low.id, OfferChanges { price: Some(99.0), ..Default::default() }).unwrap();
        assert_eq!(get_property(&mut conn, f.property_id).unwrap().best_price, 99.0);

        update_offer(&mut conn, low.id, OfferChanges { price: Some(5.0), ..Default::default() }).unwrap();
        assert_eq!(get_property(&mut conn, f.property_id).unwrap().best_price, 20.0);
    }

    #[test]
    fn deadline_is_anchored_at_creation() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();

        let offer = create_offer(&mut conn, draft(&f, 1_000.0)).unwrap();
        assert_eq!(offer.validity, 7);
        assert_eq!(offer.date_deadline, Some(offer.created_at + chrono::Duration::days(7)));

        let moved = update_offer(
            &mut conn,
            offer.id,
            OfferChanges { date_deadline: Some(offer.created_at + chrono::Duration::days(12)), ..Default::default() },
        )
        .unwrap();
        assert_eq!(moved.validity, 12);

        let extended = update_offer(&mut conn, offer.id, OfferChanges { validity: Some(30), ..Default::default() }).unwrap();
        assert_eq!(extended.date_deadline, Some(offer.created_at + chrono::Duration::days(30)));
        assert_eq!(find_offer(&mut conn, offer.id).unwrap(), extended);
    }

    #[test]
    fn accepting_propagates_to_the_property() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let offer = create_offer(&mut conn, draft(&f, 95_000.0)).unwrap();

        let accepted = accept_offer(&mut conn, offer.id).unwrap();
        assert_eq!(accepted.status, OfferStatus::Accepted);

        let property = get_property(&mut conn, f.property_id).unwrap().property;
        assert_eq!(property.state, PropertyState::OfferAccepted);
        assert_eq!(property.buyer_id, Some(f.partner_id));
        assert_eq!(property.selling_price, 95_000.0);
    }

    #[test]
    fn accepting_below_ninety_percent_is_rejected() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let low = create_offer(&mut conn, draft(&f, 89_000.0)).unwrap();
        let exact = create_offer(&mut conn, draft(&f, 90_000.0)).unwrap();

        assert!(matches!(accept_offer(&mut conn, low.id), Err(EstateError::Validation(_))));
        assert_eq!(find_offer(&mut conn, low.id).unwrap().status, OfferStatus::Pending);
        assert!(accept_offer(&mut conn, exact.id).is_ok());
    }

    #[test]
    fn refusing_leaves_the_property_alone() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let offer = create_offer(&mut conn, draft(&f, 10_000.0)).unwrap();

        assert_eq!(refuse_offer(&mut conn, offer.id).unwrap().status, OfferStatus::Refused);
        let property = get_property(&mut conn, f.property_id).unwrap().property;
        assert_eq!(property.state, PropertyState::OfferReceived);
        assert_eq!(property.buyer_id, None);
    }

    #[test]
    fn unknown_references_are_not_found() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        let mut orphan = draft(&f, 1.0);
        orphan.partner_id = 404;
        assert!(matches!(create_offer(&mut conn, orphan), Err(EstateError::NotFound { entity: "partner", .. })));
        assert!(matches!(accept_offer(&mut conn, 404), Err(EstateError::NotFound { entity: "offer", .. })));
    }

    #[test]
    fn listing_orders_by_price() {
        let f = fixture(100_000.0);
        let mut conn = f.pool.get().unwrap();
        create_offer(&mut conn, draft(&f, 10.0)).unwrap();
        create_offer(&mut conn, draft(&f, 30.0)).unwrap();
        let prices: Vec<f64> = list_property_offers(&mut conn, f.property_id)
            .unwrap()
            .into_iter()
            .map(|o| o.price)
            .collect();
        assert_eq!(prices, vec![30.0, 10.0]);
    }
}
