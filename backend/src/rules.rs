//! Business rules that need no storage: derived fields, price checks and
//! the property state machine.

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};

use crate::error::{EstateError, EstateResult};
use crate::models::{GardenOrientation, PropertyState};

/// Fraction of the expected price below which a sale is refused.
pub const MIN_SELLING_RATIO: f64 = 0.9;

/// Garden area suggested when the garden flag is switched on.
pub const DEFAULT_GARDEN_AREA: i32 = 10;

const SECONDS_PER_DAY: i64 = 86_400;

/// Prices are compared at currency precision.
fn cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn total_area(living_area: i32, garden_area: i32) -> EstateResult<i32> {
    living_area.checked_add(garden_area).ok_or_else(|| {
        EstateError::Validation(format!(
            "Total area of {living_area} + {garden_area} is out of range"
        ))
    })
}

/// Highest offer price, or 0 when there are no offers.
pub fn best_price<I>(prices: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    prices.into_iter().fold(0.0, f64::max)
}

/// Fails when both prices are set and the selling price is under 90% of
/// the expected price.
pub fn check_selling_price(selling_price: f64, expected_price: f64) -> EstateResult<()> {
    if cents(selling_price) == 0 || cents(expected_price) == 0 {
        return Ok(());
    }
    if cents(selling_price) < cents(expected_price * MIN_SELLING_RATIO) {
        return Err(EstateError::Validation(
            "The selling price cannot be less than 90% of the expected price.".to_string(),
        ));
    }
    Ok(())
}

/// A new offer must beat the current best offer, by any amount.
pub fn check_offer_price(price: f64, best_price: f64) -> EstateResult<()> {
    if !(price > best_price) {
        return Err(EstateError::OfferTooLow { price, best_price });
    }
    Ok(())
}

/// Area and orientation applied when the garden flag is toggled.
pub fn garden_defaults(garden: bool) -> (i32, Option<GardenOrientation>) {
    if garden {
        (DEFAULT_GARDEN_AREA, Some(GardenOrientation::North))
    } else {
        (0, None)
    }
}

pub fn default_availability(today: NaiveDate) -> NaiveDate {
    today.checked_add_months(Months::new(3)).unwrap_or(today)
}

/// `created_at + validity` days; no deadline for a zero validity.
pub fn deadline_from_validity(
    created_at: NaiveDateTime,
    validity: i32,
) -> EstateResult<Option<NaiveDateTime>> {
    if validity == 0 {
        return Ok(None);
    }
    created_at
        .checked_add_signed(Duration::days(i64::from(validity)))
        .map(Some)
        .ok_or_else(|| EstateError::Validation(format!("Validity of {validity} days is out of range")))
}

/// Whole days from `created_at` to `deadline`, rounded down.
pub fn validity_from_deadline(created_at: NaiveDateTime, deadline: NaiveDateTime) -> EstateResult<i32> {
    let days = (deadline - created_at).num_seconds().div_euclid(SECONDS_PER_DAY);
    i32::try_from(days)
        .map_err(|_| EstateError::Validation(format!("Deadline {deadline} is out of range")))
}

/// Resolves the `(validity, date_deadline)` pair of an offer after a write.
///
/// A written deadline drives the validity; otherwise a written validity
/// drives the deadline. With neither written the current pair is kept.
pub fn offer_window(
    created_at: NaiveDateTime,
    current: (i32, Option<NaiveDateTime>),
    validity: Option<i32>,
    date_deadline: Option<NaiveDateTime>,
) -> EstateResult<(i32, Option<NaiveDateTime>)> {
    match (validity, date_deadline) {
        (_, Some(deadline)) => Ok((validity_from_deadline(created_at, deadline)?, Some(deadline))),
        (Some(validity), None) => Ok((validity, deadline_from_validity(created_at, validity)?)),
        (None, None) => Ok(current),
    }
}

impl PropertyState {
    /// State after `sell`. Selling a canceled property is refused.
    pub fn sell(self) -> EstateResult<PropertyState> {
        match self {
            PropertyState::Canceled => Err(EstateError::InvalidStateTransition(
                "You cannot sell a canceled property.".to_string(),
            )),
            _ => Ok(PropertyState::Sold),
        }
    }

    /// State after `cancel`. Canceling a sold property is refused.
    pub fn cancel(self) -> EstateResult<PropertyState> {
        match self {
            PropertyState::Sold => Err(EstateError::InvalidStateTransition(
                "You cannot cancel a sold property.".to_string(),
            )),
            _ => Ok(PropertyState::Canceled),
        }
    }

    pub fn ensure_deletable(self) -> EstateResult<()> {
        match self {
            PropertyState::New | PropertyState::Canceled => Ok(()),
            _ => Err(EstateError::InvalidStateTransition(
                "You cannot delete a property that is not new or canceled.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn total_area_sums_living_and_garden() {
        assert_eq!(total_area(120, 30).unwrap(), 150);
        assert_eq!(total_area(0, 0).unwrap(), 0);
        assert!(matches!(total_area(i32::MAX, 1), Err(EstateError::Validation(_))));
    }

    #[test]
    fn best_price_is_zero_without_offers() {
        assert_eq!(best_price(Vec::new()), 0.0);
        assert_eq!(best_price([50_000.0, 72_500.5, 61_000.0]), 72_500.5);
    }

    #[test]
    fn selling_price_boundary_is_ninety_percent() {
        assert!(check_selling_price(90_000.0, 100_000.0).is_ok());
        assert!(matches!(
            check_selling_price(89_999.99, 100_000.0),
            Err(EstateError::Validation(_))
        ));
        // Unset prices are not checked.
        assert!(check_selling_price(0.0, 100_000.0).is_ok());
    }

    #[test]
    fn offers_must_beat_the_best_price() {
        assert!(check_offer_price(50_000.0, 0.0).is_ok());
        assert!(matches!(
            check_offer_price(50_000.0, 50_000.0),
            Err(EstateError::OfferTooLow { .. })
        ));
        assert!(check_offer_price(40_000.0, 50_000.0).is_err());
        // Sub-cent increments still count as higher.
        assert!(check_offer_price(50.004, 50.0).is_ok());
        assert!(check_offer_price(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn garden_toggle_suggests_north_facing_ten() {
        assert_eq!(garden_defaults(true), (10, Some(GardenOrientation::North)));
        assert_eq!(garden_defaults(false), (0, None));
    }

    #[test]
    fn availability_defaults_three_months_out() {
        let today = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(default_availability(today), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn deadline_and_validity_follow_each_other() {
        let created = at(2024, 3, 1, 12);
        assert_eq!(deadline_from_validity(created, 7).unwrap(), Some(at(2024, 3, 8, 12)));
        assert_eq!(deadline_from_validity(created, 0).unwrap(), None);
        assert_eq!(validity_from_deadline(created, at(2024, 3, 8, 12)).unwrap(), 7);
        // Partial days round down, also before the creation date.
        assert_eq!(validity_from_deadline(created, at(2024, 3, 8, 6)).unwrap(), 6);
        assert_eq!(validity_from_deadline(created, at(2024, 2, 29, 18)).unwrap(), -1);
        assert!(deadline_from_validity(created, i32::MAX).is_err());
    }

    #[test]
    fn written_deadline_takes_precedence() {
        let created = at(2024, 3, 1, 12);
        let current = (7, Some(at(2024, 3, 8, 12)));
        assert_eq!(
            offer_window(created, current, Some(30), Some(at(2024, 3, 11, 12))).unwrap(),
            (10, Some(at(2024, 3, 11, 12)))
        );
        assert_eq!(
            offer_window(created, current, Some(2), None).unwrap(),
            (2, Some(at(2024, 3, 3, 12)))
        );
        assert_eq!(offer_window(created, current, None, None).unwrap(), current);
    }

    #[test]
    fn state_machine_guards() {
        assert!(PropertyState::Canceled.sell().is_err());
        assert_eq!(PropertyState::Sold.sell().unwrap(), PropertyState::Sold);
        assert_eq!(PropertyState::OfferAccepted.sell().unwrap(), PropertyState::Sold);
        assert!(PropertyState::Sold.cancel().is_err());
        assert_eq!(PropertyState::OfferReceived.cancel().unwrap(), PropertyState::Canceled);
        assert!(PropertyState::New.ensure_deletable().is_ok());
        assert!(PropertyState::Canceled.ensure_deletable().is_ok());
        assert!(PropertyState::OfferReceived.ensure_deletable().is_err());
    }
}
