use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

mod catalog;
mod offer;
mod partner;
mod property;

pub use catalog::{NewPropertyTag, NewPropertyType, PropertyTag, PropertyType, PropertyTypeDetails};
pub use offer::{NewOffer, Offer, OfferChanges, OfferDraft};
pub use partner::{NewPartner, NewUser, Partner, User};
pub use property::{
    NewProperty, Property, PropertyChanges, PropertyDetails, PropertyDraft, PropertyFilter,
    PropertyTagLink,
};

/// Stores a fieldless enum as its snake_case name in a TEXT column.
macro_rules! text_column_enum {
    ($ty:ty) => {
        impl ToSql<Text, Sqlite> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.as_ref());
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Sqlite> for $ty {
            fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
                Ok(raw.parse::<$ty>()?)
            }
        }
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
    EnumString, AsRefStr, Display,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropertyState {
    #[default]
    New,
    OfferReceived,
    OfferAccepted,
    Sold,
    Canceled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
    EnumString, AsRefStr, Display,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
    EnumString, AsRefStr, Display,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GardenOrientation {
    North,
    South,
    East,
    West,
}

text_column_enum!(PropertyState);
text_column_enum!(OfferStatus);
text_column_enum!(GardenOrientation);

/// Lets a PATCH body tell "absent" (outer `None`) from an explicit `null`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
