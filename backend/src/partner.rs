use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::error::{EstateError, EstateResult};
use crate::models::{NewPartner, NewUser, Partner, PropertyDetails, User};
use crate::property::list_salesperson_properties;
use crate::schema::{partners, users};

pub(crate) fn find_partner(conn: &mut SqliteConnection, partner_id: i32) -> EstateResult<Partner> {
    partners::table
        .find(partner_id)
        .select(Partner::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| EstateError::not_found("partner", partner_id))
}

pub fn create_partner(conn: &mut SqliteConnection, new_partner: NewPartner) -> EstateResult<Partner> {
    let partner = diesel::insert_into(partners::table)
        .values(&new_partner)
        .returning(Partner::as_returning())
        .get_result(conn)?;
    info!("Created partner {} ({})", partner.id, partner.name);
    Ok(partner)
}

pub fn get_partner(conn: &mut SqliteConnection, partner_id: i32) -> EstateResult<Partner> {
    find_partner(conn, partner_id)
}

pub fn list_partners(conn: &mut SqliteConnection) -> EstateResult<Vec<Partner>> {
    Ok(partners::table.select(Partner::as_select()).order(partners::name).load(conn)?)
}

pub fn create_user(conn: &mut SqliteConnection, new_user: NewUser) -> EstateResult<User> {
    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)?;
    info!("Created user {} ({})", user.id, user.login);
    Ok(user)
}

pub fn list_users(conn: &mut SqliteConnection) -> EstateResult<Vec<User>> {
    Ok(users::table.select(User::as_select()).order(users::login).load(conn)?)
}

/// Properties a user handles as salesperson.
pub fn user_properties(conn: &mut SqliteConnection, user_id: i32) -> EstateResult<Vec<PropertyDetails>> {
    users::table
        .find(user_id)
        .select(users::id)
        .first::<i32>(conn)
        .optional()?
        .ok_or_else(|| EstateError::not_found("user", user_id))?;
    list_salesperson_properties(conn, user_id)
}
