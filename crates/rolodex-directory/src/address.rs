//! Address records owned by customers.

use crate::error::{is_constraint, non_empty, DirectoryError};
use crate::text::string_or_number;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const ADDRESS_FIELDS_REQUIRED: &str = "All address fields required";
const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// A postal address belonging to one customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub id: i64,
    pub customer_id: i64,
    pub address_details: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
}

/// Address fields as submitted by a client. Any of them may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub address_details: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pin_code: Option<String>,
}

/// A fully populated set of address fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AddressFields<'a> {
    address_details: &'a str,
    city: &'a str,
    state: &'a str,
    pin_code: &'a str,
}

impl AddressInput {
    /// Returns the fields if all four are present and non-empty.
    pub(crate) fn complete(&self) -> Option<AddressFields<'_>> {
        Some(AddressFields {
            address_details: non_empty(&self.address_details)?,
            city: non_empty(&self.city)?,
            state: non_empty(&self.state)?,
            pin_code: non_empty(&self.pin_code)?,
        })
    }

    fn require(&self) -> Result<AddressFields<'_>, DirectoryError> {
        self.complete()
            .ok_or_else(|| DirectoryError::InvalidInput(ADDRESS_FIELDS_REQUIRED.to_string()))
    }
}

/// Inserts an address row and returns its id.
///
/// A foreign-key violation means the customer does not exist.
pub(crate) fn insert_address(
    conn: &Connection,
    customer_id: i64,
    fields: &AddressFields<'_>,
) -> Result<i64, DirectoryError> {
    conn.execute(
        "INSERT INTO addresses (customer_id, address_details, city, state, pin_code)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            customer_id,
            fields.address_details,
            fields.city,
            fields.state,
            fields.pin_code,
        ],
    )
    .map_err(|e| {
        if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
            DirectoryError::NotFound(CUSTOMER_NOT_FOUND.to_string())
        } else {
            DirectoryError::Database(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// Adds an address to a customer and returns the new address id.
///
/// # Errors
///
/// `InvalidInput` unless all four fields are non-empty; `NotFound` if the
/// customer does not exist.
pub fn create_address(
    conn: &Connection,
    customer_id: i64,
    input: &AddressInput,
) -> Result<i64, DirectoryError> {
    let fields = input.require()?;
    let address_id = insert_address(conn, customer_id, &fields)?;
    tracing::info!(customer_id, address_id, "address created");
    Ok(address_id)
}

/// Lists every address of a customer in creation order.
pub fn list_addresses(conn: &Connection, customer_id: i64) -> Result<Vec<Address>, DirectoryError> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, address_details, city, state, pin_code
         FROM addresses WHERE customer_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([customer_id], map_row_to_address)?;
    let mut addresses = Vec::new();
    for row in rows {
        addresses.push(row?);
    }
    Ok(addresses)
}

/// Overwrites all four fields of an address.
///
/// Updating an id that does not exist is a no-op.
pub fn update_address(
    conn: &Connection,
    address_id: i64,
    input: &AddressInput,
) -> Result<(), DirectoryError> {
    let fields = input.require()?;
    let count = conn.execute(
        "UPDATE addresses SET address_details = ?1, city = ?2, state = ?3, pin_code = ?4
         WHERE id = ?5",
        params![
            fields.address_details,
            fields.city,
            fields.state,
            fields.pin_code,
            address_id,
        ],
    )?;
    if count == 0 {
        tracing::debug!(address_id, "update matched no address");
    }
    Ok(())
}

/// Deletes an address. Deleting an id that does not exist is a no-op.
pub fn delete_address(conn: &Connection, address_id: i64) -> Result<(), DirectoryError> {
    let count = conn.execute("DELETE FROM addresses WHERE id = ?1", [address_id])?;
    tracing::debug!(address_id, removed = count, "address delete");
    Ok(())
}

fn map_row_to_address(row: &Row) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        address_details: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        pin_code: row.get(5)?,
    })
}
