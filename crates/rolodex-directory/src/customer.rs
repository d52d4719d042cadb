//! Customer records and their paginated listing.

use crate::address::{insert_address, AddressInput};
use crate::error::{is_constraint, non_empty, DirectoryError};
use crate::text::string_or_number;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 5;
/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

const NAME_AND_PHONE_REQUIRED: &str = "Name and phone required";
const PHONE_EXISTS: &str = "Phone number already exists";
const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// A stored customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// A customer row in a listing, annotated with its joined address count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address_count: i64,
}

/// Customer fields as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone_number: Option<String>,
}

/// Payload for creating a customer, optionally with a first address.
///
/// The address is only stored when all four of its fields are non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCustomer {
    #[serde(flatten)]
    pub customer: CustomerInput,
    #[serde(flatten)]
    pub address: AddressInput,
}

/// Outcome of [`create_customer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerCreated {
    pub customer_id: i64,
    /// Set when an address was attached in the same request.
    pub address_id: Option<i64>,
}

/// Equality filters applied to the joined address columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    /// Builds a page request, defaulting to page 1 of [`DEFAULT_PAGE_LIMIT`]
    /// rows. `limit` is capped at [`MAX_PAGE_LIMIT`].
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `page` or `limit` is zero.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, DirectoryError> {
        let defaults = Self::default();
        let page = page.unwrap_or(defaults.page);
        let limit = limit.unwrap_or(defaults.limit);

        if page == 0 {
            return Err(DirectoryError::InvalidInput(
                "page must be at least 1".to_string(),
            ));
        }
        if limit == 0 {
            return Err(DirectoryError::InvalidInput(
                "limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_LIMIT),
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

struct CustomerFields<'a> {
    first_name: &'a str,
    last_name: &'a str,
    phone_number: &'a str,
}

impl CustomerInput {
    fn require(&self) -> Result<CustomerFields<'_>, DirectoryError> {
        match (
            non_empty(&self.first_name),
            non_empty(&self.last_name),
            non_empty(&self.phone_number),
        ) {
            (Some(first_name), Some(last_name), Some(phone_number)) => Ok(CustomerFields {
                first_name,
                last_name,
                phone_number,
            }),
            _ => Err(DirectoryError::InvalidInput(
                NAME_AND_PHONE_REQUIRED.to_string(),
            )),
        }
    }
}

/// Maps a unique-constraint failure on `phone_number` to `Conflict`.
fn phone_conflict(err: rusqlite::Error) -> DirectoryError {
    if is_constraint(&err, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
        DirectoryError::Conflict(PHONE_EXISTS.to_string())
    } else {
        DirectoryError::Database(err)
    }
}

/// Creates a customer, attaching an address when one is fully supplied.
///
/// Phone uniqueness is enforced by the `UNIQUE` constraint on
/// `customers.phone_number`, so two concurrent creates with the same phone
/// cannot both succeed. The customer and address inserts share one
/// transaction.
///
/// # Errors
///
/// `InvalidInput` if a name or the phone is missing, `Conflict` if the phone
/// is already taken.
pub fn create_customer(
    conn: &Connection,
    input: &NewCustomer,
) -> Result<CustomerCreated, DirectoryError> {
    let fields = input.customer.require()?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO customers (first_name, last_name, phone_number) VALUES (?1, ?2, ?3)",
        params![fields.first_name, fields.last_name, fields.phone_number],
    )
    .map_err(phone_conflict)?;
    let customer_id = tx.last_insert_rowid();

    let address_id = match input.address.complete() {
        Some(address) => Some(insert_address(&tx, customer_id, &address)?),
        None => None,
    };
    tx.commit()?;

    tracing::info!(
        customer_id,
        with_address = address_id.is_some(),
        "customer created"
    );
    Ok(CustomerCreated {
        customer_id,
        address_id,
    })
}

/// Overwrites a customer's names and phone.
///
/// Updating an id that does not exist is a no-op. Keeping the same phone
/// number is not a conflict.
///
/// # Errors
///
/// `InvalidInput` if a field is missing, `Conflict` if another customer
/// already holds the phone number.
pub fn update_customer(
    conn: &Connection,
    customer_id: i64,
    input: &CustomerInput,
) -> Result<(), DirectoryError> {
    let fields = input.require()?;
    let count = conn
        .execute(
            "UPDATE customers SET first_name = ?1, last_name = ?2, phone_number = ?3 WHERE id = ?4",
            params![
                fields.first_name,
                fields.last_name,
                fields.phone_number,
                customer_id
            ],
        )
        .map_err(phone_conflict)?;
    if count == 0 {
        tracing::debug!(customer_id, "update matched no customer");
    }
    Ok(())
}

/// Lists customers one page at a time, ordered by id.
///
/// Each row carries `COUNT(a.id)` over the `LEFT JOIN` with `addresses`.
/// With no filters every customer appears (count 0 when it has no
/// addresses). Filters go into the `WHERE` clause, so only customers with
/// at least one matching address appear and the count covers the joined
/// rows that survive the filter.
pub fn list_customers(
    conn: &Connection,
    filter: &CustomerFilter,
    page: Pagination,
) -> Result<Vec<CustomerSummary>, DirectoryError> {
    // Clauses and parameters are collected separately; nothing from the
    // request is interpolated into the SQL text.
    let mut clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1u32;

    for (column, value) in [
        ("a.city", &filter.city),
        ("a.state", &filter.state),
        ("a.pin_code", &filter.pin_code),
    ] {
        if let Some(value) = non_empty(value) {
            clauses.push(format!("{column} = ?{idx}"));
            param_values.push(Box::new(value.to_string()));
            idx += 1;
        }
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT c.id, c.first_name, c.last_name, c.phone_number, COUNT(a.id) AS address_count
         FROM customers c
         LEFT JOIN addresses a ON c.id = a.customer_id
         {where_clause}
         GROUP BY c.id
         ORDER BY c.id ASC
         LIMIT ?{} OFFSET ?{}",
        idx,
        idx + 1
    );
    param_values.push(Box::new(i64::from(page.limit())));
    param_values.push(Box::new(page.offset()));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| &**p).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), map_row_to_summary)?;

    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

/// Retrieves a customer by id.
///
/// # Errors
///
/// `NotFound` if no customer has this id.
pub fn get_customer(conn: &Connection, customer_id: i64) -> Result<Customer, DirectoryError> {
    conn.query_row(
        "SELECT id, first_name, last_name, phone_number FROM customers WHERE id = ?1",
        [customer_id],
        map_row_to_customer,
    )
    .optional()?
    .ok_or_else(|| DirectoryError::NotFound(CUSTOMER_NOT_FOUND.to_string()))
}

/// Deletes a customer together with all of its addresses.
///
/// Addresses go first, then the customer, in one transaction so a failure
/// cannot leave orphaned addresses. Deleting an id that does not exist is a
/// no-op.
pub fn delete_customer(conn: &Connection, customer_id: i64) -> Result<(), DirectoryError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let addresses = tx.execute(
        "DELETE FROM addresses WHERE customer_id = ?1",
        [customer_id],
    )?;
    let customers = tx.execute("DELETE FROM customers WHERE id = ?1", [customer_id])?;
    tx.commit()?;

    tracing::info!(
        customer_id,
        removed_customers = customers,
        removed_addresses = addresses,
        "customer delete"
    );
    Ok(())
}

fn map_row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone_number: row.get(3)?,
    })
}

fn map_row_to_summary(row: &Row) -> rusqlite::Result<CustomerSummary> {
    Ok(CustomerSummary {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone_number: row.get(3)?,
        address_count: row.get(4)?,
    })
}
