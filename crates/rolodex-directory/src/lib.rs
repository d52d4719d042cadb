//! Customer and address bookkeeping for the Rolodex service.
//!
//! Every operation takes an explicit `&rusqlite::Connection`, so callers
//! decide where the connection comes from (a per-request handle in the
//! server, an in-memory database in tests).
//!
//! | Operation | Failure modes |
//! |-----------|---------------|
//! | [`create_customer`] | `InvalidInput`, `Conflict` (duplicate phone) |
//! | [`update_customer`] | `InvalidInput`, `Conflict` |
//! | [`list_customers`] | none |
//! | [`get_customer`] | `NotFound` |
//! | [`delete_customer`] | none |
//! | [`create_address`] | `InvalidInput`, `NotFound` (unknown customer) |
//! | [`list_addresses`] | none |
//! | [`update_address`] | `InvalidInput` |
//! | [`delete_address`] | none |
//!
//! Any operation can also fail with `Database` for unexpected SQLite
//! errors. Updates and deletes of ids that do not exist succeed without
//! touching any rows.

mod address;
mod customer;
mod error;
mod text;

pub use address::{
    create_address, delete_address, list_addresses, update_address, Address, AddressInput,
};
pub use customer::{
    create_customer, delete_customer, get_customer, list_customers, update_customer, Customer,
    CustomerCreated, CustomerFilter, CustomerInput, CustomerSummary, NewCustomer, Pagination,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use error::DirectoryError;
