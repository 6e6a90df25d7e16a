//! Defines the core data model and database queries for purchases.
//!
//! Every query that reads or mutates a single purchase filters by both the
//! row ID and the owner's email address, so one account can never see or
//! change another account's records.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::PurchaseId};

/// The sales tax rate applied to purchases with the tax-paid flag set.
pub const TAX_RATE: f64 = 0.06;

// ============================================================================
// MODELS
// ============================================================================

/// A record of money spent at a vendor, owned by a single account.
///
/// To create a new `Purchase`, use [Purchase::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// The ID of the purchase.
    pub id: PurchaseId,
    /// When the purchase happened.
    pub trans_date: Date,
    /// Who the money was paid to.
    pub vendor: String,
    /// The total amount of money spent.
    pub tot_amount: f64,
    /// Whether sales tax was charged on this purchase.
    pub tax: bool,
    /// A text description of what the purchase was for.
    pub description: String,
    /// The email of the account that owns this purchase.
    pub email: String,
}

impl Purchase {
    /// Create a new purchase.
    ///
    /// Shortcut for [PurchaseBuilder] for discoverability.
    pub fn build(trans_date: Date, vendor: &str, tot_amount: f64, email: &str) -> PurchaseBuilder {
        PurchaseBuilder {
            trans_date,
            vendor: vendor.to_owned(),
            tot_amount,
            tax: false,
            description: String::new(),
            email: email.to_owned(),
        }
    }

    /// The sales tax paid on this purchase.
    ///
    /// This is the only place the tax rate is applied, so the detail view and
    /// the edit flow can never disagree on the derived amounts.
    pub fn tax_amount(&self) -> f64 {
        if self.tax { self.tot_amount * TAX_RATE } else { 0.0 }
    }

    /// The total amount including sales tax.
    pub fn real_amount(&self) -> f64 {
        self.tot_amount + self.tax_amount()
    }
}

/// A builder for creating [Purchase] instances.
///
/// The required fields are set by [Purchase::build], the optional fields
/// default to no tax and an empty description.
#[derive(Debug, PartialEq, Clone)]
pub struct PurchaseBuilder {
    /// The date when the purchase occurred.
    ///
    /// This represents the transaction date (when money moved), not when it
    /// was recorded. The date must not be in the future.
    pub trans_date: Date,

    /// The name of the vendor the purchase was made at.
    ///
    /// # Examples
    /// - `"Campus Copy Center"`
    /// - `"Joe's Hardware"`
    pub vendor: String,

    /// The total amount of money spent in dollars. Must be zero or greater.
    pub tot_amount: f64,

    /// Whether sales tax was charged.
    pub tax: bool,

    /// A human-readable description of what was bought.
    pub description: String,

    /// The email of the owning account.
    pub email: String,
}

impl PurchaseBuilder {
    /// Set the tax-paid flag for the purchase.
    pub fn tax(mut self, tax: bool) -> Self {
        self.tax = tax;
        self
    }

    /// Set the description for the purchase.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// The editable fields of a purchase, as submitted by the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseUpdate {
    /// The new transaction date.
    pub trans_date: Date,
    /// The new vendor name.
    pub vendor: String,
    /// The new total amount.
    pub tot_amount: f64,
    /// The new tax-paid flag.
    pub tax: bool,
    /// The new description.
    pub description: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new purchase in the database from a builder.
///
/// The caller is expected to have validated the builder fields (see the
/// create endpoint), this function only maps SQL failures.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_purchase(
    builder: PurchaseBuilder,
    connection: &Connection,
) -> Result<Purchase, Error> {
    let purchase = connection
        .prepare(
            "INSERT INTO purchase (trans_date, vendor, tot_amount, tax, description, email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, trans_date, vendor, tot_amount, tax, description, email",
        )?
        .query_row(
            (
                builder.trans_date,
                builder.vendor,
                builder.tot_amount,
                builder.tax,
                builder.description,
                builder.email,
            ),
            map_purchase_row,
        )?;

    Ok(purchase)
}

/// Retrieve a purchase by its `id`, scoped to the account `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a purchase owned by `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_purchase(
    id: PurchaseId,
    email: &str,
    connection: &Connection,
) -> Result<Purchase, Error> {
    let purchase = connection
        .prepare(
            "SELECT id, trans_date, vendor, tot_amount, tax, description, email
             FROM purchase WHERE id = ?1 AND email = ?2",
        )?
        .query_row(params![id, email], map_purchase_row)?;

    Ok(purchase)
}

/// Retrieve all purchases owned by `email`, newest transaction date first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_purchases_for_owner(
    email: &str,
    connection: &Connection,
) -> Result<Vec<Purchase>, Error> {
    connection
        .prepare(
            "SELECT id, trans_date, vendor, tot_amount, tax, description, email
             FROM purchase WHERE email = :email
             ORDER BY trans_date DESC, id DESC",
        )?
        .query_map(&[(":email", &email)], map_purchase_row)?
        .map(|maybe_purchase| maybe_purchase.map_err(|error| error.into()))
        .collect()
}

/// Update the editable fields of a purchase, scoped to the account `email`.
///
/// The UPDATE statement filters by both `id` and `email` so that another
/// account's row can never be modified, even with a known ID.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingPurchase] if `id` does not refer to a purchase owned by `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_purchase(
    id: PurchaseId,
    email: &str,
    update: &PurchaseUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE purchase
        SET trans_date = ?1, vendor = ?2, tot_amount = ?3, tax = ?4, description = ?5
        WHERE id = ?6 AND email = ?7",
        params![
            update.trans_date,
            update.vendor,
            update.tot_amount,
            update.tax,
            update.description,
            id,
            email,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingPurchase);
    }

    Ok(())
}

/// Delete a purchase by its `id`, scoped to the account `email`.
///
/// The DELETE statement filters by both `id` and `email` so that another
/// account's row can never be deleted, even with a known ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingPurchase] if `id` does not refer to a purchase owned by `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_purchase(id: PurchaseId, email: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM purchase WHERE id = ?1 AND email = ?2",
        params![id, email],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPurchase);
    }

    Ok(())
}

/// Get the total number of purchases in the database, across all accounts.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
#[cfg(test)]
pub fn count_purchases(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM purchase;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the purchase table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_purchase_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS purchase (
                id INTEGER PRIMARY KEY,
                trans_date TEXT NOT NULL,
                vendor TEXT NOT NULL,
                tot_amount REAL NOT NULL,
                tax INTEGER NOT NULL DEFAULT 0,
                description TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL
                );

        CREATE INDEX IF NOT EXISTS idx_purchase_email_date ON purchase(email, trans_date);",
    )?;

    Ok(())
}

/// Map a database row to a Purchase.
pub fn map_purchase_row(row: &Row) -> Result<Purchase, rusqlite::Error> {
    let id = row.get(0)?;
    let trans_date = row.get(1)?;
    let vendor = row.get(2)?;
    let tot_amount = row.get(3)?;
    let tax = row.get(4)?;
    let description = row.get(5)?;
    let email = row.get(6)?;

    Ok(Purchase {
        id,
        trans_date,
        vendor,
        tot_amount,
        tax,
        description,
        email,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        purchase::{
            Purchase, PurchaseUpdate, count_purchases, create_purchase, delete_purchase,
            get_purchase, get_purchases_for_owner, update_purchase,
        },
    };

    const OWNER: &str = "foo@bar.baz";
    const SOMEONE_ELSE: &str = "intruder@example.com";

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", amount, OWNER)
                .tax(true)
                .description("nails"),
            &conn,
        );

        match result {
            Ok(purchase) => {
                assert!(purchase.id > 0);
                assert_eq!(purchase.vendor, "Joe's Hardware");
                assert_eq!(purchase.tot_amount, amount);
                assert!(purchase.tax);
                assert_eq!(purchase.description, "nails");
                assert_eq!(purchase.email, OWNER);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn get_purchase_succeeds_for_owner() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();

        let selected = get_purchase(inserted.id, OWNER, &conn).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_purchase_fails_for_other_account() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();

        let selected = get_purchase(inserted.id, SOMEONE_ELSE, &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_purchase_fails_with_invalid_id() {
        let conn = get_test_connection();

        let selected = get_purchase(1337, OWNER, &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn list_returns_only_owned_purchases_newest_first() {
        let conn = get_test_connection();
        let old = create_purchase(
            Purchase::build(date!(2025 - 09 - 01), "Old Vendor", 1.0, OWNER),
            &conn,
        )
        .unwrap();
        let new = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "New Vendor", 2.0, OWNER),
            &conn,
        )
        .unwrap();
        create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Other Vendor", 3.0, SOMEONE_ELSE),
            &conn,
        )
        .unwrap();

        let purchases = get_purchases_for_owner(OWNER, &conn).unwrap();

        assert_eq!(purchases, vec![new, old]);
    }

    #[test]
    fn update_succeeds_for_owner() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();
        let update = PurchaseUpdate {
            trans_date: date!(2025 - 10 - 06),
            vendor: "Campus Copy Center".to_owned(),
            tot_amount: 32.1,
            tax: true,
            description: "flyers".to_owned(),
        };

        update_purchase(inserted.id, OWNER, &update, &conn).unwrap();

        let got = get_purchase(inserted.id, OWNER, &conn).unwrap();
        assert_eq!(got.trans_date, update.trans_date);
        assert_eq!(got.vendor, update.vendor);
        assert_eq!(got.tot_amount, update.tot_amount);
        assert_eq!(got.tax, update.tax);
        assert_eq!(got.description, update.description);
        assert_eq!(got.email, OWNER);
    }

    #[test]
    fn update_fails_for_other_account_and_leaves_row_unchanged() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();
        let update = PurchaseUpdate {
            trans_date: date!(2025 - 10 - 06),
            vendor: "Hijacked".to_owned(),
            tot_amount: 0.0,
            tax: false,
            description: String::new(),
        };

        let result = update_purchase(inserted.id, SOMEONE_ELSE, &update, &conn);

        assert_eq!(result, Err(Error::UpdateMissingPurchase));
        let got = get_purchase(inserted.id, OWNER, &conn).unwrap();
        assert_eq!(got, inserted);
    }

    #[test]
    fn delete_succeeds_for_owner() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();

        delete_purchase(inserted.id, OWNER, &conn).unwrap();

        assert_eq!(get_purchase(inserted.id, OWNER, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_for_other_account_and_leaves_row_in_place() {
        let conn = get_test_connection();
        let inserted = create_purchase(
            Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
            &conn,
        )
        .unwrap();

        let result = delete_purchase(inserted.id, SOMEONE_ELSE, &conn);

        assert_eq!(result, Err(Error::DeleteMissingPurchase));
        assert_eq!(count_purchases(&conn), Ok(1));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_purchase(Purchase::build(today, "Vendor", i as f64, OWNER), &conn)
                .expect("Could not create purchase");
        }

        let got_count = count_purchases(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
