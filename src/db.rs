//! Creates the tables for the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, purchase::create_purchase_table};

/// Create the tables for the application's domain models.
///
/// The tables are created within a single exclusive transaction so that a
/// partially initialized schema is never left behind.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_purchase_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
