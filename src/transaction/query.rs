//! Database query helpers for the transaction listing.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    user::{Role, UserID},
};

use super::core::{Transaction, map_transaction_row};

/// Which transactions a caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionScope {
    /// Every transaction in the store.
    All,
    /// Only transactions owned by the given user.
    OwnedBy(UserID),
}

impl TransactionScope {
    /// The scope for a caller with the given ID and role.
    ///
    /// Admins and managers see everything; everyone else sees only their
    /// own records.
    pub fn for_caller(caller: UserID, role: Role) -> Self {
        if role.is_privileged() {
            TransactionScope::All
        } else {
            TransactionScope::OwnedBy(caller)
        }
    }
}

/// The aggregate figures for a transaction scope.
#[derive(Debug, PartialEq)]
pub struct ScopeTotals {
    /// The number of transactions in the scope.
    pub count: u64,
    /// The sum of all income amounts in the scope.
    pub income: f64,
    /// The sum of all expense amounts in the scope.
    pub expense: f64,
}

impl ScopeTotals {
    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Get one page of the transactions in `scope`, newest first.
///
/// Rows are ordered by creation time and then by ID, so the order stays
/// stable for records created in the same instant. `page` starts at 1.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails or a row cannot be
/// mapped.
pub fn get_transaction_page(
    scope: TransactionScope,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let limit = page_size as i64;
    let offset = offset as i64;

    match scope {
        TransactionScope::All => connection
            .prepare(
                "SELECT id, owner_id, kind, category, amount, note, occurred_on, created_at, updated_at
                 FROM \"transaction\"
                 ORDER BY created_at DESC, id DESC
                 LIMIT :limit OFFSET :offset",
            )?
            .query_map(&[(":limit", &limit), (":offset", &offset)], map_transaction_row)?
            .map(|transaction_result| transaction_result.map_err(Error::SqlError))
            .collect(),
        TransactionScope::OwnedBy(owner) => connection
            .prepare(
                "SELECT id, owner_id, kind, category, amount, note, occurred_on, created_at, updated_at
                 FROM \"transaction\"
                 WHERE owner_id = :owner
                 ORDER BY created_at DESC, id DESC
                 LIMIT :limit OFFSET :offset",
            )?
            .query_map(
                &[(":owner", &owner.as_i64()), (":limit", &limit), (":offset", &offset)],
                map_transaction_row,
            )?
            .map(|transaction_result| transaction_result.map_err(Error::SqlError))
            .collect(),
    }
}

/// Compute the aggregate figures over the full `scope`, not just one page.
///
/// Paging through a listing must never change the totals, so these sums are
/// taken over every row the caller can see.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_scope_totals(
    scope: TransactionScope,
    connection: &Connection,
) -> Result<ScopeTotals, Error> {
    const TOTALS_COLUMNS: &str = "SELECT COUNT(id),
            COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0.0),
            COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0.0)
         FROM \"transaction\"";

    let totals = match scope {
        TransactionScope::All => {
            connection.query_row(TOTALS_COLUMNS, [], map_totals_row)?
        }
        TransactionScope::OwnedBy(owner) => connection.query_row(
            &format!("{TOTALS_COLUMNS} WHERE owner_id = :owner"),
            &[(":owner", &owner.as_i64())],
            map_totals_row,
        )?,
    };

    Ok(totals)
}

fn map_totals_row(row: &Row) -> Result<ScopeTotals, rusqlite::Error> {
    Ok(ScopeTotals {
        count: row.get::<_, i64>(0)? as u64,
        income: row.get(1)?,
        expense: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        password::PasswordHash,
        transaction::{
            Transaction, TransactionKind, create_transaction,
            query::{ScopeTotals, TransactionScope, get_scope_totals, get_transaction_page},
        },
        user::{NewUser, Role, UserID, create_user},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_user(conn: &Connection, email: &str) -> UserID {
        create_user(
            NewUser {
                name: "Test User".to_owned(),
                email: email.to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                role: Role::User,
            },
            conn,
        )
        .expect("Could not create test user")
        .id
    }

    #[test]
    fn scope_for_privileged_roles_is_all() {
        let caller = UserID::new(1);

        assert_eq!(
            TransactionScope::for_caller(caller, Role::Admin),
            TransactionScope::All
        );
        assert_eq!(
            TransactionScope::for_caller(caller, Role::Manager),
            TransactionScope::All
        );
        assert_eq!(
            TransactionScope::for_caller(caller, Role::User),
            TransactionScope::OwnedBy(caller)
        );
    }

    #[test]
    fn owned_scope_excludes_other_users_transactions() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        let other = create_test_user(&conn, "qux@bar.baz");
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Income,
                "Salary",
                1000.0,
                date!(2025 - 01 - 05),
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                other,
                TransactionKind::Expense,
                "Rent",
                800.0,
                date!(2025 - 01 - 06),
            ),
            &conn,
        )
        .unwrap();

        let got =
            get_transaction_page(TransactionScope::OwnedBy(owner), 1, 10, &conn).unwrap();

        assert_eq!(got.len(), 1, "want 1 transaction, got {}", got.len());
        assert!(got.iter().all(|transaction| transaction.owner_id == owner));
    }

    #[test]
    fn all_scope_includes_every_transaction() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        let other = create_test_user(&conn, "qux@bar.baz");
        for user_id in [owner, other] {
            create_transaction(
                Transaction::build(
                    user_id,
                    TransactionKind::Income,
                    "Salary",
                    1000.0,
                    date!(2025 - 01 - 05),
                ),
                &conn,
            )
            .unwrap();
        }

        let got = get_transaction_page(TransactionScope::All, 1, 10, &conn).unwrap();

        assert_eq!(got.len(), 2, "want 2 transactions, got {}", got.len());
    }

    #[test]
    fn page_is_ordered_newest_first() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        for i in 1..=3 {
            create_transaction(
                Transaction::build(
                    owner,
                    TransactionKind::Income,
                    &format!("transaction #{i}"),
                    i as f64,
                    date!(2025 - 01 - 05),
                ),
                &conn,
            )
            .unwrap();
        }

        let got = get_transaction_page(TransactionScope::All, 1, 10, &conn).unwrap();

        let categories: Vec<&str> = got
            .iter()
            .map(|transaction| transaction.category.as_str())
            .collect();
        assert_eq!(
            categories,
            ["transaction #3", "transaction #2", "transaction #1"]
        );
    }

    #[test]
    fn second_page_of_size_two_over_three_rows_has_one_row() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        for i in 1..=3 {
            create_transaction(
                Transaction::build(
                    owner,
                    TransactionKind::Income,
                    &format!("transaction #{i}"),
                    i as f64,
                    date!(2025 - 01 - 05),
                ),
                &conn,
            )
            .unwrap();
        }

        let got = get_transaction_page(TransactionScope::All, 2, 2, &conn).unwrap();

        assert_eq!(got.len(), 1, "want 1 transaction, got {}", got.len());
        // The oldest row lands on the last page.
        assert_eq!(got[0].category, "transaction #1");
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Income,
                "Salary",
                1000.0,
                date!(2025 - 01 - 05),
            ),
            &conn,
        )
        .unwrap();

        let got = get_transaction_page(TransactionScope::All, 5, 10, &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn totals_cover_the_full_scope() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Income,
                "Salary",
                1000.0,
                date!(2025 - 01 - 05),
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Income,
                "Bonus",
                500.0,
                date!(2025 - 01 - 06),
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Expense,
                "Rent",
                300.0,
                date!(2025 - 01 - 07),
            ),
            &conn,
        )
        .unwrap();

        let totals = get_scope_totals(TransactionScope::OwnedBy(owner), &conn).unwrap();

        assert_eq!(
            totals,
            ScopeTotals {
                count: 3,
                income: 1500.0,
                expense: 300.0,
            }
        );
        assert_eq!(totals.balance(), 1200.0);
    }

    #[test]
    fn totals_exclude_other_users_transactions() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");
        let other = create_test_user(&conn, "qux@bar.baz");
        create_transaction(
            Transaction::build(
                owner,
                TransactionKind::Income,
                "Salary",
                1000.0,
                date!(2025 - 01 - 05),
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                other,
                TransactionKind::Income,
                "Salary",
                9999.0,
                date!(2025 - 01 - 05),
            ),
            &conn,
        )
        .unwrap();

        let totals = get_scope_totals(TransactionScope::OwnedBy(owner), &conn).unwrap();

        assert_eq!(totals.income, 1000.0);
        assert_eq!(totals.count, 1);
    }

    #[test]
    fn totals_are_zero_for_empty_scope() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "foo@bar.baz");

        let totals = get_scope_totals(TransactionScope::OwnedBy(owner), &conn).unwrap();

        assert_eq!(
            totals,
            ScopeTotals {
                count: 0,
                income: 0.0,
                expense: 0.0,
            }
        );
    }
}
