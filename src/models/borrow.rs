//! Borrow ledger model and the derivations the workflow runs on.
//!
//! The `borrows` table is the single source of truth for who holds what:
//! every availability figure is derived from it, nothing is stored twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Status of a borrow episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Requested,
    Accepted,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Requested => "requested",
            BorrowStatus::Accepted => "accepted",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requested" => Ok(BorrowStatus::Requested),
            "accepted" => Ok(BorrowStatus::Accepted),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One borrow episode in the append-only ledger.
///
/// A record with `returned_on = NULL` is *open*. Returning stamps
/// `returned_on` and leaves the row as a closed historical entry; records
/// are never deleted. At most one open record exists per (book, user) pair
/// (enforced by a partial unique index).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    /// Borrower username snapshot taken when the request was created
    pub borrower_name: String,
    pub status: BorrowStatus,
    pub borrowed_on: DateTime<Utc>,
    pub returned_on: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    /// An open record represents a copy currently out (or reserved by a
    /// pending request); it counts against availability either way.
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }
}

/// Number of open borrows in a book's ledger.
pub fn open_count(ledger: &[BorrowRecord]) -> usize {
    ledger.iter().filter(|r| r.is_open()).count()
}

/// The user's open record in this ledger, if any.
pub fn open_for_user(ledger: &[BorrowRecord], user_id: i32) -> Option<&BorrowRecord> {
    ledger.iter().find(|r| r.is_open() && r.user_id == user_id)
}

/// User ids currently holding an open borrow, in ledger order.
pub fn open_borrowers(ledger: &[BorrowRecord]) -> Vec<i32> {
    ledger
        .iter()
        .filter(|r| r.is_open())
        .map(|r| r.user_id)
        .collect()
}

/// Copies remaining once open borrows are subtracted. Derived, never stored.
pub fn available_quantity(quantity: i32, ledger: &[BorrowRecord]) -> i32 {
    quantity - open_count(ledger) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i32, user_id: i32, status: BorrowStatus, returned: bool) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id,
            book_id: 1,
            user_id,
            borrower_name: format!("user{}", user_id),
            status,
            borrowed_on: now,
            returned_on: if returned { Some(now) } else { None },
        }
    }

    #[test]
    fn empty_ledger_leaves_full_quantity() {
        let ledger: Vec<BorrowRecord> = Vec::new();
        assert_eq!(open_count(&ledger), 0);
        assert_eq!(available_quantity(3, &ledger), 3);
        assert!(open_borrowers(&ledger).is_empty());
    }

    #[test]
    fn open_requested_record_counts_against_availability() {
        let ledger = vec![record(1, 10, BorrowStatus::Requested, false)];
        assert_eq!(open_count(&ledger), 1);
        assert_eq!(available_quantity(1, &ledger), 0);
        assert_eq!(open_borrowers(&ledger), vec![10]);
    }

    #[test]
    fn closed_records_do_not_count() {
        let ledger = vec![
            record(1, 10, BorrowStatus::Accepted, true),
            record(2, 11, BorrowStatus::Requested, true),
        ];
        assert_eq!(open_count(&ledger), 0);
        assert_eq!(available_quantity(2, &ledger), 2);
        assert!(open_for_user(&ledger, 10).is_none());
    }

    #[test]
    fn open_for_user_ignores_other_users_and_closed_episodes() {
        let ledger = vec![
            record(1, 10, BorrowStatus::Accepted, true),
            record(2, 10, BorrowStatus::Requested, false),
            record(3, 11, BorrowStatus::Accepted, false),
        ];
        let open = open_for_user(&ledger, 10).expect("user 10 has an open record");
        assert_eq!(open.id, 2);
        assert_eq!(open.status, BorrowStatus::Requested);
        assert!(open_for_user(&ledger, 12).is_none());
    }

    #[test]
    fn availability_holds_across_a_full_episode() {
        // quantity=1: request -> accept -> return, invariant checked at
        // every step: available = quantity - open_count.
        let mut ledger = vec![record(1, 10, BorrowStatus::Requested, false)];
        assert_eq!(available_quantity(1, &ledger), 0);

        ledger[0].status = BorrowStatus::Accepted;
        ledger[0].borrowed_on = Utc::now();
        assert_eq!(available_quantity(1, &ledger), 0);

        ledger[0].returned_on = Some(Utc::now());
        assert_eq!(available_quantity(1, &ledger), 1);
        assert!(open_for_user(&ledger, 10).is_none());

        // A new episode may start afresh for the same pair.
        ledger.push(record(2, 10, BorrowStatus::Requested, false));
        assert_eq!(available_quantity(1, &ledger), 0);
        assert_eq!(open_for_user(&ledger, 10).map(|r| r.id), Some(2));
    }

    #[test]
    fn two_users_share_capacity() {
        // quantity=1: A holds the copy, B is shut out until A returns.
        let mut ledger = vec![record(1, 10, BorrowStatus::Requested, false)];
        assert_eq!(available_quantity(1, &ledger), 0);
        assert!(open_for_user(&ledger, 11).is_none());

        ledger[0].returned_on = Some(Utc::now());
        assert_eq!(available_quantity(1, &ledger), 1);

        ledger.push(record(2, 11, BorrowStatus::Requested, false));
        assert_eq!(available_quantity(1, &ledger), 0);
        assert_eq!(open_borrowers(&ledger), vec![11]);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!("requested".parse::<BorrowStatus>(), Ok(BorrowStatus::Requested));
        assert_eq!("ACCEPTED".parse::<BorrowStatus>(), Ok(BorrowStatus::Accepted));
        assert!("returned".parse::<BorrowStatus>().is_err());
        assert_eq!(BorrowStatus::Requested.to_string(), "requested");
    }
}
