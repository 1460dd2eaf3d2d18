//! Buy/sell listings persistence.
//!
//! A file-based SQLite store for domain listings. The schema is created on
//! open, so pointing the store at a fresh path is enough to start using it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::DomainScoutError;
use crate::utils::{normalize_input, validate_domain};

/// Billing cadence attached to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentPeriod {
    Monthly,
    Yearly,
}

impl fmt::Display for PaymentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for PaymentPeriod {
    type Err = DomainScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(DomainScoutError::ParseError {
                message: format!("Invalid payment period '{}': use 'monthly' or 'yearly'", other),
                content: None,
            }),
        }
    }
}

/// Whether a listing offers to buy or to sell a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ListingKind {
    Buy,
    Sell,
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for ListingKind {
    type Err = DomainScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(DomainScoutError::ParseError {
                message: format!("Invalid listing kind '{}': use 'buy' or 'sell'", other),
                content: None,
            }),
        }
    }
}

/// One persisted buy/sell listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Listing {
    /// Row id assigned by the store
    pub id: i64,
    /// Fully-qualified domain name, unique per store
    pub domain_name: String,
    /// Asking or offering price
    pub price: f64,
    /// Billing cadence for the price
    pub payment_period: PaymentPeriod,
    /// Buy or sell side
    pub kind: ListingKind,
    /// When the listing was created
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed listing store.
#[derive(Clone)]
pub struct ListingStore {
    pool: SqlitePool,
}

impl ListingStore {
    /// Open a store at the given path, creating the file and schema if needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, DomainScoutError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        tracing::debug!(path = %path.as_ref().display(), "opened listing store");
        Ok(store)
    }

    /// Create the listings table if it does not exist yet.
    async fn init_schema(&self) -> Result<(), DomainScoutError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_name TEXT NOT NULL UNIQUE,
                price REAL NOT NULL,
                payment_period TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a new listing.
    ///
    /// The domain name is normalized before insertion so casing and stray
    /// whitespace cannot produce near-duplicate rows.
    ///
    /// # Errors
    ///
    /// Returns `DomainScoutError::DuplicateListing` if a listing for the
    /// domain already exists, and `DomainScoutError::InvalidDomain` or
    /// `DomainScoutError::StoreError` for bad input.
    pub async fn add(
        &self,
        domain_name: &str,
        price: f64,
        payment_period: PaymentPeriod,
        kind: ListingKind,
    ) -> Result<Listing, DomainScoutError> {
        let domain = normalize_input(domain_name);
        validate_domain(&domain)?;

        if !price.is_finite() || price < 0.0 {
            return Err(DomainScoutError::store(
                "Price must be a non-negative number",
            ));
        }

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (domain_name, price, payment_period, kind, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&domain)
        .bind(price)
        .bind(payment_period)
        .bind(kind)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainScoutError::duplicate_listing(&domain);
                }
            }
            DomainScoutError::from(e)
        })?;

        tracing::debug!(domain = %listing.domain_name, id = listing.id, "stored listing");
        Ok(listing)
    }

    /// Fetch all listings, newest first.
    pub async fn list(&self) -> Result<Vec<Listing>, DomainScoutError> {
        sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Look up the listing for one domain name, if any.
    pub async fn get(&self, domain_name: &str) -> Result<Option<Listing>, DomainScoutError> {
        let domain = normalize_input(domain_name);

        sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE domain_name = ?")
            .bind(&domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Remove the listing for one domain name.
    ///
    /// Returns whether a listing existed.
    pub async fn remove(&self, domain_name: &str) -> Result<bool, DomainScoutError> {
        let domain = normalize_input(domain_name);

        let result = sqlx::query("DELETE FROM listings WHERE domain_name = ?")
            .bind(&domain)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::debug!(domain = %domain, "removed listing");
        }
        Ok(removed)
    }
}
