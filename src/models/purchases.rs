use crate::store::entity::{Entity, Table, int, opt_text, real, text};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Await,
    Accept,
    Decline,
}

impl PurchaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseStatus::Await => "await",
            PurchaseStatus::Accept => "accept",
            PurchaseStatus::Decline => "decline",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "await" | "awaiting" => Ok(PurchaseStatus::Await),
            "accept" | "accepted" => Ok(PurchaseStatus::Accept),
            "decline" | "declined" => Ok(PurchaseStatus::Decline),
            other => Err(format!("unknown purchase status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub purchase_date: String,
    pub description: Option<String>,
    pub purchaser_id: String,
    pub status: PurchaseStatus,
    pub solver_id: Option<String>,
    pub solution_date: Option<String>,
}

impl Entity for Purchase {
    const TABLE: Table = Table::Purchases;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "price",
        "quantity",
        "purchase_date",
        "description",
        "purchaser_id",
        "status",
        "solver_id",
        "solution_date",
    ];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let status: String = row.get("status")?;
        let status = status.parse::<PurchaseStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::other(e)),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            purchase_date: row.get("purchase_date")?,
            description: row.get("description")?,
            purchaser_id: row.get("purchaser_id")?,
            status,
            solver_id: row.get("solver_id")?,
            solution_date: row.get("solution_date")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            int(self.id),
            text(&self.name),
            real(self.price),
            int(self.quantity),
            text(&self.purchase_date),
            opt_text(self.description.as_deref()),
            text(&self.purchaser_id),
            text(self.status.as_str()),
            opt_text(self.solver_id.as_deref()),
            opt_text(self.solution_date.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseSortingOrder {
    #[default]
    PurchaseDate,
    Name,
    Price,
}

impl PurchaseSortingOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseSortingOrder::PurchaseDate => "purchaseDate",
            PurchaseSortingOrder::Name => "name",
            PurchaseSortingOrder::Price => "price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingDirection {
    Asc,
    #[default]
    Desc,
}

impl SortingDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortingDirection::Asc => "asc",
            SortingDirection::Desc => "desc",
        }
    }
}

/// Filter applied to every page a purchases paginator requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseFilter {
    pub sort_by: PurchaseSortingOrder,
    pub direction: SortingDirection,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<PurchaseStatus>,
}

/// One page request: filter plus page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub filter: PurchaseFilter,
}
