use crate::models::purchases::{Purchase, PurchaseStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSolutionDto {
    pub status: PurchaseStatus,
    #[serde(default)]
    pub solver_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub purchase_date: String,
    #[serde(default)]
    pub description: Option<String>,
    pub purchaser_id: String,
    pub solution: PurchaseSolutionDto,
}

impl PurchaseDto {
    pub fn to_entity(&self) -> Purchase {
        Purchase {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            quantity: self.quantity,
            purchase_date: self.purchase_date.clone(),
            description: self.description.clone(),
            purchaser_id: self.purchaser_id.clone(),
            status: self.solution.status,
            solver_id: self.solution.solver_id.clone(),
            solution_date: self.solution.date.clone(),
        }
    }
}

/// One page of a paged collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreateRequest {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub purchase_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResolveRequest {
    pub status: PurchaseStatus,
}
