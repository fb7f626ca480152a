use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub items: Vec<String>,
    #[serde(skip)]
    pub cache_key: String,
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Deserialize)]
pub struct NewOrder {
    pub items: Vec<String>,
}
