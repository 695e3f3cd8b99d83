use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i32,
    pub name: String,
    pub institution_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InstitutionRow {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerRow {
    pub id: i32,
    pub name: String,
    pub school_name: Option<String>,
}

/// Institution-wide catalog. Read whole, unpaginated.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub projects: Vec<ProjectRow>,
    pub institutions: Vec<InstitutionRow>,
    pub careers: Vec<CareerRow>,
}
