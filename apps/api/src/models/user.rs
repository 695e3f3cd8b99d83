use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile → career → school chain. Every link past the user is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct StudentProfileRow {
    pub academic_year: Option<String>,
    pub career_name: Option<String>,
    pub school_name: Option<String>,
}

/// One application → project → institution chain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub project_name: String,
    pub institution_name: String,
    pub status: String,
}

/// Everything the store knows about a student, read in one pass.
#[derive(Debug, Clone)]
pub struct StudentGraph {
    pub user: User,
    pub profile: Option<StudentProfileRow>,
    pub skills: Vec<String>,
    pub applications: Vec<ApplicationRow>,
}
