use serde::Serialize;

/// Stand-in for any optional profile link that is absent.
pub const NOT_SPECIFIED: &str = "No especificado";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApplication {
    pub name: String,
    pub institution: String,
    pub status: String,
}

/// Request-scoped snapshot of one student. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentContext {
    pub name: String,
    pub career: String,
    pub school: String,
    pub academic_year: String,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectApplication>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProject {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogInstitution {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogCareer {
    pub name: String,
    pub school: String,
}

/// Request-scoped snapshot of the institution-wide catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemContext {
    pub projects: Vec<CatalogProject>,
    pub institutions: Vec<CatalogInstitution>,
    pub careers: Vec<CatalogCareer>,
}
