//! Context Aggregator: turns the relational graph into prompt-ready snapshots.
//!
//! Both contexts are derived fresh on every call. Nothing is cached.

use tracing::debug;

use crate::context::models::{
    CatalogCareer, CatalogInstitution, CatalogProject, ProjectApplication, StudentContext,
    SystemContext, NOT_SPECIFIED,
};
use crate::errors::AppError;
use crate::models::catalog::Catalog;
use crate::models::user::StudentGraph;
use crate::store::ChatStore;

/// Loads the student's profile graph. A missing user is `NotFound`; a user
/// without profile data still yields a context filled with sentinels.
pub async fn get_student_context(
    store: &dyn ChatStore,
    user_id: i32,
) -> Result<StudentContext, AppError> {
    let graph = store
        .student_graph(user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(user_id))?;

    let context = student_context_from_graph(graph);
    debug!(
        "Student context for user {user_id}: {} skills, {} projects",
        context.skills.len(),
        context.projects.len()
    );
    Ok(context)
}

/// Full catalog read. Unpaginated: fine while the catalog stays small.
pub async fn get_system_context(store: &dyn ChatStore) -> Result<SystemContext, AppError> {
    let catalog = store.catalog().await?;
    Ok(system_context_from_catalog(catalog))
}

pub fn student_context_from_graph(graph: StudentGraph) -> StudentContext {
    let profile = graph.profile.unwrap_or_default();

    StudentContext {
        name: graph.user.full_name(),
        career: or_not_specified(profile.career_name),
        school: or_not_specified(profile.school_name),
        academic_year: or_not_specified(profile.academic_year),
        skills: graph.skills,
        projects: graph
            .applications
            .into_iter()
            .map(|a| ProjectApplication {
                name: a.project_name,
                institution: a.institution_name,
                status: a.status,
            })
            .collect(),
    }
}

pub fn system_context_from_catalog(catalog: Catalog) -> SystemContext {
    SystemContext {
        projects: catalog
            .projects
            .into_iter()
            .map(|p| CatalogProject { name: p.name })
            .collect(),
        institutions: catalog
            .institutions
            .into_iter()
            .map(|i| CatalogInstitution { name: i.name })
            .collect(),
        careers: catalog
            .careers
            .into_iter()
            .map(|c| CatalogCareer {
                name: c.name,
                school: or_not_specified(c.school_name),
            })
            .collect(),
    }
}

fn or_not_specified(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}
