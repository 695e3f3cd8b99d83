//! Prompt Composer. A pure function of its arguments: same inputs, same bytes.

use crate::context::models::{StudentContext, SystemContext, NOT_SPECIFIED};
use crate::context::prompts::{ASSISTANT_LABEL, PERSONA_PREAMBLE, REPLY_CUE, USER_LABEL};
use crate::models::conversation::ConversationTurn;

/// Builds the full prompt for one inbound message.
///
/// Section order is fixed: persona, student/catalog block, per-project
/// detail, history, new message, reply cue. `history` must already be
/// oldest-first.
pub fn build_prompt(
    message: &str,
    student: Option<&StudentContext>,
    history: &[ConversationTurn],
    system: &SystemContext,
) -> String {
    let mut sections: Vec<String> = vec![PERSONA_PREAMBLE.to_string()];

    if let Some(student) = student {
        sections.push(student_block(student, system));
        if !student.projects.is_empty() {
            sections.push(project_detail_block(student));
        }
    }

    if !history.is_empty() {
        sections.push(history_block(history));
    }

    sections.push(format!("Nuevo mensaje del usuario: {message}\n{REPLY_CUE}"));

    sections.join("\n\n")
}

fn student_block(student: &StudentContext, system: &SystemContext) -> String {
    let system_projects = join_or_sentinel(system.projects.iter().map(|p| p.name.clone()));
    let system_institutions =
        join_or_sentinel(system.institutions.iter().map(|i| i.name.clone()));
    let system_careers = join_or_sentinel(
        system
            .careers
            .iter()
            .map(|c| format!("{} ({})", c.name, c.school)),
    );
    let skills = join_or_sentinel(student.skills.iter().cloned());
    let projects = join_or_sentinel(
        student
            .projects
            .iter()
            .map(|p| format!("{} ({})", p.name, p.institution)),
    );

    [
        "Información del usuario:".to_string(),
        format!("- Proyectos del sistema: {system_projects}"),
        format!("- Instituciones del sistema: {system_institutions}"),
        format!("- Carreras del sistema: {system_careers}"),
        format!("- Nombre: {}", student.name),
        format!("- Carrera: {}", student.career),
        format!("- Escuela: {}", student.school),
        format!("- Habilidades: {skills}"),
        format!("- Proyectos: {projects}"),
        format!("- Año académico: {}", student.academic_year),
    ]
    .join("\n")
}

fn project_detail_block(student: &StudentContext) -> String {
    let mut block = String::from("Proyectos en los que participa:");
    for project in &student.projects {
        block.push_str(&format!(
            "\n- {} ({}): {}",
            project.name, project.institution, project.status
        ));
    }
    block
}

fn history_block(history: &[ConversationTurn]) -> String {
    let mut block = String::from("Historial de la conversación:");
    for turn in history {
        block.push_str(&format!("\n{USER_LABEL}: {}", turn.user_message));
        block.push_str(&format!("\n{ASSISTANT_LABEL}: {}", turn.bot_response));
    }
    block
}

fn join_or_sentinel(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::models::{
        CatalogCareer, CatalogInstitution, CatalogProject, ProjectApplication,
    };
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn student() -> StudentContext {
        StudentContext {
            name: "Ana Pérez".to_string(),
            career: "Técnico en Ingeniería de Software".to_string(),
            school: "Escuela de Computación".to_string(),
            academic_year: "2".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            projects: vec![ProjectApplication {
                name: "Huerto escolar".to_string(),
                institution: "Alcaldía".to_string(),
                status: "pendiente".to_string(),
            }],
        }
    }

    fn system() -> SystemContext {
        SystemContext {
            projects: vec![CatalogProject {
                name: "Huerto escolar".to_string(),
            }],
            institutions: vec![CatalogInstitution {
                name: "Alcaldía".to_string(),
            }],
            careers: vec![CatalogCareer {
                name: "Técnico en Ingeniería de Software".to_string(),
                school: "Escuela de Computación".to_string(),
            }],
        }
    }

    fn turn(user: &str, bot: &str, second: u32) -> ConversationTurn {
        ConversationTurn {
            id: Uuid::new_v4(),
            conversation_id: "conv_1_abc".to_string(),
            user_message: user.to_string(),
            bot_response: bot.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, second).unwrap(),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let history = vec![turn("hola", "¡Hola!", 0)];
        let a = build_prompt("¿Cuál es mi carrera?", Some(&student()), &history, &system());
        let b = build_prompt("¿Cuál es mi carrera?", Some(&student()), &history, &system());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let history = vec![turn("hola", "¡Hola!", 0)];
        let prompt = build_prompt("¿Cuál es mi carrera?", Some(&student()), &history, &system());

        let persona = prompt.find("CHAT FELIZ").unwrap();
        let info = prompt.find("Información del usuario:").unwrap();
        let detail = prompt.find("Proyectos en los que participa:").unwrap();
        let hist = prompt.find("Historial de la conversación:").unwrap();
        let new_message = prompt.find("Nuevo mensaje del usuario: ¿Cuál es mi carrera?").unwrap();

        assert!(persona < info);
        assert!(info < detail);
        assert!(detail < hist);
        assert!(hist < new_message);
        assert!(prompt.ends_with(REPLY_CUE));
    }

    #[test]
    fn test_student_block_lists_catalog_and_profile() {
        let prompt = build_prompt("hola", Some(&student()), &[], &system());
        assert!(prompt.contains("- Proyectos del sistema: Huerto escolar"));
        assert!(prompt.contains("- Instituciones del sistema: Alcaldía"));
        assert!(prompt.contains(
            "- Carreras del sistema: Técnico en Ingeniería de Software (Escuela de Computación)"
        ));
        assert!(prompt.contains("- Habilidades: Rust, SQL"));
        assert!(prompt.contains("- Proyectos: Huerto escolar (Alcaldía)"));
        assert!(prompt.contains("- Huerto escolar (Alcaldía): pendiente"));
        assert_eq!(prompt.matches("- Año académico:").count(), 1);
    }

    #[test]
    fn test_empty_lists_render_sentinel_and_skip_detail() {
        let mut student = student();
        student.skills.clear();
        student.projects.clear();
        let prompt = build_prompt("hola", Some(&student), &[], &SystemContext::default());

        assert!(prompt.contains(&format!("- Habilidades: {NOT_SPECIFIED}")));
        assert!(prompt.contains(&format!("- Proyectos: {NOT_SPECIFIED}")));
        assert!(prompt.contains(&format!("- Proyectos del sistema: {NOT_SPECIFIED}")));
        assert!(!prompt.contains("Proyectos en los que participa:"));
    }

    #[test]
    fn test_without_student_or_history_only_persona_and_message() {
        let prompt = build_prompt("hola", None, &[], &system());
        assert!(!prompt.contains("Información del usuario:"));
        assert!(!prompt.contains("Historial de la conversación:"));
        assert!(prompt.starts_with(PERSONA_PREAMBLE));
        assert!(prompt.ends_with("Nuevo mensaje del usuario: hola\nRespuesta del asistente:"));
    }

    #[test]
    fn test_history_rendered_in_given_order() {
        let history = vec![turn("primero", "uno", 0), turn("segundo", "dos", 1)];
        let prompt = build_prompt("tercero", None, &history, &system());

        assert!(prompt.contains(
            "Historial de la conversación:\nUsuario: primero\nAsistente: uno\nUsuario: segundo\nAsistente: dos"
        ));
    }
}
