//! In-memory `ChatStore` for tests, with call counting and fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::catalog::Catalog;
use crate::models::conversation::{ConversationSession, ConversationTurn, NewSession, NewTurn};
use crate::models::user::{ApplicationRow, StudentGraph, StudentProfileRow, User};
use crate::store::{ChatStore, StoreError};

#[derive(Default, Clone)]
struct Tables {
    users: HashMap<i32, User>,
    profiles: HashMap<i32, StudentProfileRow>,
    skills: HashMap<i32, Vec<String>>,
    applications: HashMap<i32, Vec<ApplicationRow>>,
    catalog: Catalog,
    sessions: Vec<ConversationSession>,
    /// (seq, turn)
    turns: Vec<(u64, ConversationTurn)>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    fail_mid_delete: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: i32, first_name: &str, last_name: &str) -> Self {
        self.tables.lock().unwrap().users.insert(
            id,
            User {
                id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        self
    }

    pub fn with_profile(self, user_id: i32, profile: StudentProfileRow) -> Self {
        self.tables.lock().unwrap().profiles.insert(user_id, profile);
        self
    }

    pub fn with_skills(self, user_id: i32, skills: &[&str]) -> Self {
        self.tables
            .lock()
            .unwrap()
            .skills
            .insert(user_id, skills.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_applications(self, user_id: i32, applications: Vec<ApplicationRow>) -> Self {
        self.tables
            .lock()
            .unwrap()
            .applications
            .insert(user_id, applications);
        self
    }

    pub fn with_catalog(self, catalog: Catalog) -> Self {
        self.tables.lock().unwrap().catalog = catalog;
        self
    }

    pub fn remove_user(&self, id: i32) {
        self.tables.lock().unwrap().users.remove(&id);
    }

    /// Makes the next `delete_session` fail after the turns are gone but
    /// before the session row is, inside the transaction.
    pub fn fail_mid_delete(&self) {
        self.fail_mid_delete.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    pub fn turn_count(&self, conversation_id: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .turns
            .iter()
            .filter(|(_, t)| t.conversation_id == conversation_id)
            .count()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn push_turn(tables: &mut Tables, turn: NewTurn) -> ConversationTurn {
    let row = ConversationTurn {
        id: Uuid::new_v4(),
        conversation_id: turn.conversation_id,
        user_message: turn.user_message,
        bot_response: turn.bot_response,
        timestamp: turn.timestamp,
    };
    tables.next_seq += 1;
    tables.turns.push((tables.next_seq, row.clone()));
    row
}

fn sorted_turns(tables: &Tables, conversation_id: &str) -> Vec<ConversationTurn> {
    let mut turns: Vec<_> = tables
        .turns
        .iter()
        .filter(|(_, t)| t.conversation_id == conversation_id)
        .cloned()
        .collect();
    turns.sort_by(|(sa, a), (sb, b)| a.timestamp.cmp(&b.timestamp).then(sa.cmp(sb)));
    turns.into_iter().map(|(_, t)| t).collect()
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StoreError> {
        self.touch();
        Ok(self.tables.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn create_session(
        &self,
        session: NewSession,
        seed: NewTurn,
    ) -> Result<ConversationSession, StoreError> {
        self.touch();
        let mut tables = self.tables.lock().unwrap();
        if tables
            .sessions
            .iter()
            .any(|s| s.conversation_id == session.conversation_id)
        {
            return Err(StoreError::Unavailable(format!(
                "duplicate conversation_id {}",
                session.conversation_id
            )));
        }
        let row = ConversationSession {
            id: Uuid::new_v4(),
            conversation_id: session.conversation_id,
            user_id: session.user_id,
            start_time: session.start_time,
            end_time: None,
        };
        tables.sessions.push(row.clone());
        push_turn(&mut tables, seed);
        Ok(row)
    }

    async fn find_owned_session(
        &self,
        conversation_id: &str,
        user_id: i32,
    ) -> Result<Option<ConversationSession>, StoreError> {
        self.touch();
        Ok(self
            .tables
            .lock()
            .unwrap()
            .sessions
            .iter()
            .find(|s| s.conversation_id == conversation_id && s.user_id == user_id)
            .cloned())
    }

    async fn insert_turn(&self, turn: NewTurn) -> Result<ConversationTurn, StoreError> {
        self.touch();
        Ok(push_turn(&mut self.tables.lock().unwrap(), turn))
    }

    async fn list_turns(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        self.touch();
        Ok(sorted_turns(&self.tables.lock().unwrap(), conversation_id))
    }

    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        self.touch();
        let mut turns = sorted_turns(&self.tables.lock().unwrap(), conversation_id);
        turns.reverse();
        turns.truncate(limit.max(0) as usize);
        Ok(turns)
    }

    async fn delete_session(&self, conversation_id: &str) -> Result<(), StoreError> {
        self.touch();
        let mut tables = self.tables.lock().unwrap();

        // Work on a copy; it only replaces the live tables on commit.
        let mut tx = tables.clone();
        tx.turns.retain(|(_, t)| t.conversation_id != conversation_id);
        if self.fail_mid_delete.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection lost during delete".to_string()));
        }
        tx.sessions.retain(|s| s.conversation_id != conversation_id);

        *tables = tx;
        Ok(())
    }

    async fn student_graph(&self, user_id: i32) -> Result<Option<StudentGraph>, StoreError> {
        self.touch();
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.get(&user_id).map(|user| StudentGraph {
            user: user.clone(),
            profile: tables.profiles.get(&user_id).cloned(),
            skills: tables.skills.get(&user_id).cloned().unwrap_or_default(),
            applications: tables
                .applications
                .get(&user_id)
                .cloned()
                .unwrap_or_default(),
        }))
    }

    async fn catalog(&self) -> Result<Catalog, StoreError> {
        self.touch();
        Ok(self.tables.lock().unwrap().catalog.clone())
    }
}
