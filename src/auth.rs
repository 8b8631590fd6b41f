use crate::sheets::models::Employee;
use dashmap::DashMap;

/// Process-wide mapping from a chat session to the authenticated
/// employee. Populated on successful phone login; entries never expire
/// and are lost on restart.
#[derive(Default)]
pub struct AuthRegistry {
    users: DashMap<i64, Employee>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Records the mapping, overwriting any prior login for the chat.
    pub fn login(&self, chat_id: i64, employee: Employee) {
        self.users.insert(chat_id, employee);
    }

    pub fn employee(&self, chat_id: i64) -> Option<Employee> {
        self.users.get(&chat_id).map(|entry| entry.clone())
    }
}
