use crate::sheets::models::Decision;
use chrono::NaiveDate;
use dashmap::DashMap;

/// Per-session conversation position. The three flows share one slot:
/// starting any flow replaces whatever was in progress, so no field can
/// leak from an abandoned form into a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    // Shift submission
    SubmitDate,
    SubmitShiftHours {
        shift_date: NaiveDate,
    },
    SubmitOvertime {
        shift_date: NaiveDate,
        shift_hours: f64,
    },
    SubmitComment {
        shift_date: NaiveDate,
        shift_hours: f64,
        overtime_hours: f64,
    },

    // Shift edit; previous values ride along for the prompts only.
    EditSelect,
    EditDate {
        shift_id: i64,
        prev_shift_hours: f64,
        prev_overtime_hours: f64,
        prev_comment: String,
    },
    EditShiftHours {
        shift_id: i64,
        shift_date: NaiveDate,
        prev_overtime_hours: f64,
        prev_comment: String,
    },
    EditOvertime {
        shift_id: i64,
        shift_date: NaiveDate,
        shift_hours: f64,
        prev_comment: String,
    },
    EditComment {
        shift_id: i64,
        shift_date: NaiveDate,
        shift_hours: f64,
        overtime_hours: f64,
    },

    // Manager decision
    DecideComment {
        shift_id: i64,
        decision: Decision,
    },
}

/// In-memory conversation state per chat session. Nothing survives a
/// restart; in-flight forms are simply lost.
#[derive(Default)]
pub struct SessionStore {
    states: DashMap<i64, ConversationState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn get(&self, chat_id: i64) -> Option<ConversationState> {
        self.states.get(&chat_id).map(|state| state.clone())
    }

    pub fn set(&self, chat_id: i64, state: ConversationState) {
        self.states.insert(chat_id, state);
    }

    pub fn clear(&self, chat_id: i64) {
        self.states.remove(&chat_id);
    }
}
