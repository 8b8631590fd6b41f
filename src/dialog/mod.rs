mod decide;
mod edit;
mod menu;
pub mod state;
mod submit;

use crate::auth::AuthRegistry;
use crate::sheets::models::Employee;
use crate::sheets::SheetsGateway;
use anyhow::Result;
use state::{ConversationState, SessionStore};

pub const SKIP_COMMENT: &str = "Пропустити";

// Menu button labels double as command tokens on the wire: pressing a
// reply-keyboard button sends its label back as plain text.
pub const MENU_NEW_SHIFT: &str = "Добавить новую смену";
pub const MENU_EDIT_SHIFT: &str = "Редактировать поданую смену";
pub const MENU_MY_SHIFTS: &str = "Мои смены (7 дней)";
pub const MENU_MY_PENDING: &str = "Заявки в ожидании";
pub const MENU_MANAGER_PENDING: &str = "В очікуванні";
pub const MENU_SUBORDINATES: &str = "Мої співробітники";
pub const MENU_SHEET_LINK: &str = "Переглянути таблицю";
pub const MENU_HELP: &str = "Помощь";

const MSG_LOGIN_FIRST: &str = "Спочатку авторизуйся, поділившись номером.";
const MSG_MANAGER_ONLY: &str = "Ця дія доступна лише керівникам.";

/// Inbound chat event, already stripped of transport details.
#[derive(Debug, Clone)]
pub enum Event {
    Start,
    Text(String),
    Contact { phone: String, own: bool },
    Callback { data: String },
}

/// Keyboard layouts the transport knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    ShareContact,
    Menu { manager: bool },
    SkipComment,
    Remove,
    Decision { shift_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Message {
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// Popup shown in response to a callback query.
    Alert(String),
}

impl Outgoing {
    fn text(text: impl Into<String>) -> Self {
        Outgoing::Message {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Outgoing::Message {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Conversation engine: advances per-session state in response to
/// events and produces renderable replies. Owns no transport concerns,
/// so the whole state graph is exercisable without a live chat.
pub struct Engine {
    pub(crate) gateway: SheetsGateway,
    pub(crate) auth: AuthRegistry,
    pub(crate) sessions: SessionStore,
    pub(crate) sheet_link: String,
}

impl Engine {
    pub fn new(gateway: SheetsGateway, auth: AuthRegistry, sheet_link: String) -> Self {
        Self {
            gateway,
            auth,
            sessions: SessionStore::new(),
            sheet_link,
        }
    }

    pub async fn handle(&self, chat_id: i64, event: Event) -> Result<Vec<Outgoing>> {
        match event {
            Event::Start => self.handle_start(chat_id),
            Event::Contact { phone, own } => self.handle_contact(chat_id, &phone, own).await,
            Event::Callback { data } => self.handle_callback(chat_id, &data).await,
            Event::Text(text) => self.handle_text(chat_id, text.trim()).await,
        }
    }

    async fn handle_text(&self, chat_id: i64, text: &str) -> Result<Vec<Outgoing>> {
        // Menu commands win over an in-progress flow; entering a flow
        // always starts it from scratch.
        match text {
            MENU_NEW_SHIFT => return self.start_submission(chat_id).await,
            MENU_EDIT_SHIFT => return self.start_edit(chat_id).await,
            MENU_MY_SHIFTS => return self.list_recent_shifts(chat_id).await,
            MENU_MY_PENDING => return self.list_own_pending(chat_id).await,
            MENU_MANAGER_PENDING => return self.list_manager_pending(chat_id).await,
            MENU_SUBORDINATES => return self.list_subordinates(chat_id).await,
            MENU_SHEET_LINK => return self.sheet_link_reply(chat_id),
            MENU_HELP => return self.help(chat_id),
            _ => {}
        }

        match self.sessions.get(chat_id) {
            Some(ConversationState::SubmitDate) => self.submit_date(chat_id, text),
            Some(ConversationState::SubmitShiftHours { shift_date }) => {
                self.submit_shift_hours(chat_id, shift_date, text)
            }
            Some(ConversationState::SubmitOvertime {
                shift_date,
                shift_hours,
            }) => self.submit_overtime(chat_id, shift_date, shift_hours, text),
            Some(ConversationState::SubmitComment {
                shift_date,
                shift_hours,
                overtime_hours,
            }) => {
                self.submit_comment(chat_id, shift_date, shift_hours, overtime_hours, text)
                    .await
            }
            Some(ConversationState::EditSelect) => self.edit_select(chat_id, text).await,
            Some(ConversationState::EditDate {
                shift_id,
                prev_shift_hours,
                prev_overtime_hours,
                prev_comment,
            }) => self.edit_date(
                chat_id,
                shift_id,
                prev_shift_hours,
                prev_overtime_hours,
                prev_comment,
                text,
            ),
            Some(ConversationState::EditShiftHours {
                shift_id,
                shift_date,
                prev_overtime_hours,
                prev_comment,
            }) => self.edit_shift_hours(
                chat_id,
                shift_id,
                shift_date,
                prev_overtime_hours,
                prev_comment,
                text,
            ),
            Some(ConversationState::EditOvertime {
                shift_id,
                shift_date,
                shift_hours,
                prev_comment,
            }) => self.edit_overtime(chat_id, shift_id, shift_date, shift_hours, prev_comment, text),
            Some(ConversationState::EditComment {
                shift_id,
                shift_date,
                shift_hours,
                overtime_hours,
            }) => {
                self.edit_comment(chat_id, shift_id, shift_date, shift_hours, overtime_hours, text)
                    .await
            }
            Some(ConversationState::DecideComment { shift_id, decision }) => {
                self.finalize_decision(chat_id, shift_id, decision, text).await
            }
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn authorized(&self, chat_id: i64) -> Option<Employee> {
        self.auth.employee(chat_id)
    }

    /// Authorization failure drops the in-progress form but keeps the
    /// login (if any), so the session stays usable for a new flow.
    pub(crate) fn deny_unauthorized(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sessions.clear(chat_id);
        vec![Outgoing::with_keyboard(MSG_LOGIN_FIRST, Keyboard::ShareContact)]
    }

    pub(crate) fn deny_not_manager(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sessions.clear(chat_id);
        vec![Outgoing::text(MSG_MANAGER_ONLY)]
    }
}
