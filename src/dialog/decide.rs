use super::state::ConversationState;
use super::{Engine, Keyboard, Outgoing, SKIP_COMMENT};
use crate::sheets::models::Decision;
use anyhow::Result;

impl Engine {
    /// Entry is a button press on a rendered shift, not a menu command:
    /// the callback token carries the intent and the shift id.
    pub(super) async fn handle_callback(&self, chat_id: i64, data: &str) -> Result<Vec<Outgoing>> {
        let (action, id_text) = match data.split_once(':') {
            Some(parts) => parts,
            None => return Ok(Vec::new()),
        };
        let decision = match Decision::from_action(action) {
            Some(decision) => decision,
            None => return Ok(Vec::new()),
        };
        let shift_id: i64 = match id_text.trim().parse() {
            Ok(id) => id,
            Err(_) => return Ok(Vec::new()),
        };

        let is_manager = self
            .authorized(chat_id)
            .map(|employee| employee.is_manager())
            .unwrap_or(false);
        if !is_manager {
            self.sessions.clear(chat_id);
            return Ok(vec![Outgoing::Alert("Немає прав.".to_string())]);
        }

        self.sessions
            .set(chat_id, ConversationState::DecideComment { shift_id, decision });
        Ok(vec![Outgoing::with_keyboard(
            "Додай коментар до рішення (або натисни «Пропустити»).",
            Keyboard::SkipComment,
        )])
    }

    pub(super) async fn finalize_decision(
        &self,
        chat_id: i64,
        shift_id: i64,
        decision: Decision,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        if !employee.is_manager() {
            return Ok(self.deny_not_manager(chat_id));
        }
        let comment = if text == SKIP_COMMENT { "" } else { text };

        let result = self
            .gateway
            .update_shift_status(
                shift_id,
                decision,
                &employee.name,
                comment,
                self.gateway.now(),
            )
            .await;
        let (record, changed) = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.sessions.clear(chat_id);
                return Err(err);
            }
        };
        self.sessions.clear(chat_id);

        let menu = Keyboard::Menu { manager: true };
        match (record, changed) {
            (None, _) => Ok(vec![Outgoing::text("Заявку не знайдено.")]),
            // The shift was decided elsewhere first: report what it
            // actually is, not what was just attempted.
            (Some(record), false) => Ok(vec![Outgoing::with_keyboard(
                format!("Заявка #{shift_id} вже має статус «{}».", record.status),
                menu,
            )]),
            (Some(_), true) => Ok(vec![Outgoing::with_keyboard(
                format!("Статус заявки #{shift_id} змінено на «{}».", decision.status()),
                menu,
            )]),
        }
    }
}
