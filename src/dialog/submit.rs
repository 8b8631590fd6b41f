use super::state::ConversationState;
use super::{Engine, Keyboard, Outgoing, SKIP_COMMENT};
use crate::sheets::models::ShiftInput;
use anyhow::Result;
use chrono::NaiveDate;

impl Engine {
    pub(super) async fn start_submission(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        if self.authorized(chat_id).is_none() {
            return Ok(self.deny_unauthorized(chat_id));
        }
        self.sessions.set(chat_id, ConversationState::SubmitDate);
        Ok(vec![Outgoing::with_keyboard(
            "Вкажи дату зміни у форматі ДД.ММ.РРРР.",
            Keyboard::Remove,
        )])
    }

    pub(super) fn submit_date(&self, chat_id: i64, text: &str) -> Result<Vec<Outgoing>> {
        let shift_date = match crate::utils::parse::parse_date(text) {
            Some(date) => date,
            None => {
                return Ok(vec![Outgoing::text(
                    "Невірний формат дати. Спробуй ще раз (ДД.ММ.РРРР).",
                )])
            }
        };
        self.sessions
            .set(chat_id, ConversationState::SubmitShiftHours { shift_date });
        Ok(vec![Outgoing::text(
            "Скільки годин тривав твій робочий день? (число)",
        )])
    }

    pub(super) fn submit_shift_hours(
        &self,
        chat_id: i64,
        shift_date: NaiveDate,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let shift_hours = match crate::utils::parse::parse_hours(text) {
            Some(hours) => hours,
            None => {
                return Ok(vec![Outgoing::text(
                    "Вкажи кількість годин числом, наприклад 8 або 7.5.",
                )])
            }
        };
        self.sessions.set(
            chat_id,
            ConversationState::SubmitOvertime {
                shift_date,
                shift_hours,
            },
        );
        Ok(vec![Outgoing::text("Скільки годин овертайму? (0, якщо не було)")])
    }

    pub(super) fn submit_overtime(
        &self,
        chat_id: i64,
        shift_date: NaiveDate,
        shift_hours: f64,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let overtime_hours = match crate::utils::parse::parse_hours(text) {
            Some(hours) => hours,
            None => return Ok(vec![Outgoing::text("Вкажи годинник овертайму числом.")]),
        };
        self.sessions.set(
            chat_id,
            ConversationState::SubmitComment {
                shift_date,
                shift_hours,
                overtime_hours,
            },
        );
        Ok(vec![Outgoing::with_keyboard(
            "Додай коментар або натисни «Пропустити».",
            Keyboard::SkipComment,
        )])
    }

    pub(super) async fn submit_comment(
        &self,
        chat_id: i64,
        shift_date: NaiveDate,
        shift_hours: f64,
        overtime_hours: f64,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        let comment = if text == SKIP_COMMENT { "" } else { text };
        let input = ShiftInput {
            employee_name: employee.name.clone(),
            shift_date,
            shift_hours,
            overtime_hours,
            comment: comment.to_string(),
            submitted_at: self.gateway.now(),
            manager_name: employee.manager_name.clone(),
        };
        let shift_id = match self.gateway.append_shift(&input).await {
            Ok(id) => id,
            Err(err) => {
                self.sessions.clear(chat_id);
                return Err(err);
            }
        };
        self.sessions.clear(chat_id);
        Ok(vec![Outgoing::with_keyboard(
            format!("Зміна #{shift_id} збережена та очікує підтвердження."),
            Keyboard::Menu {
                manager: employee.is_manager(),
            },
        )])
    }
}
