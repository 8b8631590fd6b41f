use super::menu::shift_summary;
use super::state::ConversationState;
use super::{Engine, Keyboard, Outgoing, SKIP_COMMENT};
use crate::sheets::models::ShiftInput;
use crate::sheets::EDIT_WINDOW_DAYS;
use crate::utils::parse::{format_date, parse_date, parse_hours, parse_id};
use anyhow::Result;
use chrono::NaiveDate;

impl Engine {
    pub(super) async fn start_edit(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        self.sessions.clear(chat_id);
        let shifts = self
            .gateway
            .get_employee_shifts(&employee.name, Some(EDIT_WINDOW_DAYS), true)
            .await?;
        if shifts.is_empty() {
            return Ok(vec![Outgoing::with_keyboard(
                "Нет заявок для редактирования. Доступно только для заявок, поданих не пізніше 7 днів тому та зі статусом «Очікує».",
                Keyboard::Menu {
                    manager: employee.is_manager(),
                },
            )]);
        }
        let lines: Vec<String> = shifts
            .iter()
            .map(|record| shift_summary(record, false))
            .collect();
        self.sessions.set(chat_id, ConversationState::EditSelect);
        Ok(vec![Outgoing::with_keyboard(
            format!(
                "Доступні заявки для редагування:\n{}\n\nВведи номер заявки, яку треба змінити.",
                lines.join("\n\n")
            ),
            Keyboard::Remove,
        )])
    }

    /// Selection re-validates editability: an id that exists but is no
    /// longer editable re-prompts exactly like an unknown one.
    pub(super) async fn edit_select(&self, chat_id: i64, text: &str) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        let shift_id = match parse_id(text) {
            Some(id) => id,
            None => return Ok(vec![Outgoing::text("Вкажи номер заявки числом.")]),
        };
        let record = match self
            .gateway
            .get_editable_shift(&employee.name, shift_id, EDIT_WINDOW_DAYS)
            .await?
        {
            Some(record) => record,
            None => {
                return Ok(vec![Outgoing::text(
                    "Заявка недоступна для редагування. Переконайся, що вона очікує підтвердження і подана не пізніше 7 днів тому.",
                )])
            }
        };
        self.sessions.set(
            chat_id,
            ConversationState::EditDate {
                shift_id,
                prev_shift_hours: record.shift_hours,
                prev_overtime_hours: record.overtime_hours,
                prev_comment: record.comment.clone(),
            },
        );
        Ok(vec![Outgoing::text(format!(
            "Поточна дата зміни: {}. Введи нову дату у форматі ДД.ММ.РРРР.",
            format_date(record.shift_date)
        ))])
    }

    pub(super) fn edit_date(
        &self,
        chat_id: i64,
        shift_id: i64,
        prev_shift_hours: f64,
        prev_overtime_hours: f64,
        prev_comment: String,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let shift_date = match parse_date(text) {
            Some(date) => date,
            None => {
                return Ok(vec![Outgoing::text(
                    "Невірний формат дати. Спробуй (ДД.ММ.РРРР).",
                )])
            }
        };
        self.sessions.set(
            chat_id,
            ConversationState::EditShiftHours {
                shift_id,
                shift_date,
                prev_overtime_hours,
                prev_comment,
            },
        );
        Ok(vec![Outgoing::text(format!(
            "Скільки годин тривала зміна? Поточне значення: {prev_shift_hours}."
        ))])
    }

    pub(super) fn edit_shift_hours(
        &self,
        chat_id: i64,
        shift_id: i64,
        shift_date: NaiveDate,
        prev_overtime_hours: f64,
        prev_comment: String,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let shift_hours = match parse_hours(text) {
            Some(hours) => hours,
            None => return Ok(vec![Outgoing::text("Вкажи кількість годин числом.")]),
        };
        self.sessions.set(
            chat_id,
            ConversationState::EditOvertime {
                shift_id,
                shift_date,
                shift_hours,
                prev_comment,
            },
        );
        Ok(vec![Outgoing::text(format!(
            "Скільки годин овертайму? Поточне значення: {prev_overtime_hours}."
        ))])
    }

    pub(super) fn edit_overtime(
        &self,
        chat_id: i64,
        shift_id: i64,
        shift_date: NaiveDate,
        shift_hours: f64,
        prev_comment: String,
        text: &str,
    ) -> Result<Vec<Outgoing>> {
        let overtime_hours = match parse_hours(text) {
            Some(hours) => hours,
            None => return Ok(vec![Outgoing::text("Вкажи годинник овертайму числом.")]),
        };
        self.sessions.set(
            chat_id,
            ConversationState::EditComment {
                shift_id,
                shift_date,
                shift_hours,
                overtime_hours,
            },
        );
        let prev = if prev_comment.is_empty() {
            "-".to_string()
        } else {
            prev_comment
        };
        Ok(vec![Outgoing::with_keyboard(
            format!("Поточний коментар: {prev}\nВведи новий або натисни «{SKIP_COMMENT}»."),
            Keyboard::SkipComment,
        )])
    }

    pub(super) async fn edit_comment(
        &self,
        chat_id: i64,
        shift_id: i64,
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
        let updated = ShiftInput {
            employee_name: employee.name.clone(),
            shift_date,
            shift_hours,
            overtime_hours,
            comment: comment.to_string(),
            submitted_at: self.gateway.now(),
            manager_name: employee.manager_name.clone(),
        };
        let result = self
            .gateway
            .update_shift_details(shift_id, &employee.name, &updated, EDIT_WINDOW_DAYS)
            .await;
        let updated_ok = match result {
            Ok(updated_ok) => updated_ok,
            Err(err) => {
                self.sessions.clear(chat_id);
                return Err(err);
            }
        };
        self.sessions.clear(chat_id);
        let menu = Keyboard::Menu {
            manager: employee.is_manager(),
        };
        // The record can stop being editable between selection and the
        // final answer; the form is not retried.
        if !updated_ok {
            return Ok(vec![Outgoing::with_keyboard(
                "Не вдалося оновити заявку. Вона могла бути підтверджена або минуло більше 7 днів.",
                menu,
            )]);
        }
        Ok(vec![Outgoing::with_keyboard(
            format!("Заявка #{shift_id} оновлена. Очікує підтвердження."),
            menu,
        )])
    }
}
