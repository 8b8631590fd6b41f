use super::{Engine, Keyboard, Outgoing};
use crate::sheets::models::ShiftRecord;
use crate::sheets::EDIT_WINDOW_DAYS;
use crate::utils::parse::format_date;
use crate::utils::phone::sanitize_phone;
use anyhow::Result;

fn display_comment(comment: &str) -> &str {
    if comment.is_empty() {
        "-"
    } else {
        comment
    }
}

pub(super) fn shift_summary(record: &ShiftRecord, with_status: bool) -> String {
    let heading = if with_status {
        format!(
            "#{} — {} | {}",
            record.shift_id,
            format_date(record.shift_date),
            record.status
        )
    } else {
        format!("#{} — {}", record.shift_id, format_date(record.shift_date))
    };
    format!(
        "{heading}\nГодини: {}, Овертайм: {}\nКоментар: {}",
        record.shift_hours,
        record.overtime_hours,
        display_comment(&record.comment)
    )
}

impl Engine {
    pub(super) fn handle_start(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        self.sessions.clear(chat_id);
        let reply = match self.authorized(chat_id) {
            Some(employee) => Outgoing::with_keyboard(
                format!("Вітаю, {}! Обери дію в меню.", employee.name),
                Keyboard::Menu {
                    manager: employee.is_manager(),
                },
            ),
            None => Outgoing::with_keyboard(
                "Привіт! Поділись номером телефону, щоб пройти авторизацію.",
                Keyboard::ShareContact,
            ),
        };
        Ok(vec![reply])
    }

    pub(super) async fn handle_contact(
        &self,
        chat_id: i64,
        phone: &str,
        own: bool,
    ) -> Result<Vec<Outgoing>> {
        self.sessions.clear(chat_id);
        if !own {
            return Ok(vec![Outgoing::with_keyboard(
                "Надішли контакт саме зі свого аккаунту.",
                Keyboard::ShareContact,
            )]);
        }
        let phone = match sanitize_phone(phone) {
            Some(phone) => phone,
            None => {
                return Ok(vec![Outgoing::with_keyboard(
                    "Не вдалося розпізнати номер. Спробуй ще раз.",
                    Keyboard::ShareContact,
                )])
            }
        };
        let employee = match self.gateway.fetch_employee_by_phone(&phone).await? {
            Some(employee) => employee,
            None => {
                return Ok(vec![Outgoing::with_keyboard(
                    "Твого номеру немає в списку співробітників. Звернися до адміністратора.",
                    Keyboard::ShareContact,
                )])
            }
        };
        let name = employee.name.clone();
        let manager = employee.is_manager();
        self.auth.login(chat_id, employee);
        Ok(vec![Outgoing::with_keyboard(
            format!("Вітаю, {name}! Меню доступне нижче."),
            Keyboard::Menu { manager },
        )])
    }

    pub(super) async fn list_recent_shifts(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        let shifts = self
            .gateway
            .get_employee_shifts(&employee.name, Some(EDIT_WINDOW_DAYS), false)
            .await?;
        if shifts.is_empty() {
            return Ok(vec![Outgoing::text("За останні 7 днів немає поданих заявок.")]);
        }
        let lines: Vec<String> = shifts
            .iter()
            .map(|record| shift_summary(record, true))
            .collect();
        Ok(vec![Outgoing::text(lines.join("\n\n"))])
    }

    pub(super) async fn list_own_pending(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        let shifts = self
            .gateway
            .get_employee_shifts(&employee.name, Some(EDIT_WINDOW_DAYS), true)
            .await?;
        if shifts.is_empty() {
            return Ok(vec![Outgoing::text(
                "Немає заявок у статусі очікування за останні 7 днів.",
            )]);
        }
        let lines: Vec<String> = shifts
            .iter()
            .map(|record| shift_summary(record, false))
            .collect();
        Ok(vec![Outgoing::text(lines.join("\n\n"))])
    }

    /// One message per pending shift so each can carry its own
    /// approve/decline buttons.
    pub(super) async fn list_manager_pending(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        if !employee.is_manager() {
            return Ok(self.deny_not_manager(chat_id));
        }
        let shifts = self.gateway.get_pending_for_manager(&employee.name).await?;
        if shifts.is_empty() {
            return Ok(vec![Outgoing::text(
                "Немає заявок, що очікують підтвердження.",
            )]);
        }
        Ok(shifts
            .iter()
            .map(|record| {
                let text = format!(
                    "Заявка #{}\nСпівробітник: {}\nДата: {}\nГодини: {} | Овертайм: {}\nКоментар: {}",
                    record.shift_id,
                    record.employee_name,
                    format_date(record.shift_date),
                    record.shift_hours,
                    record.overtime_hours,
                    display_comment(&record.comment)
                );
                Outgoing::with_keyboard(
                    text,
                    Keyboard::Decision {
                        shift_id: record.shift_id,
                    },
                )
            })
            .collect())
    }

    pub(super) async fn list_subordinates(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        if !employee.is_manager() {
            return Ok(self.deny_not_manager(chat_id));
        }
        let subordinates = self.gateway.list_subordinates(&employee.name).await?;
        if subordinates.is_empty() {
            return Ok(vec![Outgoing::text("У тебе поки немає підлеглих.")]);
        }
        let lines: Vec<String> = subordinates
            .iter()
            .map(|sub| {
                format!(
                    "{} — {}\nСтавка зміни: {}, овертайм: {}",
                    sub.name, sub.phone, sub.shift_rate, sub.overtime_rate
                )
            })
            .collect();
        Ok(vec![Outgoing::text(lines.join("\n\n"))])
    }

    pub(super) fn sheet_link_reply(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let employee = match self.authorized(chat_id) {
            Some(employee) => employee,
            None => return Ok(self.deny_unauthorized(chat_id)),
        };
        if !employee.is_manager() {
            return Ok(self.deny_not_manager(chat_id));
        }
        Ok(vec![Outgoing::text(format!(
            "Спільна таблиця: {}",
            self.sheet_link
        ))])
    }

    pub(super) fn help(&self, chat_id: i64) -> Result<Vec<Outgoing>> {
        let base_help = "Доступні дії:\n\
            • \"Добавить новую смену\" — подати нову заявку.\n\
            • \"Редактировать поданую смену\" — редагувати заявку зі статусом «Очікує», подану не пізніше 7 днів тому.\n\
            • \"Мои смены (7 дней)\" — переглянути останні заявки.\n\
            • \"Заявки в ожидании\" — відкриті заявки за останні 7 днів.\n";
        let manager_help = "Меню керівника:\n\
            • \"В очікуванні\" — заявки співробітників, що потребують рішення.\n\
            • \"Мої співробітники\" — список команди з контактами та ставками.\n\
            • \"Переглянути таблицю\" — швидкий перехід до таблиці.\n\
            Кнопки підтвердження/відхилення відкривають форму для коментаря.";

        let reply = match self.authorized(chat_id) {
            Some(employee) => {
                let text = if employee.is_manager() {
                    format!("{base_help}\n{manager_help}")
                } else {
                    base_help.to_string()
                };
                Outgoing::with_keyboard(
                    text,
                    Keyboard::Menu {
                        manager: employee.is_manager(),
                    },
                )
            }
            None => Outgoing::with_keyboard(base_help, Keyboard::ShareContact),
        };
        Ok(vec![reply])
    }
}
