pub mod api;
pub mod models;

use crate::utils::parse::{
    format_date, format_datetime, parse_date, parse_datetime, parse_float_cell, parse_id,
};
use anyhow::Result;
use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;

use api::SheetsApi;
use models::{Decision, Employee, ShiftInput, ShiftRecord, SHIFT_STATUS_PENDING};

pub const EMPLOYEES_SHEET: &str = "Співробітники";
pub const SHIFTS_SHEET: &str = "Зміни";
pub const ACCRUALS_SHEET: &str = "Нарахування";

/// Trailing window (days) during which a pending shift may still be
/// edited by its submitter.
pub const EDIT_WINDOW_DAYS: i64 = 7;

// Shift sheet columns A-K: id, employee, date, overtime hours, shift
// hours, comment, submitted at, status, decided at, manager comment,
// manager name. Detail edits rewrite C:G, decisions rewrite H:K.

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Business operations over the three spreadsheet collections. The
/// spreadsheet is the single source of truth: every operation re-reads
/// it, nothing is cached between calls.
pub struct SheetsGateway {
    api: Box<dyn SheetsApi>,
    tz: FixedOffset,
}

impl SheetsGateway {
    pub fn new(api: Box<dyn SheetsApi>, tz: FixedOffset) -> Self {
        Self { api, tz }
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub async fn fetch_employee_by_phone(&self, phone: &str) -> Result<Option<Employee>> {
        let employees = self.fetch_employees().await?;
        Ok(employees.into_iter().find(|employee| employee.phone == phone))
    }

    pub async fn fetch_employee_by_name(&self, name: &str) -> Result<Option<Employee>> {
        let employees = self.fetch_employees().await?;
        Ok(employees.into_iter().find(|employee| employee.name == name))
    }

    pub async fn list_subordinates(&self, manager_name: &str) -> Result<Vec<Employee>> {
        let employees = self.fetch_employees().await?;
        Ok(employees
            .into_iter()
            .filter(|employee| employee.manager_name.as_deref() == Some(manager_name))
            .collect())
    }

    /// Appends a new pending shift and returns its assigned id.
    pub async fn append_shift(&self, shift: &ShiftInput) -> Result<i64> {
        let rows = self.api.read_rows(SHIFTS_SHEET).await?;
        let next_id = next_id(&rows);
        let row = vec![
            next_id.to_string(),
            shift.employee_name.clone(),
            format_date(shift.shift_date),
            shift.overtime_hours.to_string(),
            shift.shift_hours.to_string(),
            shift.comment.clone(),
            format_datetime(shift.submitted_at),
            SHIFT_STATUS_PENDING.to_string(),
            String::new(),
            String::new(),
            shift.manager_name.clone().unwrap_or_default(),
        ];
        self.api.append_row(SHIFTS_SHEET, row).await?;
        Ok(next_id)
    }

    pub async fn get_employee_shifts(
        &self,
        employee_name: &str,
        days_back: Option<i64>,
        only_pending: bool,
    ) -> Result<Vec<ShiftRecord>> {
        let records = self.fetch_shift_records().await?;
        let threshold = days_back.map(|days| self.today() - Duration::days(days));
        Ok(records
            .into_iter()
            .filter(|record| {
                if record.employee_name != employee_name {
                    return false;
                }
                if only_pending && !record.is_pending() {
                    return false;
                }
                match threshold {
                    Some(threshold) => record.reference_date() >= threshold,
                    None => true,
                }
            })
            .collect())
    }

    /// Returns the shift only when it belongs to the employee, is still
    /// pending and falls inside the editability window. Not-found and
    /// ineligible collapse into the same `None` so shift ids belonging
    /// to other employees are not distinguishable from unknown ones.
    pub async fn get_editable_shift(
        &self,
        employee_name: &str,
        shift_id: i64,
        max_days: i64,
    ) -> Result<Option<ShiftRecord>> {
        let records = self.fetch_shift_records().await?;
        let threshold = self.today() - Duration::days(max_days);
        let record = match records.into_iter().find(|r| r.shift_id == shift_id) {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.employee_name != employee_name
            || !record.is_pending()
            || record.reference_date() < threshold
        {
            return Ok(None);
        }
        Ok(Some(record))
    }

    pub async fn get_pending_for_manager(&self, manager_name: &str) -> Result<Vec<ShiftRecord>> {
        let records = self.fetch_shift_records().await?;
        Ok(records
            .into_iter()
            .filter(|record| {
                record.manager_name.as_deref() == Some(manager_name) && record.is_pending()
            })
            .collect())
    }

    /// Rewrites the editable fields of a pending shift. Editability is
    /// re-checked immediately before the write; a stale earlier read is
    /// not trusted.
    pub async fn update_shift_details(
        &self,
        shift_id: i64,
        employee_name: &str,
        updated: &ShiftInput,
        max_days: i64,
    ) -> Result<bool> {
        let editable = self
            .get_editable_shift(employee_name, shift_id, max_days)
            .await?;
        let record = match editable {
            Some(record) => record,
            None => return Ok(false),
        };
        let range = format!("C{0}:G{0}", record.row_index);
        let row = vec![
            format_date(updated.shift_date),
            updated.overtime_hours.to_string(),
            updated.shift_hours.to_string(),
            updated.comment.clone(),
            format_datetime(updated.submitted_at),
        ];
        self.api.update_range(SHIFTS_SHEET, &range, vec![row]).await?;
        Ok(true)
    }

    /// Applies a manager decision. The current status is re-read
    /// immediately before the write: a shift that already left pending
    /// is returned unchanged with `false` instead of being overwritten.
    /// Approval synchronously appends one accrual row.
    pub async fn update_shift_status(
        &self,
        shift_id: i64,
        decision: Decision,
        manager_name: &str,
        comment: &str,
        decided_at: NaiveDateTime,
    ) -> Result<(Option<ShiftRecord>, bool)> {
        let records = self.fetch_shift_records().await?;
        let target = match records.into_iter().find(|r| r.shift_id == shift_id) {
            Some(record) => record,
            None => return Ok((None, false)),
        };
        if !target.is_pending() {
            return Ok((Some(target), false));
        }

        let range = format!("H{0}:K{0}", target.row_index);
        let row = vec![
            decision.status().to_string(),
            format_datetime(decided_at),
            comment.to_string(),
            manager_name.to_string(),
        ];
        self.api.update_range(SHIFTS_SHEET, &range, vec![row]).await?;

        let updated = ShiftRecord {
            status: decision.status().to_string(),
            approved_at: Some(decided_at),
            manager_comment: comment.to_string(),
            manager_name: Some(manager_name.to_string()),
            ..target
        };
        if decision == Decision::Approve {
            self.append_accrual(&updated).await?;
        }
        Ok((Some(updated), true))
    }

    /// Accrual rates are captured from the employee record at approval
    /// time. A missing employee record skips the accrual without
    /// failing the already-written decision.
    async fn append_accrual(&self, shift: &ShiftRecord) -> Result<()> {
        let employee = match self.fetch_employee_by_name(&shift.employee_name).await? {
            Some(employee) => employee,
            None => {
                tracing::warn!(
                    "No employee record for {}, accrual for shift #{} skipped",
                    shift.employee_name,
                    shift.shift_id
                );
                return Ok(());
            }
        };
        let rows = self.api.read_rows(ACCRUALS_SHEET).await?;
        let next_id = next_id(&rows);
        let shift_sum = shift.shift_hours * employee.shift_rate;
        let overtime_sum = shift.overtime_hours * employee.overtime_rate;
        let row = vec![
            next_id.to_string(),
            employee.name.clone(),
            format_date(shift.shift_date),
            shift.overtime_hours.to_string(),
            employee.shift_rate.to_string(),
            employee.overtime_rate.to_string(),
            shift_sum.to_string(),
            overtime_sum.to_string(),
            (shift_sum + overtime_sum).to_string(),
        ];
        self.api.append_row(ACCRUALS_SHEET, row).await?;
        Ok(())
    }

    async fn fetch_shift_records(&self) -> Result<Vec<ShiftRecord>> {
        let rows = self.api.read_rows(SHIFTS_SHEET).await?;
        let today = self.today();
        let mut records = Vec::new();
        for (index, row) in rows.iter().enumerate().skip(1) {
            records.push(ShiftRecord {
                row_index: index + 1,
                shift_id: parse_id(cell(row, 0)).unwrap_or(0),
                employee_name: cell(row, 1).trim().to_string(),
                shift_date: parse_date(cell(row, 2)).unwrap_or(today),
                overtime_hours: parse_float_cell(cell(row, 3)),
                shift_hours: parse_float_cell(cell(row, 4)),
                comment: cell(row, 5).trim().to_string(),
                submitted_at: parse_datetime(cell(row, 6)),
                status: cell(row, 7).trim().to_string(),
                approved_at: parse_datetime(cell(row, 8)),
                manager_comment: cell(row, 9).trim().to_string(),
                manager_name: match cell(row, 10).trim() {
                    "" => None,
                    name => Some(name.to_string()),
                },
            });
        }
        Ok(records)
    }

    /// The manager cell may hold a phone number instead of a name; it is
    /// resolved against the roster on read.
    async fn fetch_employees(&self) -> Result<Vec<Employee>> {
        let rows = self.api.read_rows(EMPLOYEES_SHEET).await?;
        let mut name_by_phone: HashMap<String, String> = HashMap::new();
        for row in rows.iter().skip(1) {
            let phone = cell(row, 1).trim();
            let name = cell(row, 0).trim();
            if !phone.is_empty() && !name.is_empty() {
                name_by_phone.insert(phone.to_string(), name.to_string());
            }
        }

        let mut employees = Vec::new();
        for row in rows.iter().skip(1) {
            let manager_raw = cell(row, 5).trim();
            let manager_name = match manager_raw {
                "" => None,
                raw => Some(
                    name_by_phone
                        .get(raw)
                        .cloned()
                        .unwrap_or_else(|| raw.to_string()),
                ),
            };
            employees.push(Employee {
                name: cell(row, 0).trim().to_string(),
                phone: cell(row, 1).trim().to_string(),
                role: cell(row, 2).trim().to_string(),
                shift_rate: parse_float_cell(cell(row, 3)),
                overtime_rate: parse_float_cell(cell(row, 4)),
                manager_name,
            });
        }
        Ok(employees)
    }
}

/// Next unused id for an id-keyed sheet: max over the parseable cells of
/// the first column plus one, or 1 for an empty collection.
fn next_id(rows: &[Vec<String>]) -> i64 {
    rows.iter()
        .skip(1)
        .filter_map(|row| parse_id(cell(row, 0)))
        .max()
        .map(|max| max + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::api::testing::MemorySheets;
    use super::*;
    use chrono::Duration;

    const TZ_SECONDS: i32 = 3 * 3600;

    fn gateway(api: MemorySheets) -> SheetsGateway {
        SheetsGateway::new(Box::new(api), FixedOffset::east_opt(TZ_SECONDS).unwrap())
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn employees_header() -> Vec<String> {
        row(&[
            "ПІБ",
            "Телефон",
            "Роль",
            "Вартість зміни",
            "Вартість години овертайму",
            "Керівник",
        ])
    }

    fn shifts_header() -> Vec<String> {
        row(&[
            "ID", "ПІБ", "Дата", "Овертайм", "Години", "Коментар", "Подано", "Статус",
            "Вирішено", "Коментар керівника", "Керівник",
        ])
    }

    fn seeded_employees() -> Vec<Vec<String>> {
        vec![
            employees_header(),
            row(&["Іван", "380501234567", "Співробітник", "100", "150", "Олена"]),
            row(&["Олена", "380671112233", "Керівник", "200", "250", ""]),
        ]
    }

    fn shift_input(employee: &str, date: NaiveDate, submitted: NaiveDateTime) -> ShiftInput {
        ShiftInput {
            employee_name: employee.to_string(),
            shift_date: date,
            shift_hours: 8.0,
            overtime_hours: 2.0,
            comment: "нічна зміна".to_string(),
            submitted_at: submitted,
            manager_name: Some("Олена".to_string()),
        }
    }

    #[tokio::test]
    async fn test_append_shift_assigns_first_id() {
        let api = MemorySheets::new()
            .with_sheet(SHIFTS_SHEET, vec![shifts_header()])
            .with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let gateway = gateway(api);

        let today = gateway.today();
        let input = shift_input("Іван", today, gateway.now());
        let id = gateway.append_shift(&input).await.unwrap();
        assert_eq!(id, 1);

        let shifts = gateway
            .get_employee_shifts("Іван", None, false)
            .await
            .unwrap();
        assert_eq!(shifts.len(), 1);
        let record = &shifts[0];
        assert_eq!(record.shift_id, 1);
        assert_eq!(record.employee_name, "Іван");
        assert_eq!(record.shift_date, today);
        assert_eq!(record.shift_hours, 8.0);
        assert_eq!(record.overtime_hours, 2.0);
        assert_eq!(record.comment, "нічна зміна");
        assert_eq!(record.status, SHIFT_STATUS_PENDING);
        assert_eq!(record.manager_name.as_deref(), Some("Олена"));
    }

    #[tokio::test]
    async fn test_append_shift_continues_from_max_id() {
        let gateway = {
            let today = chrono::Utc::now().date_naive();
            let api = MemorySheets::new()
                .with_sheet(
                    SHIFTS_SHEET,
                    vec![
                        shifts_header(),
                        row(&["7", "Іван", &format_date(today), "0", "8", "", "", "Очікує", "", "", "Олена"]),
                        row(&["жодного id", "Іван", &format_date(today), "0", "8", "", "", "Очікує", "", "", ""]),
                    ],
                )
                .with_sheet(EMPLOYEES_SHEET, seeded_employees());
            gateway(api)
        };

        let input = shift_input("Іван", gateway.today(), gateway.now());
        let id = gateway.append_shift(&input).await.unwrap();
        assert_eq!(id, 8);
    }

    #[tokio::test]
    async fn test_editable_shift_rules() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let fresh = format_datetime(today.and_hms_opt(9, 0, 0).unwrap());
        let stale = format_datetime(
            (today - Duration::days(EDIT_WINDOW_DAYS + 1))
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let date = format_date(today);

        let api = MemorySheets::new()
            .with_sheet(
                SHIFTS_SHEET,
                vec![
                    shifts_header(),
                    row(&["1", "Іван", &date, "0", "8", "", &fresh, "Очікує", "", "", "Олена"]),
                    row(&["2", "Іван", &date, "0", "8", "", &fresh, "Підтверджено", "", "", "Олена"]),
                    row(&["3", "Іван", &date, "0", "8", "", &stale, "Очікує", "", "", "Олена"]),
                    row(&["4", "Петро", &date, "0", "8", "", &fresh, "Очікує", "", "", "Олена"]),
                ],
            )
            .with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let gateway = gateway(api);

        let editable = gateway
            .get_editable_shift("Іван", 1, EDIT_WINDOW_DAYS)
            .await
            .unwrap();
        assert_eq!(editable.map(|r| r.shift_id), Some(1));

        // Decided, stale and foreign shifts all collapse into None.
        for id in [2, 3, 4] {
            assert!(gateway
                .get_editable_shift("Іван", id, EDIT_WINDOW_DAYS)
                .await
                .unwrap()
                .is_none());
        }
        assert!(gateway
            .get_editable_shift("Іван", 99, EDIT_WINDOW_DAYS)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reference_date_falls_back_to_shift_date() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let stale_date = format_date(today - Duration::days(EDIT_WINDOW_DAYS + 3));

        // No submission timestamp at all: the shift date decides.
        let api = MemorySheets::new().with_sheet(
            SHIFTS_SHEET,
            vec![
                shifts_header(),
                row(&["1", "Іван", &stale_date, "0", "8", "", "", "Очікує", "", "", ""]),
            ],
        );
        let gateway = gateway(api);

        assert!(gateway
            .get_editable_shift("Іван", 1, EDIT_WINDOW_DAYS)
            .await
            .unwrap()
            .is_none());
        let all = gateway
            .get_employee_shifts("Іван", Some(EDIT_WINDOW_DAYS), false)
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_update_shift_details_revalidates() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let fresh = format_datetime(today.and_hms_opt(9, 0, 0).unwrap());

        let api = MemorySheets::new()
            .with_sheet(
                SHIFTS_SHEET,
                vec![
                    shifts_header(),
                    row(&["1", "Іван", &format_date(today), "0", "8", "старий", &fresh, "Очікує", "", "", "Олена"]),
                    row(&["2", "Іван", &format_date(today), "0", "8", "", &fresh, "Відхилено", "", "", "Олена"]),
                ],
            )
            .with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let gateway = gateway(api);

        let new_date = today - Duration::days(1);
        let mut updated = shift_input("Іван", new_date, gateway.now());
        updated.shift_hours = 10.0;
        updated.comment = "новий".to_string();

        let ok = gateway
            .update_shift_details(1, "Іван", &updated, EDIT_WINDOW_DAYS)
            .await
            .unwrap();
        assert!(ok);
        let record = gateway
            .get_employee_shifts("Іван", None, false)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.shift_id == 1)
            .unwrap();
        assert_eq!(record.shift_date, new_date);
        assert_eq!(record.shift_hours, 10.0);
        assert_eq!(record.comment, "новий");

        // Already decided: the write is refused.
        let ok = gateway
            .update_shift_details(2, "Іван", &updated, EDIT_WINDOW_DAYS)
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_decision_is_idempotent() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let fresh = format_datetime(today.and_hms_opt(9, 0, 0).unwrap());

        let api = MemorySheets::new()
            .with_sheet(
                SHIFTS_SHEET,
                vec![
                    shifts_header(),
                    row(&["1", "Іван", &format_date(today), "2", "8", "", &fresh, "Очікує", "", "", "Олена"]),
                ],
            )
            .with_sheet(EMPLOYEES_SHEET, seeded_employees())
            .with_sheet(ACCRUALS_SHEET, vec![row(&["ID"])]);
        let gateway = gateway(api);

        let (first, changed) = gateway
            .update_shift_status(1, Decision::Approve, "Олена", "добре", gateway.now())
            .await
            .unwrap();
        assert!(changed);
        assert_eq!(first.unwrap().status, models::SHIFT_STATUS_APPROVED);

        // Second decision with a different outcome is a no-op reporting
        // the already-written status.
        let (second, changed) = gateway
            .update_shift_status(1, Decision::Decline, "Олена", "", gateway.now())
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(second.unwrap().status, models::SHIFT_STATUS_APPROVED);
    }

    #[tokio::test]
    async fn test_approval_appends_accrual() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let fresh = format_datetime(today.and_hms_opt(9, 0, 0).unwrap());

        let api = MemorySheets::new()
            .with_sheet(
                SHIFTS_SHEET,
                vec![
                    shifts_header(),
                    row(&["1", "Іван", &format_date(today), "2", "8", "", &fresh, "Очікує", "", "", "Олена"]),
                ],
            )
            .with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let view = api.clone();
        let gateway = gateway(api);

        gateway
            .update_shift_status(1, Decision::Approve, "Олена", "", gateway.now())
            .await
            .unwrap();

        // 8h × 100 + 2h × 150, rates captured at approval time.
        let accruals = view.rows(ACCRUALS_SHEET);
        assert_eq!(accruals.len(), 1);
        let accrual = &accruals[0];
        assert_eq!(accrual[0], "1");
        assert_eq!(accrual[1], "Іван");
        assert_eq!(accrual[3], "2");
        assert_eq!(accrual[4], "100");
        assert_eq!(accrual[5], "150");
        assert_eq!(accrual[6], "800");
        assert_eq!(accrual[7], "300");
        assert_eq!(accrual[8], "1100");
    }

    #[tokio::test]
    async fn test_decline_skips_accrual() {
        let gateway0 = gateway(MemorySheets::new());
        let today = gateway0.today();
        let fresh = format_datetime(today.and_hms_opt(9, 0, 0).unwrap());

        let api = MemorySheets::new()
            .with_sheet(
                SHIFTS_SHEET,
                vec![
                    shifts_header(),
                    row(&["1", "Іван", &format_date(today), "2", "8", "", &fresh, "Очікує", "", "", "Олена"]),
                ],
            )
            .with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let view = api.clone();
        let gateway = gateway(api);

        let (record, changed) = gateway
            .update_shift_status(1, Decision::Decline, "Олена", "ні", gateway.now())
            .await
            .unwrap();
        assert!(changed);
        assert_eq!(record.unwrap().status, models::SHIFT_STATUS_DECLINED);
        assert!(view.rows(ACCRUALS_SHEET).is_empty());
    }

    #[tokio::test]
    async fn test_subordinates_and_phone_lookup() {
        let api = MemorySheets::new().with_sheet(EMPLOYEES_SHEET, seeded_employees());
        let gateway = gateway(api);

        let found = gateway
            .fetch_employee_by_phone("380501234567")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Іван");
        assert!(!found.is_manager());
        assert!(gateway
            .fetch_employee_by_phone("380000000000")
            .await
            .unwrap()
            .is_none());

        let team = gateway.list_subordinates("Олена").await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].name, "Іван");
    }

    #[tokio::test]
    async fn test_manager_cell_phone_resolves_to_name() {
        let api = MemorySheets::new().with_sheet(
            EMPLOYEES_SHEET,
            vec![
                employees_header(),
                row(&["Іван", "380501234567", "Співробітник", "100", "150", "380671112233"]),
                row(&["Олена", "380671112233", "Керівник", "200", "250", ""]),
            ],
        );
        let gateway = gateway(api);

        let ivan = gateway.fetch_employee_by_name("Іван").await.unwrap().unwrap();
        assert_eq!(ivan.manager_name.as_deref(), Some("Олена"));
    }
}
