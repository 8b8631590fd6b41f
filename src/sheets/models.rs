use chrono::{NaiveDate, NaiveDateTime};

pub const SHIFT_STATUS_PENDING: &str = "Очікує";
pub const SHIFT_STATUS_APPROVED: &str = "Підтверджено";
pub const SHIFT_STATUS_DECLINED: &str = "Відхилено";

const MANAGER_ROLE: &str = "керівник";

#[derive(Debug, Clone)]
pub struct Employee {
    pub name: String,
    pub phone: String,
    pub role: String,
    pub shift_rate: f64,
    pub overtime_rate: f64,
    pub manager_name: Option<String>,
}

impl Employee {
    pub fn is_manager(&self) -> bool {
        self.role.to_lowercase() == MANAGER_ROLE
    }
}

/// Fields accepted from a completed submission or edit form.
#[derive(Debug, Clone)]
pub struct ShiftInput {
    pub employee_name: String,
    pub shift_date: NaiveDate,
    pub shift_hours: f64,
    pub overtime_hours: f64,
    pub comment: String,
    pub submitted_at: NaiveDateTime,
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShiftRecord {
    /// 1-based spreadsheet row the record was read from.
    pub row_index: usize,
    pub shift_id: i64,
    pub employee_name: String,
    pub shift_date: NaiveDate,
    pub shift_hours: f64,
    pub overtime_hours: f64,
    pub comment: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub status: String,
    pub approved_at: Option<NaiveDateTime>,
    pub manager_comment: String,
    pub manager_name: Option<String>,
}

impl ShiftRecord {
    pub fn is_pending(&self) -> bool {
        self.status == SHIFT_STATUS_PENDING
    }

    /// Date the editability window is measured from: submission date when
    /// known, otherwise the shift date itself.
    pub fn reference_date(&self) -> NaiveDate {
        self.submitted_at
            .map(|at| at.date())
            .unwrap_or(self.shift_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

impl Decision {
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(Decision::Approve),
            "decline" => Some(Decision::Decline),
            _ => None,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Decline => "decline",
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Decision::Approve => SHIFT_STATUS_APPROVED,
            Decision::Decline => SHIFT_STATUS_DECLINED,
        }
    }
}
