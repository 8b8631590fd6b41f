use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub sheet_id: String,
    pub service_account_json: String,
    pub tz_offset_hours: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let bot_token = env::var("BOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("BOT_TOKEN environment variable is required"))?;

        let sheet_id = env::var("GSHEET_ID")
            .map_err(|_| anyhow::anyhow!("GSHEET_ID environment variable is required"))?;

        let service_account_json = env::var("GOOGLE_SERVICE_ACCOUNT_JSON").map_err(|_| {
            anyhow::anyhow!("GOOGLE_SERVICE_ACCOUNT_JSON environment variable is required")
        })?;

        let tz_offset_hours = env::var("TZ_OFFSET_HOURS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3);

        Ok(Config {
            bot_token,
            sheet_id,
            service_account_json,
            tz_offset_hours,
        })
    }

    pub fn sheet_link(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.sheet_id)
    }
}
