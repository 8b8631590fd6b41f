use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const VALUES_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Row-oriented spreadsheet primitives. The gateway works with typed
/// records above this boundary; everything below is collaborator glue.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Returns every row of the sheet, header row included.
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()>;

    /// Overwrites a cell range (e.g. "C5:G5") with the given rows.
    async fn update_range(&self, sheet: &str, range: &str, rows: Vec<Vec<String>>) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut key: ServiceAccountKey =
            serde_json::from_str(raw).context("Failed to parse service account JSON")?;
        // Keys passed through .env files usually carry the PEM with
        // literal "\n" sequences.
        key.private_key = key.private_key.replace("\\n", "\n");
        Ok(key)
    }
}

/// Claims for the service-account token grant: the signed JWT is
/// exchanged at the token endpoint for a short-lived bearer token.
#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets v4 values client authorized by a service account.
pub struct GoogleSheetsApi {
    client: reqwest::Client,
    key: ServiceAccountKey,
    sheet_id: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsApi {
    pub fn new(key: ServiceAccountKey, sheet_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            key,
            sheet_id: sheet_id.to_string(),
            token: Mutex::new(None),
        }
    }

    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now();
        let claims = TokenClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .context("Failed to parse service account private key")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .context("Failed to sign token request")?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("Token request failed")?;
        let response = check_status(response).await?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(VALUES_BASE)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid Sheets base URL"))?
            .push(&self.sheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Sheets API error: {} - {}", status, body);
    }
    Ok(response)
}

#[async_trait]
impl SheetsApi for GoogleSheetsApi {
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(self.values_url(sheet)?)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to read sheet {sheet}"))?;
        let response = check_status(response).await?;

        let range: ValueRange = response
            .json()
            .await
            .context("Failed to parse values response")?;
        Ok(range.values)
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .post(self.values_url(&format!("{sheet}:append"))?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await
            .with_context(|| format!("Failed to append to sheet {sheet}"))?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_range(&self, sheet: &str, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .put(self.values_url(&format!("{sheet}!{range}"))?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await
            .with_context(|| format!("Failed to update {sheet}!{range}"))?;
        check_status(response).await?;
        Ok(())
    }
}
