//! Google Sheets append client
//!
//! Authenticates with a service-account JWT grant and appends audit rows via
//! the `values:append` endpoint. The bearer token is cached and refreshed
//! shortly before expiry so the per-turn cost is a single append call.

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::audit::AuditRecord;
use crate::audit::AuditSink;
use crate::audit::ServiceAccountKey;
use crate::config::AuditConfig;
use crate::errors::GuideChatError;
use crate::errors::Result;

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_SECS: u64 = 3600;
/// Refresh this many seconds before the token actually expires
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: u64,
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Client appending rows to a single worksheet of a single spreadsheet
pub struct SheetsClient {
    client: Client,
    credentials: ServiceAccountKey,
    endpoint: String,
    spreadsheet_id: String,
    worksheet: String,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    /// Create a new client holding pre-decoded credentials
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        credentials: ServiceAccountKey,
        spreadsheet_id: String,
        worksheet: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            endpoint: SHEETS_ENDPOINT.to_string(),
            spreadsheet_id,
            worksheet,
            token: Mutex::new(None),
        })
    }

    /// Create a client from the application config, decoding the credential
    /// bundle once here rather than per append
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let creds_b64 = config.credentials_b64.as_deref().ok_or_else(|| {
            GuideChatError::Config("Audit enabled but no credentials configured".to_string())
        })?;
        let credentials = crate::audit::credentials::decode_service_account(creds_b64)?;

        if config.spreadsheet_id.is_empty() {
            return Err(GuideChatError::Config(
                "Audit enabled but no spreadsheet id configured".to_string(),
            ));
        }

        Self::new(
            credentials,
            config.spreadsheet_id.clone(),
            config.worksheet.clone(),
            config.timeout_secs,
        )
    }

    /// Obtain a bearer token, reusing the cached one while it is fresh
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if now_unix() + TOKEN_EXPIRY_MARGIN_SECS < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let iat = now_unix();
        let claims = TokenClaims {
            iss: &self.credentials.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.credentials.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| {
                GuideChatError::Credentials(format!("Invalid service account key: {e}"))
            })?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| GuideChatError::Credentials(format!("Failed to sign JWT: {e}")))?;

        debug!("Exchanging JWT for access token");

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideChatError::Audit(format!(
                "Token exchange failed ({status}): {error_text}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GuideChatError::Audit(format!("Failed to parse token response: {e}")))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: iat + token.expires_in.min(TOKEN_LIFETIME_SECS),
        })
    }

    /// Append a single row to the worksheet
    async fn append_row(&self, row: Vec<String>) -> Result<()> {
        let token = self.access_token().await?;

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.endpoint, self.spreadsheet_id, self.worksheet
        );

        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideChatError::Audit(format!(
                "Append failed ({status}): {error_text}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AuditSink for SheetsClient {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        self.append_row(vec![
            record.session_id.clone(),
            record.timestamp.clone(),
            record.query.clone(),
            record.response.clone(),
        ])
        .await
    }
}
