use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ns_core::{Error, Result, SpeechSynthesizer, Voice};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::retry::RetryPolicy;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Service account credentials for Google Cloud.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccount {
    /// Both values must be present and non-blank. Escaped `\n` sequences in the
    /// key (as found in `.env` files) become real newlines.
    pub fn from_parts(private_key: Option<String>, client_email: Option<String>) -> Option<Self> {
        let private_key = private_key.filter(|k| !k.trim().is_empty())?;
        let client_email = client_email.filter(|e| !e.trim().is_empty())?;
        Some(Self {
            client_email: client_email.trim().to_string(),
            private_key: private_key.replace("\\n", "\n"),
        })
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech over REST, authenticated as a service account.
pub struct GoogleSpeechClient {
    client: Arc<Client>,
    account: ServiceAccount,
    retry: RetryPolicy,
    token: Mutex<Option<(String, Instant)>>,
}

impl fmt::Debug for GoogleSpeechClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSpeechClient")
            .field("client", &"<reqwest::Client>")
            .field("account", &self.account)
            .finish()
    }
}

impl GoogleSpeechClient {
    pub fn new(client: Arc<Client>, account: ServiceAccount) -> Self {
        Self {
            client,
            account,
            retry: RetryPolicy::default(),
            token: Mutex::new(None),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn signed_assertion(&self) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .map_err(|e| Error::Speech(format!("invalid service account key: {}", e)))?;
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: TOKEN_URI,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| Error::Speech(format!("could not sign token request: {}", e)))
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some((token, expires)) = cached.as_ref() {
            if Instant::now() < *expires {
                return Ok(token.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response = self
            .client
            .post(TOKEN_URI)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("token exchange failed with HTTP {}: {}", status, body)));
        }

        let token = response.json::<TokenResponse>().await?;
        // refresh a minute early
        let lifetime = token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS as u64).saturating_sub(60);
        *cached = Some((token.access_token.clone(), Instant::now() + Duration::from_secs(lifetime)));
        debug!("🔑 Obtained speech access token for {}", self.account.client_email);
        Ok(token.access_token)
    }

    async fn call(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
        let token = self.access_token().await?;
        let request = synthesize_request(text, voice);

        let response = self
            .client
            .post(SYNTHESIZE_URL)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("synthesis failed with HTTP {}: {}", status, body)));
        }

        let body = response.text().await?;
        decode_audio(&body)
    }
}

fn synthesize_request<'a>(text: &'a str, voice: &'a Voice) -> SynthesizeRequest<'a> {
    SynthesizeRequest {
        input: SynthesisInput { text },
        voice: VoiceSelection {
            language_code: &voice.language_code,
            name: &voice.name,
        },
        audio_config: AudioConfig {
            audio_encoding: "MP3",
        },
    }
}

fn decode_audio(body: &str) -> Result<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)?;
    STANDARD
        .decode(response.audio_content)
        .map_err(|e| Error::Speech(format!("audio payload is not base64: {}", e)))
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechClient {
    fn name(&self) -> &str {
        "Google Cloud Text-to-Speech"
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
        self.retry.run("speech synthesis", || self.call(text, voice)).await
    }
}
