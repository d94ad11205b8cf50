use std::collections::HashMap;

use anyhow::Context;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ProviderCredentials};

/// One canonical user record, whatever provider authenticated it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalProfile {
    /// Provider-assigned id.
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub provider: String,
}

/// The single capability a provider must implement: turn its userinfo
/// payload into a [`CanonicalProfile`]. Adding a provider means one impl
/// plus one entry in [`ProviderRegistry::from_config`].
pub trait ProfileSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn userinfo_url(&self) -> &'static str;
    fn scopes(&self) -> &'static [&'static str];
    fn auth_url(&self) -> &'static str;
    fn token_url(&self) -> &'static str;
    fn normalize(&self, payload: &serde_json::Value) -> anyhow::Result<CanonicalProfile>;
}

struct Google;

impl ProfileSource for Google {
    fn name(&self) -> &'static str {
        "google"
    }
    fn userinfo_url(&self) -> &'static str {
        "https://www.googleapis.com/oauth2/v2/userinfo"
    }
    fn scopes(&self) -> &'static [&'static str] {
        &["openid", "profile", "email"]
    }
    fn auth_url(&self) -> &'static str {
        "https://accounts.google.com/o/oauth2/v2/auth"
    }
    fn token_url(&self) -> &'static str {
        "https://oauth2.googleapis.com/token"
    }

    fn normalize(&self, payload: &serde_json::Value) -> anyhow::Result<CanonicalProfile> {
        let id = payload["id"]
            .as_str()
            .context("google profile missing id")?
            .to_string();
        let display_name = payload["name"]
            .as_str()
            .or_else(|| payload["email"].as_str())
            .unwrap_or(id.as_str())
            .to_string();
        Ok(CanonicalProfile {
            id,
            display_name,
            email: payload["email"].as_str().map(str::to_string),
            provider: self.name().to_string(),
        })
    }
}

struct GitHub;

impl ProfileSource for GitHub {
    fn name(&self) -> &'static str {
        "github"
    }
    fn userinfo_url(&self) -> &'static str {
        "https://api.github.com/user"
    }
    fn scopes(&self) -> &'static [&'static str] {
        &["user:email", "read:user"]
    }
    fn auth_url(&self) -> &'static str {
        "https://github.com/login/oauth/authorize"
    }
    fn token_url(&self) -> &'static str {
        "https://github.com/login/oauth/access_token"
    }

    fn normalize(&self, payload: &serde_json::Value) -> anyhow::Result<CanonicalProfile> {
        // GitHub ids are numeric
        let id = payload["id"]
            .as_i64()
            .context("github profile missing id")?
            .to_string();
        // real name is optional; fall back to the login
        let display_name = payload["name"]
            .as_str()
            .or_else(|| payload["login"].as_str())
            .unwrap_or(id.as_str())
            .to_string();
        Ok(CanonicalProfile {
            id,
            display_name,
            email: payload["email"].as_str().map(str::to_string),
            provider: self.name().to_string(),
        })
    }
}

struct LinkedIn;

impl ProfileSource for LinkedIn {
    fn name(&self) -> &'static str {
        "linkedin"
    }
    fn userinfo_url(&self) -> &'static str {
        "https://api.linkedin.com/v2/userinfo"
    }
    fn scopes(&self) -> &'static [&'static str] {
        &["openid", "profile", "email"]
    }
    fn auth_url(&self) -> &'static str {
        "https://www.linkedin.com/oauth/v2/authorization"
    }
    fn token_url(&self) -> &'static str {
        "https://www.linkedin.com/oauth/v2/accessToken"
    }

    fn normalize(&self, payload: &serde_json::Value) -> anyhow::Result<CanonicalProfile> {
        let id = payload["sub"]
            .as_str()
            .context("linkedin profile missing sub")?
            .to_string();
        let display_name = payload["name"]
            .as_str()
            .or_else(|| payload["email"].as_str())
            .unwrap_or(id.as_str())
            .to_string();
        Ok(CanonicalProfile {
            id,
            display_name,
            email: payload["email"].as_str().map(str::to_string),
            provider: self.name().to_string(),
        })
    }
}

/// A registered provider: its OAuth client plus the profile capability.
pub struct Provider {
    client: BasicClient,
    source: Box<dyn ProfileSource>,
}

impl Provider {
    fn new(
        source: Box<dyn ProfileSource>,
        creds: &ProviderCredentials,
        callback_url: String,
    ) -> anyhow::Result<Self> {
        let client = BasicClient::new(
            ClientId::new(creds.client_id.clone()),
            Some(ClientSecret::new(creds.client_secret.clone())),
            AuthUrl::new(source.auth_url().to_string())?,
            Some(TokenUrl::new(source.token_url().to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(callback_url)?);
        Ok(Self { client, source })
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// Consent-screen URL plus the CSRF state to stash in a cookie.
    pub fn authorize(&self) -> (oauth2::url::Url, CsrfToken) {
        let mut request = self.client.authorize_url(CsrfToken::new_random);
        for scope in self.source.scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        request.url()
    }

    /// Exchange the callback code and fetch the canonical profile.
    pub async fn exchange_callback(
        &self,
        http: &reqwest::Client,
        code: String,
    ) -> anyhow::Result<CanonicalProfile> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .context("token exchange failed")?;

        let payload: serde_json::Value = http
            .get(self.source.userinfo_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token.access_token().secret()))
            .header(reqwest::header::USER_AGENT, "triviamind")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.source.normalize(&payload)
    }
}

/// Explicit name-to-provider mapping, built once at startup and carried
/// in [`crate::state::AppState`].
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Provider>,
}

impl ProviderRegistry {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers = HashMap::new();
        let entries: [(Box<dyn ProfileSource>, &Option<ProviderCredentials>); 3] = [
            (Box::new(Google), &config.google),
            (Box::new(GitHub), &config.github),
            (Box::new(LinkedIn), &config.linkedin),
        ];
        for (source, creds) in entries {
            let name = source.name();
            let Some(creds) = creds else {
                tracing::info!(provider = name, "no credentials configured, skipping");
                continue;
            };
            match Provider::new(source, creds, config.callback_url(name)) {
                Ok(provider) => {
                    providers.insert(name, provider);
                }
                Err(e) => {
                    tracing::error!(provider = name, error = %e, "failed to register provider");
                }
            }
        }
        Self { providers }
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_holds_only_configured_providers() {
        let registry = ProviderRegistry::from_config(&crate::config::test_config());
        assert!(registry.get("github").is_some());
        assert!(registry.get("google").is_none());
        assert!(registry.get("linkedin").is_none());
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let registry = ProviderRegistry::from_config(&crate::config::test_config());
        let (url, state) = registry.get("github").unwrap().authorize();
        let query = url.query().unwrap();
        assert!(url.as_str().starts_with("https://github.com/login/oauth/authorize"));
        assert!(query.contains("client_id=test-client"));
        assert!(query.contains(&format!("state={}", state.secret())));
        assert!(query.contains("redirect_uri="));
    }

    #[test]
    fn github_profile_falls_back_to_login() {
        let profile = GitHub
            .normalize(&json!({"id": 583231, "login": "octocat", "name": null, "email": null}))
            .unwrap();
        assert_eq!(profile.id, "583231");
        assert_eq!(profile.display_name, "octocat");
        assert_eq!(profile.email, None);
        assert_eq!(profile.provider, "github");
    }

    #[test]
    fn google_profile_uses_name_and_email() {
        let profile = Google
            .normalize(&json!({"id": "10485760", "name": "Test User", "email": "t@example.com"}))
            .unwrap();
        assert_eq!(profile.id, "10485760");
        assert_eq!(profile.display_name, "Test User");
        assert_eq!(profile.email.as_deref(), Some("t@example.com"));
    }

    #[test]
    fn linkedin_profile_maps_sub() {
        let profile = LinkedIn
            .normalize(&json!({"sub": "abc-123", "name": "Test User", "email": "t@example.com"}))
            .unwrap();
        assert_eq!(profile.id, "abc-123");
        assert_eq!(profile.provider, "linkedin");
    }

    #[test]
    fn missing_id_is_an_error() {
        assert!(GitHub.normalize(&json!({"login": "octocat"})).is_err());
        assert!(Google.normalize(&json!({"name": "x"})).is_err());
    }
}
