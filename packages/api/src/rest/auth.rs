//! `/auth/v1`: password sign-up/sign-in, refresh and logout.

use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use store::{AuthUser, Session, SignUpMetadata};

use super::{check, RestBackend};
use crate::backend::AuthEvent;
use crate::error::ApiError;

/// Seconds before expiry at which a held session counts as stale.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// 4xx answers from the auth service carry user-facing messages.
fn auth_error(e: ApiError) -> ApiError {
    match e {
        ApiError::Http { status, message } if (400..500).contains(&status) && status != 429 => {
            ApiError::Auth(message)
        }
        other => other,
    }
}

fn is_expired(session: &Session) -> bool {
    session
        .expires_at
        .is_some_and(|at| at - EXPIRY_MARGIN_SECS <= Utc::now().timestamp())
}

/// Sign-up answers with a session when the project auto-confirms emails and
/// with the bare user object otherwise.
fn parse_sign_up(body: serde_json::Value) -> Result<(AuthUser, Option<Session>), ApiError> {
    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body)?;
        let session = token.into_session();
        return Ok((session.user.clone(), Some(session)));
    }
    let user = match body.get("user") {
        Some(user) => serde_json::from_value(user.clone())?,
        None => serde_json::from_value(body)?,
    };
    Ok((user, None))
}

impl RestBackend {
    pub(super) async fn session_or_refresh(&self) -> Result<Option<Session>, ApiError> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if !is_expired(&session) {
            return Ok(Some(session));
        }
        tracing::debug!("Held session expired, refreshing");
        match self.auth_refresh().await {
            Ok(session) => Ok(Some(session)),
            Err(ApiError::Auth(message)) => {
                tracing::info!("Session refresh rejected: {message}");
                self.store_session(None);
                self.emit(AuthEvent::SignedOut);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub(super) async fn auth_sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser, ApiError> {
        let response = self
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let body: serde_json::Value = check(response).await.map_err(auth_error)?.json().await?;
        let (user, session) = parse_sign_up(body)?;
        if let Some(session) = session {
            self.store_session(Some(session.clone()));
            self.emit(AuthEvent::SignedIn(session));
        }
        tracing::info!("Account created for {}", user.id);
        Ok(user)
    }

    pub(super) async fn auth_sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let response = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check(response).await.map_err(auth_error)?.json().await?;
        let session = token.into_session();
        self.store_session(Some(session.clone()));
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    pub(super) async fn auth_refresh(&self) -> Result<Session, ApiError> {
        let refresh_token = self
            .current_session()
            .and_then(|s| s.refresh_token)
            .ok_or(ApiError::NotAuthenticated)?;
        let response = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = check(response).await.map_err(auth_error)?.json().await?;
        let session = token.into_session();
        self.store_session(Some(session.clone()));
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// Revoke the session server-side, then forget it locally. A failed
    /// revocation leaves the local session untouched.
    pub(super) async fn auth_sign_out(&self) -> Result<(), ApiError> {
        if self.current_session().is_some() {
            let response = self.request(Method::POST, "/auth/v1/logout").send().await?;
            match check(response).await {
                Ok(_) => {}
                // Token already invalid server-side
                Err(ApiError::Http { status: 401 | 403 | 404, .. }) => {}
                Err(e) => return Err(e),
            }
        }
        self.store_session(None);
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_json() -> serde_json::Value {
        json!({ "id": "u1", "email": "amal@example.com", "aud": "authenticated" })
    }

    #[test]
    fn test_token_response_computes_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": user_json(),
        }))
        .unwrap();
        let before = Utc::now().timestamp();
        let session = token.into_session();
        let at = session.expires_at.unwrap();
        assert!(at >= before + 3600 && at <= Utc::now().timestamp() + 3600);
        assert_eq!(session.user.id, "u1");
    }

    #[test]
    fn test_sign_up_with_confirmation_pending() {
        let (user, session) = parse_sign_up(user_json()).unwrap();
        assert_eq!(user.id, "u1");
        assert!(session.is_none());
    }

    #[test]
    fn test_sign_up_with_auto_confirm() {
        let (user, session) = parse_sign_up(json!({
            "access_token": "at",
            "expires_at": 1_900_000_000,
            "user": user_json(),
        }))
        .unwrap();
        assert_eq!(user.email.as_deref(), Some("amal@example.com"));
        assert_eq!(session.unwrap().expires_at, Some(1_900_000_000));
    }

    #[test]
    fn test_client_errors_become_auth_errors() {
        let e = auth_error(ApiError::Http { status: 400, message: "Invalid login credentials".into() });
        assert_eq!(e, ApiError::Auth("Invalid login credentials".into()));
        let e = auth_error(ApiError::Http { status: 503, message: "down".into() });
        assert!(e.is_transient());
    }

    #[test]
    fn test_expiry_margin() {
        let mut session = Session {
            access_token: "at".into(),
            refresh_token: None,
            expires_at: None,
            user: AuthUser { id: "u1".into(), email: None },
        };
        assert!(!is_expired(&session));
        session.expires_at = Some(Utc::now().timestamp() + 10);
        assert!(is_expired(&session));
        session.expires_at = Some(Utc::now().timestamp() + 3600);
        assert!(!is_expired(&session));
    }
}
