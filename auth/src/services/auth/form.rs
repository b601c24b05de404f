use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("request body is not valid UTF-8")]
    InvalidUtf8,
}

/// Decoded `application/x-www-form-urlencoded` body of a token request.
///
/// `scope` may be sent space- or comma-separated, or repeated; all forms are merged in
/// request order with duplicates dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequestForm {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
}

impl TokenRequestForm {
    pub fn parse(headers: &HeaderMap, body: &[u8]) -> Result<Self, FormError> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        if let Some(content_type) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let mime = content_type.split(';').next().unwrap_or_default().trim();
            if !mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
                return Err(FormError::UnsupportedContentType(mime.to_string()));
            }
        }

        std::str::from_utf8(body).map_err(|_| FormError::InvalidUtf8)?;

        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let value = value.into_owned();
            // First occurrence wins for single-valued parameters.
            let slot = match &*key {
                "grant_type" => &mut form.grant_type,
                "code" => &mut form.code,
                "refresh_token" => &mut form.refresh_token,
                "redirect_uri" => &mut form.redirect_uri,
                "client_id" => &mut form.client_id,
                "client_secret" => &mut form.client_secret,
                "scope" => {
                    for scope in value
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|s| !s.is_empty())
                    {
                        if !form.scopes.iter().any(|s| s == scope) {
                            form.scopes.push(scope.to_string());
                        }
                    }
                    continue;
                }
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }

        Ok(form)
    }

    pub fn grant_type(&self) -> Option<&str> {
        self.grant_type.as_deref()
    }
}

/// Client credentials from an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers
    }

    #[test]
    fn test_parse_client_credentials_form() {
        let form = TokenRequestForm::parse(
            &form_headers(),
            b"grant_type=client_credentials&scope=all+offline",
        )
        .unwrap();

        assert_eq!(form.grant_type(), Some("client_credentials"));
        assert_eq!(form.scopes, vec!["all", "offline"]);
        assert!(form.code.is_none());
    }

    #[test]
    fn test_parse_repeated_scope_parameters() {
        let form =
            TokenRequestForm::parse(&form_headers(), b"scope=all&scope=offline&scope=all").unwrap();

        assert_eq!(form.scopes, vec!["all", "offline"]);
    }

    #[test]
    fn test_parse_comma_separated_scope() {
        let form = TokenRequestForm::parse(&form_headers(), b"scope=all%2Coffline").unwrap();

        assert_eq!(form.scopes, vec!["all", "offline"]);
    }

    #[test]
    fn test_parse_empty_body() {
        let form = TokenRequestForm::parse(&HeaderMap::new(), b"").unwrap();
        assert_eq!(form, TokenRequestForm::default());
    }

    #[test]
    fn test_parse_rejects_json_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let err = TokenRequestForm::parse(&headers, br#"{"grant_type":"x"}"#).unwrap_err();
        assert!(matches!(err, FormError::UnsupportedContentType(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let err = TokenRequestForm::parse(&form_headers(), &[0x67, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, FormError::InvalidUtf8));
    }

    #[test]
    fn test_basic_credentials() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("flytepropeller:foobar");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );

        let creds = BasicCredentials::from_headers(&headers).unwrap();
        assert_eq!(creds.username, "flytepropeller");
        assert_eq!(creds.password, "foobar");
    }

    #[test]
    fn test_basic_credentials_ignores_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        assert!(BasicCredentials::from_headers(&headers).is_none());
    }
}
