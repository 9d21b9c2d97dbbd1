//! Locating the session token on an incoming request.
//!
//! Non-web clients send `Authorization: Bearer <token>`; browsers rely on a
//! same-site cookie. Both are checked on every request, bearer first.

use cookie::Cookie;
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;

use crate::error::AuthError;
use crate::token::TokenService;

/// Returns the raw token from the bearer header, falling back to `cookie_name`.
///
/// A well-formed bearer header always wins, even when its token later fails
/// verification and the cookie would have passed.
pub fn bearer_or_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookie_value(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

/// Resolves the authenticated client id, or [`AuthError::Unauthorized`] for
/// missing and invalid tokens alike.
pub fn authenticate(
    headers: &HeaderMap,
    cookie_name: &str,
    tokens: &TokenService,
) -> Result<String, AuthError> {
    bearer_or_cookie(headers, cookie_name)
        .and_then(|token| tokens.verify(&token))
        .ok_or(AuthError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&http::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append((*name).clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_header() {
        let map = headers(&[(&AUTHORIZATION, "Bearer abc.def")]);
        assert_eq!(bearer_or_cookie(&map, "session").as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_fallback() {
        let map = headers(&[(&COOKIE, "theme=dark; session=abc.def; other=1")]);
        assert_eq!(bearer_or_cookie(&map, "session").as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let map = headers(&[(&AUTHORIZATION, "Bearer from-header"), (&COOKIE, "session=from-cookie")]);
        assert_eq!(bearer_or_cookie(&map, "session").as_deref(), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_scheme_falls_back_to_cookie() {
        let map = headers(&[(&AUTHORIZATION, "Basic dXNlcjpwYXNz"), (&COOKIE, "session=abc")]);
        assert_eq!(bearer_or_cookie(&map, "session").as_deref(), Some("abc"));
    }

    #[test]
    fn test_nothing_found() {
        let map = headers(&[(&COOKIE, "sessionid=abc")]);
        assert_eq!(bearer_or_cookie(&map, "session"), None);
        assert_eq!(bearer_or_cookie(&HeaderMap::new(), "session"), None);
    }

    #[test]
    fn test_invalid_bearer_does_not_fall_back_to_cookie() {
        let tokens = TokenService::new("secret");
        let token = tokens.sign("42").unwrap();
        let map = headers(&[
            (&AUTHORIZATION, "Bearer stale.token"),
            (&COOKIE, &format!("session={}", token)),
        ]);

        assert_eq!(bearer_or_cookie(&map, "session").as_deref(), Some("stale.token"));
        assert!(matches!(
            authenticate(&map, "session", &tokens),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_authenticate() {
        let tokens = TokenService::new("secret");
        let token = tokens.sign("42").unwrap();

        let good = headers(&[(&AUTHORIZATION, &format!("Bearer {}", token))]);
        assert_eq!(authenticate(&good, "session", &tokens).unwrap(), "42");

        let cookie = headers(&[(&COOKIE, &format!("session={}", token))]);
        assert_eq!(authenticate(&cookie, "session", &tokens).unwrap(), "42");

        let bad = headers(&[(&AUTHORIZATION, "Bearer nope")]);
        assert!(matches!(
            authenticate(&bad, "session", &tokens),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&HeaderMap::new(), "session", &tokens),
            Err(AuthError::Unauthorized)
        ));
    }
}
