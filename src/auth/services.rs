use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::{digest_secret, AuthConfig};

fn digests_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Compare a submitted access code against the held digest.
pub fn verify_code(cfg: &AuthConfig, code: &str) -> bool {
    digests_match(&digest_secret(code), &cfg.secret_digest)
}

/// Session cookie carrying the secret digest.
pub fn session_cookie(cfg: &AuthConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), cfg.secret_digest.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(cfg.cookie_lifetime_secs))
        .build()
}

pub fn is_authenticated(cfg: &AuthConfig, jar: &CookieJar) -> bool {
    let ok = jar
        .get(&cfg.cookie_name)
        .map(|c| digests_match(c.value(), &cfg.secret_digest))
        .unwrap_or(false);
    debug!(authenticated = ok, "session check");
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AuthConfig {
        AuthConfig {
            secret_digest: digest_secret("123456"),
            cookie_name: "foodtracker_auth".into(),
            cookie_lifetime_secs: 3600,
        }
    }

    #[test]
    fn code_verification() {
        assert!(verify_code(&cfg(), "123456"));
        assert!(!verify_code(&cfg(), "654321"));
        assert!(!verify_code(&cfg(), ""));
    }

    #[test]
    fn cookie_attributes() {
        let c = session_cookie(&cfg());
        assert_eq!(c.name(), "foodtracker_auth");
        assert_eq!(c.value(), digest_secret("123456"));
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn session_check_against_jar() {
        let cfg = cfg();
        let jar = CookieJar::new();
        assert!(!is_authenticated(&cfg, &jar));

        let jar = jar.add(session_cookie(&cfg));
        assert!(is_authenticated(&cfg, &jar));

        let forged = CookieJar::new().add(Cookie::new("foodtracker_auth", "123456"));
        assert!(!is_authenticated(&cfg, &forged));
    }
}
