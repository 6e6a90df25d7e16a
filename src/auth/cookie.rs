//! Defines functions for handling user authentication with cookies.
//!
//! The auth state lives in a single private (encrypted) cookie that holds a
//! serialized [Token] with the user ID and the expiry time. The expiry is
//! stored in the token itself so that a client cannot keep a session alive by
//! editing the cookie's expires attribute.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{Error, auth::UserID, auth::token::Token};

/// The name of the cookie holding the serialized auth token.
pub(crate) const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_auth_cookie(token: &Token, local_offset: UtcOffset) -> Result<Cookie<'static>, Error> {
    let value = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(Cookie::build((COOKIE_TOKEN, value))
        .expires(token.expires_at.to_offset(local_offset))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build())
}

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// Sets the initial expiry of the token to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    Ok(jar.add(build_auth_cookie(&token, local_offset)?))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the auth token from the cookie jar.
///
/// # Errors
///
/// Returns a:
/// - [Error::CookieMissing] if the token cookie is not in the cookie jar.
/// - [Error::InvalidCredentials] if the token cannot be parsed or has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidCredentials)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}

/// Set the expiry of the auth token in `jar` to the latest of UTC now
/// plus `duration` and the token's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns a:
/// - [Error::CookieMissing] if the token cookie is not in the cookie jar.
/// - [Error::InvalidCredentials] if the token cannot be parsed or has expired.
/// - [Error::JSONSerializationError] if the updated token cannot be serialized.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::DateError("expiry overflowed the date-time range".to_owned()))?;

    let token = Token {
        user_id: token.user_id,
        expires_at: max(token.expires_at, new_expiry),
    };

    Ok(jar.add(build_auth_cookie(&token, local_offset)?))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        auth::{
            UserID,
            cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION},
        },
    };

    use super::{
        extend_auth_cookie_duration_if_needed, get_token_from_cookies, invalidate_auth_cookie,
        set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = get_jar();
        let user_id = UserID::new(1);

        let jar =
            set_auth_cookie(jar, user_id, DEFAULT_COOKIE_DURATION, UtcOffset::UTC).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, user_id);
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn cookie_expires_attribute_matches_token_expiry() {
        let jar = get_jar();

        let jar = set_auth_cookie(
            jar,
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_date_time_close!(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn get_token_fails_with_empty_jar() {
        let jar = get_jar();

        assert_eq!(get_token_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn get_token_fails_with_expired_token() {
        let jar = get_jar();
        let jar = set_auth_cookie(
            jar,
            UserID::new(1),
            Duration::minutes(-5),
            UtcOffset::UTC,
        )
        .unwrap();

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = get_jar();
        let jar = set_auth_cookie(
            jar,
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let jar =
            extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10), UtcOffset::UTC)
                .unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + Duration::minutes(10)
        );
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        // The initial token expires in 5 minutes, so extending it by 5 seconds should not change the expiry.
        let jar =
            extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5), UtcOffset::UTC)
                .unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials),
        );
    }
}
