use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Deserialize;
use uuid::Uuid;

use satellite_core::UserId;

use crate::AuthError;

/// Signed assertion of who a token represents and until when.
///
/// The signature covers exactly [`Claims::encode`], so the encoding is
/// canonical by construction: a fixed-shape JSON object written field by field,
///
/// ```text
/// {"sub":"<hyphenated lowercase uuid>","exp":<unix seconds, 0 = never>}
/// ```
///
/// Expirations are kept at whole-second precision so that every value survives
/// an encode/decode round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Claims {
    subject: UserId,
    expiration: Option<DateTime<Utc>>,
}

/// Wire shape accepted by [`Claims::decode`] before the canonical check.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireClaims {
    sub: Uuid,
    exp: i64,
}

impl Claims {
    /// Build claims for `subject`. `None` means the token never expires.
    ///
    /// A fractional expiration is rounded up to the next whole second, so a
    /// token never expires before the requested instant. An expiration at or
    /// before the Unix epoch is clamped to one second after it, since `0` is
    /// the never-expires sentinel on the wire.
    pub fn new(subject: UserId, expiration: Option<DateTime<Utc>>) -> Self {
        let expiration = expiration.map(|exp| {
            let exp = round_up_to_second(exp);
            if exp.timestamp() <= 0 {
                DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1)
            } else {
                exp
            }
        });
        Self {
            subject,
            expiration,
        }
    }

    pub fn never_expiring(subject: UserId) -> Self {
        Self::new(subject, None)
    }

    /// Claims valid for `ttl` from `now`. Saturates instead of overflowing.
    pub fn expiring_after(subject: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(subject, Some(expiration))
    }

    pub fn subject(&self) -> UserId {
        self.subject
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// Expired means strictly before `now`; a token is still valid at its
    /// expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiration, Some(exp) if exp < now)
    }

    pub fn check_expiration(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    /// Canonical payload bytes.
    pub fn encode(&self) -> Vec<u8> {
        let exp = self.expiration.map(|e| e.timestamp()).unwrap_or(0);
        format!(
            r#"{{"sub":"{}","exp":{}}}"#,
            self.subject.as_uuid().hyphenated(),
            exp
        )
        .into_bytes()
    }

    /// Decode a payload produced by [`Claims::encode`].
    ///
    /// Anything that is not byte-for-byte canonical (reordered keys, extra
    /// whitespace, alternative uuid spellings) is rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, AuthError> {
        let wire: WireClaims =
            serde_json::from_slice(payload).map_err(|_| AuthError::MalformedToken)?;

        let expiration = match wire.exp {
            0 => None,
            secs if secs < 0 => return Err(AuthError::MalformedToken),
            secs => Some(DateTime::from_timestamp(secs, 0).ok_or(AuthError::MalformedToken)?),
        };

        let claims = Self {
            subject: UserId::from_uuid(wire.sub),
            expiration,
        };

        if claims.encode() != payload {
            return Err(AuthError::MalformedToken);
        }

        Ok(claims)
    }
}

/// Smallest whole-second instant not before `at`. Saturates at the last
/// representable second.
fn round_up_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    let floor = at.trunc_subsecs(0);
    if floor == at {
        return floor;
    }
    floor.checked_add_signed(Duration::seconds(1)).unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x0192_5f2a_7c1e_7d3b_9a44_0b6e_1f2d_3c4b))
    }

    #[test]
    fn encoding_is_fixed_shape() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::new(subject(), Some(at));
        assert_eq!(
            String::from_utf8(claims.encode()).unwrap(),
            r#"{"sub":"01925f2a-7c1e-7d3b-9a44-0b6e1f2d3c4b","exp":1700000000}"#
        );
    }

    #[test]
    fn never_expiring_encodes_zero() {
        let claims = Claims::never_expiring(subject());
        assert!(claims.encode().ends_with(br#""exp":0}"#));
        assert_eq!(Claims::decode(&claims.encode()).unwrap(), claims);
        assert!(!claims.is_expired_at(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn fractional_expiration_rounds_up() {
        let at = DateTime::from_timestamp(1_700_000_000, 1_000_000).unwrap();
        let claims = Claims::new(subject(), Some(at));
        let exp = claims.expiration().unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_001);
        assert_eq!(exp.timestamp_subsec_nanos(), 0);
        assert!(!claims.is_expired_at(at));
        assert_eq!(Claims::decode(&claims.encode()).unwrap(), claims);

        let whole = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(Claims::new(subject(), Some(whole)).expiration(), Some(whole));
    }

    #[test]
    fn short_ttl_is_valid_for_its_full_duration() {
        let now = DateTime::from_timestamp(1_700_000_000, 900_000_000).unwrap();
        let claims = Claims::expiring_after(subject(), now, Duration::milliseconds(500));
        assert!(claims.check_expiration(now + Duration::milliseconds(500)).is_ok());
        assert_eq!(claims.expiration().unwrap().timestamp(), 1_700_000_002);
    }

    #[test]
    fn pre_epoch_expiration_stays_expired() {
        let claims = Claims::new(subject(), Some(DateTime::<Utc>::UNIX_EPOCH));
        assert!(claims.is_expired_at(Utc::now()));
        assert_eq!(Claims::decode(&claims.encode()).unwrap(), claims);
    }

    #[test]
    fn expiration_instant_itself_is_valid() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::new(subject(), Some(at));
        assert!(claims.check_expiration(at).is_ok());
        assert_eq!(
            claims.check_expiration(at + Duration::seconds(1)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn decode_rejects_non_canonical_payloads() {
        let cases: [&[u8]; 7] = [
            br#"{"exp":0,"sub":"01925f2a-7c1e-7d3b-9a44-0b6e1f2d3c4b"}"#,
            br#"{"sub": "01925f2a-7c1e-7d3b-9a44-0b6e1f2d3c4b","exp":0}"#,
            br#"{"sub":"01925F2A-7C1E-7D3B-9A44-0B6E1F2D3C4B","exp":0}"#,
            br#"{"sub":"01925f2a7c1e7d3b9a440b6e1f2d3c4b","exp":0}"#,
            br#"{"sub":"01925f2a-7c1e-7d3b-9a44-0b6e1f2d3c4b","exp":-5}"#,
            br#"{"sub":"01925f2a-7c1e-7d3b-9a44-0b6e1f2d3c4b","exp":0,"admin":true}"#,
            b"not json",
        ];
        for payload in cases {
            assert_eq!(
                Claims::decode(payload),
                Err(AuthError::MalformedToken),
                "{}",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn saturating_ttl_does_not_panic() {
        let claims = Claims::expiring_after(subject(), Utc::now(), Duration::MAX);
        assert_eq!(Claims::decode(&claims.encode()).unwrap(), claims);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: decode(encode(c)) == c for every constructible value.
            #[test]
            fn encode_decode_round_trip(
                raw in any::<u128>(),
                secs in prop::option::of(-1_000_000i64..253_402_300_799i64),
            ) {
                let expiration = secs.map(|s| DateTime::from_timestamp(s, 0).unwrap());
                let claims = Claims::new(UserId::from_uuid(Uuid::from_u128(raw)), expiration);

                let decoded = Claims::decode(&claims.encode()).unwrap();
                prop_assert_eq!(decoded, claims);
                prop_assert_eq!(decoded.encode(), claims.encode());
            }
        }
    }
}
