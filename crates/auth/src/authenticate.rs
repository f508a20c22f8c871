//! Signature verification: proves a token's payload is untampered and was
//! produced with the expected key. Expiration is checked by the gate.

use subtle::ConstantTimeEq;

use crate::{AuthError, Claims, Signer, Token};

/// Sign `claims` into a token.
pub fn sign_claims<S>(claims: &Claims, signer: &S) -> Result<Token, AuthError>
where
    S: Signer + ?Sized,
{
    let payload = claims.encode();
    let signature = signer.sign(&payload)?;
    Ok(Token::new(payload, signature))
}

/// Verify `token` against `signer` and decode its claims.
///
/// The signature is recomputed and compared in constant time, so the running
/// time does not reveal how many leading signature bytes were correct.
pub fn authenticate<S>(token: &Token, signer: &S) -> Result<Claims, AuthError>
where
    S: Signer + ?Sized,
{
    let expected = signer.sign(&token.payload)?;

    let matches: bool = expected.as_slice().ct_eq(token.signature.as_slice()).into();
    if !matches {
        return Err(AuthError::InvalidSignature);
    }

    Claims::decode(&token.payload)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use satellite_core::UserId;

    use super::*;
    use crate::{HmacSigner, SignerError};

    fn signer() -> HmacSigner {
        HmacSigner::new("test-signing-secret").unwrap()
    }

    #[test]
    fn signed_claims_authenticate_unchanged() {
        let claims = Claims::expiring_after(UserId::new(), Utc::now(), Duration::minutes(15));
        let token = sign_claims(&claims, &signer()).unwrap();
        assert_eq!(authenticate(&token, &signer()).unwrap(), claims);
    }

    #[test]
    fn expired_claims_still_authenticate() {
        let claims = Claims::expiring_after(UserId::new(), Utc::now(), Duration::minutes(-5));
        let token = sign_claims(&claims, &signer()).unwrap();
        assert_eq!(authenticate(&token, &signer()).unwrap(), claims);
    }

    #[test]
    fn other_key_is_rejected() {
        let claims = Claims::never_expiring(UserId::new());
        let token = sign_claims(&claims, &signer()).unwrap();
        let other = HmacSigner::new("another-secret").unwrap();
        assert_eq!(authenticate(&token, &other), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn truncated_or_empty_signature_is_rejected() {
        let claims = Claims::never_expiring(UserId::new());
        let mut token = sign_claims(&claims, &signer()).unwrap();

        token.signature.truncate(16);
        assert_eq!(authenticate(&token, &signer()), Err(AuthError::InvalidSignature));

        token.signature.clear();
        assert_eq!(authenticate(&token, &signer()), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn correctly_signed_garbage_is_malformed() {
        let payload = b"{\"hello\":\"world\"}".to_vec();
        let signature = signer().sign(&payload).unwrap();
        let token = Token::new(payload, signature);
        assert_eq!(authenticate(&token, &signer()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn signer_failure_surfaces_as_transient() {
        struct Unavailable;
        impl Signer for Unavailable {
            fn sign(&self, _payload: &[u8]) -> Result<Vec<u8>, SignerError> {
                Err(SignerError::new("key service unreachable"))
            }
        }

        let token = Token::new(b"x".to_vec(), b"y".to_vec());
        let err = authenticate(&token, &Unavailable).unwrap_err();
        assert!(err.is_transient());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: flipping any single bit of payload or signature never
            /// authenticates.
            #[test]
            fn any_bit_flip_is_detected(bit in 0usize..4096, in_signature in any::<bool>()) {
                let claims = Claims::expiring_after(UserId::new(), Utc::now(), Duration::minutes(15));
                let mut token = sign_claims(&claims, &signer()).unwrap();

                let target = if in_signature { &mut token.signature } else { &mut token.payload };
                let bit = bit % (target.len() * 8);
                target[bit / 8] ^= 1 << (bit % 8);

                let result = authenticate(&token, &signer());
                prop_assert!(matches!(
                    result,
                    Err(AuthError::InvalidSignature) | Err(AuthError::MalformedToken)
                ));
            }
        }
    }
}
