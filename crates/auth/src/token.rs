use core::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::AuthError;

/// Claims payload plus a signature over it.
///
/// String form is `base64url(payload) "." base64url(signature)` without
/// padding, which is safe to carry in a header or as an API key. The signature
/// carried here is only ever compared against a recomputed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Token {
    pub fn new(payload: Vec<u8>, signature: Vec<u8>) -> Self {
        Self { payload, signature }
    }

    /// Parse the canonical string form.
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let (payload, signature) = input.split_once('.').ok_or(AuthError::MalformedToken)?;
        if payload.is_empty() || signature.is_empty() || signature.contains('.') {
            return Err(AuthError::MalformedToken);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::MalformedToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::MalformedToken)?;

        Ok(Self { payload, signature })
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&self.payload),
            URL_SAFE_NO_PAD.encode(&self.signature)
        )
    }
}

impl FromStr for Token {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
