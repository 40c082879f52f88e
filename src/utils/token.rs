//! Signed, time-limited action tokens.
//!
//! A token is `base64url(claims_json).base64url(hmac_sha256(first_part))`.
//! Nothing is stored server side: the token is the only witness of a pending
//! action, and redeeming it twice is allowed as long as it has not expired.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

use crate::types::token::{ActionClaims, ActionKind};

type HmacSha256 = Hmac<Sha256>;

/// Reasons a token was refused, plus `OutOfRange` when minting overflows.
/// Refusals are for logs only; callers see one
/// generic outcome (see `AppError::InvalidToken`).
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token minted for another action")]
    WrongAction,
    #[error("token lifetime out of range")]
    OutOfRange,
    #[error("token minted for another user")]
    UserMismatch,
    #[error("token payload rejected")]
    Rejected,
}

#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSigner([REDACTED])")
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self { key: secret.as_ref().to_vec() }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    pub fn mint(
        &self,
        kind: ActionKind,
        user_id: i32,
        expires_in: Duration,
        new_email: Option<String>,
    ) -> Result<String, TokenError> {
        self.mint_at(kind, user_id, expires_in, new_email, Utc::now())
    }

    pub fn mint_at(
        &self,
        kind: ActionKind,
        user_id: i32,
        expires_in: Duration,
        new_email: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(expires_in)
            .ok_or(TokenError::OutOfRange)?;
        let claims = ActionClaims {
            kind,
            user_id,
            new_email,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let payload = serde_json::to_vec(&claims).expect("serialize claims");
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload_b64}.{signature_b64}"))
    }

    /// Checks signature, expiry and kind. Used on its own for session tokens,
    /// where the token is what identifies the user.
    pub fn verify(&self, token: &str, kind: ActionKind) -> Result<ActionClaims, TokenError> {
        self.verify_at(token, kind, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<ActionClaims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let claims: ActionClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.kind != kind {
            return Err(TokenError::WrongAction);
        }
        Ok(claims)
    }

    pub fn redeem(
        &self,
        token: &str,
        kind: ActionKind,
        user_id: i32,
    ) -> Result<ActionClaims, TokenError> {
        self.redeem_with(token, kind, user_id, |_| true)
    }

    /// Like `redeem`, then runs `validator` once the user id has matched.
    pub fn redeem_with<F>(
        &self,
        token: &str,
        kind: ActionKind,
        user_id: i32,
        validator: F,
    ) -> Result<ActionClaims, TokenError>
    where
        F: FnOnce(&ActionClaims) -> bool,
    {
        self.redeem_at(token, kind, user_id, validator, Utc::now())
    }

    pub fn redeem_at<F>(
        &self,
        token: &str,
        kind: ActionKind,
        user_id: i32,
        validator: F,
        now: DateTime<Utc>,
    ) -> Result<ActionClaims, TokenError>
    where
        F: FnOnce(&ActionClaims) -> bool,
    {
        let claims = self.verify_at(token, kind, now)?;
        if claims.user_id != user_id {
            return Err(TokenError::UserMismatch);
        }
        if !validator(&claims) {
            return Err(TokenError::Rejected);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("SjefBOa$1FgGco0SkfPO392qqH9%a492")
    }

    #[test]
    fn round_trip() {
        let s = signer();
        let token = s.mint(ActionKind::Reset, 7, Duration::seconds(3600), None).unwrap();
        let claims = s.redeem(&token, ActionKind::Reset, 7).unwrap();
        assert_eq!(claims.kind, ActionKind::Reset);
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.new_email, None);
    }

    #[test]
    fn minting_is_deterministic_for_a_fixed_instant() {
        let s = signer();
        let at = Utc::now();
        let a = s.mint_at(ActionKind::Confirm, 1, Duration::hours(1), None, at).unwrap();
        let b = s.mint_at(ActionKind::Confirm, 1, Duration::hours(1), None, at).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn confirm_scenario_for_user_42() {
        let s = signer();
        let issued = Utc::now();
        let token = s.mint_at(ActionKind::Confirm, 42, ActionKind::Confirm.default_ttl(), None, issued).unwrap();

        let six_days = issued + Duration::days(6);
        assert!(s.redeem_at(&token, ActionKind::Confirm, 42, |_| true, six_days).is_ok());
        // replays still validate; nothing marks a token as spent
        assert!(s.redeem_at(&token, ActionKind::Confirm, 42, |_| true, six_days).is_ok());

        let eight_days = issued + Duration::days(8);
        assert!(matches!(
            s.redeem_at(&token, ActionKind::Confirm, 42, |_| true, eight_days),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn expired_token_fails_with_valid_signature() {
        let s = signer();
        let token = s.mint_at(
            ActionKind::Reset,
            3,
            Duration::seconds(3600),
            None,
            Utc::now() - Duration::hours(2),
        ).unwrap();
        assert!(matches!(s.redeem(&token, ActionKind::Reset, 3), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_user_fails_before_expiry() {
        let s = signer();
        let token = s.mint(ActionKind::Confirm, 42, Duration::seconds(3600), None).unwrap();
        assert!(matches!(
            s.redeem(&token, ActionKind::Confirm, 43),
            Err(TokenError::UserMismatch)
        ));
    }

    #[test]
    fn wrong_kind_fails() {
        let s = signer();
        let token = s.mint(ActionKind::Reset, 42, Duration::seconds(3600), None).unwrap();
        assert!(matches!(
            s.redeem(&token, ActionKind::Confirm, 42),
            Err(TokenError::WrongAction)
        ));
        assert!(s.verify(&token, ActionKind::Session).is_err());
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = signer().mint(ActionKind::Confirm, 1, Duration::seconds(60), None).unwrap();
        let other = TokenSigner::new("another-secret");
        assert!(matches!(
            other.redeem(&token, ActionKind::Confirm, 1),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn every_single_bit_flip_is_rejected() {
        let s = signer();
        let token = s.mint(
            ActionKind::ChangeEmail,
            42,
            Duration::seconds(3600),
            Some("new@example.com".into()),
        ).unwrap();
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.to_vec();
                tampered[i] ^= 1 << bit;
                let tampered = String::from_utf8_lossy(&tampered);
                assert!(
                    s.redeem(&tampered, ActionKind::ChangeEmail, 42).is_err(),
                    "flip of bit {bit} in byte {i} was accepted"
                );
            }
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let s = signer();
        assert!(matches!(s.verify("", ActionKind::Confirm), Err(TokenError::Malformed)));
        assert!(matches!(s.verify("no-dot", ActionKind::Confirm), Err(TokenError::Malformed)));
        assert!(s.verify("a.b", ActionKind::Confirm).is_err());
    }

    #[test]
    fn validator_runs_only_after_identity_matches() {
        let s = signer();
        let token = s.mint(ActionKind::ChangeEmail, 5, Duration::seconds(3600), Some("n@x.io".into())).unwrap();

        let mut called = false;
        let res = s.redeem_with(&token, ActionKind::ChangeEmail, 6, |_| {
            called = true;
            true
        });
        assert!(matches!(res, Err(TokenError::UserMismatch)));
        assert!(!called);

        let res = s.redeem_with(&token, ActionKind::ChangeEmail, 5, |c| c.new_email.is_none());
        assert!(matches!(res, Err(TokenError::Rejected)));

        let claims = s
            .redeem_with(&token, ActionKind::ChangeEmail, 5, |c| c.new_email.is_some())
            .unwrap();
        assert_eq!(claims.new_email.as_deref(), Some("n@x.io"));
    }

    #[test]
    fn many_outstanding_tokens_stay_valid() {
        let s = signer();
        let first = s.mint_at(ActionKind::Reset, 9, Duration::hours(1), None, Utc::now() - Duration::seconds(5)).unwrap();
        let second = s.mint(ActionKind::Reset, 9, Duration::hours(1), None).unwrap();
        assert_ne!(first, second);
        assert!(s.redeem(&first, ActionKind::Reset, 9).is_ok());
        assert!(s.redeem(&second, ActionKind::Reset, 9).is_ok());
    }

    #[test]
    fn huge_lifetime_is_refused_without_panicking() {
        let s = signer();
        let res = s.mint(ActionKind::Session, 1, Duration::days(365 * 1_000_000), None);
        assert!(matches!(res, Err(TokenError::OutOfRange)));
        let res = s.mint(ActionKind::Session, 1, Duration::MAX, None);
        assert!(matches!(res, Err(TokenError::OutOfRange)));
    }

    #[test]
    fn token_is_still_valid_at_its_expiry_second() {
        let s = signer();
        let issued = Utc::now();
        let token = s.mint_at(ActionKind::Reset, 4, Duration::seconds(3600), None, issued).unwrap();
        let exp = issued + Duration::seconds(3600);

        assert!(s.redeem_at(&token, ActionKind::Reset, 4, |_| true, exp).is_ok());
        assert!(matches!(
            s.redeem_at(&token, ActionKind::Reset, 4, |_| true, exp + Duration::seconds(1)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn debug_hides_the_key() {
        assert_eq!(format!("{:?}", signer()), "TokenSigner([REDACTED])");
    }
}
