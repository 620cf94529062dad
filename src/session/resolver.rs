//! Session resolution: raw token in, identity (or Anonymous) out.
//!
//! Resolution never fails past this boundary. Every decode error (tampered,
//! malformed, expired) degrades to `Anonymous`; the distinction survives
//! only in debug logs. Callers that require an identity escalate Anonymous
//! into an authorization failure themselves.

use crate::clock::now_unix;
use crate::models::Role;
use crate::session::token::TokenCodec;

/// An authenticated identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub org_id: String,
}

/// Outcome of resolving an inbound request's session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Anonymous,
    Authenticated {
        identity: Identity,
        /// Replacement token to set on the outgoing response, present when
        /// the current token is inside the renewal window.
        renewed: Option<String>,
    },
}

/// Resolve a raw token (or its absence) into an identity.
///
/// Sliding renewal is threshold-based: a replacement token is minted only
/// when the remaining lifetime has dropped below the configured threshold.
/// Renewing on every request would keep a stolen token alive indefinitely;
/// the threshold bounds that window to the token lifetime.
pub fn resolve(codec: &TokenCodec, raw: Option<&str>) -> Resolution {
    let Some(token) = raw else {
        return Resolution::Anonymous;
    };

    match codec.decode(token) {
        Ok(claims) => {
            let identity = Identity {
                user_id: claims.sub.clone(),
                role: claims.role,
                org_id: claims.org_id.clone(),
            };
            let renewed = maybe_renew(codec, &claims);
            Resolution::Authenticated { identity, renewed }
        }
        Err(err) => {
            tracing::debug!(error = %err, "session token rejected");
            Resolution::Anonymous
        }
    }
}

/// Mint a replacement token when the current one is near expiry.
///
/// Renewal is fire-and-forget: a signing failure is logged and the request
/// proceeds unrenewed.
fn maybe_renew(codec: &TokenCodec, claims: &crate::session::SessionClaims) -> Option<String> {
    let remaining = claims.exp.saturating_sub(now_unix());
    if remaining >= codec.renew_threshold_secs() {
        return None;
    }

    match codec.encode(&claims.sub, claims.role, &claims.org_id) {
        Ok(token) => Some(token),
        Err(err) => {
            tracing::warn!(error = %err, user_id = %claims.sub, "session renewal failed; continuing unrenewed");
            None
        }
    }
}
