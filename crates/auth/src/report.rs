//! Structured reporting of authentication and authorization events.
//!
//! Components take an `Arc<dyn AuthReporter>` instead of logging directly, so
//! the decision code stays independent of the logging backend and tests can
//! observe what was reported.

use landspice_core::UserId;

/// Result of one sign-in attempt, as recorded by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    InvalidInput,
    /// Username unknown. Reported separately, never surfaced to the caller.
    UnknownUser,
    WrongPassword,
    AccountNotActive,
    StoreUnavailable,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::InvalidInput => "invalid_input",
            AttemptOutcome::UnknownUser => "unknown_user",
            AttemptOutcome::WrongPassword => "wrong_password",
            AttemptOutcome::AccountNotActive => "account_not_active",
            AttemptOutcome::StoreUnavailable => "store_unavailable",
        }
    }
}

pub trait AuthReporter: Send + Sync {
    /// One call per sign-in attempt. Never receives the password.
    fn sign_in_attempt(&self, username: &str, outcome: AttemptOutcome, user_id: Option<UserId>);

    /// A gate or checker refused a request.
    fn access_denied(&self, user_id: Option<UserId>, target: &str, reason: &str);

    /// Unexpected failure that was absorbed (fail closed or best effort).
    fn internal_error(&self, context: &'static str, error: &dyn std::error::Error);
}

/// Production reporter: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl AuthReporter for TracingReporter {
    fn sign_in_attempt(&self, username: &str, outcome: AttemptOutcome, user_id: Option<UserId>) {
        let user_id = user_id.map(|id| id.to_string());
        match outcome {
            AttemptOutcome::Success => tracing::info!(
                username = %username,
                user_id = user_id.as_deref().unwrap_or(""),
                outcome = outcome.as_str(),
                "sign-in succeeded"
            ),
            _ => tracing::warn!(
                username = %username,
                user_id = user_id.as_deref().unwrap_or(""),
                outcome = outcome.as_str(),
                "sign-in rejected"
            ),
        }
    }

    fn access_denied(&self, user_id: Option<UserId>, target: &str, reason: &str) {
        let user_id = user_id.map(|id| id.to_string());
        tracing::warn!(
            user_id = user_id.as_deref().unwrap_or(""),
            target = %target,
            reason = %reason,
            "access denied"
        );
    }

    fn internal_error(&self, context: &'static str, error: &dyn std::error::Error) {
        tracing::error!(context = context, error = %error, "auth internal error");
    }
}
