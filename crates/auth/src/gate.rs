//! Path-level request authorization.
//!
//! [`RouteTable::decide`] is a pure function of the request path and the
//! session read at the start of the request. It never errors: every outcome,
//! including "not signed in", is a [`GateDecision`].

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::{Identity, Role};

/// Machine-readable code passed to the error page as `?reason=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorReason {
    AccountDeactivated,
    CredentialsSignin,
    AccessDenied,
    SessionRequired,
    Configuration,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::AccountDeactivated => "AccountDeactivated",
            ErrorReason::CredentialsSignin => "CredentialsSignin",
            ErrorReason::AccessDenied => "AccessDenied",
            ErrorReason::SessionRequired => "SessionRequired",
            ErrorReason::Configuration => "Configuration",
        }
    }
}

impl core::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path matcher. Prefixes match whole segments: `/admin` covers `/admin` and
/// `/admin/users`, not `/administrator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self::Prefix(path)
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Prefix(p) if p == "/" => path.starts_with('/'),
            PathPattern::Prefix(p) => {
                path.strip_prefix(p.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }

    fn specificity(&self) -> usize {
        match self {
            PathPattern::Exact(p) | PathPattern::Prefix(p) => p.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub pattern: PathPattern,
    pub roles: Vec<Role>,
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// No valid session. `callback_url` is the originally requested path.
    RedirectToSignIn { callback_url: String },
    RedirectToError(ErrorReason),
    RedirectToUnauthorized,
    /// Alias resolution (e.g. `/dashboard` → role landing page).
    RedirectTo(String),
}

/// Static routing policy: public paths, role-restricted prefixes, landing pages.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<PathPattern>,
    role_rules: Vec<RoleRule>,
    landing: HashMap<Role, String>,
    dashboard_alias: String,
    sign_in_path: String,
    error_path: String,
    unauthorized_path: String,
}

impl RouteTable {
    /// Empty table: nothing public, no role rules, no landing pages.
    pub fn new() -> Self {
        Self {
            public: Vec::new(),
            role_rules: Vec::new(),
            landing: HashMap::new(),
            dashboard_alias: "/dashboard".to_string(),
            sign_in_path: "/auth/signin".to_string(),
            error_path: "/auth/error".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
        }
    }

    pub fn landspice_default() -> Self {
        use Role::*;

        Self::new()
            .public(PathPattern::exact("/"))
            .public(PathPattern::prefix("/auth"))
            .public(PathPattern::prefix("/api/auth"))
            .public(PathPattern::exact("/api/health"))
            .public(PathPattern::exact("/unauthorized"))
            .public(PathPattern::prefix("/static"))
            .public(PathPattern::exact("/favicon.ico"))
            .restrict(PathPattern::prefix("/admin"), &[Admin])
            .restrict(PathPattern::prefix("/api/admin"), &[Admin])
            .restrict(PathPattern::prefix("/restaurant"), &[Restaurant, Admin])
            .restrict(PathPattern::prefix("/bank"), &[Bank, Admin])
            .restrict(PathPattern::prefix("/supplier"), &[Supplier, Admin])
            .restrict(PathPattern::prefix("/marketer"), &[Marketer, Admin])
            .restrict(PathPattern::prefix("/employee"), &[LandspiceEmployee, Admin])
            .landing(Admin, "/admin/dashboard")
            .landing(Restaurant, "/restaurant/dashboard")
            .landing(Bank, "/bank/dashboard")
            .landing(Supplier, "/supplier/dashboard")
            .landing(Marketer, "/marketer/dashboard")
            .landing(LandspiceEmployee, "/employee/dashboard")
    }

    pub fn public(mut self, pattern: PathPattern) -> Self {
        self.public.push(pattern);
        self
    }

    pub fn restrict(mut self, pattern: PathPattern, roles: &[Role]) -> Self {
        self.role_rules.push(RoleRule {
            pattern,
            roles: roles.to_vec(),
        });
        self
    }

    pub fn landing(mut self, role: Role, path: impl Into<String>) -> Self {
        self.landing.insert(role, path.into());
        self
    }

    pub fn dashboard_alias(mut self, path: impl Into<String>) -> Self {
        self.dashboard_alias = path.into();
        self
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn unauthorized_path(&self) -> &str {
        &self.unauthorized_path
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| p.matches(path))
    }

    pub fn landing_for(&self, role: Role) -> Option<&str> {
        self.landing.get(&role).map(String::as_str)
    }

    /// The most specific role rule covering `path`, if any.
    fn rule_for(&self, path: &str) -> Option<&RoleRule> {
        self.role_rules
            .iter()
            .filter(|rule| rule.pattern.matches(path))
            .max_by_key(|rule| rule.pattern.specificity())
    }

    /// Whether `role` clears the path rules for `path` (ignores session state).
    pub fn role_may_access(&self, role: Role, path: &str) -> bool {
        let path = canonical_path(path);
        if self.is_public(&path) {
            return true;
        }
        self.rule_for(&path).is_none_or(|rule| rule.roles.contains(&role))
    }

    /// Decide what happens to a request. First matching step wins:
    /// public path, missing session, inactive account, role rule, dashboard
    /// alias, allow.
    ///
    /// Rules are matched against [`canonical_path`], so an encoded or dotted
    /// spelling of a restricted path is judged as that path.
    pub fn decide(&self, path: &str, query: Option<&str>, session: Option<&Identity>) -> GateDecision {
        let path = canonical_path(path);
        let path = path.as_str();

        if self.is_public(path) {
            return GateDecision::Allow;
        }

        let Some(identity) = session else {
            let callback_url = match query.filter(|q| !q.is_empty()) {
                Some(q) => format!("{path}?{q}"),
                None => path.to_string(),
            };
            return GateDecision::RedirectToSignIn { callback_url };
        };

        if !identity.is_active() {
            return GateDecision::RedirectToError(ErrorReason::AccountDeactivated);
        }

        if let Some(rule) = self.rule_for(path) {
            if !rule.roles.contains(&identity.role) {
                return GateDecision::RedirectToUnauthorized;
            }
        }

        if path == self.dashboard_alias {
            return match self.landing_for(identity.role) {
                Some(landing) => GateDecision::RedirectTo(landing.to_string()),
                None => GateDecision::RedirectToSignIn {
                    callback_url: path.to_string(),
                },
            };
        }

        GateDecision::Allow
    }

    /// `Location` for a redirecting decision; `None` for `Allow`.
    pub fn location(&self, decision: &GateDecision) -> Option<String> {
        match decision {
            GateDecision::Allow => None,
            GateDecision::RedirectToSignIn { callback_url } => Some(format!(
                "{}?callbackUrl={}",
                self.sign_in_path,
                encode_component(callback_url)
            )),
            GateDecision::RedirectToError(reason) => {
                Some(format!("{}?reason={}", self.error_path, reason.as_str()))
            }
            GateDecision::RedirectToUnauthorized => Some(self.unauthorized_path.clone()),
            GateDecision::RedirectTo(path) => Some(path.clone()),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::landspice_default()
    }
}

/// Request path as the router will see it: percent-decoded, empty and `.`
/// segments dropped, `..` resolved. Always starts with `/`.
pub fn canonical_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

fn encode_component(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Accept a post-sign-in destination only if it stays on this site.
pub fn local_callback(raw: Option<&str>) -> Option<&str> {
    let raw = raw?.trim();
    let local = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control);
    local.then_some(raw)
}
