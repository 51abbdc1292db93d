/// Access policy engine
///
/// This module decides, given a verified [`Identity`] and a resource,
/// whether an operation is allowed. Decisions are pure functions of their
/// inputs: no database access, no clock, no shared state, which keeps them
/// trivially safe under concurrency and easy to test exhaustively.
///
/// # Permission Model
///
/// - Admins may read, update, and delete any task and see all tasks.
/// - Regular users may only touch tasks whose `owner_id` matches their own
///   account ID.
/// - Creating a task is open to any authenticated identity; the created
///   task's owner is always the caller, so there is nothing to check here.
/// - Account management routes require the admin role, expressed as an
///   explicit route table ([`RoutePolicy`]) consulted by one gate
///   middleware rather than per-handler checks.
///
/// Existence is checked before ownership: handlers resolve the resource
/// first and return 404 when it is missing, for admins and non-admins
/// alike, then ask this module about the resource they found.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::policy::{authorize_task, Decision, TaskAction};
/// use taskdeck_shared::auth::jwt::Identity;
/// use taskdeck_shared::models::account::Role;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let me = Identity { id: owner, username: "alice".into(), role: Role::User };
///
/// assert_eq!(authorize_task(&me, TaskAction::Update, owner), Decision::Allow);
/// ```

use axum::http::Method;
use uuid::Uuid;

use super::jwt::Identity;
use crate::models::account::Role;
use crate::models::task::TaskScope;

/// Action on a specific task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Read a single task
    Read,

    /// Modify a task's fields (owner excluded)
    Update,

    /// Delete a task
    Delete,
}

/// Why an operation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Caller does not own the resource and is not an admin
    Ownership,

    /// Caller's role does not meet the route's requirement
    Role,
}

/// Outcome of a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Operation may proceed
    Allow,

    /// Operation is denied for the given reason
    Deny(DenyReason),
}

impl Decision {
    /// True when the decision is Allow
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides whether `identity` may perform `action` on the task owned by
/// `task_owner_id`
///
/// Admins are always allowed; everyone else must own the task. The rule is
/// identical for read, update, and delete, but the action is part of the
/// signature so callers state what they are doing and future asymmetries
/// have somewhere to live.
pub fn authorize_task(identity: &Identity, _action: TaskAction, task_owner_id: Uuid) -> Decision {
    if identity.is_admin() {
        return Decision::Allow;
    }

    if identity.id == task_owner_id {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Ownership)
    }
}

/// Computes the listing scope for an identity
///
/// Admins see every task; other roles see only their own. The scope is
/// applied inside the store query, so out-of-scope tasks are never
/// materialized at all.
pub fn task_scope(identity: &Identity) -> TaskScope {
    if identity.is_admin() {
        TaskScope::All
    } else {
        TaskScope::OwnedBy(identity.id)
    }
}

/// Checks a bare role requirement
pub fn require_role(identity: &Identity, required: Role) -> Decision {
    match required {
        Role::Admin if !identity.is_admin() => Decision::Deny(DenyReason::Role),
        _ => Decision::Allow,
    }
}

/// One row of the route/role table
///
/// A rule matches a request when the method matches (or the rule is
/// method-agnostic) and the request path equals the prefix or continues it
/// past a `/` boundary.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Method the rule applies to; None matches every method
    pub method: Option<Method>,

    /// Path prefix, e.g. "/users"
    pub prefix: &'static str,

    /// Role required to pass the gate
    pub required_role: Role,
}

impl RouteRule {
    /// Creates a rule for all methods under a prefix
    pub fn for_prefix(prefix: &'static str, required_role: Role) -> Self {
        Self {
            method: None,
            prefix,
            required_role,
        }
    }

    /// Creates a rule for one method under a prefix
    pub fn for_method(method: Method, prefix: &'static str, required_role: Role) -> Self {
        Self {
            method: Some(method),
            prefix,
            required_role,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(ref m) = self.method {
            if m != method {
                return false;
            }
        }

        path == self.prefix
            || (path.starts_with(self.prefix)
                && path.as_bytes().get(self.prefix.len()) == Some(&b'/'))
    }
}

/// Explicit per-route role requirements
///
/// The table is built once at startup and consulted by a single gate
/// middleware, so every role-gated surface is visible in one place instead
/// of being scattered across handler annotations.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Creates a policy from a list of rules
    ///
    /// Rules are consulted in order; the first match wins.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Looks up the role required for a request, if any
    pub fn required_role(&self, method: &Method, path: &str) -> Option<Role> {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.required_role)
    }

    /// Evaluates the table for an identity
    ///
    /// Routes without a rule are open to any authenticated identity.
    pub fn authorize(&self, identity: &Identity, method: &Method, path: &str) -> Decision {
        match self.required_role(method, path) {
            Some(required) => require_role(identity, required),
            None => Decision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_allowed_on_any_task() {
        let admin = identity(Role::Admin);
        let stranger_task = Uuid::new_v4();

        for action in [TaskAction::Read, TaskAction::Update, TaskAction::Delete] {
            assert_eq!(authorize_task(&admin, action, stranger_task), Decision::Allow);
        }
    }

    #[test]
    fn test_owner_allowed_on_own_task() {
        let user = identity(Role::User);

        for action in [TaskAction::Read, TaskAction::Update, TaskAction::Delete] {
            assert_eq!(authorize_task(&user, action, user.id), Decision::Allow);
        }
    }

    #[test]
    fn test_non_owner_denied_for_ownership() {
        let user = identity(Role::User);
        let someone_elses_task = Uuid::new_v4();

        for action in [TaskAction::Read, TaskAction::Update, TaskAction::Delete] {
            assert_eq!(
                authorize_task(&user, action, someone_elses_task),
                Decision::Deny(DenyReason::Ownership)
            );
        }
    }

    #[test]
    fn test_task_scope_per_role() {
        let admin = identity(Role::Admin);
        assert_eq!(task_scope(&admin), TaskScope::All);

        let user = identity(Role::User);
        assert_eq!(task_scope(&user), TaskScope::OwnedBy(user.id));
    }

    #[test]
    fn test_require_role() {
        assert_eq!(require_role(&identity(Role::Admin), Role::Admin), Decision::Allow);
        assert_eq!(
            require_role(&identity(Role::User), Role::Admin),
            Decision::Deny(DenyReason::Role)
        );
        // Everyone satisfies a user-level requirement
        assert_eq!(require_role(&identity(Role::User), Role::User), Decision::Allow);
        assert_eq!(require_role(&identity(Role::Admin), Role::User), Decision::Allow);
    }

    #[test]
    fn test_route_rule_prefix_matching() {
        let rule = RouteRule::for_prefix("/users", Role::Admin);

        assert!(rule.matches(&Method::GET, "/users"));
        assert!(rule.matches(&Method::DELETE, "/users/123"));
        assert!(!rule.matches(&Method::GET, "/userspace"));
        assert!(!rule.matches(&Method::GET, "/tasks"));
    }

    #[test]
    fn test_route_rule_method_matching() {
        let rule = RouteRule::for_method(Method::POST, "/users", Role::Admin);

        assert!(rule.matches(&Method::POST, "/users"));
        assert!(!rule.matches(&Method::GET, "/users"));
    }

    #[test]
    fn test_route_policy_gates_admin_surface() {
        let policy = RoutePolicy::new(vec![RouteRule::for_prefix("/users", Role::Admin)]);

        let user = identity(Role::User);
        assert_eq!(
            policy.authorize(&user, &Method::GET, "/users"),
            Decision::Deny(DenyReason::Role)
        );
        assert_eq!(policy.authorize(&user, &Method::GET, "/tasks"), Decision::Allow);

        let admin = identity(Role::Admin);
        assert_eq!(policy.authorize(&admin, &Method::GET, "/users"), Decision::Allow);
    }

    #[test]
    fn test_route_policy_unlisted_routes_are_open() {
        let policy = RoutePolicy::default();
        let user = identity(Role::User);

        assert_eq!(policy.authorize(&user, &Method::GET, "/anything"), Decision::Allow);
    }
}
