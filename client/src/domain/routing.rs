//! Role-based route authorisation.
//!
//! [`decide`] is the pure predicate behind
//! [`SessionService::authorize`](crate::domain::session::SessionService::authorize):
//! given the current identity and the roles a screen requires, it
//! answers allow, redirect to login, or redirect to the role's home
//! screen. It has no side effects and is safe to call repeatedly.

use std::fmt;

use super::identity::{Identity, Role};

/// Screens an unauthorised visitor is redirected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Administrator landing screen.
    Dashboard,
    /// Analyst landing screen.
    Analysis,
    /// Ordinary-user landing screen.
    Profile,
}

impl Route {
    /// Path rendered into the location bar for this route.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Analysis => "/analysis",
            Self::Profile => "/profile",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of an authorisation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The current identity may view the screen.
    Allow,
    /// Nobody is signed in; send the visitor to the login screen.
    RedirectToLogin,
    /// Signed in but not permitted; send the visitor to their home
    /// screen instead.
    Redirect(Route),
}

/// Decide whether `identity` may view a screen requiring `required`.
///
/// An empty `required` set admits any authenticated identity. When the
/// role is not in the set, the redirect target depends on the role the
/// visitor actually holds: administrators land on the dashboard,
/// analysts on the analysis screen, everyone else on their profile.
pub fn decide(identity: Option<&Identity>, required: &[Role]) -> RouteDecision {
    let Some(identity) = identity else {
        return RouteDecision::RedirectToLogin;
    };
    if required.is_empty() || required.contains(&identity.role()) {
        return RouteDecision::Allow;
    }
    match identity.role() {
        Role::Admin => RouteDecision::Redirect(Route::Dashboard),
        Role::Analyst => RouteDecision::Redirect(Route::Analysis),
        Role::User => RouteDecision::Redirect(Route::Profile),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn identity(role: Role) -> Identity {
        Identity::minimal("someone@example.com").with_role(role)
    }

    #[test]
    fn anonymous_visitors_are_sent_to_login() {
        assert_eq!(
            decide(None, &[Role::Admin]),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(decide(None, &[]), RouteDecision::RedirectToLogin);
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Analyst)]
    #[case(Role::Admin)]
    fn empty_requirement_admits_any_identity(#[case] role: Role) {
        assert_eq!(decide(Some(&identity(role)), &[]), RouteDecision::Allow);
    }

    #[rstest]
    #[case(Role::User, &[Role::User, Role::Admin][..])]
    #[case(Role::Admin, &[Role::Admin][..])]
    #[case(Role::Analyst, &[Role::Analyst][..])]
    fn matching_role_is_allowed(#[case] role: Role, #[case] required: &[Role]) {
        assert_eq!(decide(Some(&identity(role)), required), RouteDecision::Allow);
    }

    #[rstest]
    #[case(Role::Admin, Route::Dashboard)]
    #[case(Role::Analyst, Route::Analysis)]
    #[case(Role::User, Route::Profile)]
    fn mismatched_role_redirects_to_role_home(#[case] role: Role, #[case] target: Route) {
        let required = match role {
            Role::User => vec![Role::Admin],
            _ => vec![Role::User],
        };
        assert_eq!(
            decide(Some(&identity(role)), &required),
            RouteDecision::Redirect(target)
        );
    }

    #[test]
    fn analyst_denied_admin_screen_goes_to_analysis_not_profile() {
        let analyst = identity(Role::Analyst);
        assert_eq!(
            decide(Some(&analyst), &[Role::Admin]),
            RouteDecision::Redirect(Route::Analysis)
        );
    }

    #[test]
    fn decision_is_stable_across_repeated_calls() {
        let admin = identity(Role::Admin);
        let first = decide(Some(&admin), &[Role::User]);
        let second = decide(Some(&admin), &[Role::User]);
        assert_eq!(first, second);
        assert_eq!(first, RouteDecision::Redirect(Route::Dashboard));
    }

    #[test]
    fn route_paths_match_screen_locations() {
        assert_eq!(Route::Dashboard.path(), "/dashboard");
        assert_eq!(Route::Analysis.path(), "/analysis");
        assert_eq!(Route::Profile.path(), "/profile");
    }
}
