//! The route decision function.

use crate::Route;
use serde::{Deserialize, Serialize};

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "route")]
pub enum RouteDecision {
    /// Render the requested screen.
    Render(Route),
    /// Navigate to a different screen instead.
    Redirect(Route),
}

/// Decide whether a requested screen renders or redirects.
///
/// Rules, evaluated in order:
/// 1. Root always redirects: to the catalog when a session is present,
///    to sign-in otherwise.
/// 2. Sign-in redirects to the catalog when a session is present (no
///    re-authentication while signed in); otherwise it renders.
/// 3. Every other screen renders when a session is present and redirects
///    to sign-in otherwise.
pub fn decide(requested: &Route, session_present: bool) -> RouteDecision {
    match requested {
        Route::Root => {
            if session_present {
                RouteDecision::Redirect(Route::Catalog)
            } else {
                RouteDecision::Redirect(Route::SignIn)
            }
        }
        Route::SignIn => {
            if session_present {
                RouteDecision::Redirect(Route::Catalog)
            } else {
                RouteDecision::Render(Route::SignIn)
            }
        }
        route => {
            if session_present {
                RouteDecision::Render(route.clone())
            } else {
                RouteDecision::Redirect(Route::SignIn)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_redirects_to_catalog_when_signed_in() {
        assert_eq!(
            decide(&Route::Root, true),
            RouteDecision::Redirect(Route::Catalog)
        );
    }

    #[test]
    fn root_redirects_to_sign_in_when_signed_out() {
        assert_eq!(
            decide(&Route::Root, false),
            RouteDecision::Redirect(Route::SignIn)
        );
    }

    #[test]
    fn sign_in_redirects_to_catalog_when_signed_in() {
        assert_eq!(
            decide(&Route::SignIn, true),
            RouteDecision::Redirect(Route::Catalog)
        );
    }

    #[test]
    fn sign_in_renders_when_signed_out() {
        assert_eq!(
            decide(&Route::SignIn, false),
            RouteDecision::Render(Route::SignIn)
        );
    }

    #[test]
    fn guarded_screens_render_when_signed_in() {
        for route in [
            Route::Catalog,
            Route::AddBook,
            Route::BookDetail("bk-1".to_string()),
        ] {
            assert_eq!(decide(&route, true), RouteDecision::Render(route.clone()));
        }
    }

    #[test]
    fn guarded_screens_redirect_to_sign_in_when_signed_out() {
        for route in [
            Route::Catalog,
            Route::AddBook,
            Route::BookDetail("bk-1".to_string()),
        ] {
            assert_eq!(
                decide(&route, false),
                RouteDecision::Redirect(Route::SignIn)
            );
        }
    }

    #[test]
    fn decision_depends_only_on_route_and_presence() {
        // Referentially transparent: repeated calls agree
        for _ in 0..3 {
            assert_eq!(
                decide(&Route::Catalog, false),
                RouteDecision::Redirect(Route::SignIn)
            );
            assert_eq!(
                decide(&Route::SignIn, true),
                RouteDecision::Redirect(Route::Catalog)
            );
        }
    }

    #[test]
    fn decisions_serialize_for_json_output() {
        let json =
            serde_json::to_string(&decide(&Route::Root, false)).unwrap();
        assert!(json.contains("redirect"));
        assert!(json.contains("sign_in"));
    }
}
