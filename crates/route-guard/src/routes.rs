//! Screen routes.

use serde::{Deserialize, Serialize};

/// The screen surface: one route per screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "screen", content = "id")]
pub enum Route {
    /// `/` - redirect-only entry point.
    Root,
    /// `/sign-in` - the authentication screen.
    SignIn,
    /// `/catalog` - the book list.
    Catalog,
    /// `/catalog/add` - the add-book form.
    AddBook,
    /// `/catalog/{id}` - a single book detail screen.
    BookDetail(String),
}

impl Route {
    /// Resolve a path string to a route.
    ///
    /// Returns None for paths outside the screen surface.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/" => Some(Route::Root),
            "/sign-in" => Some(Route::SignIn),
            "/catalog" => Some(Route::Catalog),
            "/catalog/add" => Some(Route::AddBook),
            _ => {
                let id = trimmed.strip_prefix("/catalog/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Route::BookDetail(id.to_string()))
            }
        }
    }

    /// The path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::Catalog => "/catalog".to_string(),
            Route::AddBook => "/catalog/add".to_string(),
            Route::BookDetail(id) => format!("/catalog/{}", id),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Root));
        assert_eq!(Route::parse("/sign-in"), Some(Route::SignIn));
        assert_eq!(Route::parse("/catalog"), Some(Route::Catalog));
        assert_eq!(Route::parse("/catalog/add"), Some(Route::AddBook));
        assert_eq!(
            Route::parse("/catalog/bk-42"),
            Some(Route::BookDetail("bk-42".to_string()))
        );
    }

    #[test]
    fn parse_tolerates_trailing_slash() {
        assert_eq!(Route::parse("/catalog/"), Some(Route::Catalog));
        assert_eq!(Route::parse("/sign-in/"), Some(Route::SignIn));
    }

    #[test]
    fn parse_rejects_unknown_paths() {
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse("/catalog/bk-1/extra"), None);
        assert_eq!(Route::parse("catalog"), None);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::Root,
            Route::SignIn,
            Route::Catalog,
            Route::AddBook,
            Route::BookDetail("bk-7".to_string()),
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }
}
