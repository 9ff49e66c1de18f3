use serde::Serialize;
use std::fmt;

/// Logical presentation routes. Four of them require a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Login,
    Signup,
    Setup,
    Generating,
    Letter,
    Reflection,
}

/// Outcome of checking a route against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Allowed,
    /// Send the client to `/login`, remembering where it was headed.
    RedirectToLogin { from: &'static str },
}

impl RouteAccess {
    pub fn location(&self) -> Option<String> {
        match self {
            RouteAccess::Allowed => None,
            RouteAccess::RedirectToLogin { from } => {
                Some(format!("{}?from={}", Route::Login.path(), from))
            }
        }
    }
}

impl Route {
    pub fn all() -> &'static [Route] {
        &[
            Route::Landing,
            Route::Login,
            Route::Signup,
            Route::Setup,
            Route::Generating,
            Route::Letter,
            Route::Reflection,
        ]
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Setup => "/setup",
            Route::Generating => "/generating",
            Route::Letter => "/letter",
            Route::Reflection => "/reflection",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Route::all().iter().copied().find(|r| r.path() == trimmed)
    }

    pub fn requires_session(self) -> bool {
        matches!(
            self,
            Route::Setup | Route::Generating | Route::Letter | Route::Reflection
        )
    }

    pub fn guard(self, authenticated: bool) -> RouteAccess {
        if self.requires_session() && !authenticated {
            RouteAccess::RedirectToLogin { from: self.path() }
        } else {
            RouteAccess::Allowed
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
