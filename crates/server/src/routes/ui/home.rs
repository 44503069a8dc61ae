//! Root redirect.

use axum::response::Redirect;

use crate::middleware::OptionalAuth;

/// Send logged-in users to their households and everyone else to the login form.
pub async fn index(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/households")
    } else {
        Redirect::to("/login")
    }
}
