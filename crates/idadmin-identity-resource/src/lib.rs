//! idadmin: identity resource context.
//!
//! Named groups of user claims (`openid`, `profile`, `email`, ...) that
//! clients request as identity scopes.

pub mod application;
pub mod domain;
