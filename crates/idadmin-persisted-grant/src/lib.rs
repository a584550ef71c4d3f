//! idadmin: persisted grant context.
//!
//! Grants the identity provider has stored on behalf of users (refresh
//! tokens, consents, authorization codes). The admin surface can search and
//! revoke them; it never creates them.

pub mod application;
pub mod domain;
