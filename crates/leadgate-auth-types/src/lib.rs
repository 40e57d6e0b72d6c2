//! Auth types shared between the Leadgate auth service and its consumers.
//!
//! Provides the three signed-claim types (access, refresh, reset), JWT
//! validation, the cookie builders for the admin session, and the
//! `Identity` extractor for protected routes.

pub mod cookie;
pub mod identity;
pub mod token;
