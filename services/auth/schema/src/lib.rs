//! sea-orm entities owned by the auth service.

pub mod admins;
pub mod otp_records;
