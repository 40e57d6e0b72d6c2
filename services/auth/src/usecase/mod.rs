pub mod login;
pub mod password;
pub mod register;
pub mod token;
pub mod verify_otp;
