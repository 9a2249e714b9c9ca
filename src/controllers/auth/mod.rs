

pub mod signup;
pub mod login;
pub mod home;
pub mod _404;
