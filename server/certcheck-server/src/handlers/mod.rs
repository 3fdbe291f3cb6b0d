pub mod certificate_check;
pub mod health;
