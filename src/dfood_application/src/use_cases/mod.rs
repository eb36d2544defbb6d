pub mod delete_account;
pub mod login;
pub mod logout;
pub mod register;
pub mod update_password;
