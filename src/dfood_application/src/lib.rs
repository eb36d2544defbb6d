pub mod orchestrator;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use orchestrator::{AuthOrchestrator, RegisterRequest};

pub use use_cases::{
    delete_account::{DeleteAccountError, DeleteAccountUseCase},
    login::{LoginError, LoginResponse, LoginUseCase},
    logout::{LogoutError, LogoutUseCase},
    register::{RegisterError, RegisterUseCase},
    update_password::{UpdatePasswordError, UpdatePasswordUseCase},
};
