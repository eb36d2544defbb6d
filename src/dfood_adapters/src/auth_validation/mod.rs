pub mod bearer_validator;
pub mod jwt_token_service;
