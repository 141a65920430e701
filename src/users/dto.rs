use serde::Deserialize;

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `PUT /user/:id/password`.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
