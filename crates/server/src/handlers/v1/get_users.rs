use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub message: String,
}

pub async fn get_users() -> Json<UsersResponse> {
    Json(UsersResponse {
        message: "Hello World".to_string(),
    })
}
