use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use leaderboard_app::domain::PlayerError;

pub enum ApiError {
    Player(PlayerError),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Player(PlayerError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Player(PlayerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Player(PlayerError::DataAccess(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            ApiError::Player(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg,
        };
        let body = serde_json::json!({ "error": msg });
        (status, Json(body)).into_response()
    }
}

impl From<PlayerError> for ApiError {
    fn from(value: PlayerError) -> Self {
        ApiError::Player(value)
    }
}
