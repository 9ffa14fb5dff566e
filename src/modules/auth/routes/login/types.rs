pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
        pub email: String,
        #[validate(length(min = 1, code = "MISSING_PASSWORD", message = "Password is required"))]
        pub password: String,
    }
}

pub mod response {
    use axum::response::IntoResponse;
    use serde_json::json;

    use crate::{error::Error, modules::auth::service::LoginResult, utils::response};

    pub enum Success {
        LoggedIn(LoginResult),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::LoggedIn(LoginResult { user, tokens }) => response::ok(
                    "Login successful",
                    json!({
                        "access_token": tokens.access_token,
                        "refresh_token": tokens.refresh_token,
                        "token_type": tokens.token_type,
                        "expires_in": tokens.expires_in,
                        "user": user,
                    }),
                ),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
