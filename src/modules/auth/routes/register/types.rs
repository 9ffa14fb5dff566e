pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(length(
            min = 2,
            max = 64,
            code = "INVALID_NAME",
            message = "Name must be between 2 and 64 characters"
        ))]
        pub name: String,
        #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
        pub email: String,
        #[validate(length(
            min = 6,
            max = 64,
            code = "INVALID_PASSWORD",
            message = "Password must be between 6 and 64 characters"
        ))]
        pub password: String,
        #[validate(must_match(other = "password", message = "Passwords do not match"))]
        pub password_confirmation: String,
        #[validate(length(
            min = 7,
            max = 20,
            code = "INVALID_PHONE",
            message = "Phone number must be between 7 and 20 characters"
        ))]
        pub phone: String,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::user::repository::User, utils::response};

    pub enum Success {
        Registered(User),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Registered(user) => response::created("Account created", user),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
