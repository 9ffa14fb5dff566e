pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(length(min = 1, code = "MISSING_REFRESH_TOKEN"))]
        pub refresh_token: String,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::auth::token::TokenPair, utils::response};

    pub enum Success {
        Refreshed(TokenPair),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Refreshed(tokens) => response::ok("Tokens refreshed", tokens),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
