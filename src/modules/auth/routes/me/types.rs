pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::user::repository::User, utils::response};

    pub enum Success {
        Profile(User),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Profile(user) => response::ok("Profile fetched", user),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
