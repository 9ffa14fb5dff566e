pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, utils::response};

    pub enum Success {
        Cleared,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Cleared => response::message("Cart cleared"),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
