pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, utils::response};

    pub enum Success {
        Removed,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Removed => response::message("Item removed from cart"),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
