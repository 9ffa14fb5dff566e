pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::cart::service::FullCart, utils::response};

    pub enum Success {
        Cart(FullCart),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Cart(cart) => response::ok("Cart fetched", cart),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
