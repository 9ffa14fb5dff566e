pub mod response {
    use axum::response::IntoResponse;

    use crate::{
        error::Error, modules::order::repository::OrderStatusHistory, utils::response,
    };

    pub enum Success {
        History(Vec<OrderStatusHistory>),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::History(history) => response::ok("Order history fetched", history),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
