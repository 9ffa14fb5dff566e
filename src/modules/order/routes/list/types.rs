pub mod response {
    use axum::response::IntoResponse;

    use crate::{
        error::Error,
        modules::order::repository::Order,
        utils::{pagination::Paginated, response},
    };

    pub enum Success {
        Orders(Paginated<Order>),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Orders(orders) => response::ok("Orders fetched", orders),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
