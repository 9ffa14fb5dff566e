pub mod request {
    use crate::modules::auth::middleware::Auth;

    pub struct Payload {
        pub id: String,
        pub auth: Auth,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::order::repository::FullOrder, utils::response};

    pub enum Success {
        Order(FullOrder),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Order(order) => response::ok("Order fetched", order),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
