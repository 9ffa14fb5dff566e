pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    use crate::modules::auth::middleware::Auth;

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(length(
            min = 10,
            code = "INVALID_DELIVERY_ADDRESS",
            message = "Delivery address must be at least 10 characters"
        ))]
        pub delivery_address: String,
        pub payment_method: Option<String>,
    }

    pub struct Payload {
        pub auth: Auth,
        pub body: Body,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::order::repository::FullOrder, utils::response};

    pub enum Success {
        Placed(FullOrder),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Placed(order) => response::created("Order placed", order),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
