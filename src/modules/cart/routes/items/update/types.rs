pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    use crate::modules::auth::middleware::Auth;

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(range(
            min = 1,
            max = 999,
            code = "INVALID_QUANTITY",
            message = "Quantity must be between 1 and 999"
        ))]
        pub quantity: i32,
    }

    pub struct Payload {
        pub id: String,
        pub auth: Auth,
        pub body: Body,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::cart::repository::CartItem, utils::response};

    pub enum Success {
        Updated(CartItem),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Updated(item) => response::ok("Cart item updated", item),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
