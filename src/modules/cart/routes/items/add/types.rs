pub mod request {
    use serde::Deserialize;
    use validator::Validate;

    use crate::modules::auth::middleware::Auth;

    fn default_quantity() -> i32 {
        1
    }

    #[derive(Deserialize, Validate)]
    pub struct Body {
        #[validate(length(min = 1, code = "MISSING_MENU_ITEM"))]
        pub menu_item_id: String,
        #[serde(default = "default_quantity")]
        #[validate(range(
            min = 1,
            max = 999,
            code = "INVALID_QUANTITY",
            message = "Quantity must be between 1 and 999"
        ))]
        pub quantity: i32,
    }

    pub struct Payload {
        pub auth: Auth,
        pub body: Body,
    }
}

pub mod response {
    use axum::response::IntoResponse;

    use crate::{error::Error, modules::cart::repository::CartItem, utils::response};

    pub enum Success {
        Added(CartItem),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Added(item) => response::created("Item added to cart", item),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
