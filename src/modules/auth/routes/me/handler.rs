use super::types::response;
use crate::modules::auth::middleware::Auth;

pub async fn handler(auth: Auth) -> response::Response {
    Ok(response::Success::Profile(auth.user))
}
