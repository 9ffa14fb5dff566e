use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use axum_typed_multipart::BaseMultipart;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::Error;

/// JSON body that is deserialized and validated before the handler runs.
/// Both kinds of failure are reported through the regular error envelope.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::InvalidArgument(rejection.body_text()))?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// Typed multipart body whose parse failures render as `InvalidArgument`.
pub type Multipart<T> = BaseMultipart<T, Error>;
