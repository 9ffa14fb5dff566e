use std::sync::Arc;

use super::repository::{
    Address, AddressRepository, CreateAddressPayload, UpdateAddressPayload,
};
use crate::error::{Error, Result};

/// Keeps at most one default address per user by clearing the others before
/// a new default is written. Two concurrent writes for the same user can
/// still leave zero or two defaults; this is not enforced by the database.
#[derive(Clone)]
pub struct AddressService {
    addresses: Arc<dyn AddressRepository>,
}

impl AddressService {
    pub fn new(addresses: Arc<dyn AddressRepository>) -> Self {
        Self { addresses }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Address>> {
        Ok(self.addresses.find_many_by_user_id(user_id).await?)
    }

    pub async fn create(&self, mut payload: CreateAddressPayload) -> Result<Address> {
        if self
            .addresses
            .find_many_by_user_id(&payload.user_id)
            .await?
            .is_empty()
        {
            payload.is_default = true;
        } else if payload.is_default {
            self.addresses
                .unset_defaults(&payload.user_id, None)
                .await?;
        }

        Ok(self.addresses.create(payload).await?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        payload: UpdateAddressPayload,
    ) -> Result<Address> {
        self.addresses
            .find_by_id_and_user_id(id, user_id)
            .await?
            .ok_or_else(|| Error::not_found("Address"))?;

        if payload.is_default == Some(true) {
            self.addresses.unset_defaults(user_id, Some(id)).await?;
        }

        self.addresses
            .update_by_id(id, payload)
            .await?
            .ok_or_else(|| Error::not_found("Address"))
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        self.addresses
            .find_by_id_and_user_id(id, user_id)
            .await?
            .ok_or_else(|| Error::not_found("Address"))?;

        match self.addresses.delete_by_id(id).await? {
            true => Ok(()),
            false => Err(Error::not_found("Address")),
        }
    }
}
