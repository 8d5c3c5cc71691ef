use super::Resource;
use crate::{error::AppError, models::user::Principal};

/// Gate for update and delete. Kinds without an owner are open to every
/// authenticated principal.
pub fn authorize<T: Resource>(principal: &Principal, entity: &T) -> Result<(), AppError> {
    match entity.owner() {
        Some(owner) if owner != principal._id => Err(AppError::Forbidden(T::schema().label)),
        _ => Ok(()),
    }
}
