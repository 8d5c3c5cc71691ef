use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{fields::to_utc, Patch, ReferenceNames, Resource, ResourceKind, Schema},
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::Site,
    label: "Site",
    collection: "sites",
    required: &["name"],
    choices: &[],
    sort: &[],
    owner: None,
    unique: &[],
    references: &[],
    name_fields: &["name"],
};

#[derive(Debug, Deserialize, Serialize)]
pub struct Site {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteRequest {
    pub name: Patch<String>,
    pub location: Patch<String>,
    pub manager: Patch<String>,
    pub contact: Patch<String>,
}
#[derive(Debug, Serialize)]
pub struct SiteResponse {
    pub _id: String,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Resource for Site {
    type Request = SiteRequest;
    type Response = SiteResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: SiteRequest, _principal: &Principal) -> Result<Self, AppError> {
        Ok(Site {
            _id: None,
            name: request.name.trimmed().required("name")?,
            location: request.location.non_blank().into_option().flatten(),
            manager: request.manager.non_blank().into_option().flatten(),
            contact: request.contact.non_blank().into_option().flatten(),
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: SiteRequest) -> Result<(), AppError> {
        request.name.trimmed().apply(&mut self.name);
        request.location.non_blank().apply_or_clear(&mut self.location);
        request.manager.non_blank().apply_or_clear(&mut self.manager);
        request.contact.non_blank().apply_or_clear(&mut self.contact);
        Ok(())
    }
    fn present(self, _names: &ReferenceNames) -> SiteResponse {
        SiteResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            name: self.name,
            location: self.location,
            manager: self.manager,
            contact: self.contact,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
