use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{
        fields::{parse_date, parse_reference, to_utc},
        Linked, Patch, Populate, Reference, ReferenceNames, Resource, ResourceKind, Schema,
        SortOrder,
    },
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::Compliance,
    label: "Compliance record",
    collection: "compliances",
    required: &["equipmentName", "checkedBy", "checkedAt", "status"],
    choices: &[("status", &["Compliant", "Non-compliant", "Pending"])],
    sort: &[("checkedAt", SortOrder::Descending)],
    owner: None,
    unique: &[],
    references: &[Reference {
        field: "checkedBy",
        target: ResourceKind::User,
        populate: Populate::ListAndGet,
    }],
    name_fields: &["equipmentName"],
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComplianceStatus {
    Compliant,
    #[serde(rename = "Non-compliant")]
    NonCompliant,
    Pending,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compliance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub equipment_name: String,
    pub checked_by: ObjectId,
    pub checked_at: bson::DateTime,
    pub status: ComplianceStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplianceRequest {
    pub equipment_name: Patch<String>,
    pub checked_by: Patch<String>,
    pub checked_at: Patch<String>,
    pub status: Patch<ComplianceStatus>,
    pub remarks: Patch<String>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResponse {
    #[serde(rename = "_id")]
    pub _id: String,
    pub equipment_name: String,
    pub checked_by: Linked,
    pub checked_at: DateTime<Utc>,
    pub status: ComplianceStatus,
    pub remarks: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Compliance {
    type Request = ComplianceRequest;
    type Response = ComplianceResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: ComplianceRequest, _principal: &Principal) -> Result<Self, AppError> {
        let checked_by = request.checked_by.required("checkedBy")?;
        let checked_at = request.checked_at.required("checkedAt")?;
        Ok(Compliance {
            _id: None,
            equipment_name: request.equipment_name.trimmed().required("equipmentName")?,
            checked_by: parse_reference("checkedBy", &checked_by)?,
            checked_at: parse_date("checkedAt", &checked_at)?,
            status: request.status.required("status")?,
            remarks: request.remarks.trimmed().into_option().unwrap_or_default(),
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: ComplianceRequest) -> Result<(), AppError> {
        request
            .equipment_name
            .trimmed()
            .apply(&mut self.equipment_name);
        request
            .checked_by
            .try_map(|raw| parse_reference("checkedBy", &raw))?
            .apply(&mut self.checked_by);
        request
            .checked_at
            .try_map(|raw| parse_date("checkedAt", &raw))?
            .apply(&mut self.checked_at);
        request.status.apply(&mut self.status);
        request.remarks.trimmed().apply_or_clear(&mut self.remarks);
        Ok(())
    }
    fn present(self, names: &ReferenceNames) -> ComplianceResponse {
        ComplianceResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            equipment_name: self.equipment_name,
            checked_by: names.link(ResourceKind::User, &self.checked_by),
            checked_at: to_utc(self.checked_at),
            status: self.status,
            remarks: self.remarks,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
