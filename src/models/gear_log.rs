use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{
        fields::{parse_date, parse_reference, to_utc},
        Linked, Patch, Populate, Reference, ReferenceNames, Resource, ResourceKind, Schema,
    },
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::GearLog,
    label: "Gear log",
    collection: "gearlogs",
    required: &[
        "worker",
        "site",
        "gearType",
        "gearCondition",
        "dateChecked",
        "status",
    ],
    choices: &[("status", &["Good", "Damaged", "Replaced"])],
    sort: &[],
    owner: None,
    unique: &[],
    references: &[
        Reference {
            field: "worker",
            target: ResourceKind::Worker,
            populate: Populate::List,
        },
        Reference {
            field: "site",
            target: ResourceKind::Site,
            populate: Populate::List,
        },
    ],
    name_fields: &["gearType"],
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GearStatus {
    Good,
    Damaged,
    Replaced,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GearLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub worker: ObjectId,
    pub site: ObjectId,
    pub gear_type: String,
    pub gear_condition: String,
    pub date_checked: bson::DateTime,
    pub status: GearStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GearLogRequest {
    pub worker: Patch<String>,
    pub site: Patch<String>,
    pub gear_type: Patch<String>,
    pub gear_condition: Patch<String>,
    pub date_checked: Patch<String>,
    pub status: Patch<GearStatus>,
    pub remarks: Patch<String>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GearLogResponse {
    #[serde(rename = "_id")]
    pub _id: String,
    pub worker: Linked,
    pub site: Linked,
    pub gear_type: String,
    pub gear_condition: String,
    pub date_checked: DateTime<Utc>,
    pub status: GearStatus,
    pub remarks: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for GearLog {
    type Request = GearLogRequest;
    type Response = GearLogResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: GearLogRequest, _principal: &Principal) -> Result<Self, AppError> {
        let date_checked = request.date_checked.required("dateChecked")?;
        Ok(GearLog {
            _id: None,
            worker: parse_reference("worker", &request.worker.required("worker")?)?,
            site: parse_reference("site", &request.site.required("site")?)?,
            gear_type: request.gear_type.trimmed().required("gearType")?,
            gear_condition: request.gear_condition.trimmed().required("gearCondition")?,
            date_checked: parse_date("dateChecked", &date_checked)?,
            status: request.status.required("status")?,
            remarks: request.remarks.trimmed().into_option().unwrap_or_default(),
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: GearLogRequest) -> Result<(), AppError> {
        request
            .worker
            .try_map(|raw| parse_reference("worker", &raw))?
            .apply(&mut self.worker);
        request
            .site
            .try_map(|raw| parse_reference("site", &raw))?
            .apply(&mut self.site);
        request.gear_type.trimmed().apply(&mut self.gear_type);
        request.gear_condition.trimmed().apply(&mut self.gear_condition);
        request
            .date_checked
            .try_map(|raw| parse_date("dateChecked", &raw))?
            .apply(&mut self.date_checked);
        request.status.apply(&mut self.status);
        request.remarks.trimmed().apply_or_clear(&mut self.remarks);
        Ok(())
    }
    fn present(self, names: &ReferenceNames) -> GearLogResponse {
        GearLogResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            worker: names.link(ResourceKind::Worker, &self.worker),
            site: names.link(ResourceKind::Site, &self.site),
            gear_type: self.gear_type,
            gear_condition: self.gear_condition,
            date_checked: to_utc(self.date_checked),
            status: self.status,
            remarks: self.remarks,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
