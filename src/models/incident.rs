use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{
        fields::{parse_date, parse_reference, to_utc},
        Patch, Populate, Reference, ReferenceNames, Resource, ResourceKind, Schema, SortOrder,
    },
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::Incident,
    label: "Incident",
    collection: "incidents",
    required: &[
        "title",
        "description",
        "incident_type",
        "severity_level",
        "date",
        "site_id",
    ],
    choices: &[
        (
            "incident_type",
            &["Fall", "Electrical", "Equipment Failure", "Fire", "Chemical", "Other"],
        ),
        ("severity_level", &["Low", "Medium", "High"]),
    ],
    sort: &[("date", SortOrder::Descending)],
    owner: Some("user"),
    unique: &[],
    references: &[Reference {
        field: "site_id",
        target: ResourceKind::Site,
        populate: Populate::Never,
    }],
    name_fields: &["title"],
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentKind {
    Fall,
    Electrical,
    #[serde(rename = "Equipment Failure")]
    EquipmentFailure,
    Fire,
    Chemical,
    Other,
}
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Incident {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user: ObjectId,
    pub site_id: ObjectId,
    pub incident_type: IncidentKind,
    pub title: String,
    pub description: String,
    pub severity_level: SeverityLevel,
    pub date: bson::DateTime,
    #[serde(default)]
    pub resolved: bool,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncidentRequest {
    pub site_id: Patch<String>,
    pub incident_type: Patch<IncidentKind>,
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub severity_level: Patch<SeverityLevel>,
    pub date: Patch<String>,
    pub resolved: Patch<bool>,
}
#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub _id: String,
    pub user: String,
    pub site_id: String,
    pub incident_type: IncidentKind,
    pub title: String,
    pub description: String,
    pub severity_level: SeverityLevel,
    pub date: DateTime<Utc>,
    pub resolved: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Incident {
    type Request = IncidentRequest;
    type Response = IncidentResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: IncidentRequest, principal: &Principal) -> Result<Self, AppError> {
        Ok(Incident {
            _id: None,
            user: principal._id,
            site_id: parse_reference("site_id", &request.site_id.required("site_id")?)?,
            incident_type: request.incident_type.required("incident_type")?,
            title: request.title.trimmed().required("title")?,
            description: request.description.trimmed().required("description")?,
            severity_level: request.severity_level.required("severity_level")?,
            date: parse_date("date", &request.date.required("date")?)?,
            resolved: request.resolved.into_option().unwrap_or(false),
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: IncidentRequest) -> Result<(), AppError> {
        request
            .site_id
            .try_map(|raw| parse_reference("site_id", &raw))?
            .apply(&mut self.site_id);
        request.incident_type.apply(&mut self.incident_type);
        request.title.trimmed().apply(&mut self.title);
        request.description.trimmed().apply(&mut self.description);
        request.severity_level.apply(&mut self.severity_level);
        request
            .date
            .try_map(|raw| parse_date("date", &raw))?
            .apply(&mut self.date);
        request.resolved.apply_or_clear(&mut self.resolved);
        Ok(())
    }
    fn owner(&self) -> Option<ObjectId> {
        Some(self.user)
    }
    fn present(self, _names: &ReferenceNames) -> IncidentResponse {
        IncidentResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            user: self.user.to_hex(),
            site_id: self.site_id.to_hex(),
            incident_type: self.incident_type,
            title: self.title,
            description: self.description,
            severity_level: self.severity_level,
            date: to_utc(self.date),
            resolved: self.resolved,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
