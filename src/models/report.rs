use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{
        fields::{parse_date, to_utc},
        Patch, ReferenceNames, Resource, ResourceKind, Schema, SortOrder,
    },
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::Report,
    label: "Hazard report",
    collection: "reports",
    required: &["title", "description", "date", "location"],
    choices: &[],
    sort: &[("date", SortOrder::Descending)],
    owner: None,
    unique: &[],
    references: &[],
    name_fields: &["title"],
};

#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub date: bson::DateTime,
    pub location: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub date: Patch<String>,
    pub location: Patch<String>,
}
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub _id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Report {
    type Request = ReportRequest;
    type Response = ReportResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: ReportRequest, _principal: &Principal) -> Result<Self, AppError> {
        Ok(Report {
            _id: None,
            title: request.title.trimmed().required("title")?,
            description: request.description.trimmed().required("description")?,
            date: parse_date("date", &request.date.required("date")?)?,
            location: request.location.trimmed().required("location")?,
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: ReportRequest) -> Result<(), AppError> {
        request.title.trimmed().apply(&mut self.title);
        request.description.trimmed().apply(&mut self.description);
        request
            .date
            .try_map(|raw| parse_date("date", &raw))?
            .apply(&mut self.date);
        request.location.trimmed().apply(&mut self.location);
        Ok(())
    }
    fn present(self, _names: &ReferenceNames) -> ReportResponse {
        ReportResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            title: self.title,
            description: self.description,
            date: to_utc(self.date),
            location: self.location,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
