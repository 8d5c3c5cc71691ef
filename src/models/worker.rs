use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::user::Principal;
use crate::{
    access::{
        fields::{normalize_email, parse_date, to_utc},
        Patch, ReferenceNames, Resource, ResourceKind, Schema, SortOrder,
    },
    error::AppError,
};

pub static SCHEMA: Schema = Schema {
    kind: ResourceKind::Worker,
    label: "Worker",
    collection: "workers",
    required: &["firstName", "lastName", "email"],
    choices: &[],
    sort: &[
        ("lastName", SortOrder::Ascending),
        ("firstName", SortOrder::Ascending),
    ],
    owner: None,
    unique: &["email"],
    references: &[],
    name_fields: &["firstName", "lastName"],
};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub date_hired: bson::DateTime,
    #[serde(default = "active_by_default")]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerRequest {
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub email: Patch<String>,
    pub phone: Patch<String>,
    pub job_title: Patch<String>,
    pub department: Patch<String>,
    pub date_hired: Patch<String>,
    pub active: Patch<bool>,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    #[serde(rename = "_id")]
    pub _id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub date_hired: DateTime<Utc>,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn active_by_default() -> bool {
    true
}

impl Resource for Worker {
    type Request = WorkerRequest;
    type Response = WorkerResponse;

    fn schema() -> &'static Schema {
        &SCHEMA
    }
    fn build(request: WorkerRequest, _principal: &Principal) -> Result<Self, AppError> {
        let email = request.email.required("email")?;
        let date_hired = match request.date_hired.into_option() {
            Some(raw) => parse_date("dateHired", &raw)?,
            None => bson::DateTime::now(),
        };
        Ok(Worker {
            _id: None,
            first_name: request.first_name.trimmed().required("firstName")?,
            last_name: request.last_name.trimmed().required("lastName")?,
            email: normalize_email("email", &email)?,
            phone: request.phone.non_blank().into_option().flatten(),
            job_title: request.job_title.non_blank().into_option().flatten(),
            department: request.department.non_blank().into_option().flatten(),
            date_hired,
            active: request.active.into_option().unwrap_or(true),
            created_at: None,
            updated_at: None,
        })
    }
    fn merge(&mut self, request: WorkerRequest) -> Result<(), AppError> {
        if request.date_hired == Patch::Null {
            return Err(AppError::invalid("dateHired", "cannot be cleared"));
        }
        request.first_name.trimmed().apply(&mut self.first_name);
        request.last_name.trimmed().apply(&mut self.last_name);
        request
            .email
            .try_map(|raw| normalize_email("email", &raw))?
            .apply(&mut self.email);
        request.phone.non_blank().apply_or_clear(&mut self.phone);
        request.job_title.non_blank().apply_or_clear(&mut self.job_title);
        request.department.non_blank().apply_or_clear(&mut self.department);
        request
            .date_hired
            .try_map(|raw| parse_date("dateHired", &raw))?
            .apply(&mut self.date_hired);
        match request.active {
            Patch::Null => self.active = active_by_default(),
            active => active.apply(&mut self.active),
        }
        Ok(())
    }
    fn present(self, _names: &ReferenceNames) -> WorkerResponse {
        WorkerResponse {
            _id: self._id.map(|_id| _id.to_hex()).unwrap_or_default(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            job_title: self.job_title,
            department: self.department,
            date_hired: to_utc(self.date_hired),
            active: self.active,
            created_at: self.created_at.map(to_utc),
            updated_at: self.updated_at.map(to_utc),
        }
    }
}
