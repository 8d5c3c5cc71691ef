use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

use crate::{error::AppError, models};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Incident,
    GearLog,
    Compliance,
    Report,
    Worker,
    Site,
    User,
}

impl ResourceKind {
    pub fn schema(self) -> &'static Schema {
        match self {
            ResourceKind::Incident => &models::incident::SCHEMA,
            ResourceKind::GearLog => &models::gear_log::SCHEMA,
            ResourceKind::Compliance => &models::compliance::SCHEMA,
            ResourceKind::Report => &models::report::SCHEMA,
            ResourceKind::Worker => &models::worker::SCHEMA,
            ResourceKind::Site => &models::site::SCHEMA,
            ResourceKind::User => &models::user::SCHEMA,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// The operation a response is rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Get,
    Write,
}

/// Responses in which a reference is expanded to `{ _id, name }`.
/// Everywhere else it is the bare id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Populate {
    Never,
    List,
    ListAndGet,
}

impl Populate {
    pub fn applies_to(self, view: View) -> bool {
        matches!(
            (self, view),
            (Populate::List, View::List) | (Populate::ListAndGet, View::List | View::Get)
        )
    }
}

/// A field holding the id of another entity.
#[derive(Debug)]
pub struct Reference {
    pub field: &'static str,
    pub target: ResourceKind,
    pub populate: Populate,
}

/// Declarative description of one resource kind.
#[derive(Debug)]
pub struct Schema {
    pub kind: ResourceKind,
    pub label: &'static str,
    pub collection: &'static str,
    /// Payload fields that must be present and non-blank, in report order.
    pub required: &'static [&'static str],
    pub choices: &'static [(&'static str, &'static [&'static str])],
    pub sort: &'static [(&'static str, SortOrder)],
    /// Field holding the owning user's id; only owned kinds set this.
    pub owner: Option<&'static str>,
    pub unique: &'static [&'static str],
    pub references: &'static [Reference],
    /// Fields joined with a space to name an entity of this kind.
    pub name_fields: &'static [&'static str],
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

impl Schema {
    pub fn missing_fields(&self, payload: &Map<String, Value>) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| payload.get(*field).map_or(true, is_blank))
            .collect()
    }

    /// Required fields the payload explicitly sets to null or blank.
    pub fn blanked_fields(&self, payload: &Map<String, Value>) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| payload.get(*field).map_or(false, is_blank))
            .collect()
    }

    pub fn invalid_choice(&self, payload: &Map<String, Value>) -> Option<AppError> {
        self.choices.iter().find_map(|(field, allowed)| {
            let value = payload.get(*field)?;
            match value {
                Value::Null => None,
                Value::String(text) if allowed.contains(&text.as_str()) => None,
                _ => Some(AppError::invalid(
                    field,
                    format!("expected one of {}", allowed.join(", ")),
                )),
            }
        })
    }

    pub fn validate_create(&self, payload: &Map<String, Value>) -> Result<(), AppError> {
        let missing = self.missing_fields(payload);
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        self.invalid_choice(payload).map_or(Ok(()), Err)
    }

    pub fn validate_update(&self, payload: &Map<String, Value>) -> Result<(), AppError> {
        let blanked = self.blanked_fields(payload);
        if !blanked.is_empty() {
            return Err(AppError::missing_fields(&blanked));
        }
        self.invalid_choice(payload).map_or(Ok(()), Err)
    }

    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for (field, order) in self.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            sort.insert(*field, Bson::Int32(direction));
        }
        Some(sort)
    }

    pub fn display_name(&self, document: &Document) -> Option<String> {
        let parts: Vec<&str> = self
            .name_fields
            .iter()
            .filter_map(|field| document.get_str(field).ok())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
