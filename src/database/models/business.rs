use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A tenant: one owning user, one globally unique subdomain slug.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub subdomain: String,
    pub visual_config: Option<Json<VisualConfig>>,
    pub appointment_config: Json<AppointmentConfig>,
    pub availability: Option<Json<Vec<AvailabilityDay>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the anonymous chatbot widget is allowed to see: everything except
/// the owner linkage and bookkeeping timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBusiness {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub subdomain: String,
    pub visual_config: Option<VisualConfig>,
    pub appointment_config: AppointmentConfig,
    pub availability: Option<Vec<AvailabilityDay>>,
}

impl From<Business> for PublicBusiness {
    fn from(b: Business) -> Self {
        Self {
            id: b.id,
            name: b.name,
            description: b.description,
            subdomain: b.subdomain,
            visual_config: b.visual_config.map(|j| j.0),
            appointment_config: b.appointment_config.0,
            availability: b.availability.map(|j| j.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            logo_url: None,
            theme: Theme::Light,
            primary_color: None,
            welcome_message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentConfig {
    pub services: Vec<ServiceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    /// Minutes
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub day: Weekday,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Time-of-day slot, "HH:MM".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    fn bounds(&self) -> Result<(NaiveTime, NaiveTime), String> {
        let start = NaiveTime::parse_from_str(&self.start, "%H:%M")
            .map_err(|_| format!("invalid slot start '{}'", self.start))?;
        let end = NaiveTime::parse_from_str(&self.end, "%H:%M")
            .map_err(|_| format!("invalid slot end '{}'", self.end))?;
        if start >= end {
            return Err(format!("slot {}-{} is empty or reversed", self.start, self.end));
        }
        Ok((start, end))
    }
}

impl AvailabilityDay {
    /// Slots within one weekday must parse and must not overlap.
    pub fn validate(&self) -> Result<(), String> {
        let mut bounds = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            bounds.push(slot.bounds()?);
        }
        bounds.sort_by_key(|(start, _)| *start);
        for pair in bounds.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            if next_start < prev_end {
                return Err(format!("overlapping slots on {:?}", self.day));
            }
        }
        Ok(())
    }
}
