//! Business data the chatbot answers from

use cosmic_common::{ContentStore, Query, Row};
use serde_json::Value;
use tracing::warn;

const DEFAULT_BUSINESS_NAME: &str = "Cosmic Astrology";
const DEFAULT_HOURS: &str = "Monday - Saturday: 9:00 AM - 8:00 PM, Sunday: 10:00 AM - 6:00 PM";

fn text(row: &Row, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// The `business_info` singleton
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessInfo {
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub business_hours: Option<String>,
    pub whatsapp_number: Option<String>,
    pub google_location_url: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

impl BusinessInfo {
    pub fn from_row(row: &Row) -> Self {
        Self {
            business_name: text(row, "business_name"),
            phone: text(row, "phone"),
            email: text(row, "email"),
            address: text(row, "address"),
            business_hours: text(row, "business_hours"),
            whatsapp_number: text(row, "whatsapp_number").or_else(|| text(row, "whatsapp")),
            google_location_url: text(row, "google_location_url"),
            facebook: text(row, "facebook"),
            instagram: text(row, "instagram"),
            twitter: text(row, "twitter"),
        }
    }

    pub fn name(&self) -> &str {
        self.business_name.as_deref().unwrap_or(DEFAULT_BUSINESS_NAME)
    }

    pub fn hours(&self) -> &str {
        self.business_hours.as_deref().unwrap_or(DEFAULT_HOURS)
    }

    /// WhatsApp number, falling back to the phone number
    pub fn whatsapp(&self) -> Option<&str> {
        self.whatsapp_number.as_deref().or(self.phone.as_deref())
    }
}

/// Title and description of an active service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    pub title: String,
    pub description: Option<String>,
}

impl ServiceSummary {
    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            title: text(row, "title")?,
            description: text(row, "description"),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub business: BusinessInfo,
    /// `chatbot_config` singleton (empty when missing)
    pub config: Row,
    pub astrological_services: Vec<ServiceSummary>,
    pub pooja_services: Vec<ServiceSummary>,
}

impl ChatContext {
    /// Load everything the chatbot needs; unreadable tables count as empty
    pub async fn load(store: &dyn ContentStore) -> Self {
        let business = first_row(store, "business_info").await;
        let config = first_row(store, "chatbot_config").await;

        Self {
            business: BusinessInfo::from_row(&business),
            config,
            astrological_services: active_services(store, "astrological_services").await,
            pooja_services: active_services(store, "pooja_services").await,
        }
    }

    /// `false` only when the config explicitly disables the chatbot
    pub fn is_enabled(&self) -> bool {
        self.config.get("is_enabled").and_then(Value::as_bool) != Some(false)
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.config
            .get("system_prompt")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

async fn first_row(store: &dyn ContentStore, table: &str) -> Row {
    match store.select(table, &Query::new().limit(1)).await {
        Ok(rows) => rows.into_iter().next().unwrap_or_default(),
        Err(e) => {
            warn!(table, error = %e, "Chatbot could not read table");
            Row::new()
        }
    }
}

async fn active_services(store: &dyn ContentStore, table: &str) -> Vec<ServiceSummary> {
    let query = Query::new().eq("active", true).order_asc("display_order");
    match store.select(table, &query).await {
        Ok(rows) => rows.iter().filter_map(ServiceSummary::from_row).collect(),
        Err(e) => {
            warn!(table, error = %e, "Chatbot could not read services");
            Vec::new()
        }
    }
}
