//! Checklist forms and their submissions.
//!
//! A [`Form`] is a template (opening checklist, incident report, ...) whose
//! field definitions are stored as a JSON array in a text property. A
//! [`FormSubmission`] stores the answers as a JSON object keyed by field
//! name.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

/// Input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Checkbox,
    Select,
    Date,
}

/// A single field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Key used in submission answers.
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Allowed values for `select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FormField {
    /// Checks one answer value against the field's kind.
    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let ok = match self.kind {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Checkbox => value.is_boolean(),
            FieldKind::Select => value
                .as_str()
                .is_some_and(|v| self.options.iter().any(|o| o == v)),
            FieldKind::Date => value
                .as_str()
                .is_some_and(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("invalid value for field '{}'", self.name))
        }
    }
}

/// Blank answers do not satisfy a required field.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// A form template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
    /// Restricts the form to one store. `None` means every store.
    pub store_id: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Form {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            fields,
            store_id: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether users of `store_id` should see this form.
    pub fn applies_to(&self, store_id: Option<&str>) -> bool {
        match (&self.store_id, store_id) {
            (None, _) => true,
            (Some(own), Some(wanted)) => own == wanted,
            (Some(_), None) => false,
        }
    }

    /// Field names must be non-empty and unique; select fields need options.
    pub fn validate_fields(fields: &[FormField]) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for field in fields {
            if field.name.trim().is_empty() {
                return Err("field names must not be empty".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("duplicate field name '{}'", field.name));
            }
            if field.kind == FieldKind::Select && field.options.is_empty() {
                return Err(format!("select field '{}' has no options", field.name));
            }
        }
        Ok(())
    }

    /// Validates submitted answers: every required field present and
    /// non-blank, every value of the right kind, no unknown keys.
    pub fn validate_answers(&self, answers: &Map<String, Value>) -> std::result::Result<(), String> {
        for key in answers.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                return Err(format!("unknown field '{}'", key));
            }
        }
        for field in &self.fields {
            match answers.get(&field.name) {
                Some(value) if !is_blank(value) => field.check(value)?,
                _ if field.required => {
                    return Err(format!("missing required field '{}'", field.name))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl NotionRecord for Form {
    const DATABASE: DatabaseKind = DatabaseKind::Forms;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title("Title"),
            description: page.text("Description"),
            fields: serde_json::from_str(&page.text("Fields")).unwrap_or_default(),
            store_id: page.relation("Store"),
            active: page.checkbox("Active"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        let fields = serde_json::to_string(&self.fields).unwrap_or_else(|_| "[]".to_string());
        Properties::new()
            .title("Title", &self.title)
            .text("Description", &self.description)
            .text("Fields", &fields)
            .relation("Store", self.store_id.as_deref())
            .checkbox("Active", self.active)
    }
}

/// A filled-in form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: String,
    pub form_id: Option<String>,
    pub store_id: Option<String>,
    pub submitted_by: Option<String>,
    /// Human readable title, e.g. `Opening checklist - 2024-05-01`.
    pub summary: String,
    pub answers: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl FormSubmission {
    pub fn new(form: &Form, store_id: &str, submitted_by: &str, answers: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            form_id: Some(form.id.clone()),
            store_id: Some(store_id.to_string()),
            submitted_by: Some(submitted_by.to_string()),
            summary: format!("{} - {}", form.title, now.format("%Y-%m-%d")),
            answers,
            created_at: now,
        }
    }
}

impl NotionRecord for FormSubmission {
    const DATABASE: DatabaseKind = DatabaseKind::FormSubmissions;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            form_id: page.relation("Form"),
            store_id: page.relation("Store"),
            submitted_by: page.relation("Submitted By"),
            summary: page.title("Summary"),
            answers: serde_json::from_str(&page.text("Answers")).unwrap_or_default(),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        let answers = Value::Object(self.answers.clone()).to_string();
        Properties::new()
            .title("Summary", &self.summary)
            .relation("Form", self.form_id.as_deref())
            .relation("Store", self.store_id.as_deref())
            .relation("Submitted By", self.submitted_by.as_deref())
            .text("Answers", &answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, kind: FieldKind, required: bool) -> FormField {
        FormField {
            name: name.to_string(),
            label: name.to_uppercase(),
            kind,
            required,
            options: Vec::new(),
        }
    }

    fn opening_checklist() -> Form {
        let mut shift = field("shift", FieldKind::Select, true);
        shift.options = vec!["am".into(), "pm".into()];
        Form::new(
            "Opening checklist",
            vec![
                field("alarm_off", FieldKind::Checkbox, true),
                field("cash_float", FieldKind::Number, true),
                field("notes", FieldKind::Text, false),
                field("delivery_date", FieldKind::Date, false),
                shift,
            ],
        )
    }

    fn answers(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_answers() {
        let form = opening_checklist();
        let ok = answers(json!({
            "alarm_off": true,
            "cash_float": 150.0,
            "shift": "am",
            "delivery_date": "2024-05-02"
        }));
        assert!(form.validate_answers(&ok).is_ok());
    }

    #[test]
    fn test_missing_or_blank_required_field() {
        let form = opening_checklist();
        let err = form
            .validate_answers(&answers(json!({ "alarm_off": true, "shift": "am" })))
            .unwrap_err();
        assert!(err.contains("cash_float"));

        let err = form
            .validate_answers(&answers(json!({ "alarm_off": true, "cash_float": 1, "shift": " " })))
            .unwrap_err();
        assert!(err.contains("shift"));
    }

    #[test]
    fn test_wrong_kinds_and_unknown_keys() {
        let form = opening_checklist();
        let base = json!({ "alarm_off": true, "cash_float": 1, "shift": "am" });

        let mut bad = answers(base.clone());
        bad.insert("cash_float".into(), json!("lots"));
        assert!(form.validate_answers(&bad).is_err());

        let mut bad = answers(base.clone());
        bad.insert("shift".into(), json!("night"));
        assert!(form.validate_answers(&bad).is_err());

        let mut bad = answers(base.clone());
        bad.insert("delivery_date".into(), json!("05/02/2024"));
        assert!(form.validate_answers(&bad).is_err());

        let mut bad = answers(base);
        bad.insert("extra".into(), json!(1));
        assert!(form.validate_answers(&bad).unwrap_err().contains("unknown"));
    }

    #[test]
    fn test_validate_fields() {
        assert!(Form::validate_fields(&opening_checklist().fields).is_ok());

        let dupes = vec![
            field("a", FieldKind::Text, false),
            field("a", FieldKind::Number, false),
        ];
        assert!(Form::validate_fields(&dupes).unwrap_err().contains("duplicate"));

        let no_options = vec![field("pick", FieldKind::Select, false)];
        assert!(Form::validate_fields(&no_options).is_err());

        assert!(Form::validate_fields(&[field(" ", FieldKind::Text, false)]).is_err());
    }

    #[test]
    fn test_applies_to() {
        let mut form = opening_checklist();
        assert!(form.applies_to(Some("s-1")));
        assert!(form.applies_to(None));

        form.store_id = Some("s-1".into());
        assert!(form.applies_to(Some("s-1")));
        assert!(!form.applies_to(Some("s-2")));
        assert!(!form.applies_to(None));
    }

    #[test]
    fn test_fields_survive_page_mapping() {
        let form = opening_checklist();
        let page = Page {
            id: "f1".into(),
            created_time: Utc::now(),
            last_edited_time: Utc::now(),
            archived: false,
            parent: Default::default(),
            properties: form.to_properties().into_map(),
        };
        let back = Form::from_page(&page);
        assert_eq!(back.fields, form.fields);
        assert!(back.active);
    }

    #[test]
    fn test_corrupt_fields_json_reads_empty() {
        let page = Page {
            id: "f1".into(),
            created_time: Utc::now(),
            last_edited_time: Utc::now(),
            archived: false,
            parent: Default::default(),
            properties: Properties::new()
                .title("Title", "Broken")
                .text("Fields", "{not json")
                .into_map(),
        };
        assert!(Form::from_page(&page).fields.is_empty());
    }
}
