//! Form page and field catalog descriptor

use axum::{response::Html, Json};
use serde::Serialize;

use atraso_core::fields::{self, FieldDomain};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Serve the interactive form page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// One widget descriptor for the form page.
#[derive(Serialize)]
pub struct FieldDescriptor {
    name: &'static str,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'static str>,
    #[serde(flatten)]
    widget: WidgetDescriptor,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetDescriptor {
    Int { min: i64, max: i64, default: i64 },
    Select { options: Vec<OptionDescriptor> },
}

#[derive(Serialize)]
pub struct OptionDescriptor {
    code: &'static str,
    label: &'static str,
}

/// The field catalog as JSON. The page builds its widgets from this, so the
/// server's catalog stays the single source of truth for names, domains and
/// display labels.
pub async fn descriptor() -> Json<Vec<FieldDescriptor>> {
    let descriptors = fields::FORM_FIELDS
        .iter()
        .map(|spec| FieldDescriptor {
            name: spec.name,
            label: spec.label,
            help: spec.help,
            widget: match spec.domain {
                FieldDomain::IntRange { min, max, default } => {
                    WidgetDescriptor::Int { min, max, default }
                }
                FieldDomain::Select { options } => WidgetDescriptor::Select {
                    options: options
                        .iter()
                        .map(|option| OptionDescriptor {
                            code: option.code,
                            label: option.label,
                        })
                        .collect(),
                },
            },
        })
        .collect();
    Json(descriptors)
}
