//! Form field catalog.
//!
//! Single source of truth for the interactive form: field names, Spanish
//! display labels, widget domains and defaults. The web layer serves this
//! catalog to the form page and validates submissions against it; batch mode
//! uses the field names as the "visible" column list for its warnings.
//!
//! Field names match the training dataset's column names exactly. Display
//! labels are what the user sees; option codes are the raw values the
//! artifact was trained on.

use crate::record::{FieldValue, RecordMap};

/// One choice of a select field: raw code plus display label.
#[derive(Debug, Clone, Copy)]
pub struct SelectOption {
    pub code: &'static str,
    pub label: &'static str,
}

/// Widget domain of a form field.
#[derive(Debug, Clone, Copy)]
pub enum FieldDomain {
    IntRange {
        min: i64,
        max: i64,
        default: i64,
    },
    Select {
        options: &'static [SelectOption],
    },
}

/// One form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub help: Option<&'static str>,
    pub domain: FieldDomain,
}

const YES_NO: &[SelectOption] = &[
    SelectOption { code: "yes", label: "Sí" },
    SelectOption { code: "no", label: "No" },
];

const PARENT_JOBS: &[SelectOption] = &[
    SelectOption { code: "teacher", label: "Docente" },
    SelectOption { code: "health", label: "Salud" },
    SelectOption { code: "services", label: "Servicios" },
    SelectOption { code: "at_home", label: "En casa" },
    SelectOption { code: "other", label: "Otro" },
];

const EDU_HELP: &str = "0 = ninguna, 1 = primaria, 2 = 5º-9º, 3 = secundaria, 4 = superior";
const ALCOHOL_HELP: &str = "1 = muy bajo, 5 = muy alto";

/// Every field of the student form, in on-screen order.
pub static FORM_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "school",
        label: "Colegio (school)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "GP", label: "Gabriel Pereira (GP)" },
                SelectOption { code: "MS", label: "Mousinho da Silveira (MS)" },
            ],
        },
    },
    FieldSpec {
        name: "sex",
        label: "Sexo (sex)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "F", label: "Femenino" },
                SelectOption { code: "M", label: "Masculino" },
            ],
        },
    },
    FieldSpec {
        name: "age",
        label: "Edad (age)",
        help: None,
        domain: FieldDomain::IntRange { min: 15, max: 25, default: 17 },
    },
    FieldSpec {
        name: "address",
        label: "Tipo de domicilio (address)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "U", label: "Urbano" },
                SelectOption { code: "R", label: "Rural" },
            ],
        },
    },
    FieldSpec {
        name: "famsize",
        label: "Tamaño de familia (famsize)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "LE3", label: "3 o menos miembros" },
                SelectOption { code: "GT3", label: "Más de 3 miembros" },
            ],
        },
    },
    FieldSpec {
        name: "Pstatus",
        label: "Estado de convivencia de padres (Pstatus)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "T", label: "Juntos" },
                SelectOption { code: "A", label: "Separados" },
            ],
        },
    },
    FieldSpec {
        name: "Medu",
        label: "Educación de la madre (Medu)",
        help: Some(EDU_HELP),
        domain: FieldDomain::IntRange { min: 0, max: 4, default: 2 },
    },
    FieldSpec {
        name: "Fedu",
        label: "Educación del padre (Fedu)",
        help: Some(EDU_HELP),
        domain: FieldDomain::IntRange { min: 0, max: 4, default: 2 },
    },
    FieldSpec {
        name: "Mjob",
        label: "Trabajo de la madre (Mjob)",
        help: None,
        domain: FieldDomain::Select { options: PARENT_JOBS },
    },
    FieldSpec {
        name: "Fjob",
        label: "Trabajo del padre (Fjob)",
        help: None,
        domain: FieldDomain::Select { options: PARENT_JOBS },
    },
    FieldSpec {
        name: "reason",
        label: "Razón para elegir el colegio (reason)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "home", label: "Cercanía" },
                SelectOption { code: "reputation", label: "Reputación" },
                SelectOption { code: "course", label: "Curso" },
                SelectOption { code: "other", label: "Otro" },
            ],
        },
    },
    FieldSpec {
        name: "guardian",
        label: "Apoderado principal (guardian)",
        help: None,
        domain: FieldDomain::Select {
            options: &[
                SelectOption { code: "mother", label: "Madre" },
                SelectOption { code: "father", label: "Padre" },
                SelectOption { code: "other", label: "Otro" },
            ],
        },
    },
    FieldSpec {
        name: "traveltime",
        label: "Tiempo de traslado al colegio (traveltime)",
        help: Some("1: <15 min, 2: 15-30 min, 3: 30-60 min, 4: >1 h"),
        domain: FieldDomain::IntRange { min: 1, max: 4, default: 1 },
    },
    FieldSpec {
        name: "studytime",
        label: "Horas de estudio semanal (studytime)",
        help: Some("1: <2 h, 2: 2-5 h, 3: 5-10 h, 4: >10 h"),
        domain: FieldDomain::IntRange { min: 1, max: 4, default: 2 },
    },
    FieldSpec {
        name: "failures",
        label: "Nº de repeticiones previas (failures)",
        help: Some("Número de veces que repitió curso o asignatura"),
        domain: FieldDomain::IntRange { min: 0, max: 4, default: 0 },
    },
    FieldSpec {
        name: "schoolsup",
        label: "Apoyo educativo extra del colegio (schoolsup)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "famsup",
        label: "Apoyo educativo de la familia (famsup)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "paid",
        label: "Clases pagadas extra (paid)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "activities",
        label: "Actividades extracurriculares (activities)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "nursery",
        label: "Asistió a educación inicial (nursery)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "higher",
        label: "Desea educación superior (higher)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "internet",
        label: "Acceso a Internet en casa (internet)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "romantic",
        label: "Tiene relación romántica (romantic)",
        help: None,
        domain: FieldDomain::Select { options: YES_NO },
    },
    FieldSpec {
        name: "famrel",
        label: "Calidad de relaciones familiares (famrel)",
        help: Some("1 = muy mala, 5 = excelente"),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 4 },
    },
    FieldSpec {
        name: "freetime",
        label: "Tiempo libre después de clase (freetime)",
        help: Some("1 = muy poco, 5 = mucho"),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 3 },
    },
    FieldSpec {
        name: "goout",
        label: "Salir con amigos (goout)",
        help: Some("1 = casi nunca, 5 = muy frecuente"),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 2 },
    },
    FieldSpec {
        name: "Dalc",
        label: "Consumo de alcohol en días de semana (Dalc)",
        help: Some(ALCOHOL_HELP),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 1 },
    },
    FieldSpec {
        name: "Walc",
        label: "Consumo de alcohol en fin de semana (Walc)",
        help: Some(ALCOHOL_HELP),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 1 },
    },
    FieldSpec {
        name: "health",
        label: "Estado de salud actual (health)",
        help: Some("1 = muy malo, 5 = muy bueno"),
        domain: FieldDomain::IntRange { min: 1, max: 5, default: 4 },
    },
    FieldSpec {
        name: "absences",
        label: "Número de inasistencias (absences)",
        help: None,
        domain: FieldDomain::IntRange { min: 0, max: 100, default: 0 },
    },
];

/// Look up a field by dataset column name.
pub fn spec(name: &str) -> Option<&'static FieldSpec> {
    FORM_FIELDS.iter().find(|field| field.name == name)
}

/// Column names the user can see on the form. Batch mode warns when any of
/// these are absent from an uploaded CSV.
pub fn visible_columns() -> impl Iterator<Item = &'static str> {
    FORM_FIELDS.iter().map(|field| field.name)
}

/// A record with every field at its widget default (the form's initial
/// state).
pub fn default_record() -> RecordMap {
    FORM_FIELDS
        .iter()
        .map(|field| {
            let value = match field.domain {
                FieldDomain::IntRange { default, .. } => FieldValue::Number(default as f64),
                FieldDomain::Select { options } => FieldValue::Text(options[0].code.to_string()),
            };
            (field.name.to_string(), value)
        })
        .collect()
}

/// Strict validation of an interactive submission: every form field must be
/// present with a value inside its domain, and no unknown keys are allowed.
///
/// Returns the sorted list of problems so the caller can surface all of them
/// at once.
pub fn validate_record(record: &RecordMap) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    for key in record.keys() {
        if spec(key).is_none() {
            problems.push(format!("unknown field '{key}'"));
        }
    }

    for field in FORM_FIELDS {
        let Some(value) = record.get(field.name) else {
            problems.push(format!("field '{}' is required", field.name));
            continue;
        };
        match field.domain {
            FieldDomain::IntRange { min, max, .. } => match value.as_f64() {
                Some(v) if v.fract() != 0.0 => {
                    problems.push(format!("field '{}' must be an integer", field.name));
                }
                Some(v) if !(min..=max).contains(&(v as i64)) => {
                    problems.push(format!(
                        "field '{}': {} outside {}..={}",
                        field.name, v, min, max
                    ));
                }
                Some(_) => {}
                None => problems.push(format!("field '{}' must be an integer", field.name)),
            },
            FieldDomain::Select { options } => match value.as_text() {
                Some(code) if options.iter().any(|option| option.code == code) => {}
                Some(code) => problems.push(format!(
                    "field '{}': unknown option '{}'",
                    field.name, code
                )),
                None => problems.push(format!(
                    "field '{}' must be a category code",
                    field.name
                )),
            },
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        problems.sort();
        Err(problems)
    }
}
