//! Request-body schema validation.
//!
//! Mutating endpoints check their JSON body against a small declarative
//! `Schema` before deserializing it. Validation is exposed as the
//! `Validator` trait so callers can inject their own implementation;
//! `SchemaValidator` is the default one.
//!
//! Violations are reported per property using the message wording clients
//! already rely on, e.g. `requires property "isbn"` or
//! `is not of a type(s) integer`.

use serde::Serialize;
use serde_json::Value;

/// JSON type accepted for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// A JSON integer that fits in 32 bits.
    Integer,
    /// Like `Integer`, but `null` is also accepted.
    NullableInteger,
}

impl FieldType {
    /// Type name used in violation messages.
    fn describe(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::NullableInteger => "integer,null",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => is_i32(value),
            Self::NullableInteger => value.is_null() || is_i32(value),
        }
    }
}

fn is_i32(value: &Value) -> bool {
    value.as_i64().is_some_and(|n| i32::try_from(n).is_ok())
}

/// A single declared property of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn prop(name: &'static str, ty: FieldType) -> Property {
    Property { name, ty }
}

/// Schema for a JSON object body.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Schema name, used in logs.
    pub name: &'static str,
    pub properties: &'static [Property],
    pub required: &'static [&'static str],
    /// Whether properties not listed in `properties` are tolerated.
    pub additional_properties: bool,
}

const BOOK_PROPERTIES: &[Property] = &[
    prop("isbn", FieldType::String),
    prop("amazon_url", FieldType::String),
    prop("author_id", FieldType::NullableInteger),
    prop("language", FieldType::String),
    prop("pages", FieldType::Integer),
    prop("publisher", FieldType::String),
    prop("title", FieldType::String),
    prop("year", FieldType::Integer),
];

const BOOK_FIELDS_WITHOUT_ISBN: &[Property] = &[
    prop("amazon_url", FieldType::String),
    prop("author_id", FieldType::NullableInteger),
    prop("language", FieldType::String),
    prop("pages", FieldType::Integer),
    prop("publisher", FieldType::String),
    prop("title", FieldType::String),
    prop("year", FieldType::Integer),
];

/// Body of `POST /books`.
pub const BOOK_SCHEMA: Schema = Schema {
    name: "book",
    properties: BOOK_PROPERTIES,
    required: &[
        "isbn",
        "amazon_url",
        "language",
        "pages",
        "publisher",
        "title",
        "year",
    ],
    additional_properties: true,
};

/// Body of `PUT /books/{isbn}`. The isbn comes from the path; a body isbn
/// is tolerated and ignored.
pub const BOOK_UPDATE_SCHEMA: Schema = Schema {
    name: "book_update",
    properties: BOOK_PROPERTIES,
    required: &[
        "amazon_url",
        "language",
        "pages",
        "publisher",
        "title",
        "year",
    ],
    additional_properties: true,
};

/// Body of `PATCH /books/{isbn}`: any subset of the non-key fields.
pub const BOOK_PATCH_SCHEMA: Schema = Schema {
    name: "book_patch",
    properties: BOOK_FIELDS_WITHOUT_ISBN,
    required: &[],
    additional_properties: false,
};

/// Body of `POST /authors` and `PUT /authors/{id}`.
pub const AUTHOR_SCHEMA: Schema = Schema {
    name: "author",
    properties: &[prop("name", FieldType::String)],
    required: &["name"],
    additional_properties: true,
};

/// One violation found in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{property} {message}")]
pub struct ValidationError {
    /// Path of the offending value (`instance` or `instance.<field>`).
    pub property: String,
    pub message: String,
}

/// Outcome of validating a body against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a JSON body against a schema.
pub trait Validator: Send + Sync {
    fn validate(&self, body: &Value, schema: &Schema) -> ValidationReport;
}

/// Default validator for `Schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
    fn validate(&self, body: &Value, schema: &Schema) -> ValidationReport {
        let Some(object) = body.as_object() else {
            return ValidationReport::from_errors(vec![ValidationError {
                property: "instance".to_string(),
                message: "is not of a type(s) object".to_string(),
            }]);
        };

        let mut errors = Vec::new();

        for name in schema.required {
            if !object.contains_key(*name) {
                errors.push(ValidationError {
                    property: "instance".to_string(),
                    message: format!("requires property \"{}\"", name),
                });
            }
        }

        for (key, value) in object {
            match schema.properties.iter().find(|p| p.name == key) {
                Some(property) if !property.ty.accepts(value) => {
                    errors.push(ValidationError {
                        property: format!("instance.{}", key),
                        message: format!("is not of a type(s) {}", property.ty.describe()),
                    });
                }
                Some(_) => {}
                None if !schema.additional_properties => {
                    errors.push(ValidationError {
                        property: "instance".to_string(),
                        message: format!(
                            "is not allowed to have the additional property \"{key}\""
                        ),
                    });
                }
                None => {}
            }
        }

        ValidationReport::from_errors(errors)
    }
}
