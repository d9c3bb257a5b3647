//! Declarative field and object validation.
//!
//! Validation is always a separate step from patch application. A [`RuleSet`]
//! lists per-field rules, checked first in declaration order, followed by
//! object-level rules that span several fields.

mod patterns;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One failed rule. `field` is `None` for object-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: Option<String>,
    pub message: String,
}

/// Ordered failures of one validation run. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    #[cfg(test)]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.message.as_str())
    }

    /// Messages grouped by field name; object-level failures use the `""` key.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for failure in &self.failures {
            grouped
                .entry(failure.field.clone().unwrap_or_default())
                .or_default()
                .push(failure.message.clone());
        }
        grouped
    }

    fn push(&mut self, field: Option<&str>, message: String) {
        self.failures.push(ValidationFailure {
            field: field.map(str::to_string),
            message,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.messages().collect();
        f.write_str(&messages.join(" "))
    }
}

/// A single-field check on a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    MaxLength(usize),
    /// Checked only when the value is non-empty.
    Email,
    /// Checked only when the value is non-empty.
    Phone,
}

impl FieldRule {
    fn check(self, field: &str, value: &str) -> Option<String> {
        match self {
            FieldRule::Required if value.trim().is_empty() => {
                Some(format!("The {field} field is required."))
            }
            FieldRule::MaxLength(max) if value.chars().count() > max => Some(format!(
                "The field {field} must be a string with a maximum length of {max}."
            )),
            FieldRule::Email if !value.is_empty() && !patterns::is_email(value) => {
                Some(format!("The {field} field is not a valid e-mail address."))
            }
            FieldRule::Phone if !value.is_empty() && !patterns::is_phone(value) => {
                Some(format!("The {field} field is not a valid phone number."))
            }
            _ => None,
        }
    }
}

pub struct FieldRules<T> {
    pub field: &'static str,
    pub read: fn(&T) -> &str,
    pub rules: &'static [FieldRule],
}

/// A rule spanning several fields. `holds` returns `true` when satisfied.
pub struct ObjectRule<T> {
    pub message: &'static str,
    pub holds: fn(&T) -> bool,
}

pub struct RuleSet<T: 'static> {
    fields: &'static [FieldRules<T>],
    objects: &'static [ObjectRule<T>],
}

impl<T: 'static> RuleSet<T> {
    pub const fn new(fields: &'static [FieldRules<T>], objects: &'static [ObjectRule<T>]) -> Self {
        Self { fields, objects }
    }
}

impl<T: 'static> fmt::Debug for RuleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("fields", &self.fields.iter().map(|r| r.field).collect::<Vec<_>>())
            .field("objects", &self.objects.len())
            .finish()
    }
}

/// Runs every rule of `rules` against `resource`.
///
/// Each field reports at most its first failing rule. Object rules always run
/// after the field rules, whether or not a field rule failed.
pub fn validate<T: 'static>(resource: &T, rules: &RuleSet<T>) -> ValidationReport {
    let mut report = ValidationReport::default();

    for field_rules in rules.fields {
        let value = (field_rules.read)(resource);
        if let Some(message) = field_rules
            .rules
            .iter()
            .find_map(|rule| rule.check(field_rules.field, value))
        {
            report.push(Some(field_rules.field), message);
        }
    }

    for rule in rules.objects {
        if !(rule.holds)(resource) {
            report.push(None, rule.message.to_string());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Contact {
        name: String,
        email: String,
    }

    fn name(c: &Contact) -> &str {
        &c.name
    }
    fn email(c: &Contact) -> &str {
        &c.email
    }
    fn has_email(c: &Contact) -> bool {
        !c.email.is_empty()
    }

    static CONTACT_RULES: RuleSet<Contact> = RuleSet::new(
        &[
            FieldRules {
                field: "Name",
                read: name,
                rules: &[FieldRule::Required, FieldRule::MaxLength(5)],
            },
            FieldRules {
                field: "Email",
                read: email,
                rules: &[FieldRule::Email],
            },
        ],
        &[ObjectRule {
            message: "Email is needed.",
            holds: has_email,
        }],
    );

    fn contact(name: &str, email: &str) -> Contact {
        Contact {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_valid_resource_has_empty_report() {
        let report = validate(&contact("Ann", "ann@email.com"), &CONTACT_RULES);
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_first_failing_rule_per_field() {
        let report = validate(&contact("", "ann@email.com"), &CONTACT_RULES);
        assert_eq!(
            report.failures(),
            &[ValidationFailure {
                field: Some("Name".to_string()),
                message: "The Name field is required.".to_string(),
            }]
        );

        let report = validate(&contact("Annabelle", "ann@email.com"), &CONTACT_RULES);
        assert_eq!(
            report.messages().collect::<Vec<_>>(),
            vec!["The field Name must be a string with a maximum length of 5."]
        );
    }

    #[test]
    fn test_object_rules_run_after_field_failures() {
        let report = validate(&contact("", ""), &CONTACT_RULES);
        assert_eq!(
            report.messages().collect::<Vec<_>>(),
            vec!["The Name field is required.", "Email is needed."]
        );
        let grouped = report.by_field();
        assert_eq!(grouped[""], vec!["Email is needed.".to_string()]);
        assert_eq!(grouped["Name"], vec!["The Name field is required.".to_string()]);
    }

    #[test]
    fn test_format_rules_skip_empty_values() {
        assert_eq!(FieldRule::Email.check("Email", ""), None);
        assert_eq!(FieldRule::Phone.check("Phone", ""), None);
        assert!(FieldRule::Email.check("Email", "test").is_some());
        assert!(FieldRule::Phone.check("Phone", "*-*-0000").is_some());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let c = contact("Annabelle", "nope");
        assert_eq!(validate(&c, &CONTACT_RULES), validate(&c, &CONTACT_RULES));
    }
}
