//! Form view-model: current field values, per-field error markers, and the
//! validate / reset / build-payload operations over them.

use crate::config::{Config, FormLayout};
use crate::errors::{IntakeError, Result};
use crate::fields::{FieldBinding, FieldId, FieldKind, Trigger, bindings_for};
use crate::phone;
use crate::social::{self, SocialMode};
use crate::validators::{self, FieldError, PICKER_DATE_FORMAT, Verdict};
use chrono::NaiveDate;
use shared::protocol::{FormSubmission, SocialNetwork};
use std::collections::{BTreeMap, BTreeSet};

const NETWORKS: [SocialNetwork; 2] = [SocialNetwork::Telegram, SocialNetwork::Whatsapp];

/// Date format sent to the relay.
pub const SUBMISSION_DATE_FORMAT: &str = "%d.%m.%Y";

/// Something the user did to one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEvent {
    /// Text typed into a text or masked field.
    Input { field: FieldId, value: String },
    /// Value picked in the birth date picker.
    DatePicked(String),
    /// Option chosen in a single-choice group.
    Selected { field: FieldId, index: usize },
    /// Service checkbox toggled.
    Toggled { index: usize, checked: bool },
}

impl FieldEvent {
    pub fn field(&self) -> FieldId {
        match self {
            FieldEvent::Input { field, .. } | FieldEvent::Selected { field, .. } => *field,
            FieldEvent::DatePicked(_) => FieldId::BirthDate,
            FieldEvent::Toggled { .. } => FieldId::Services,
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            FieldEvent::Input { .. } => Trigger::Input,
            _ => Trigger::Change,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ChoiceGroup {
    options: Vec<String>,
    selected: Option<usize>,
}

impl ChoiceGroup {
    fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    fn select(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    fn selected_label(&self) -> Option<&str> {
        self.selected.map(|i| self.options[i].as_str())
    }
}

#[derive(Clone, Debug, Default)]
struct MultiChoiceGroup {
    options: Vec<String>,
    selected: BTreeSet<usize>,
}

impl MultiChoiceGroup {
    fn set(&mut self, index: usize, checked: bool) -> bool {
        if index >= self.options.len() {
            return false;
        }
        if checked {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
        true
    }

    /// Selected labels in option order.
    fn joined(&self) -> String {
        self.selected
            .iter()
            .map(|&i| self.options[i].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub struct FormState {
    layout: FormLayout,
    bindings: Vec<FieldBinding>,
    first_name: String,
    last_name: String,
    birth_date: String,
    phone: String,
    social: String,
    social_type: ChoiceGroup,
    gender: ChoiceGroup,
    contact_method: ChoiceGroup,
    services: MultiChoiceGroup,
    errors: BTreeMap<FieldId, FieldError>,
}

impl FormState {
    pub fn new(config: &Config) -> Self {
        Self {
            layout: config.layout,
            bindings: bindings_for(&config.layout),
            first_name: String::new(),
            last_name: String::new(),
            birth_date: String::new(),
            phone: String::new(),
            social: String::new(),
            social_type: ChoiceGroup::new(
                NETWORKS.iter().map(|n| n.display_name().to_string()).collect(),
            ),
            gender: ChoiceGroup::new(config.gender_options.clone()),
            contact_method: ChoiceGroup::new(config.contact_method_options.clone()),
            services: MultiChoiceGroup {
                options: config.service_options.clone(),
                selected: BTreeSet::new(),
            },
            errors: BTreeMap::new(),
        }
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    fn binding(&self, field: FieldId) -> Option<&FieldBinding> {
        self.bindings.iter().find(|b| b.field == field)
    }

    /// Applies an event and, when the event is the field's trigger,
    /// re-validates that field.
    ///
    /// Events for fields the layout does not show are ignored.
    pub fn handle(&mut self, event: FieldEvent) -> Verdict {
        let field = event.field();
        let Some(binding) = self.binding(field).copied() else {
            tracing::debug!(?field, "Ignoring event for inactive field");
            return Ok(());
        };
        let trigger = event.trigger();

        match event {
            FieldEvent::Input { field, value } => {
                let value = match binding.kind {
                    FieldKind::MaskedText => phone::apply_mask(&value),
                    FieldKind::Text => value,
                    _ => return Ok(()),
                };
                let Some(slot) = self.text_mut(field) else {
                    return Ok(());
                };
                *slot = value;
            }
            FieldEvent::DatePicked(value) => self.birth_date = value,
            FieldEvent::Selected { field, index } => {
                let Some(group) = self.choice_mut(field) else {
                    return Ok(());
                };
                if !group.select(index) {
                    tracing::debug!(?field, index, "Ignoring unknown option");
                }
            }
            FieldEvent::Toggled { index, checked } => {
                if !self.services.set(index, checked) {
                    tracing::debug!(index, "Ignoring unknown service");
                }
            }
        }

        if trigger != binding.trigger {
            return Ok(());
        }
        let verdict = self.validate_field(field);

        // Whether a handle is acceptable depends on the chosen network
        if field == FieldId::SocialType
            && (!self.social.trim().is_empty() || self.errors.contains_key(&FieldId::Social))
        {
            let _ = self.validate_field(FieldId::Social);
        }
        verdict
    }

    /// Storage of a typed text field; `None` for every other field.
    fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        match field {
            FieldId::FirstName => Some(&mut self.first_name),
            FieldId::LastName => Some(&mut self.last_name),
            FieldId::Phone => Some(&mut self.phone),
            FieldId::Social => Some(&mut self.social),
            FieldId::BirthDate
            | FieldId::SocialType
            | FieldId::Gender
            | FieldId::ContactMethod
            | FieldId::Services => None,
        }
    }

    fn chosen_network(&self) -> Option<SocialNetwork> {
        self.social_type.selected.map(|i| NETWORKS[i])
    }

    fn choice(&self, field: FieldId) -> Option<&ChoiceGroup> {
        match field {
            FieldId::Gender => Some(&self.gender),
            FieldId::ContactMethod => Some(&self.contact_method),
            FieldId::SocialType => Some(&self.social_type),
            _ => None,
        }
    }

    fn choice_mut(&mut self, field: FieldId) -> Option<&mut ChoiceGroup> {
        match field {
            FieldId::Gender => Some(&mut self.gender),
            FieldId::ContactMethod => Some(&mut self.contact_method),
            FieldId::SocialType => Some(&mut self.social_type),
            _ => None,
        }
    }

    /// Position of `label` among the options of a choice field.
    pub fn option_index(&self, field: FieldId, label: &str) -> Option<usize> {
        let options = match field {
            FieldId::Services => &self.services.options,
            _ => &self.choice(field)?.options,
        };
        options.iter().position(|o| o == label)
    }

    /// Current value of a text-like field.
    pub fn value(&self, field: FieldId) -> &str {
        match field {
            FieldId::FirstName => &self.first_name,
            FieldId::LastName => &self.last_name,
            FieldId::BirthDate => &self.birth_date,
            FieldId::Phone => &self.phone,
            FieldId::Social => &self.social,
            _ => self.choice(field).and_then(ChoiceGroup::selected_label).unwrap_or(""),
        }
    }

    fn check(&self, field: FieldId) -> Verdict {
        let label = field.label();
        match field {
            FieldId::FirstName | FieldId::LastName => {
                validators::validate_required(label, self.value(field))
            }
            FieldId::BirthDate => validators::validate_birth_date(label, &self.birth_date),
            FieldId::Phone => validators::validate_phone(label, &self.phone),
            FieldId::Social => match self.layout.social {
                Some(mode) => {
                    validators::validate_social(label, mode, self.chosen_network(), &self.social)
                }
                None => Ok(()),
            },
            FieldId::SocialType | FieldId::Gender | FieldId::ContactMethod => {
                let selected = self.choice(field).and_then(|g| g.selected);
                validators::validate_choice(field.selection_prompt(), selected)
            }
            FieldId::Services => {
                validators::validate_multi_choice(field.selection_prompt(), self.services.selected.len())
            }
        }
    }

    /// Runs one field's validator and updates its error marker.
    pub fn validate_field(&mut self, field: FieldId) -> Verdict {
        let verdict = self.check(field);
        match &verdict {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(e) => {
                self.errors.insert(field, e.clone());
            }
        }
        verdict
    }

    /// Validates every active field, without stopping at the first failure,
    /// so that all invalid fields are marked at once.
    pub fn validate_form(&mut self) -> bool {
        let fields: Vec<FieldId> = self.bindings.iter().map(|b| b.field).collect();
        let mut is_valid = true;
        for field in fields {
            if self.validate_field(field).is_err() {
                is_valid = false;
            }
        }
        is_valid
    }

    pub fn errors(&self) -> &BTreeMap<FieldId, FieldError> {
        &self.errors
    }

    pub fn error(&self, field: FieldId) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// Clears every value, selection and error marker.
    pub fn reset(&mut self) {
        self.first_name.clear();
        self.last_name.clear();
        self.birth_date.clear();
        self.phone.clear();
        self.social.clear();
        self.social_type.selected = None;
        self.gender.selected = None;
        self.contact_method.selected = None;
        self.services.selected.clear();
        self.errors.clear();
    }

    /// Builds the payload from the current values.
    ///
    /// Meant to be called after [`FormState::validate_form`] succeeded; a
    /// field that does not hold a usable value yields
    /// [`IntakeError::Incomplete`].
    pub fn to_submission(&self) -> Result<FormSubmission> {
        if let Some(binding) = self.bindings.iter().find(|b| self.check(b.field).is_err()) {
            return Err(IntakeError::Incomplete(binding.field));
        }

        let birth_date = NaiveDate::parse_from_str(self.birth_date.trim(), PICKER_DATE_FORMAT)
            .map_err(|_| IntakeError::Incomplete(FieldId::BirthDate))?
            .format(SUBMISSION_DATE_FORMAT)
            .to_string();

        let phone = self.layout.phone.then(|| phone::apply_mask(&self.phone));

        let (social, social_display, social_type) = match self.layout.social {
            None => (None, None, None),
            Some(SocialMode::Link) => {
                let link = self.social.trim();
                let network = social::network_of_link(link)
                    .ok_or(IntakeError::Incomplete(FieldId::Social))?;
                (Some(link.to_string()), None, Some(network))
            }
            Some(SocialMode::Handle) => {
                let network = self
                    .chosen_network()
                    .ok_or(IntakeError::Incomplete(FieldId::SocialType))?;
                let handle = self.social.trim();
                (
                    Some(social::deep_link(network, handle)),
                    Some(handle.to_string()),
                    Some(network),
                )
            }
        };

        let contact_method = if self.layout.contact_method {
            let label = self
                .contact_method
                .selected_label()
                .ok_or(IntakeError::Incomplete(FieldId::ContactMethod))?;
            Some(label.to_string())
        } else {
            None
        };

        Ok(FormSubmission {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birth_date,
            phone,
            social,
            social_display,
            social_type,
            gender: self
                .gender
                .selected_label()
                .ok_or(IntakeError::Incomplete(FieldId::Gender))?
                .to_string(),
            contact_method,
            services: self.services.joined(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn config(layout: FormLayout) -> Config {
        Config {
            relay_url: Url::parse("http://127.0.0.1:3000/relay").unwrap(),
            layout,
            gender_options: vec!["Мужской".into(), "Женский".into()],
            service_options: vec!["Маникюр".into(), "Педикюр".into(), "Стрижка".into()],
            contact_method_options: vec!["Позвонить".into(), "Написать".into()],
        }
    }

    fn full_layout() -> FormLayout {
        FormLayout {
            phone: true,
            social: Some(SocialMode::Handle),
            contact_method: true,
        }
    }

    fn input(field: FieldId, value: &str) -> FieldEvent {
        FieldEvent::Input {
            field,
            value: value.to_string(),
        }
    }

    fn fill_minimal(form: &mut FormState) {
        let _ = form.handle(input(FieldId::FirstName, "  Иван "));
        let _ = form.handle(input(FieldId::LastName, "Петров"));
        let _ = form.handle(FieldEvent::DatePicked("1990-02-01".into()));
        let _ = form.handle(FieldEvent::Selected {
            field: FieldId::Gender,
            index: 0,
        });
        let _ = form.handle(FieldEvent::Toggled {
            index: 2,
            checked: true,
        });
        let _ = form.handle(FieldEvent::Toggled {
            index: 0,
            checked: true,
        });
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let mut form = FormState::new(&config(full_layout()));
        assert!(!form.validate_form());

        let invalid: Vec<FieldId> = form.errors().keys().copied().collect();
        let expected: Vec<FieldId> = form.bindings().iter().map(|b| b.field).collect();
        assert_eq!(invalid.len(), 9);
        let mut expected_sorted = expected;
        expected_sorted.sort();
        assert_eq!(invalid, expected_sorted);

        assert_eq!(
            form.error(FieldId::FirstName).unwrap().to_string(),
            "Имя обязательно для заполнения."
        );
        assert_eq!(
            form.error(FieldId::Services).unwrap().to_string(),
            "Выберите хотя бы одну услугу."
        );
        assert_eq!(
            form.error(FieldId::Gender).unwrap().to_string(),
            "Выберите ваш пол."
        );
    }

    #[test]
    fn test_reactive_validation_sets_and_clears_markers() {
        let mut form = FormState::new(&config(FormLayout::default()));

        assert!(form.handle(input(FieldId::FirstName, "   ")).is_err());
        assert!(form.error(FieldId::FirstName).is_some());

        assert!(form.handle(input(FieldId::FirstName, "Анна")).is_ok());
        assert!(form.error(FieldId::FirstName).is_none());

        let _ = form.handle(FieldEvent::Toggled {
            index: 1,
            checked: true,
        });
        assert!(
            form.handle(FieldEvent::Toggled {
                index: 1,
                checked: false
            })
            .is_err()
        );
        assert!(form.error(FieldId::Services).is_some());
    }

    #[test]
    fn test_phone_is_masked_while_typing() {
        let mut form = FormState::new(&config(full_layout()));

        assert!(form.handle(input(FieldId::Phone, "8999")).is_err());
        assert_eq!(form.value(FieldId::Phone), "+7 (999");
        assert_eq!(
            form.error(FieldId::Phone),
            Some(&FieldError::InvalidPhone)
        );

        assert!(form.handle(input(FieldId::Phone, "+7 (999) 123-45-678")).is_ok());
        assert_eq!(form.value(FieldId::Phone), "+7 (999) 123-45-67");
        assert!(form.error(FieldId::Phone).is_none());
    }

    #[test]
    fn test_inactive_fields_are_ignored() {
        let mut form = FormState::new(&config(FormLayout::default()));
        assert!(form.handle(input(FieldId::Phone, "123")).is_ok());
        assert_eq!(form.value(FieldId::Phone), "");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_unknown_option_keeps_group_empty() {
        let mut form = FormState::new(&config(FormLayout::default()));
        assert!(
            form.handle(FieldEvent::Selected {
                field: FieldId::Gender,
                index: 7
            })
            .is_err()
        );
        assert_eq!(form.value(FieldId::Gender), "");
    }

    #[test]
    fn test_minimal_submission() {
        let mut form = FormState::new(&config(FormLayout::default()));
        fill_minimal(&mut form);
        assert!(form.validate_form());

        let submission = form.to_submission().unwrap();
        assert_eq!(submission.first_name, "Иван");
        assert_eq!(submission.birth_date, "01.02.1990");
        assert_eq!(submission.gender, "Мужской");
        // Option order, not click order
        assert_eq!(submission.services, "Маникюр, Стрижка");
        assert_eq!(submission.phone, None);
        assert_eq!(submission.social, None);
        assert_eq!(submission.contact_method, None);
    }

    #[test]
    fn test_full_submission_with_handle() {
        let mut form = FormState::new(&config(full_layout()));
        fill_minimal(&mut form);
        let _ = form.handle(input(FieldId::Phone, "89991234567"));
        let _ = form.handle(input(FieldId::Social, "@ivan_p"));
        let index = form.option_index(FieldId::SocialType, "Telegram").unwrap();
        let _ = form.handle(FieldEvent::Selected {
            field: FieldId::SocialType,
            index,
        });
        let _ = form.handle(FieldEvent::Selected {
            field: FieldId::ContactMethod,
            index: 1,
        });
        assert!(form.validate_form(), "{:?}", form.errors());

        let submission = form.to_submission().unwrap();
        assert_eq!(submission.phone.as_deref(), Some("+7 (999) 123-45-67"));
        assert_eq!(submission.social.as_deref(), Some("https://t.me/ivan_p"));
        assert_eq!(submission.social_display.as_deref(), Some("@ivan_p"));
        assert_eq!(submission.social_type, Some(SocialNetwork::Telegram));
        assert_eq!(submission.contact_method.as_deref(), Some("Написать"));
    }

    fn select_network(form: &mut FormState, label: &str) -> Verdict {
        let index = form.option_index(FieldId::SocialType, label).unwrap();
        form.handle(FieldEvent::Selected {
            field: FieldId::SocialType,
            index,
        })
    }

    #[test]
    fn test_whatsapp_needs_a_number() {
        let mut form = FormState::new(&config(full_layout()));
        fill_minimal(&mut form);
        let _ = form.handle(input(FieldId::Phone, "89991234567"));
        let _ = form.handle(FieldEvent::Selected {
            field: FieldId::ContactMethod,
            index: 0,
        });

        assert!(form.handle(input(FieldId::Social, "@john_doe")).is_ok());
        assert!(select_network(&mut form, "WhatsApp").is_ok());
        // Choosing the network re-checks the handle already typed
        assert_eq!(
            form.error(FieldId::Social),
            Some(&FieldError::InvalidSocialHandle)
        );
        assert!(!form.validate_form());
        assert!(matches!(
            form.to_submission(),
            Err(IntakeError::Incomplete(FieldId::Social))
        ));

        // Switching back to Telegram clears the marker
        assert!(select_network(&mut form, "Telegram").is_ok());
        assert!(form.error(FieldId::Social).is_none());

        assert!(select_network(&mut form, "WhatsApp").is_ok());
        assert!(form.handle(input(FieldId::Social, "+7 (999) 123-45-67")).is_ok());
        assert!(form.validate_form(), "{:?}", form.errors());
        let submission = form.to_submission().unwrap();
        assert_eq!(submission.social.as_deref(), Some("https://wa.me/79991234567"));
        assert_eq!(submission.social_type, Some(SocialNetwork::Whatsapp));
    }

    #[test]
    fn test_link_mode_infers_network() {
        let layout = FormLayout {
            social: Some(SocialMode::Link),
            ..FormLayout::default()
        };
        let mut form = FormState::new(&config(layout));
        fill_minimal(&mut form);

        assert_eq!(
            form.handle(input(FieldId::Social, "https://example.com/username1")),
            Err(FieldError::InvalidSocialLink)
        );
        assert!(form.handle(input(FieldId::Social, "https://wa.me/79991234567")).is_ok());
        assert!(form.validate_form());

        let submission = form.to_submission().unwrap();
        assert_eq!(submission.social.as_deref(), Some("https://wa.me/79991234567"));
        assert_eq!(submission.social_type, Some(SocialNetwork::Whatsapp));
    }

    #[test]
    fn test_to_submission_refuses_invalid_form() {
        let mut form = FormState::new(&config(FormLayout::default()));
        fill_minimal(&mut form);
        let _ = form.handle(FieldEvent::DatePicked("not-a-date".into()));
        assert!(matches!(
            form.to_submission(),
            Err(IntakeError::Incomplete(FieldId::BirthDate))
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = FormState::new(&config(full_layout()));
        fill_minimal(&mut form);
        let _ = form.handle(input(FieldId::Phone, "123"));
        assert!(!form.validate_form());
        assert!(!form.errors().is_empty());

        form.reset();
        assert!(form.errors().is_empty());
        assert_eq!(form.value(FieldId::FirstName), "");
        assert_eq!(form.value(FieldId::Phone), "");
        assert_eq!(form.value(FieldId::Gender), "");
        assert!(!form.validate_form());
        assert_eq!(form.errors().len(), form.bindings().len());
    }
}
