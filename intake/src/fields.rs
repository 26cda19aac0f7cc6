//! Field table: which fields a layout shows, what kind of input each one
//! is, and which event re-validates it.

use crate::config::FormLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    FirstName,
    LastName,
    BirthDate,
    Phone,
    Social,
    SocialType,
    Gender,
    ContactMethod,
    Services,
}

impl FieldId {
    /// Label shown next to the field; also names it in required-field errors.
    pub const fn label(&self) -> &'static str {
        match self {
            FieldId::FirstName => "Имя",
            FieldId::LastName => "Фамилия",
            FieldId::BirthDate => "Дата рождения",
            FieldId::Phone => "Телефон",
            FieldId::Social => "Соцсеть",
            FieldId::SocialType => "Тип соцсети",
            FieldId::Gender => "Пол",
            FieldId::ContactMethod => "Способ связи",
            FieldId::Services => "Услуги",
        }
    }

    /// Prompt shown when a choice group has no selection.
    pub const fn selection_prompt(&self) -> &'static str {
        match self {
            FieldId::Gender => "Выберите ваш пол.",
            FieldId::ContactMethod => "Выберите способ связи.",
            FieldId::SocialType => "Выберите соцсеть.",
            FieldId::Services => "Выберите хотя бы одну услугу.",
            _ => "Выберите вариант.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    /// Text reformatted on every keystroke.
    MaskedText,
    SingleChoice,
    MultiChoice,
}

/// Event that re-runs a field's validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Input,
    Change,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: FieldId,
    pub kind: FieldKind,
    pub trigger: Trigger,
}

impl FieldBinding {
    const fn new(field: FieldId, kind: FieldKind) -> Self {
        let trigger = match kind {
            FieldKind::Text | FieldKind::MaskedText => Trigger::Input,
            FieldKind::Date | FieldKind::SingleChoice | FieldKind::MultiChoice => Trigger::Change,
        };
        Self {
            field,
            kind,
            trigger,
        }
    }
}

/// Active bindings for `layout`, in display order.
pub fn bindings_for(layout: &FormLayout) -> Vec<FieldBinding> {
    let mut bindings = vec![
        FieldBinding::new(FieldId::FirstName, FieldKind::Text),
        FieldBinding::new(FieldId::LastName, FieldKind::Text),
        FieldBinding::new(FieldId::BirthDate, FieldKind::Date),
    ];

    if layout.phone {
        bindings.push(FieldBinding::new(FieldId::Phone, FieldKind::MaskedText));
    }
    if let Some(mode) = layout.social {
        bindings.push(FieldBinding::new(FieldId::Social, FieldKind::Text));
        if mode == crate::social::SocialMode::Handle {
            bindings.push(FieldBinding::new(FieldId::SocialType, FieldKind::SingleChoice));
        }
    }
    bindings.push(FieldBinding::new(FieldId::Gender, FieldKind::SingleChoice));
    if layout.contact_method {
        bindings.push(FieldBinding::new(FieldId::ContactMethod, FieldKind::SingleChoice));
    }
    bindings.push(FieldBinding::new(FieldId::Services, FieldKind::MultiChoice));

    bindings
}
