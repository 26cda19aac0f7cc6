use crate::social::SocialMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No options configured for {0}")]
    NoOptions(&'static str),

    #[error("Duplicate option {1:?} in {0}")]
    DuplicateOption(&'static str, String),
}

/// Which optional fields the form collects.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FormLayout {
    #[serde(default)]
    pub phone: bool,
    /// Absent when the form has no social field.
    #[serde(default)]
    pub social: Option<SocialMode>,
    #[serde(default)]
    pub contact_method: bool,
}

/// Intake form configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Relay endpoint submissions are posted to
    pub relay_url: Url,
    #[serde(default)]
    pub layout: FormLayout,
    pub gender_options: Vec<String>,
    pub service_options: Vec<String>,
    #[serde(default)]
    pub contact_method_options: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_options("gender_options", &self.gender_options)?;
        check_options("service_options", &self.service_options)?;
        if self.layout.contact_method {
            check_options("contact_method_options", &self.contact_method_options)?;
        }
        Ok(())
    }
}

fn check_options(name: &'static str, options: &[String]) -> Result<(), ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::NoOptions(name));
    }
    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(ValidationError::DuplicateOption(name, option.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
relay_url: "http://127.0.0.1:3000/relay"
layout:
    phone: true
    social: handle
    contact_method: true
gender_options: [Мужской, Женский]
service_options: [Маникюр, Педикюр, Стрижка]
contact_method_options: [Позвонить, Написать]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.relay_url.path(), "/relay");
        assert_eq!(config.layout.social, Some(SocialMode::Handle));
        assert_eq!(config.service_options.len(), 3);
    }

    #[test]
    fn test_layout_defaults_to_minimal() {
        let yaml = r#"
relay_url: "http://127.0.0.1:3000/relay"
gender_options: [Мужской, Женский]
service_options: [Маникюр]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.layout, FormLayout::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base = Config {
            relay_url: Url::parse("http://127.0.0.1:3000/relay").unwrap(),
            layout: FormLayout::default(),
            gender_options: vec!["М".into(), "Ж".into()],
            service_options: vec!["A".into()],
            contact_method_options: vec![],
        };
        assert!(base.validate().is_ok());

        let mut config = base.clone();
        config.service_options.clear();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::NoOptions("service_options")
        ));

        let mut config = base.clone();
        config.layout.contact_method = true;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::NoOptions("contact_method_options")
        ));

        let mut config = base;
        config.gender_options.push("М".into());
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::DuplicateOption("gender_options", _)
        ));
    }

    #[test]
    fn test_unknown_social_mode() {
        assert!(serde_yaml::from_str::<FormLayout>("social: email").is_err());
    }
}
