use crate::config::Config;
use crate::errors::{IntakeError, Result};
use crate::form::FormState;
use shared::protocol::{FormSubmission, RelayFailure, RelaySuccess};
use tokio::sync::watch;
use url::Url;

pub const SUBMIT_LABEL: &str = "Отправить";
pub const SUBMITTING_LABEL: &str = "Отправка...";
pub const FAILURE_NOTICE: &str =
    "Произошла ошибка при отправке заказа. Пожалуйста, попробуйте еще раз.";

/// State of the submit button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub label: &'static str,
}

impl SubmitControl {
    pub const IDLE: Self = Self {
        disabled: false,
        label: SUBMIT_LABEL,
    };
    pub const BUSY: Self = Self {
        disabled: true,
        label: SUBMITTING_LABEL,
    };
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// At least one field is invalid; nothing was sent.
    Invalid,
    /// The relay accepted the submission. The body is absent if it could not
    /// be decoded.
    Delivered(Option<RelaySuccess>),
    /// The request failed or the relay answered with an error.
    Failed(IntakeError),
}

/// Ways the confirmation overlay can be dismissed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dismissal {
    CloseButton,
    Backdrop,
    Escape,
}

/// Drives one form instance: validation, submission and the UI state
/// around it.
///
/// `attempt_submit` borrows the submitter mutably for the whole request, so
/// one form can never have two submissions in flight. The submit control is
/// published on a watch channel so a UI sees it change while the request
/// runs.
pub struct Submitter {
    client: reqwest::Client,
    relay_url: Url,
    form: FormState,
    control: watch::Sender<SubmitControl>,
    overlay_visible: bool,
    notice: Option<&'static str>,
}

impl Submitter {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            relay_url: config.relay_url.clone(),
            form: FormState::new(config),
            control: watch::Sender::new(SubmitControl::IDLE),
            overlay_visible: false,
            notice: None,
        })
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn control(&self) -> SubmitControl {
        *self.control.borrow()
    }

    /// Receiver that observes every change of the submit control.
    pub fn watch_control(&self) -> watch::Receiver<SubmitControl> {
        self.control.subscribe()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// User-facing failure notice from the last attempt, if it failed.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Validates the whole form and, if it passes, posts it to the relay.
    ///
    /// The submit control is disabled for the duration of the request and
    /// restored afterwards whatever the result.
    pub async fn attempt_submit(&mut self) -> SubmitOutcome {
        self.notice = None;
        if !self.form.validate_form() {
            tracing::debug!(invalid = self.form.errors().len(), "Form is invalid");
            return SubmitOutcome::Invalid;
        }

        self.control.send_replace(SubmitControl::BUSY);
        let result = match self.form.to_submission() {
            Ok(submission) => self.post(&submission).await,
            Err(e) => Err(e),
        };
        self.control.send_replace(SubmitControl::IDLE);

        match result {
            Ok(reply) => {
                tracing::info!("Submission delivered");
                self.overlay_visible = true;
                SubmitOutcome::Delivered(reply)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to submit form");
                self.notice = Some(FAILURE_NOTICE);
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn post(&self, submission: &FormSubmission) -> Result<Option<RelaySuccess>> {
        let response = self
            .client
            .post(self.relay_url.clone())
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = match response.json::<RelayFailure>().await {
                Ok(failure) => failure.error,
                Err(_) => "Ошибка при отправке данных".to_string(),
            };
            return Err(IntakeError::Rejected { status, error });
        }

        Ok(response.json::<RelaySuccess>().await.ok())
    }

    /// Hides the overlay and resets the form.
    ///
    /// `Escape` only acts while the overlay is shown. Returns whether
    /// anything was dismissed.
    pub fn dismiss_overlay(&mut self, how: Dismissal) -> bool {
        if how == Dismissal::Escape && !self.overlay_visible {
            return false;
        }
        self.overlay_visible = false;
        self.notice = None;
        self.form.reset();
        true
    }
}
