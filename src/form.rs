//! Live expiry calculation for the item form.
//!
//! An [`ExpiryForm`] mirrors the three inputs of the item form. Whenever the
//! product type or the opened-on date changes, the expires-on field is
//! recomputed from the product type's rule and overwritten. Listeners see a
//! change and an input event for every field that is written, the edited
//! input first and then the overwritten expiry.

use crate::expiry::{compute_expiry, parse_ymd, to_ymd};
use crate::rules::RuleBook;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Initial field values as found on the page. `None` means the field is not
/// present at all, which disables the calculator.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub product_type: Option<String>,
    pub opened_on: Option<String>,
    pub expires_on: Option<String>,
}

impl FormFields {
    /// Fields for a blank "new item" form.
    pub fn blank() -> Self {
        Self {
            product_type: Some(String::new()),
            opened_on: Some(String::new()),
            expires_on: Some(String::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub product_type: String,
    pub opened_on: String,
    pub expires_on: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ProductType,
    OpenedOn,
    ExpiresOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    Input,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEvent<'a> {
    pub field: Field,
    pub kind: Notify,
    pub value: &'a str,
}

pub type Listener = Box<dyn FnMut(&FieldEvent<'_>, &FormState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expiry must be on or after the opened date")]
pub struct DateOrderError;

/// Cross-field check run against the form: both dates present and valid,
/// and the expiry earlier than the opened date, is the only failure.
pub fn check_date_order(state: &FormState) -> Result<(), DateOrderError> {
    match (parse_ymd(&state.opened_on), parse_ymd(&state.expires_on)) {
        (Some(opened), Some(expires)) if opened > expires => Err(DateOrderError),
        _ => Ok(()),
    }
}

pub struct ExpiryForm {
    rules: Arc<RuleBook>,
    state: FormState,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for ExpiryForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryForm")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ExpiryForm {
    /// Binds the calculator to a form. Returns `None` (after logging) when
    /// one of the three fields is missing. Runs one recompute so that an
    /// edit page shows a consistent expiry straight away.
    pub fn attach(rules: Arc<RuleBook>, fields: FormFields) -> Option<Self> {
        let (Some(product_type), Some(opened_on), Some(expires_on)) =
            (fields.product_type, fields.opened_on, fields.expires_on)
        else {
            warn!("expiry inputs not found, auto calculation disabled");
            return None;
        };

        let mut form = Self {
            rules,
            state: FormState {
                product_type,
                opened_on,
                expires_on,
            },
            listeners: Vec::new(),
        };
        form.recompute();
        Some(form)
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FieldEvent<'_>, &FormState) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn into_state(self) -> FormState {
        self.state
    }

    pub fn select_product_type(&mut self, product_type: impl Into<String>) -> Option<NaiveDate> {
        self.state.product_type = product_type.into();
        self.notify(Field::ProductType);
        self.recompute()
    }

    pub fn set_opened_on(&mut self, opened_on: impl Into<String>) -> Option<NaiveDate> {
        self.state.opened_on = opened_on.into();
        self.notify(Field::OpenedOn);
        self.recompute()
    }

    /// A manual edit of the expiry. Kept only until the next recompute.
    pub fn edit_expires_on(&mut self, expires_on: impl Into<String>) {
        self.state.expires_on = expires_on.into();
        self.notify(Field::ExpiresOn);
    }

    /// Recomputes and overwrites expires-on. Leaves it untouched when there
    /// is no rule for the product type or the opened date does not parse.
    pub fn recompute(&mut self) -> Option<NaiveDate> {
        let rule = self.rules.get(&self.state.product_type)?;
        let opened = parse_ymd(&self.state.opened_on)?;
        let expires = compute_expiry(opened, rule)?;

        self.state.expires_on = to_ymd(expires);
        debug!(
            product_type = %self.state.product_type,
            opened_on = %self.state.opened_on,
            expires_on = %self.state.expires_on,
            "expiry recomputed"
        );
        self.notify(Field::ExpiresOn);
        Some(expires)
    }

    pub fn check_date_order(&self) -> Result<(), DateOrderError> {
        check_date_order(&self.state)
    }

    fn notify(&mut self, field: Field) {
        let value = match field {
            Field::ProductType => self.state.product_type.clone(),
            Field::OpenedOn => self.state.opened_on.clone(),
            Field::ExpiresOn => self.state.expires_on.clone(),
        };
        for kind in [Notify::Change, Notify::Input] {
            let event = FieldEvent {
                field,
                kind,
                value: &value,
            };
            for listener in &mut self.listeners {
                listener(&event, &self.state);
            }
        }
    }
}
