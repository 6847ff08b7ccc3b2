//! Scenario context supplied once per training session.

use serde::{Deserialize, Serialize};

/// Read-only description of the training scenario.
///
/// All fields are optional; the prompt builder omits clauses for absent
/// fields instead of rendering them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioContext {
    /// Industry the simulated business operates in (e.g. "retail").
    pub business_type: Option<String>,

    /// What the customer is believed to want (e.g. "discount_request").
    pub customer_intent: Option<String>,

    /// Free-text scenario description shown to the counterparty model.
    pub scenario: Option<String>,
}

impl ScenarioContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the business type.
    pub fn with_business_type(mut self, business_type: impl Into<String>) -> Self {
        self.business_type = Some(business_type.into());
        self
    }

    /// Sets the customer intent.
    pub fn with_customer_intent(mut self, intent: impl Into<String>) -> Self {
        self.customer_intent = Some(intent.into());
        self
    }

    /// Sets the free-text scenario.
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.business_type.is_none() && self.customer_intent.is_none() && self.scenario.is_none()
    }
}
