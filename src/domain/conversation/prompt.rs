//! System prompt construction for the counterparty model.
//!
//! Deterministic and total: the same context always yields the same prompt,
//! and no context can make it fail. Clause order is fixed (industry, then
//! scenario, then intent) so regenerated prompts are reproducible across
//! sessions.

use super::ScenarioContext;

/// Base instruction given to every counterparty model.
const BASE_PROMPT: &str = "You are an AI assistant helping with negotiation training. \
You should respond as a helpful business representative who is open to negotiation \
but also needs to maintain business interests.";

/// Builds the system instruction for a training session.
///
/// Absent context fields are omitted entirely; they never render as empty
/// clauses.
pub fn build_system_prompt(context: &ScenarioContext) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    if let Some(business_type) = &context.business_type {
        prompt.push_str(&format!(
            "\n\nYou work in the {} industry.",
            business_type
        ));
    }

    if let Some(scenario) = &context.scenario {
        prompt.push_str(&format!("\n\nScenario context: {}", scenario));
    }

    if let Some(intent) = &context.customer_intent {
        prompt.push_str(&format!("\n\nThe customer's likely intent is: {}", intent));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_context_yields_base_prompt_only() {
        let prompt = build_system_prompt(&ScenarioContext::new());
        assert_eq!(prompt, BASE_PROMPT);
    }

    #[test]
    fn business_type_appends_industry_clause() {
        let ctx = ScenarioContext::new().with_business_type("retail");
        let prompt = build_system_prompt(&ctx);
        assert!(prompt.contains("You work in the retail industry."));
    }

    #[test]
    fn scenario_appends_scenario_clause() {
        let ctx = ScenarioContext::new().with_scenario("clearance sale");
        let prompt = build_system_prompt(&ctx);
        assert!(prompt.contains("Scenario context: clearance sale"));
    }

    #[test]
    fn intent_appends_intent_clause() {
        let ctx = ScenarioContext::new().with_customer_intent("discount_request");
        let prompt = build_system_prompt(&ctx);
        assert!(prompt.contains("The customer's likely intent is: discount_request"));
    }

    #[test]
    fn absent_fields_render_nothing() {
        let ctx = ScenarioContext::new().with_business_type("saas");
        let prompt = build_system_prompt(&ctx);
        assert!(!prompt.contains("Scenario context:"));
        assert!(!prompt.contains("likely intent"));
    }

    #[test]
    fn full_context_orders_industry_scenario_intent() {
        let ctx = ScenarioContext::new()
            .with_business_type("retail")
            .with_customer_intent("refund")
            .with_scenario("damaged goods");
        let prompt = build_system_prompt(&ctx);

        let industry = prompt.find("You work in the").unwrap();
        let scenario = prompt.find("Scenario context:").unwrap();
        let intent = prompt.find("The customer's likely intent is:").unwrap();
        assert!(industry < scenario);
        assert!(scenario < intent);
    }

    #[test]
    fn deterministic_for_same_context() {
        let ctx = ScenarioContext::new()
            .with_business_type("automotive")
            .with_scenario("trade-in haggling");
        assert_eq!(build_system_prompt(&ctx), build_system_prompt(&ctx));
    }

    proptest! {
        /// Clause ordering is stable no matter which fields are populated.
        #[test]
        fn clause_order_is_stable(
            business in proptest::option::of("[a-z]{1,12}"),
            intent in proptest::option::of("[a-z_]{1,12}"),
            scenario in proptest::option::of("[a-z ]{1,24}"),
        ) {
            let ctx = ScenarioContext {
                business_type: business,
                customer_intent: intent,
                scenario,
            };
            let prompt = build_system_prompt(&ctx);

            prop_assert!(prompt.starts_with(BASE_PROMPT));

            let industry = prompt.find("\n\nYou work in the");
            let scenario = prompt.find("\n\nScenario context:");
            let intent = prompt.find("\n\nThe customer's likely intent is:");

            if let (Some(i), Some(s)) = (industry, scenario) {
                prop_assert!(i < s);
            }
            if let (Some(s), Some(n)) = (scenario, intent) {
                prop_assert!(s < n);
            }
            if let (Some(i), Some(n)) = (industry, intent) {
                prop_assert!(i < n);
            }
        }
    }
}
