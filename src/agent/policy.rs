//! Workflow policy preamble sent as the system prompt

/// Fixed workflow ordering and tool-only rules
pub const WORKFLOW_POLICY: &str = "\
You are a healthcare workflow orchestration agent.

WORKFLOW POLICY:
- If a patient name is mentioned, call `search_patient` first
- After patient identification, check insurance eligibility
- Before booking, find available slots
- Use tools for ALL actions

STRICT RULES:
- NO medical advice
- NO diagnosis
- NO free-text answers
- ONLY tool calls
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_orders_workflow() {
        let search = WORKFLOW_POLICY.find("search_patient").unwrap();
        let eligibility = WORKFLOW_POLICY.find("insurance eligibility").unwrap();
        let slots = WORKFLOW_POLICY.find("available slots").unwrap();
        assert!(search < eligibility && eligibility < slots);
    }
}
