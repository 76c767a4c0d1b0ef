//! Action availability derived from stored results

use serde::Serialize;

use crate::store::ResultStore;

pub const RUN_PRECONDITION: &str =
    "No combined test cases available. Generate combined test cases first.";
pub const REPORT_PRECONDITION: &str =
    "No execution results available. Run the test cases first.";

/// Enablement of the Execute and Report actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Gates {
    pub can_run: bool,
    pub can_report: bool,
}

impl Gates {
    pub fn evaluate(store: &ResultStore) -> Self {
        Self {
            can_run: store.combined().is_some_and(|c| !c.test_cases.is_empty()),
            can_report: store.execution().is_some_and(|e| !e.results.is_empty()),
        }
    }

    pub fn run_hint(&self, store: &ResultStore) -> String {
        match store.combined() {
            Some(c) if self.can_run => {
                format!("{} combined test case(s) ready to execute.", c.test_cases.len())
            }
            _ => RUN_PRECONDITION.to_string(),
        }
    }

    pub fn report_hint(&self, store: &ResultStore) -> String {
        match store.execution() {
            Some(e) if self.can_report => {
                format!("{} execution result(s) ready for reporting.", e.results.len())
            }
            _ => REPORT_PRECONDITION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::*;
    use crate::types::{CombinedResult, ExecStatus, ExecutionResult};

    #[test]
    fn test_gates_closed_on_empty_store() {
        let store = ResultStore::new();
        let gates = Gates::evaluate(&store);
        assert!(!gates.can_run);
        assert!(!gates.can_report);
        assert_eq!(gates.run_hint(&store), RUN_PRECONDITION);
    }

    #[test]
    fn test_gates_closed_on_empty_collections() {
        let mut store = ResultStore::new();
        store.set_combined(CombinedResult::new(Vec::new()));
        store.set_execution(ExecutionResult::new(Vec::new()));
        assert_eq!(Gates::evaluate(&store), Gates::default());
    }

    #[test]
    fn test_gates_open_with_data() {
        let mut store = ResultStore::new();
        store.set_combined(CombinedResult::new(vec![combined_case("TC-001", "Positive", true)]));
        let gates = Gates::evaluate(&store);
        assert!(gates.can_run);
        assert!(!gates.can_report);
        assert!(gates.run_hint(&store).starts_with("1 combined"));

        store.set_execution(ExecutionResult::new(vec![exec_record("TC-001", ExecStatus::Pass)]));
        assert!(Gates::evaluate(&store).can_report);

        store.reset();
        assert_eq!(Gates::evaluate(&store), Gates::default());
    }
}
