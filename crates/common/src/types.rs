//! Core types for qaflow
//!
//! Field names and nesting follow the backend's JSON so a stored result can be
//! exported back out without loss.

use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Categories
// ============================================================================

/// Intent classification of a test case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Positive,
    Negative,
    Boundary,
    EdgeCase,
    /// Anything the backend sends that is not one of the four known categories
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [
        Category::Positive,
        Category::Negative,
        Category::Boundary,
        Category::EdgeCase,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Positive => "Positive",
            Category::Negative => "Negative",
            Category::Boundary => "Boundary",
            Category::EdgeCase => "Edge Case",
            Category::Other(s) => s,
        }
    }

    pub fn style(&self) -> CategoryStyle {
        match self {
            Category::Positive => CategoryStyle::Positive,
            Category::Negative => CategoryStyle::Negative,
            Category::Boundary => CategoryStyle::Boundary,
            Category::EdgeCase => CategoryStyle::EdgeCase,
            Category::Other(_) => CategoryStyle::Default,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Positive" => Category::Positive,
            "Negative" => Category::Negative,
            "Boundary" => Category::Boundary,
            "Edge Case" => Category::EdgeCase,
            _ => Category::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual border/badge key for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStyle {
    Positive,
    Negative,
    Boundary,
    EdgeCase,
    /// Unstyled fallback for unrecognized categories
    Default,
}

impl CategoryStyle {
    pub fn border_key(self) -> &'static str {
        match self {
            CategoryStyle::Positive => "border-positive",
            CategoryStyle::Negative => "border-negative",
            CategoryStyle::Boundary => "border-boundary",
            CategoryStyle::EdgeCase => "border-edge",
            CategoryStyle::Default => "border-default",
        }
    }

    pub fn badge_key(self) -> &'static str {
        match self {
            CategoryStyle::Positive => "badge-positive",
            CategoryStyle::Negative => "badge-negative",
            CategoryStyle::Boundary => "badge-boundary",
            CategoryStyle::EdgeCase => "badge-edge",
            CategoryStyle::Default => "badge-default",
        }
    }
}

/// Badge key for a priority value ("High" -> "badge-high")
pub fn priority_badge(priority: &str) -> String {
    let key = priority.trim().to_lowercase().replace(' ', "-");
    if key.is_empty() {
        "badge-default".to_string()
    } else {
        format!("badge-{}", key)
    }
}

/// Per-category counts, in the fixed category order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    #[serde(rename = "Positive", default)]
    pub positive: usize,
    #[serde(rename = "Negative", default)]
    pub negative: usize,
    #[serde(rename = "Boundary", default)]
    pub boundary: usize,
    #[serde(rename = "Edge Case", default)]
    pub edge_case: usize,
}

impl TypeCounts {
    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        let mut counts = Self::default();
        for category in categories {
            counts.increment(category);
        }
        counts
    }

    /// Unknown categories are not counted
    pub fn increment(&mut self, category: &Category) {
        match category {
            Category::Positive => self.positive += 1,
            Category::Negative => self.negative += 1,
            Category::Boundary => self.boundary += 1,
            Category::EdgeCase => self.edge_case += 1,
            Category::Other(_) => {}
        }
    }

    pub fn get(&self, category: &Category) -> usize {
        match category {
            Category::Positive => self.positive,
            Category::Negative => self.negative,
            Category::Boundary => self.boundary,
            Category::EdgeCase => self.edge_case,
            Category::Other(_) => 0,
        }
    }

    pub fn sum(&self) -> usize {
        self.positive + self.negative + self.boundary + self.edge_case
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::KNOWN.into_iter().map(move |c| {
            let n = self.get(&c);
            (c, n)
        })
    }
}

/// Stats panel contents for a test-case collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub by_type: TypeCounts,
}

// ============================================================================
// Analyze stage
// ============================================================================

/// A generated test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub priority: String,
}

/// Semantic breakdown of a user story
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub user_role: String,
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_test_cases: Option<usize>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Result of the Analyze stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: StoryAnalysis,
    pub test_suite: TestSuite,
}

impl AnalysisResult {
    pub fn feature(&self) -> &str {
        &self.analysis.feature
    }

    pub fn user_role(&self) -> &str {
        &self.analysis.user_role
    }

    pub fn conditions(&self) -> &[String] {
        &self.analysis.conditions
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_suite.test_cases
    }

    pub fn stats(&self) -> CategoryStats {
        CategoryStats {
            total: self.test_cases().len(),
            by_type: TypeCounts::from_categories(self.test_cases().iter().map(|tc| &tc.category)),
        }
    }
}

// ============================================================================
// Explore stage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRecord {
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub button_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub buttons: Vec<ButtonRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub text: String,
    pub href: String,
}

/// One crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Set when the page could not be fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub forms: Vec<FormRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// Result of the Explore stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
}

impl ExplorerResult {
    pub fn form_count(&self) -> usize {
        self.pages.iter().map(|p| p.forms.len()).sum()
    }

    pub fn link_count(&self) -> usize {
        self.pages.iter().map(|p| p.links.len()).sum()
    }
}

// ============================================================================
// Combine stage
// ============================================================================

fn default_mapped() -> bool {
    true
}

/// A test case mapped onto concrete pages and forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTestCase {
    pub tc_id: String,
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub user_role: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub form_name: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub manual_steps: Vec<String>,
    #[serde(default)]
    pub automation_steps: Vec<String>,
    #[serde(default = "default_mapped")]
    pub mapped: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedSummary {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    pub by_type: TypeCounts,
}

impl CombinedSummary {
    pub fn from_cases(cases: &[CombinedTestCase]) -> Self {
        let mapped = cases.iter().filter(|tc| tc.mapped).count();
        Self {
            total: cases.len(),
            mapped,
            unmapped: cases.len() - mapped,
            by_type: TypeCounts::from_categories(cases.iter().map(|tc| &tc.category)),
        }
    }
}

/// Result of the Combine stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_data: Option<StoryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_data: Option<ExplorerResult>,
    #[serde(default)]
    pub test_cases: Vec<CombinedTestCase>,
    pub summary: CombinedSummary,
}

impl CombinedResult {
    pub fn new(test_cases: Vec<CombinedTestCase>) -> Self {
        let summary = CombinedSummary::from_cases(&test_cases);
        Self {
            story_data: None,
            page_data: None,
            test_cases,
            summary,
        }
    }

    /// Replace a summary that disagrees with the case list.
    /// Returns true when a correction was made.
    pub fn normalize(&mut self) -> bool {
        let computed = CombinedSummary::from_cases(&self.test_cases);
        if computed == self.summary {
            return false;
        }
        warn!(
            reported_total = self.summary.total,
            actual_total = computed.total,
            "combined summary disagrees with its test cases; recomputing"
        );
        self.summary = computed;
        true
    }
}

// ============================================================================
// Execute stage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecStatus {
    Pass,
    Fail,
    Error,
}

impl std::fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecStatus::Pass => write!(f, "Pass"),
            ExecStatus::Fail => write!(f, "Fail"),
            ExecStatus::Error => write!(f, "Error"),
        }
    }
}

/// Outcome of running one combined test case in the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecRecord {
    pub tc_id: String,
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub user_role: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub page_url: String,
    pub status: ExecStatus,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub screenshot_path: Option<String>,
    #[serde(default)]
    pub log: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl ExecutionSummary {
    pub fn from_records(records: &[ExecRecord]) -> Self {
        let count = |status| records.iter().filter(|r| r.status == status).count();
        Self {
            total: records.len(),
            passed: count(ExecStatus::Pass),
            failed: count(ExecStatus::Fail),
            errored: count(ExecStatus::Error),
        }
    }

    /// Pass percentage, 0 when nothing ran
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Result of the Execute stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub results: Vec<ExecRecord>,
    pub summary: ExecutionSummary,
}

impl ExecutionResult {
    pub fn new(results: Vec<ExecRecord>) -> Self {
        let summary = ExecutionSummary::from_records(&results);
        Self { results, summary }
    }

    /// Replace a summary that disagrees with the records.
    /// Returns true when a correction was made.
    pub fn normalize(&mut self) -> bool {
        let computed = ExecutionSummary::from_records(&self.results);
        if computed == self.summary {
            return false;
        }
        warn!(
            reported_total = self.summary.total,
            actual_total = computed.total,
            "execution summary disagrees with its records; recomputing"
        );
        self.summary = computed;
        true
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn test_case(id: &str, category: &str) -> TestCase {
        TestCase {
            id: id.to_string(),
            title: format!("Login: {}", id),
            category: Category::from(category),
            preconditions: vec!["User is registered".to_string()],
            steps: vec!["Open login page".to_string(), "Submit".to_string()],
            expected_result: "Dashboard is shown".to_string(),
            priority: "High".to_string(),
        }
    }

    pub fn combined_case(id: &str, category: &str, mapped: bool) -> CombinedTestCase {
        CombinedTestCase {
            tc_id: id.to_string(),
            feature: "Login".to_string(),
            user_role: "user".to_string(),
            condition: format!("condition for {}", id),
            page_url: "https://example.com/login".to_string(),
            page_title: "Login".to_string(),
            form_name: if mapped { "login-form".to_string() } else { "—".to_string() },
            category: Category::from(category),
            priority: "Medium".to_string(),
            manual_steps: vec!["Open the browser".to_string()],
            automation_steps: vec!["driver.get(url)".to_string()],
            mapped,
        }
    }

    pub fn exec_record(id: &str, status: ExecStatus) -> ExecRecord {
        ExecRecord {
            tc_id: id.to_string(),
            feature: "Login".to_string(),
            user_role: "user".to_string(),
            condition: format!("condition for {}", id),
            page_url: "https://example.com/login".to_string(),
            status,
            duration_seconds: 1.25,
            error_message: (status != ExecStatus::Pass).then(|| "element not found".to_string()),
            screenshot_path: None,
            log: "navigated\nclicked".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_round_trips_display_strings() {
        let value: Category = serde_json::from_value(json!("Edge Case")).unwrap();
        assert_eq!(value, Category::EdgeCase);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!("Edge Case"));

        let other: Category = serde_json::from_value(json!("Security")).unwrap();
        assert_eq!(other, Category::Other("Security".to_string()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("Security"));
    }

    #[test]
    fn test_unknown_category_degrades_to_default_style() {
        assert_eq!(Category::from("Smoke").style(), CategoryStyle::Default);
        assert_eq!(Category::from("Smoke").style().border_key(), "border-default");
        assert_eq!(Category::EdgeCase.style().badge_key(), "badge-edge");
    }

    #[test]
    fn test_priority_badge() {
        assert_eq!(priority_badge("High"), "badge-high");
        assert_eq!(priority_badge(" Medium "), "badge-medium");
        assert_eq!(priority_badge(""), "badge-default");
    }

    #[test]
    fn test_combined_summary_invariants() {
        let cases = vec![
            combined_case("TC-001", "Positive", true),
            combined_case("TC-002", "Positive", true),
            combined_case("TC-003", "Negative", false),
            combined_case("TC-004", "Edge Case", false),
        ];
        let summary = CombinedSummary::from_cases(&cases);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.mapped + summary.unmapped, summary.total);
        assert_eq!(summary.by_type.sum(), summary.total);
        assert_eq!(summary.by_type.get(&Category::Positive), 2);
        assert_eq!(summary.unmapped, 2);
    }

    #[test]
    fn test_normalize_repairs_inconsistent_summary() {
        let mut result = CombinedResult::new(vec![combined_case("TC-001", "Boundary", true)]);
        assert!(!result.normalize());

        result.summary.total = 9;
        assert!(result.normalize());
        assert_eq!(result.summary.total, 1);
        assert_eq!(result.summary.by_type.boundary, 1);
    }

    #[test]
    fn test_execution_summary_invariants() {
        let mut result = ExecutionResult::new(vec![
            exec_record("TC-001", ExecStatus::Pass),
            exec_record("TC-002", ExecStatus::Fail),
            exec_record("TC-003", ExecStatus::Error),
            exec_record("TC-004", ExecStatus::Pass),
        ]);
        let s = result.summary;
        assert_eq!(s.passed + s.failed + s.errored, s.total);
        assert_eq!(s.passed, 2);
        assert!((s.pass_rate() - 50.0).abs() < f64::EPSILON);

        result.summary.passed = 0;
        assert!(result.normalize());
        assert_eq!(result.summary.passed, 2);
    }

    #[test]
    fn test_analysis_wire_shape_and_stats() {
        let raw = json!({
            "analysis": {
                "feature": "Login",
                "user_role": "user",
                "conditions": ["valid credentials", "invalid credentials"]
            },
            "test_suite": {
                "test_cases": [{
                    "id": "TC1",
                    "type": "Positive",
                    "priority": "High",
                    "steps": ["..."],
                    "expected_result": "..."
                }]
            }
        });
        let result: AnalysisResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.feature(), "Login");
        assert_eq!(result.conditions().len(), 2);
        assert!(result.test_cases()[0].preconditions.is_empty());

        let stats = result.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_type.positive, 1);
        assert_eq!(stats.by_type.negative + stats.by_type.boundary + stats.by_type.edge_case, 0);
    }

    #[test]
    fn test_combined_mapped_defaults_to_true() {
        let raw = json!({"tc_id": "TC-001", "type": "Negative"});
        let tc: CombinedTestCase = serde_json::from_value(raw).unwrap();
        assert!(tc.mapped);
        assert_eq!(tc.category, Category::Negative);
    }
}
