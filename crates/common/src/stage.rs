//! Pipeline stages and the panels that present them

use serde::{Deserialize, Serialize};

/// Deepest crawl the backend will perform
pub const MAX_CRAWL_DEPTH: u32 = 2;

/// One of the five pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyze,
    Explore,
    Combine,
    Execute,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Analyze,
        Stage::Explore,
        Stage::Combine,
        Stage::Execute,
        Stage::Report,
    ];

    /// Panel that presents this stage
    pub fn panel(self) -> Panel {
        match self {
            Stage::Analyze => Panel::Story,
            Stage::Explore => Panel::Url,
            Stage::Combine => Panel::Combo,
            Stage::Execute => Panel::Exec,
            Stage::Report => Panel::Report,
        }
    }

    /// Backend endpoint path
    pub fn endpoint(self) -> &'static str {
        match self {
            Stage::Analyze => "/analyze",
            Stage::Explore => "/explore",
            Stage::Combine => "/generate-combined",
            Stage::Execute => "/execute",
            Stage::Report => "/report",
        }
    }

    /// Progress indicator text while the stage is in flight
    pub fn busy_message(self) -> &'static str {
        match self {
            Stage::Analyze => "Analyzing user story and generating test cases...",
            Stage::Explore => "Crawling website and extracting structure...",
            Stage::Combine => "Analyzing story, crawling site and mapping test cases...",
            Stage::Execute => "Running test cases in the browser...",
            Stage::Report => "Generating report...",
        }
    }

    /// Fallback shown when the backend fails without a message
    pub fn failure_message(self) -> &'static str {
        match self {
            Stage::Analyze => "Analysis failed.",
            Stage::Explore => "Exploration failed.",
            Stage::Combine => "Combined generation failed.",
            Stage::Execute => "Execution failed.",
            Stage::Report => "Report generation failed.",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Analyze => write!(f, "analyze"),
            Stage::Explore => write!(f, "explore"),
            Stage::Combine => write!(f, "combine"),
            Stage::Execute => write!(f, "execute"),
            Stage::Report => write!(f, "report"),
        }
    }
}

/// Stage selector position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Story,
    Url,
    Combo,
    Exec,
    Report,
}

impl Panel {
    pub fn stage(self) -> Stage {
        match self {
            Panel::Story => Stage::Analyze,
            Panel::Url => Stage::Explore,
            Panel::Combo => Stage::Combine,
            Panel::Exec => Stage::Execute,
            Panel::Report => Stage::Report,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Story => "User Story",
            Panel::Url => "Website Explorer",
            Panel::Combo => "Combined Generator",
            Panel::Exec => "Test Execution",
            Panel::Report => "Report",
        }
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Panel::Story => write!(f, "story"),
            Panel::Url => write!(f, "url"),
            Panel::Combo => write!(f, "combo"),
            Panel::Exec => write!(f, "exec"),
            Panel::Report => write!(f, "report"),
        }
    }
}

impl std::str::FromStr for Panel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "story" => Ok(Panel::Story),
            "url" => Ok(Panel::Url),
            "combo" => Ok(Panel::Combo),
            "exec" => Ok(Panel::Exec),
            "report" => Ok(Panel::Report),
            other => Err(crate::Error::InvalidConfig(format!("unknown panel '{}'", other))),
        }
    }
}

/// User-supplied input for a stage run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageInput {
    Analyze { story: String },
    Explore { url: String, depth: u32 },
    Combine { story: String, url: String, depth: u32 },
    /// Test cases come from the stored combined result
    Execute { headless: bool },
    /// Payload is the stored execution result
    Report,
}

impl StageInput {
    pub fn stage(&self) -> Stage {
        match self {
            StageInput::Analyze { .. } => Stage::Analyze,
            StageInput::Explore { .. } => Stage::Explore,
            StageInput::Combine { .. } => Stage::Combine,
            StageInput::Execute { .. } => Stage::Execute,
            StageInput::Report => Stage::Report,
        }
    }

    /// Reject empty required fields, naming the first missing one.
    pub fn validate(&self) -> crate::Result<()> {
        let missing = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                Err(crate::Error::Validation { field })
            } else {
                Ok(())
            }
        };

        match self {
            StageInput::Analyze { story } => missing(story, "user story"),
            StageInput::Explore { url, .. } => missing(url, "website URL"),
            StageInput::Combine { story, url, .. } => {
                missing(story, "user story")?;
                missing(url, "website URL")
            }
            StageInput::Execute { .. } | StageInput::Report => Ok(()),
        }
    }
}

/// Clamp a requested crawl depth to what the backend supports
pub fn clamp_depth(depth: u32) -> u32 {
    depth.min(MAX_CRAWL_DEPTH)
}
