//! Prompt modes and instruction composition
//!
//! Each analysis mode maps to a fixed instruction string. All image
//! modes share a closing directive that forces a `Question:`/`Answer:`
//! structure and a literal fallback sentence when no question is found.

use std::fmt;

/// Closing directive appended to every image-analysis instruction
pub(crate) const ANSWER_DIRECTIVE: &str = "When the image contains a solvable question, respond \
     with a 'Question:' and 'Answer:' structure in plain text. Always return 'No question to \
     solve' if the image shows anything other than a question.";

/// Directive appended to text follow-up queries
pub(crate) const PLAIN_TEXT_DIRECTIVE: &str =
    "Respond in plain text only, without decorative formatting.";

/// Explanation style requested for an image analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    /// Five-year-old-level explanation
    ExplainLikeFive,
    /// Ordered step-by-step solution
    StepByStep,
    /// Generic analyze-and-solve instruction
    #[default]
    Default,
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplainLikeFive => write!(f, "explain_like_five"),
            Self::StepByStep => write!(f, "step_by_step"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl PromptMode {
    /// Parse a prompt mode from a string
    ///
    /// Accepts both the short CLI spellings and the full names.
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::gateway::PromptMode;
    ///
    /// assert_eq!(PromptMode::parse_str("eli5").unwrap(), PromptMode::ExplainLikeFive);
    /// assert_eq!(PromptMode::parse_str("steps").unwrap(), PromptMode::StepByStep);
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "eli5" | "explain_like_five" => Ok(Self::ExplainLikeFive),
            "steps" | "step_by_step" => Ok(Self::StepByStep),
            "default" => Ok(Self::Default),
            other => Err(format!("Unknown prompt mode: {}", other)),
        }
    }
}

/// Compose the full instruction string for an image analysis
pub fn instruction_for(mode: PromptMode) -> String {
    let base = match mode {
        PromptMode::ExplainLikeFive => {
            "Explain this academic problem as if you were explaining it to a 5-year-old."
        }
        PromptMode::StepByStep => {
            "Provide a clear, step-by-step solution for this academic problem. If there are \
             multiple steps, list them in order. Do not use any unnecessary symbols in maths \
             related problems."
        }
        PromptMode::Default => {
            "You are a helpful teaching assistant. Please analyze this image and provide a \
             solution."
        }
    };

    format!("{} {}", base, ANSWER_DIRECTIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_accepts_both_spellings() {
        assert_eq!(
            PromptMode::parse_str("explain_like_five").unwrap(),
            PromptMode::ExplainLikeFive
        );
        assert_eq!(
            PromptMode::parse_str("step_by_step").unwrap(),
            PromptMode::StepByStep
        );
        assert_eq!(PromptMode::parse_str("default").unwrap(), PromptMode::Default);
    }

    #[test]
    fn test_parse_str_rejects_unknown() {
        assert!(PromptMode::parse_str("verbose").is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for mode in [
            PromptMode::ExplainLikeFive,
            PromptMode::StepByStep,
            PromptMode::Default,
        ] {
            assert_eq!(PromptMode::parse_str(&mode.to_string()).unwrap(), mode);
        }
    }

    #[test]
    fn test_every_mode_carries_answer_directive() {
        for mode in [
            PromptMode::ExplainLikeFive,
            PromptMode::StepByStep,
            PromptMode::Default,
        ] {
            let instruction = instruction_for(mode);
            assert!(instruction.contains("No question to solve"));
            assert!(instruction.contains("'Question:'"));
        }
    }

    #[test]
    fn test_mode_instructions_differ() {
        assert_ne!(
            instruction_for(PromptMode::ExplainLikeFive),
            instruction_for(PromptMode::StepByStep)
        );
        assert!(instruction_for(PromptMode::ExplainLikeFive).contains("5-year-old"));
        assert!(instruction_for(PromptMode::StepByStep).contains("step-by-step"));
    }
}
