use super::{ClassifierError, IntentClassifier, IntentRequest};

/// Rule-based labels from the citing section and keywords in the context text
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

const INTRO_SECTIONS: &[&str] = &["introduction", "related work", "background"];
const METHOD_SECTIONS: &[&str] = &["methods", "methodology", "approach"];
const RESULT_SECTIONS: &[&str] = &["results", "experiments", "evaluation"];

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

impl HeuristicClassifier {
    pub fn label(text: &str, section: &str) -> &'static str {
        let text = text.to_lowercase();
        let section = section.trim().to_lowercase();
        let section = section.as_str();

        if INTRO_SECTIONS.contains(&section) {
            if mentions(&text, &["survey", "review", "overview", "background"]) {
                return "Background";
            }
            if mentions(&text, &["motivat", "recently", "growing", "emerging"]) {
                return "Motivation";
            }
        } else if METHOD_SECTIONS.contains(&section) {
            if mentions(&text, &["use", "employ", "apply", "implement", "method"]) {
                return "Methods";
            }
        } else if RESULT_SECTIONS.contains(&section)
            && mentions(&text, &["comparison", "compared", "result", "outperform", "baseline"])
        {
            return "Results";
        }

        if mentions(&text, &["future work", "future research", "ongoing", "plan"]) {
            "Future"
        } else if mentions(&text, &["method", "algorithm", "technique", "approach", "framework"]) {
            "Methods"
        } else if mentions(&text, &["result", "show", "find", "outperform", "achieve"]) {
            "Results"
        } else if mentions(&text, &["motivat", "prompt", "inspire", "address"]) {
            "Motivation"
        } else {
            "Background"
        }
    }
}

impl IntentClassifier for HeuristicClassifier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn predict(&self, request: &IntentRequest) -> Result<String, ClassifierError> {
        let section = request.section.as_deref().unwrap_or("");
        Ok(Self::label(&request.text, section).to_string())
    }
}
