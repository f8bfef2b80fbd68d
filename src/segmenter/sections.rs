//! Ordered section-classification rules for tender text.
//!
//! Tender documents in this domain follow a recognizable layout: chapter
//! headers, a handful of named sections ("OBJETO:", "PRESUPUESTO:", ...), and
//! generic numbered headings. Classification scans the case-folded first 500
//! characters of a chunk against the rule table below; the first match wins.
//! Named sections are listed before the generic numbered-heading rule so a
//! heading like "3.2 REQUISITOS TÉCNICOS" keeps its specific label.

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel label for chunks no rule matched.
pub const UNLABELED_SECTION: &str = "sin_seccion";

/// Number of leading characters of a chunk inspected for a section heading.
const SCAN_CHARS: usize = 500;

enum RuleLabel {
    /// A fixed category label.
    Fixed(&'static str),
    /// Echo the matched text itself, preserving hierarchical context.
    Echo,
}

struct SectionRule {
    pattern: Regex,
    label: RuleLabel,
}

fn rule(pattern: &str, label: RuleLabel) -> SectionRule {
    SectionRule {
        pattern: Regex::new(pattern).expect("section rule pattern must compile"),
        label,
    }
}

// Evaluation order matters: chapter headers first (they carry hierarchy),
// then named sections, and the generic numbered-heading rule last.
static RULES: Lazy<Vec<SectionRule>> = Lazy::new(|| {
    vec![
        rule(r"cap[ií]tulo\s+(?:[ivxlcdm]+|\d+)", RuleLabel::Echo),
        rule(r"objeto\s*(?:del\s+contrato\s*)?:", RuleLabel::Fixed("objeto")),
        rule(
            r"presupuesto\s*(?:oficial\s*)?:?",
            RuleLabel::Fixed("presupuesto"),
        ),
        rule(
            r"requisitos\s+t[eé]cnicos",
            RuleLabel::Fixed("requisitos_tecnicos"),
        ),
        rule(
            r"requisitos\s+habilitantes",
            RuleLabel::Fixed("requisitos_habilitantes"),
        ),
        rule(
            r"criterios\s+de\s+evaluaci[oó]n",
            RuleLabel::Fixed("criterios_evaluacion"),
        ),
        rule(r"experiencia\s+(?:del\s+)?proponente", RuleLabel::Fixed("experiencia")),
        rule(r"garant[ií]as", RuleLabel::Fixed("garantias")),
        rule(r"cronograma", RuleLabel::Fixed("cronograma")),
        rule(r"anexos?\b", RuleLabel::Fixed("anexos")),
        rule(
            r"(?m)^\s*(\d+(?:\.\d+)*\.?)\s+\S[^\n]{2,60}",
            RuleLabel::Echo,
        ),
    ]
});

/// Labels a chunk by its leading text, or returns [`UNLABELED_SECTION`].
pub fn classify_section(chunk_text: &str) -> String {
    let window: String = chunk_text.chars().take(SCAN_CHARS).collect();
    let window = window.to_lowercase();

    for rule in RULES.iter() {
        if let Some(found) = rule.pattern.find(&window) {
            return match &rule.label {
                RuleLabel::Fixed(label) => (*label).to_string(),
                RuleLabel::Echo => found.as_str().trim().to_string(),
            };
        }
    }
    UNLABELED_SECTION.to_string()
}
