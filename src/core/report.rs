// src/core/report.rs
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;
use super::levels::Level;

const LEVELS_TEMPLATE: &str = r#"# {{ project }}: learning path

{{ levels | length }} levels generated from the {{ language }} call graph.
{% for level in levels %}
## {{ loop.index }}. {{ level.name }}

- **Difficulty:** {{ level.difficulty | capitalize }}
- **XP:** {{ level.xp_reward }}
- **Estimated time:** {{ level.estimated_time }} min
{%- if level.prerequisites %}
- **Requires:** {{ level.prerequisites | join(sep=", ") }}
{%- endif %}

{{ level.description }}

**Call chain:** {% for id in level.call_chain %}`{{ id }}`{% if not loop.last %} → {% endif %}{% endfor %}

### Objectives
{% for objective in level.objectives %}
- {{ objective }}
{%- endfor %}

```{{ language }}
{{ level.code_snippet | safe }}
```

### Challenges
{% for challenge in level.challenges %}
{{ loop.index }}. **{{ challenge.question.prompt }}** ({{ challenge.points }} pts)
{%- if challenge.question.options is defined %}
{%- for option in challenge.question.options %}
   - {{ option }}
{%- endfor %}
{%- endif %}
{%- if challenge.answer is defined %}
   - _Answer:_ `{{ challenge.answer | json_encode() | safe }}`
{%- endif %}
{%- endfor %}
{% endfor %}"#;

#[derive(Serialize)]
struct ReportContext<'a> {
    project: &'a str,
    language: &'a str,
    levels: &'a [Level],
}

/// Render levels as a Markdown learning path.
///
/// Answers appear only for challenges that still carry one; pass redacted
/// levels for a learner-facing report.
pub fn render_levels_markdown(project: &str, language: &str, levels: &[Level]) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("levels.md", LEVELS_TEMPLATE)?;

    let context = Context::from_serialize(ReportContext { project, language, levels })?;
    Ok(tera.render("levels.md", &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::levels::{Challenge, ChallengeAnswer, ChallengeQuestion, ChallengeType, Difficulty};

    fn level() -> Level {
        Level {
            id: "level_1".to_string(),
            name: "Understanding main".to_string(),
            description: "Learn how main works and trace its execution to save".to_string(),
            difficulty: Difficulty::Basic,
            entry_function: "app.py::main".to_string(),
            call_chain: vec!["app.py::main".to_string(), "app.py::save".to_string()],
            code_snippet: "def main():\n    save(\"<x>\")".to_string(),
            challenges: vec![Challenge {
                id: "mc_app.py::main".to_string(),
                challenge_type: ChallengeType::MultipleChoice,
                question: ChallengeQuestion::MultipleChoice {
                    prompt: "How many parameters does main() accept?".to_string(),
                    options: vec!["0".to_string(), "1".to_string(), "2".to_string()],
                },
                answer: Some(ChallengeAnswer::MultipleChoice { correct: "0".to_string() }),
                hints: vec!["Check the function signature at line 1".to_string()],
                points: 10,
            }],
            objectives: vec!["Trace execution from main to save".to_string()],
            xp_reward: 100,
            estimated_time: 3,
            prerequisites: Vec::new(),
        }
    }

    #[test]
    fn test_markdown_report_lists_levels() {
        let markdown = render_levels_markdown("demo", "python", &[level()]).unwrap();
        assert!(markdown.starts_with("# demo: learning path"));
        assert!(markdown.contains("## 1. Understanding main"));
        assert!(markdown.contains("**Difficulty:** Basic"));
        assert!(markdown.contains("`app.py::main` → `app.py::save`"));
        assert!(markdown.contains("- Trace execution from main to save"));
        assert!(markdown.contains("save(\"<x>\")"));
        assert!(markdown.contains("How many parameters does main() accept?"));
        assert!(markdown.contains("_Answer:_"));
    }

    #[test]
    fn test_learner_report_has_no_answers() {
        let markdown = render_levels_markdown("demo", "python", &[level().redacted()]).unwrap();
        assert!(markdown.contains("How many parameters does main() accept?"));
        assert!(!markdown.contains("_Answer:_"));
        assert!(!markdown.contains("correct"));
    }
}
