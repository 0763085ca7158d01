//! TOML lesson files and the host adapters built from them.
//!
//! A lesson is a set of named states. Each state has tutor content, an
//! optional prompt, and answer rules; a rule either routes to another state
//! or keeps the learner where they are with feedback. [`Lesson`] implements
//! every adapter seam the engine needs, so one loaded file powers rendering,
//! topology, measuring, and answer evaluation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use colloquy_engine::{
    AnswerEvaluator, ContentMeasurer, EvaluationError, EvaluationRequest, HostAdapters,
    InitialCard, InteractionRenderer, LessonTopology,
};
use colloquy_types::{EvaluatedAnswer, FocusLabel, LearnerParams, StateName};

#[derive(Debug, Deserialize)]
pub struct LessonFile {
    pub title: String,
    pub initial_state: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default, rename = "state")]
    pub states: Vec<StateDef>,
}

#[derive(Debug, Deserialize)]
pub struct StateDef {
    pub name: String,
    pub content: String,
    /// Inline interactions render inside the tutor card; anything else gets
    /// the supplemental panel.
    #[serde(default = "default_true")]
    pub inline: bool,
    #[serde(default)]
    pub terminal: bool,
    pub prompt: Option<String>,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDef>,
    pub default_feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RuleDef {
    /// Answer text to match, compared case-insensitively after trimming.
    /// `"*"` matches anything.
    pub matches: String,
    /// Destination state; omitted means the learner stays put.
    pub dest: Option<String>,
    #[serde(default)]
    pub feedback: String,
    /// Re-render the interaction after this feedback.
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub set_params: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

/// A validated lesson.
#[derive(Debug)]
pub struct Lesson {
    title: String,
    initial_state: StateName,
    initial_params: LearnerParams,
    states: HashMap<StateName, StateDef>,
    render_counter: AtomicU64,
}

impl Lesson {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read lesson file {}", path.display()))?;
        let file: LessonFile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse lesson file {}", path.display()))?;
        Self::from_file(file)
    }

    pub fn from_file(file: LessonFile) -> Result<Self> {
        if file.states.is_empty() {
            bail!("lesson `{}` defines no states", file.title);
        }

        let mut states = HashMap::new();
        for state in file.states {
            let name = StateName::from(state.name.as_str());
            if state.terminal && !state.rules.is_empty() {
                warn!(state = %name, "rules on a terminal state are unreachable");
            }
            if states.insert(name.clone(), state).is_some() {
                bail!("state `{name}` is defined twice");
            }
        }

        let initial_state = StateName::from(file.initial_state.as_str());
        if !states.contains_key(&initial_state) {
            bail!("initial state `{initial_state}` is not defined");
        }
        for (name, state) in &states {
            for rule in &state.rules {
                if let Some(dest) = &rule.dest
                    && !states.contains_key(&StateName::from(dest.as_str()))
                {
                    bail!("state `{name}` routes to undefined state `{dest}`");
                }
            }
        }

        Ok(Self {
            title: file.title,
            initial_state,
            initial_params: file.params.into_iter().collect(),
            states,
            render_counter: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The card the player opens on.
    #[must_use]
    pub fn initial_card(&self) -> InitialCard {
        let content_html = self
            .state(&self.initial_state)
            .map(|state| substitute_params(&state.content, &self.initial_params))
            .unwrap_or_default();
        InitialCard {
            state_name: self.initial_state.clone(),
            params: self.initial_params.clone(),
            content_html,
        }
    }

    #[must_use]
    pub fn prompt(&self, state_name: &StateName) -> Option<&str> {
        self.state(state_name).and_then(|state| state.prompt.as_deref())
    }

    /// Bundles this lesson into the adapter set a [`Player`] takes.
    ///
    /// `latency` is added to every evaluation, to exercise the waiting
    /// states the way a remote answer-checking backend would.
    ///
    /// [`Player`]: colloquy_engine::Player
    #[must_use]
    pub fn adapters(self: &Arc<Self>, latency: Duration) -> HostAdapters {
        // Clone at the concrete type; the field sites unsize to the
        // trait objects.
        let renderer: Arc<Lesson> = Arc::clone(self);
        let topology: Arc<Lesson> = Arc::clone(self);
        let measurer: Arc<Lesson> = Arc::clone(self);
        HostAdapters {
            evaluator: Arc::new(LessonEvaluator {
                lesson: Arc::clone(self),
                latency,
            }),
            renderer,
            topology,
            measurer,
        }
    }

    fn state(&self, state_name: &StateName) -> Option<&StateDef> {
        self.states.get(state_name)
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluatedAnswer, EvaluationError> {
        let state = self.state(&request.state_name).ok_or_else(|| {
            EvaluationError::new(format!("unknown state `{}`", request.state_name))
        })?;

        let answer = request.answer.trim();
        let matched = state
            .rules
            .iter()
            .find(|rule| rule.matches == "*" || rule.matches.eq_ignore_ascii_case(answer));

        let Some(rule) = matched else {
            return Ok(stay_put(
                request,
                state
                    .default_feedback
                    .clone()
                    .unwrap_or_else(|| "Not quite. Try again.".to_owned()),
                false,
            ));
        };

        let Some(dest) = &rule.dest else {
            return Ok(stay_put(request, rule.feedback.clone(), rule.refresh));
        };

        let dest_name = StateName::from(dest.as_str());
        let dest_state = self.state(&dest_name).ok_or_else(|| {
            EvaluationError::new(format!("rule routes to undefined state `{dest_name}`"))
        })?;

        let mut effective = request.params.clone();
        for (key, value) in &rule.set_params {
            effective.set(key.as_str(), value.as_str());
        }
        let content_html = substitute_params(&dest_state.content, &effective);
        let new_params = (!rule.set_params.is_empty()).then_some(effective);

        Ok(EvaluatedAnswer {
            new_state_name: dest_name,
            refresh_interaction: false,
            feedback_html: rule.feedback.clone(),
            content_html,
            new_params,
        })
    }
}

fn stay_put(request: &EvaluationRequest, feedback_html: String, refresh: bool) -> EvaluatedAnswer {
    EvaluatedAnswer {
        new_state_name: request.state_name.clone(),
        refresh_interaction: refresh,
        feedback_html,
        content_html: String::new(),
        new_params: None,
    }
}

/// Replaces `{{name}}` placeholders with learner parameter values.
fn substitute_params(template: &str, params: &LearnerParams) -> String {
    let mut out = template.to_owned();
    for (name, value) in params.iter() {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

impl InteractionRenderer for Lesson {
    fn interaction_html(&self, state_name: &StateName, focus_label: &FocusLabel) -> String {
        if self.is_state_terminal(state_name) {
            return String::new();
        }
        let prompt = self
            .state(state_name)
            .and_then(|state| state.prompt.as_deref())
            .unwrap_or("Your answer");
        format!("<input focus=\"{focus_label}\" prompt=\"{prompt}\"/>")
    }

    fn render_suffix(&self) -> String {
        // Monotonic rather than random, so re-renders are reproducible.
        let n = self.render_counter.fetch_add(1, Ordering::Relaxed);
        format!("<!-- render {n} -->")
    }
}

impl LessonTopology for Lesson {
    fn is_interaction_inline(&self, state_name: &StateName) -> bool {
        self.state(state_name).is_none_or(|state| state.inline)
    }

    fn is_state_terminal(&self, state_name: &StateName) -> bool {
        self.state(state_name).is_some_and(|state| state.terminal)
    }
}

impl ContentMeasurer for Lesson {
    fn natural_height(&self, content_html: &str) -> u32 {
        // Crude print model: one 24px line per 80 characters, plus chrome.
        let lines = (content_html.len() / 80) as u32 + 1;
        lines * 24 + 48
    }
}

struct LessonEvaluator {
    lesson: Arc<Lesson>,
    latency: Duration,
}

#[async_trait]
impl AnswerEvaluator for LessonEvaluator {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluatedAnswer, EvaluationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.lesson.evaluate(&request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{Lesson, LessonFile};
    use colloquy_engine::{EvaluationRequest, LessonTopology};
    use colloquy_types::{FocusLabel, LearnerParams, StateName};

    fn lesson(toml_source: &str) -> Lesson {
        let file: LessonFile = toml::from_str(toml_source).unwrap();
        Lesson::from_file(file).unwrap()
    }

    fn request(state: &str, answer: &str, params: LearnerParams) -> EvaluationRequest {
        EvaluationRequest {
            answer: answer.to_owned(),
            state_name: StateName::from(state),
            params,
        }
    }

    const BASIC: &str = r#"
        title = "Fractions"
        initial_state = "intro"

        [params]
        name = "friend"

        [[state]]
        name = "intro"
        content = "<p>Hello {{name}}! What is half of 10?</p>"
        prompt = "Enter a number"
        default_feedback = "Think about sharing 10 sweets between 2 people."

        [[state.rule]]
        matches = "5"
        dest = "done"
        feedback = "Exactly."
        set_params = { score = "1" }

        [[state.rule]]
        matches = "ten"
        feedback = "That is the whole thing, not half."
        refresh = true

        [[state]]
        name = "done"
        content = "<p>Score: {{score}}</p>"
        terminal = true
    "#;

    #[test]
    fn parses_and_validates_a_lesson() {
        let lesson = lesson(BASIC);
        assert_eq!(lesson.title(), "Fractions");

        let initial = lesson.initial_card();
        assert_eq!(initial.state_name, StateName::from("intro"));
        assert!(initial.content_html.contains("Hello friend!"));

        assert!(lesson.is_interaction_inline(&StateName::from("intro")));
        assert!(!lesson.is_state_terminal(&StateName::from("intro")));
        assert!(lesson.is_state_terminal(&StateName::from("done")));
    }

    #[test]
    fn matching_rule_routes_with_params_and_substitution() {
        let lesson = lesson(BASIC);
        let result = lesson
            .evaluate(&request("intro", "  5 ", LearnerParams::new()))
            .unwrap();

        assert_eq!(result.new_state_name, StateName::from("done"));
        assert_eq!(result.feedback_html, "Exactly.");
        assert_eq!(result.content_html, "<p>Score: 1</p>");
        let params = result.new_params.unwrap();
        assert_eq!(params.get("score"), Some("1"));
    }

    #[test]
    fn same_state_rule_keeps_the_learner_and_can_refresh() {
        let lesson = lesson(BASIC);
        let result = lesson
            .evaluate(&request("intro", "TEN", LearnerParams::new()))
            .unwrap();

        assert_eq!(result.new_state_name, StateName::from("intro"));
        assert!(result.refresh_interaction);
        assert!(result.content_html.is_empty());
        assert!(result.new_params.is_none());
    }

    #[test]
    fn unmatched_answer_gets_the_default_feedback() {
        let lesson = lesson(BASIC);
        let result = lesson
            .evaluate(&request("intro", "7", LearnerParams::new()))
            .unwrap();

        assert_eq!(result.new_state_name, StateName::from("intro"));
        assert!(result.feedback_html.contains("sweets"));
    }

    #[test]
    fn wildcard_rule_matches_anything() {
        let source = r#"
            title = "t"
            initial_state = "a"

            [[state]]
            name = "a"
            content = "x"

            [[state.rule]]
            matches = "*"
            dest = "b"

            [[state]]
            name = "b"
            content = "y"
            terminal = true
        "#;
        let lesson = lesson(source);
        let result = lesson
            .evaluate(&request("a", "whatever", LearnerParams::new()))
            .unwrap();
        assert_eq!(result.new_state_name, StateName::from("b"));
        assert_eq!(result.feedback_html, "");
    }

    #[tokio::test]
    async fn adapters_expose_the_lesson_through_every_seam() {
        let lesson = Arc::new(lesson(BASIC));
        let adapters = lesson.adapters(Duration::ZERO);

        let html = adapters
            .renderer
            .interaction_html(&StateName::from("intro"), &FocusLabel::generated(1));
        assert!(html.contains("Enter a number"));
        assert!(
            adapters
                .renderer
                .interaction_html(&StateName::from("done"), &FocusLabel::generated(2))
                .is_empty()
        );

        assert!(adapters.topology.is_state_terminal(&StateName::from("done")));
        assert!(!adapters.topology.is_state_terminal(&StateName::from("intro")));
        assert!(adapters.measurer.natural_height("<p>short</p>") > 0);

        let result = adapters
            .evaluator
            .evaluate(request("intro", "5", LearnerParams::new()))
            .await
            .unwrap();
        assert_eq!(result.new_state_name, StateName::from("done"));
    }

    #[test]
    fn rejects_undefined_initial_state() {
        let source = r#"
            title = "t"
            initial_state = "missing"

            [[state]]
            name = "a"
            content = "x"
        "#;
        let file: LessonFile = toml::from_str(source).unwrap();
        let error = Lesson::from_file(file).unwrap_err();
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn rejects_rules_routing_nowhere() {
        let source = r#"
            title = "t"
            initial_state = "a"

            [[state]]
            name = "a"
            content = "x"

            [[state.rule]]
            matches = "*"
            dest = "nowhere"
        "#;
        let file: LessonFile = toml::from_str(source).unwrap();
        let error = Lesson::from_file(file).unwrap_err();
        assert!(error.to_string().contains("nowhere"));
    }

    #[test]
    fn rejects_duplicate_state_names() {
        let source = r#"
            title = "t"
            initial_state = "a"

            [[state]]
            name = "a"
            content = "x"

            [[state]]
            name = "a"
            content = "y"
        "#;
        let file: LessonFile = toml::from_str(source).unwrap();
        assert!(Lesson::from_file(file).is_err());
    }
}
