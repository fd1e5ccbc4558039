//! The NVC tool and resource catalog.
//!
//! [`build_registry`] registers the seven knowledge resources and the six
//! tools against a loaded content store. Prompt tools are pure renderers;
//! `submit_feedback` is the only tool with a side effect.

mod feedback;

pub use feedback::FeedbackTool;

use crate::content::{ContentKey, ContentStore};
use crate::error::Result;
use crate::persistence::FeedbackSink;
use crate::prompts::{
    clarifier, debate, discourse, discourse::MAX_CITATIONS, debate::MAX_TOPICS, trainer, transform,
    ClarifyParams, DebateParams, Difficulty,
    DiscourseParams, Prompt, Topic, TrainerParams, TransformParams,
};
use crate::registry::{
    CapabilityRegistry, FieldKind, FieldSpec, InputSchema, ItemKind, Literal, ResourceDescriptor,
    ToolDescriptor, ToolHandler, ToolOutput, ValidatedInput,
};
use std::sync::Arc;

pub const THOUGHT_CLARIFIER: &str = "thought_clarifier";
pub const TRANSFORM_MESSAGE: &str = "transform_message";
pub const NVC_TRAINER: &str = "nvc_trainer";
pub const POLITICAL_DISCOURSE: &str = "political_discourse";
pub const POLITICAL_DEBATE: &str = "political_debate";
pub const SUBMIT_FEEDBACK: &str = "submit_feedback";

const TEXT: FieldKind = FieldKind::Text { non_empty: true };

const CITATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required(
        "source",
        "Who said it: politician name, party, or document reference",
        TEXT,
    ),
    FieldSpec::required("text", "The exact quote or passage to analyze", TEXT),
];

pub const CLARIFIER_SCHEMA: InputSchema = InputSchema::new(&[FieldSpec::required(
    "text",
    "The user's free-form text to analyze",
    TEXT,
)]);

pub const TRANSFORM_SCHEMA: InputSchema = InputSchema::new(&[FieldSpec::required(
    "text",
    "The message to transform using NVC principles",
    TEXT,
)]);

pub const TRAINER_SCHEMA: InputSchema = InputSchema::new(&[
    FieldSpec::required(
        "topic",
        "The NVC building block to practice",
        FieldKind::Choice(Topic::NAMES),
    ),
    FieldSpec::with_default(
        "difficulty",
        "Exercise difficulty level (default: beginner)",
        FieldKind::Choice(Difficulty::NAMES),
        Literal::Str("beginner"),
    ),
]);

pub const DISCOURSE_SCHEMA: InputSchema = InputSchema::new(&[
    FieldSpec::required(
        "citations",
        "One or more political citations to analyze",
        FieldKind::List {
            item: ItemKind::Record(CITATION_FIELDS),
            min: 1,
            max: MAX_CITATIONS,
        },
    ),
    FieldSpec::optional(
        "topic",
        "Optional topic or context (e.g., 'climate policy')",
        FieldKind::Text { non_empty: false },
    ),
]);

pub const DEBATE_SCHEMA: InputSchema = InputSchema::new(&[
    FieldSpec::required("party1", "Name of the first political party", TEXT),
    FieldSpec::required("party2", "Name of the second political party", TEXT),
    FieldSpec::required(
        "topics",
        "List of topics to debate (1-10)",
        FieldKind::List {
            item: ItemKind::Text { non_empty: true },
            min: 1,
            max: MAX_TOPICS,
        },
    ),
    FieldSpec::with_default(
        "search",
        "Search for latest party positions before generating (default: false)",
        FieldKind::Flag,
        Literal::Bool(false),
    ),
]);

pub const FEEDBACK_SCHEMA: InputSchema = InputSchema::new(&[FieldSpec::required(
    "text",
    "The user's free-form feedback",
    TEXT,
)]);

/// A tool whose whole job is rendering one [`Prompt`].
pub struct PromptTool {
    build: fn(&ValidatedInput) -> Result<Prompt>,
    required: &'static [ContentKey],
}

impl ToolHandler for PromptTool {
    fn required_content(&self) -> &'static [ContentKey] {
        self.required
    }

    fn call(&self, input: &ValidatedInput, store: &ContentStore) -> Result<ToolOutput> {
        let prompt = (self.build)(input)?;
        Ok(ToolOutput::text(prompt.render(store)))
    }
}

/// The seven browsable knowledge resources.
pub fn resource_catalog() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor::new(
            "intro",
            "nvc://intro",
            "Getting started guide: what this server offers and how to use it",
            ContentKey::Intro,
        ),
        ResourceDescriptor::new(
            "feelings-catalog",
            "nvc://catalogs/feelings",
            "~120 NVC feelings organized by met/unmet needs, plus masking feelings",
            ContentKey::Feelings,
        ),
        ResourceDescriptor::new(
            "needs-catalog",
            "nvc://catalogs/needs",
            "Universal human needs in 9 categories",
            ContentKey::Needs,
        ),
        ResourceDescriptor::new(
            "nvc-principles",
            "nvc://knowledge/principles",
            "Core NVC principles and common pitfalls to avoid",
            ContentKey::Principles,
        ),
        ResourceDescriptor::new(
            "four-components",
            "nvc://knowledge/four-components",
            "The four NVC components: observation, feeling, need, request",
            ContentKey::FourComponents,
        ),
        ResourceDescriptor::new(
            "nvc-examples",
            "nvc://knowledge/examples",
            "Worked NVC analyses showing the framework applied to real situations",
            ContentKey::Examples,
        ),
        ResourceDescriptor::new(
            "nvc-overview",
            "nvc://knowledge/overview",
            "What Nonviolent Communication is and why it matters",
            ContentKey::Overview,
        ),
    ]
}

/// The six tools, in listing order.
pub fn tool_catalog(sink: Arc<FeedbackSink>) -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: THOUGHT_CLARIFIER,
            description: "Analyze free-form text through the lens of Nonviolent Communication (NVC).

Given the user's unfiltered thoughts, this tool returns a structured NVC analysis
that surfaces the feelings and needs underneath, and optionally a concrete request.

The analysis is grounded in the bundled NVC knowledge base (feelings catalog,
needs catalog, principles, and worked examples).

Usage: Pass any text (a journal entry, a message draft, a frustrating thought)
and receive a structured breakdown of the observations, feelings, needs, and
possible requests hidden in your words.",
            input_schema: CLARIFIER_SCHEMA,
            handler: Arc::new(PromptTool {
                build: |input| Ok(Prompt::ThoughtClarifier(input.parse::<ClarifyParams>()?)),
                required: clarifier::SECTIONS,
            }),
        },
        ToolDescriptor {
            name: TRANSFORM_MESSAGE,
            description: "Rewrite any message using Nonviolent Communication (NVC) principles.

Paste an email, chat message, feedback, or any written communication and get
a transformed version that preserves your intent while applying NVC structure
(observation, feelings, needs, request).

Two modes available:
- **One-shot**: Immediate rewrite with a \"What changed\" summary
- **Guided**: Step-by-step clarification (observation → feelings → needs → request)

The tool will ask which mode you prefer before transforming.",
            input_schema: TRANSFORM_SCHEMA,
            handler: Arc::new(PromptTool {
                build: |input| Ok(Prompt::TransformMessage(input.parse::<TransformParams>()?)),
                required: transform::SECTIONS,
            }),
        },
        ToolDescriptor {
            name: NVC_TRAINER,
            description: "Generate an interactive NVC practice exercise.

Pick a topic (observations, feelings, needs, or requests) and a difficulty level
(beginner, intermediate, or advanced) to get a tailored exercise that tests your
understanding of that NVC building block.

- **Beginner**: Multiple-choice identification (spot the correct NVC formulation)
- **Intermediate**: Nuanced multiple-choice + short open-ended reformulation
- **Advanced**: Complex real-world open-ended exercises

After answering, the tool provides detailed feedback grounded in the NVC knowledge base.",
            input_schema: TRAINER_SCHEMA,
            handler: Arc::new(PromptTool {
                build: |input| Ok(Prompt::Trainer(input.parse::<TrainerParams>()?)),
                required: trainer::SECTIONS,
            }),
        },
        ToolDescriptor {
            name: POLITICAL_DISCOURSE,
            description: "Analyze political citations through the NVC lens.

Given one or more real political quotes (with source attribution), this tool
identifies life-alienating communication patterns (judgments, evaluations,
demands, dehumanizing language, etc.) and surfaces the human needs behind
the rhetoric.

Three-phase process:
1. Display verbatim citations
2. Analyze what's NOT NVC about them (patterns, hidden observations, unexpressed feelings/needs)
3. On request: transform into NVC while preserving political intent

Usage: Provide 1-10 citations with source and text. Optionally include
a topic for context.",
            input_schema: DISCOURSE_SCHEMA,
            handler: Arc::new(PromptTool {
                build: |input| Ok(Prompt::Discourse(input.parse::<DiscourseParams>()?)),
                required: discourse::SECTIONS,
            }),
        },
        ToolDescriptor {
            name: POLITICAL_DEBATE,
            description: "Simulate a structured political debate between two parties using NVC principles.

Given two party names and a list of topics, this tool generates a debate that
surfaces the universal human needs behind each party's political positions
rather than scoring rhetorical points.

For each topic the debate proceeds through four phases: Position Mapping,
Needs Excavation, Empathic Dialogue, and Common Ground, followed by a
cross-topic synthesis.

Optionally enable search to have the host LLM look up each party's latest
positions before generating the debate.",
            input_schema: DEBATE_SCHEMA,
            handler: Arc::new(PromptTool {
                build: |input| Ok(Prompt::Debate(input.parse::<DebateParams>()?)),
                required: debate::SECTIONS,
            }),
        },
        ToolDescriptor {
            name: SUBMIT_FEEDBACK,
            description: "Submit feedback about the NVC tools.

Use this to share suggestions, report issues, or tell us what you liked.
Feedback is stored locally by the server.",
            input_schema: FEEDBACK_SCHEMA,
            handler: Arc::new(FeedbackTool::new(sink)),
        },
    ]
}

/// Register every resource and tool. Any failure aborts startup.
pub fn build_registry(store: Arc<ContentStore>, sink: Arc<FeedbackSink>) -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new(store);

    for resource in resource_catalog() {
        registry.register_resource(resource)?;
    }
    for tool in tool_catalog(sink) {
        registry.register_tool(tool)?;
    }

    tracing::info!(
        resources = registry.resources().len(),
        tools = registry.tools().len(),
        "Capability registry built"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::Prompt;
    use serde_json::json;
    use tempfile::tempdir;

    fn registry() -> (tempfile::TempDir, CapabilityRegistry) {
        let dir = tempdir().unwrap();
        let sink = Arc::new(FeedbackSink::new(dir.path().join("feedback.json")));
        let store = Arc::new(ContentStore::embedded().unwrap());
        (dir, build_registry(store, sink).unwrap())
    }

    #[test]
    fn test_catalog_sizes() {
        let (_dir, registry) = registry();
        assert_eq!(registry.resources().len(), 7);
        let names: Vec<_> = registry.tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                THOUGHT_CLARIFIER,
                TRANSFORM_MESSAGE,
                NVC_TRAINER,
                POLITICAL_DISCOURSE,
                POLITICAL_DEBATE,
                SUBMIT_FEEDBACK
            ]
        );
    }

    #[test]
    fn test_required_content_matches_rendered_sections() {
        let (_dir, registry) = registry();
        let required = |name: &str| registry.tool(name).unwrap().handler.required_content();

        assert_eq!(
            required(THOUGHT_CLARIFIER),
            &Prompt::ThoughtClarifier(ClarifyParams { text: "x".into() }).sections()[..]
        );
        assert_eq!(required(POLITICAL_DEBATE), debate::SECTIONS);
        assert!(required(SUBMIT_FEEDBACK).is_empty());

        for topic in [Topic::Observations, Topic::Feelings, Topic::Needs, Topic::Requests] {
            let prompt = Prompt::Trainer(TrainerParams {
                topic,
                difficulty: Difficulty::Advanced,
            });
            for key in prompt.sections() {
                assert!(required(NVC_TRAINER).contains(&key));
            }
        }
    }

    #[test]
    fn test_schema_names_match_enums() {
        for name in Topic::NAMES {
            let input = TRAINER_SCHEMA.validate(&json!({ "topic": name })).unwrap();
            let params: TrainerParams = input.parse().unwrap();
            assert_eq!(params.topic.as_str(), *name);
            assert_eq!(params.difficulty, Difficulty::Beginner);
        }
    }

    #[test]
    fn test_missing_store_entry_fails_startup() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(FeedbackSink::new(dir.path().join("feedback.json")));
        let store = Arc::new(
            ContentStore::load(
                ContentKey::ALL
                    .into_iter()
                    .filter(|k| *k != ContentKey::DebateGuide)
                    .map(|k| {
                        (
                            k,
                            crate::content::ContentSource::Inline(crate::content::embedded::text(k).into()),
                        )
                    }),
            )
            .unwrap(),
        );
        let err = build_registry(store, sink).err().unwrap();
        assert!(err.to_string().contains("debate_guide"));
    }
}
