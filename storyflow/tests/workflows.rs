//! End-to-end operation runs over the in-memory store, scripted player and mock model.

use std::sync::Arc;

use storyflow::store::{collections, metadata, Document, DocumentStore};
use storyflow::story::{world_building_questions, RANDOM_DIRECTIVES, RANDOM_GENRE};
use storyflow::workflows::{
    question_loop, seed_by_ids, seed_create_character, seed_create_world, seed_join_game,
};
use storyflow::{
    AgentError, CharTokenizer, InMemoryDocumentStore, MockLlm, Operation, PromptTruncator,
    ScriptedInteraction, Services, Source, StoryState, StreamEvent, StreamMode, TruncationConfig,
};
use tokio_stream::StreamExt;

const LIMIT: usize = 50;

const WORLD_JSON: &str = r#"{"page_content": "Eldoria floats above a sea of mist.", "metadata": {"genre": "fantasy", "magic_presence": true}}"#;
const LORE_JSON: &str = r#"```json
{"page_content": "The mist was once an ocean, drained by the first mages.", "metadata": {"era": "before"}}
```"#;
const CHARACTER_JSON: &str = r#"{"page_content": "Ada is a cartographer of the mist.", "metadata": {"gender": "female", "age": 31}}"#;
const SUMMARY: &str = "Eldoria drifts on, and Ada maps its edges.";

struct Harness {
    llm: Arc<MockLlm>,
    store: Arc<InMemoryDocumentStore>,
    io: Arc<ScriptedInteraction>,
    services: Services,
}

fn harness(responses: &[&str], answers: &[&str]) -> Harness {
    let llm = Arc::new(MockLlm::with_responses(responses.iter().copied()));
    let store = Arc::new(InMemoryDocumentStore::default());
    let io = Arc::new(ScriptedInteraction::new(answers.iter().copied()));
    let truncator =
        PromptTruncator::new(Arc::new(CharTokenizer), TruncationConfig::default()).unwrap();
    let services = Services {
        llm: llm.clone(),
        store: store.clone(),
        interaction: io.clone(),
        truncator: Arc::new(truncator),
    };
    Harness {
        llm,
        store,
        io,
        services,
    }
}

/// Stores world `w1` named "eldoria" and character `c1` named "ada" in it.
async fn seed_world_and_character(store: &InMemoryDocumentStore) {
    store
        .add(
            collections::WORLDS,
            Document::new(
                "w1",
                "Eldoria floats above a sea of mist.",
                metadata(&[("world_name", "eldoria"), ("world_id", "w1")]),
            ),
        )
        .await
        .unwrap();
    store
        .add(
            collections::CHARACTERS,
            Document::new(
                "c1",
                "Ada is a cartographer of the mist.",
                metadata(&[
                    ("world_id", "w1"),
                    ("character_id", "c1"),
                    ("character_name", "ada"),
                    ("gender", "female"),
                ]),
            ),
        )
        .await
        .unwrap();
}

async fn run(h: &Harness, op: Operation, seed: StoryState) -> Result<StoryState, AgentError> {
    op.compile(&h.services).unwrap().invoke(seed, LIMIT).await
}

/// **Scenario**: New world then new character: answers y, Eldoria, blank, blank, Ada.
#[tokio::test]
async fn interactive_session_creates_world_and_character() {
    let h = harness(
        &[WORLD_JSON, CHARACTER_JSON, SUMMARY],
        &["y", "Eldoria", "", "", "Ada"],
    );
    let seed = StoryState {
        source: Some(Source::Cli),
        ..Default::default()
    };
    let out = run(&h, Operation::InteractiveSession, seed).await.unwrap();

    assert_eq!(out.world_summary.as_deref(), Some(SUMMARY));
    assert_eq!(out.world_name.as_deref(), Some("eldoria"));
    assert_eq!(out.world_genre.as_deref(), Some(RANDOM_GENRE));
    assert_eq!(out.story_directives.as_deref(), Some(RANDOM_DIRECTIVES));
    assert_eq!(out.character_name.as_deref(), Some("ada"));
    assert_eq!(out.character_gender.as_deref(), Some("female"));
    assert_eq!(h.io.remaining(), 0);
    assert_eq!(h.llm.call_count(), 3);

    let world_id = out.world_id.clone().unwrap();
    let world = h.store.get(collections::WORLDS, &world_id).await.unwrap().unwrap();
    assert_eq!(world.meta_str("world_name"), Some("eldoria"));
    let character_id = out.character_id.clone().unwrap();
    let character = h
        .store
        .get(collections::CHARACTERS, &character_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(character.meta_str("world_id"), Some(world_id.as_str()));
    assert_eq!(character.meta_str("character_name"), Some("ada"));
    assert!(out
        .character_context
        .as_deref()
        .unwrap()
        .contains("cartographer"));
    assert!(h.io.said().iter().any(|s| s == SUMMARY));
    let said = h.io.said();
    assert!(said.iter().any(|s| s == "Eldoria floats above a sea of mist."));
    assert!(said.iter().any(|s| s == "Ada is a cartographer of the mist."));
}

/// **Scenario**: Only the operations without an interactive session skip the player.
#[test]
fn only_the_session_is_interactive() {
    assert!(Operation::InteractiveSession.is_interactive());
    for op in [
        Operation::CreateWorld,
        Operation::CreateCharacter,
        Operation::JoinGame,
        Operation::NextPrompt,
        Operation::RegisterAction,
        Operation::WorldSynopsis,
    ] {
        assert!(!op.is_interactive(), "{}", op.name());
    }
}

/// **Scenario**: Asking to create a world that exists loops back to the first question,
/// a blank name is asked again, and the existing world and character are then played.
#[tokio::test]
async fn interactive_session_restarts_on_conflict() {
    let h = harness(
        &[LORE_JSON, SUMMARY],
        &["y", "Eldoria", "n", "  ", "eldoria", "n", "Ada"],
    );
    seed_world_and_character(&h.store).await;

    let out = run(&h, Operation::InteractiveSession, StoryState::default())
        .await
        .unwrap();

    assert_eq!(out.world_id.as_deref(), Some("w1"));
    assert_eq!(out.character_id.as_deref(), Some("c1"));
    assert_eq!(out.must_restart_init, Some(false));
    assert_eq!(out.world_summary.as_deref(), Some(SUMMARY));
    assert_eq!(h.io.remaining(), 0);
    assert!(h
        .io
        .said()
        .iter()
        .any(|s| s.contains("'eldoria' already exists")));
    assert_eq!(h.store.len(collections::LORES), 1);
    assert_eq!(h.store.len(collections::WORLDS), 1);
}

/// **Scenario**: Choosing an unknown character loops back to the new-character question.
#[tokio::test]
async fn interactive_session_restarts_on_missing_character() {
    let h = harness(
        &[LORE_JSON, CHARACTER_JSON, SUMMARY],
        &["n", "eldoria", "n", "Bob", "y", "Bob"],
    );
    seed_world_and_character(&h.store).await;

    let out = run(&h, Operation::InteractiveSession, StoryState::default())
        .await
        .unwrap();

    assert_eq!(out.character_name.as_deref(), Some("bob"));
    assert_eq!(out.must_restart_character, Some(false));
    assert_eq!(h.store.len(collections::CHARACTERS), 2);
    assert!(h
        .io
        .said()
        .iter()
        .any(|s| s.contains("'bob' does not exist")));
}

/// **Scenario**: create_world saves the world and one lore, then summarizes.
#[tokio::test]
async fn create_world_saves_world_and_lore() {
    let h = harness(&[WORLD_JSON, LORE_JSON, SUMMARY], &[]);
    let seed = seed_create_world("Eldoria", Some("dark fantasy"), None);

    let out = run(&h, Operation::CreateWorld, seed).await.unwrap();

    assert_eq!(out.world_summary.as_deref(), Some(SUMMARY));
    let world_id = out.world_id.clone().unwrap();
    let world = h.store.get(collections::WORLDS, &world_id).await.unwrap().unwrap();
    assert_eq!(world.text, "Eldoria floats above a sea of mist.");
    assert_eq!(world.meta_str("world_name"), Some("eldoria"));
    assert_eq!(world.meta_str("world_id"), Some(world_id.as_str()));

    let lore = h
        .store
        .find_by_metadata(collections::LORES, &metadata(&[("world_id", world_id.as_str())]))
        .await
        .unwrap();
    assert_eq!(lore.len(), 1);
    assert_eq!(lore[0].meta_str("type"), Some("lore"));
    assert!(h.llm.prompts()[0].contains("dark fantasy"));
    assert!(h.io.transcript().is_empty());
}

/// **Scenario**: A second create_world with the same name fails with EntityExists.
#[tokio::test]
async fn create_world_twice_fails() {
    let h = harness(&[WORLD_JSON, LORE_JSON, SUMMARY], &[]);
    run(&h, Operation::CreateWorld, seed_create_world("Eldoria", None, None))
        .await
        .unwrap();
    let calls = h.llm.call_count();

    let err = run(&h, Operation::CreateWorld, seed_create_world(" ELDORIA ", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityExists { ref kind, ref name }
        if kind == "world" && name == "eldoria"));
    assert_eq!(h.llm.call_count(), calls);
}

/// **Scenario**: Streaming create_world shows save_documents visited twice, world then lore.
#[tokio::test]
async fn create_world_stream_order() {
    let h = harness(&[WORLD_JSON, LORE_JSON, SUMMARY], &[]);
    let compiled = Operation::CreateWorld.compile(&h.services).unwrap();
    let events: Vec<_> = compiled
        .stream(seed_create_world("Eldoria", None, None), LIMIT, [StreamMode::Updates])
        .collect()
        .await;
    let nodes: Vec<String> = events
        .into_iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { node_id, .. } => Some(node_id),
            _ => None,
        })
        .collect();
    assert_eq!(
        nodes,
        vec![
            "check_world_exists",
            "generate_world",
            "save_documents",
            "get_world_context",
            "get_lore_context",
            "generate_lore",
            "save_documents",
            "generate_world_summary",
        ]
    );
}

/// **Scenario**: A recursion limit below the path length stops create_world.
#[tokio::test]
async fn create_world_respects_recursion_limit() {
    let h = harness(&[WORLD_JSON, LORE_JSON, SUMMARY], &[]);
    let compiled = Operation::CreateWorld.compile(&h.services).unwrap();
    let err = compiled
        .invoke(seed_create_world("Eldoria", None, None), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::RecursionLimitExceeded { limit: 3 }));
    assert_eq!(h.store.len(collections::WORLDS), 1);
    assert_eq!(h.store.len(collections::LORES), 0);
}

/// **Scenario**: Unparseable model output is retried and then reported as a parse error.
#[tokio::test]
async fn unparseable_world_fails_after_retries() {
    let h = harness(&["I would rather write a poem."], &[]);
    let err = run(&h, Operation::CreateWorld, seed_create_world("Eldoria", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Parse(_)));
    assert_eq!(h.llm.call_count(), 3);
    assert!(h.store.is_empty(collections::WORLDS));
}

/// **Scenario**: create_character in an existing world stores the character under its new id.
#[tokio::test]
async fn create_character_in_existing_world() {
    let h = harness(&[CHARACTER_JSON], &[]);
    seed_world_and_character(&h.store).await;

    let out = run(&h, Operation::CreateCharacter, seed_create_character("w1", "Bea"))
        .await
        .unwrap();

    assert_eq!(out.world_name.as_deref(), Some("eldoria"));
    let character_id = out.character_id.clone().unwrap();
    assert_ne!(character_id, "c1");
    let doc = h
        .store
        .get(collections::CHARACTERS, &character_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.meta_str("character_name"), Some("bea"));
    assert_eq!(doc.meta_str("world_id"), Some("w1"));
    assert_eq!(out.character_gender.as_deref(), Some("female"));
}

/// **Scenario**: create_character fails for a taken name or an unknown world.
#[tokio::test]
async fn create_character_conflicts() {
    let h = harness(&[CHARACTER_JSON], &[]);
    seed_world_and_character(&h.store).await;

    let err = run(&h, Operation::CreateCharacter, seed_create_character("w1", "ADA"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityExists { .. }));

    let err = run(&h, Operation::CreateCharacter, seed_create_character("w9", "Bea"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityMissing { ref kind, .. } if kind == "world"));
    assert_eq!(h.llm.call_count(), 0);
}

/// **Scenario**: join_game resolves both names to ids and summarizes.
#[tokio::test]
async fn join_game_resolves_ids() {
    let h = harness(&[SUMMARY], &[]);
    seed_world_and_character(&h.store).await;

    let out = run(&h, Operation::JoinGame, seed_join_game("Eldoria", "Ada"))
        .await
        .unwrap();
    assert_eq!(out.world_id.as_deref(), Some("w1"));
    assert_eq!(out.character_id.as_deref(), Some("c1"));
    assert_eq!(out.world_summary.as_deref(), Some(SUMMARY));
    assert!(out.world_context.as_deref().unwrap().contains("sea of mist"));

    let err = run(&h, Operation::JoinGame, seed_join_game("Eldoria", "Zed"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityMissing { ref kind, .. } if kind == "character"));
}

/// **Scenario**: register_action stores the answer as an event that the next prompt sees.
#[tokio::test]
async fn actions_feed_the_next_prompt() {
    let h = harness(
        &["The gate creaks open. What do you do?", "Mist pours through the gate."],
        &[],
    );
    seed_world_and_character(&h.store).await;

    let prompt = run(&h, Operation::NextPrompt, seed_by_ids("w1", Some("c1")))
        .await
        .unwrap();
    let question = prompt.ai_question.clone().unwrap();
    assert_eq!(question, "The gate creaks open. What do you do?");
    assert_eq!(prompt.character_name.as_deref(), Some("ada"));

    let mut seed = seed_by_ids("w1", Some("c1"));
    seed.ai_question = Some(question);
    seed.player_answer = Some("I step through".into());
    let acted = run(&h, Operation::RegisterAction, seed).await.unwrap();
    assert_eq!(
        acted.immediate_events.as_deref(),
        Some("Mist pours through the gate.")
    );
    assert_eq!(h.store.len(collections::EVENTS), 1);

    let again = run(&h, Operation::NextPrompt, seed_by_ids("w1", Some("c1")))
        .await
        .unwrap();
    assert!(again
        .event_context
        .as_deref()
        .unwrap()
        .contains("Answer: I step through"));
}

/// **Scenario**: A character id from another world is treated as missing.
#[tokio::test]
async fn next_prompt_rejects_foreign_character() {
    let h = harness(&["unused"], &[]);
    seed_world_and_character(&h.store).await;
    h.store
        .add(
            collections::WORLDS,
            Document::new("w2", "Another world.", metadata(&[("world_name", "other")])),
        )
        .await
        .unwrap();

    let err = run(&h, Operation::NextPrompt, seed_by_ids("w2", Some("c1")))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityMissing { ref kind, .. } if kind == "character"));
}

/// **Scenario**: world_synopsis summarizes a world by id without a character.
#[tokio::test]
async fn world_synopsis_by_id() {
    let h = harness(&[SUMMARY], &[]);
    seed_world_and_character(&h.store).await;

    let out = run(&h, Operation::WorldSynopsis, seed_by_ids("w1", None))
        .await
        .unwrap();
    assert_eq!(out.world_summary.as_deref(), Some(SUMMARY));
    assert_eq!(out.world_name.as_deref(), Some("eldoria"));
    assert_eq!(out.source, Some(Source::Api));
    assert!(out
        .character_context
        .as_deref()
        .unwrap()
        .contains("cartographer"));

    let err = run(&h, Operation::WorldSynopsis, seed_by_ids("nope", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EntityMissing { .. }));
}

/// **Scenario**: The question loop asks every question in order and keys the answers.
#[tokio::test]
async fn question_loop_collects_answers() {
    let h = harness(&[], &["Eldoria", "dark fantasy", " airships "]);
    let questions = world_building_questions();
    let count = questions.len();
    let compiled = question_loop(&h.services, questions)
        .unwrap()
        .compile()
        .unwrap();

    let out = compiled.invoke(StoryState::default(), LIMIT).await.unwrap();
    let responses = out.responses.unwrap();
    assert_eq!(responses.len(), count);
    assert_eq!(responses["world_name"], "Eldoria");
    assert_eq!(responses["world_genre"], "dark fantasy");
    assert_eq!(responses["story_directives"], "airships");
    assert_eq!(out.question_index, Some(count));
    assert!(out.current_question.is_none());
}
