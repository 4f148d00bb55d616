use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use madlib_core::suggest::{fetch_color, fetch_words};
use madlib_core::{
    Canvas, Conversation, GenerateError, GenerateRequest, Generator, InputGate, ModelSet, Palette,
};
use pretty_assertions::assert_eq;

/// Replays canned results and records every request it sees
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerateError>>>,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<String, GenerateError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerateError::Decode("script exhausted".into())))
    }
}

#[tokio::test]
async fn test_story_session_round() {
    let generator = ScriptedGenerator::new(vec![
        Ok("The moon rolled off the table.".into()),
        Err(GenerateError::Decode("connection reset".into())),
        Ok(" Nobody picked it up. ".into()),
    ]);
    let mut conversation = Conversation::new(ModelSet::default(), 200);

    let request = conversation.initial_turn();
    let reply = generator.generate(&request).await;
    conversation.resolve(reply);

    let request = conversation.submit_turn("It rolled to the door.").unwrap();
    assert!(conversation.transcript().rendered().ends_with("AI is thinking..."));
    let reply = generator.generate(&request).await;
    conversation.resolve(reply);

    let request = conversation.submit_turn("It knocked twice.").unwrap();
    let reply = generator.generate(&request).await;
    conversation.resolve(reply);

    let prompts: Vec<String> = generator.seen().into_iter().map(|r| r.prompt).collect();
    assert_eq!(
        prompts,
        vec![
            "mm_writer_start".to_string(),
            "The moon rolled off the table. It rolled to the door.".to_string(),
            "The moon rolled off the table. It rolled to the door. It knocked twice.".to_string(),
        ]
    );

    assert_eq!(
        conversation.story(),
        "The moon rolled off the table. It rolled to the door. It knocked twice. Nobody picked it up."
    );
    assert!(conversation
        .transcript()
        .rendered()
        .contains("Error: invalid response: connection reset"));
    assert_eq!(conversation.gate(), InputGate::Open);
}

#[tokio::test]
async fn test_story_locks_after_budget() {
    let long_reply = vec!["word"; 198].join(" ");
    let generator = ScriptedGenerator::new(vec![Ok(long_reply), Ok("end".into())]);
    let mut conversation = Conversation::new(ModelSet::default(), 200);

    let request = conversation.initial_turn();
    conversation.resolve(generator.generate(&request).await);
    assert_eq!(conversation.gate(), InputGate::Open);

    let request = conversation.submit_turn("almost").unwrap();
    conversation.resolve(generator.generate(&request).await);

    assert_eq!(conversation.word_count(), 200);
    assert_eq!(conversation.gate(), InputGate::Locked);
    assert!(conversation.submit_turn("one more").is_err());
}

#[tokio::test]
async fn test_palette_fills_from_word_fetch() {
    let generator = ScriptedGenerator::new(vec![Ok(
        "salt, tide, lantern, hush, ember, drift, quill, fog, moss, brine, gale, dune".into(),
    )]);
    let models = ModelSet::default();

    let words = fetch_words(&generator, &models, Some("sea")).await.unwrap();
    let mut palette = Palette::new();
    palette.extend(words);

    let listed: Vec<&str> = palette.entries().iter().map(|e| e.word.as_str()).collect();
    assert_eq!(
        listed,
        vec!["salt", "tide", "lantern", "hush", "ember", "drift", "quill", "fog"]
    );

    let seen = generator.seen();
    assert_eq!(seen[0].prompt, "sea");
    assert_eq!(seen[0].model, "mm_mistral");
    assert_eq!(seen[0].options, None);
}

#[tokio::test]
async fn test_failed_word_fetch_leaves_palette_alone() {
    let generator = ScriptedGenerator::new(vec![Err(GenerateError::Decode("down".into()))]);
    let mut palette = Palette::new();
    if let Ok(words) = fetch_words(&generator, &ModelSet::default(), None).await {
        palette.extend(words);
    }
    assert!(palette.is_empty());
    assert_eq!(generator.seen()[0].prompt, "mm_filler_words");
}

#[tokio::test]
async fn test_color_description_styles_tile() {
    let generator = ScriptedGenerator::new(vec![
        Ok("Try #2E8B57 for a sea green".into()),
        Ok("I cannot help with that".into()),
    ]);
    let models = ModelSet::default();
    let mut canvas = Canvas::new(400.0, 400.0);
    let id = canvas.add_tile("kelp");

    let color = fetch_color(&generator, &models, "sea green").await;
    assert!(canvas.apply_style_to(id, madlib_core::StyleEdit::Foreground(color)));
    assert_eq!(canvas.tile(id).unwrap().foreground.as_str(), "#2e8b57");

    let color = fetch_color(&generator, &models, "something").await;
    assert_eq!(color.as_str(), "#000000");
}
