//! End-to-end pipeline tests over a deterministic embedder, the in-memory
//! index, and a scripted chat client.

use docquery_core::config::{ChunkingConfig, SynthesisConfig};
use docquery_llm::{
    AssistantMessage, ChatChoice, ChatClient, ChatCompletion, ChatRequest, LlmError,
};
use docquery_retrieval::synthesize::{AnswerSynthesizer, RATE_LIMIT_ANSWER};
use docquery_retrieval::{
    DocumentLoader, HashedProvider, MemoryBackend, QueryPipeline, NO_CONTEXT_ANSWER,
};
use httpmock::prelude::*;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Chat client that pops one scripted outcome per call and records every
/// request it receives.
struct ScriptedClient {
    outcomes: Mutex<Vec<Result<ChatCompletion, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(outcomes: Vec<Result<ChatCompletion, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn answering(answers: &[&str]) -> Arc<Self> {
        Self::new(answers.iter().map(|a| Ok(completion(a))).collect())
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn user_prompt(&self, call: usize) -> String {
        self.requests.lock().unwrap()[call].messages[1].content.clone()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes.lock().unwrap().remove(0)
    }
}

fn completion(content: &str) -> ChatCompletion {
    ChatCompletion {
        choices: vec![ChatChoice {
            message: Some(AssistantMessage {
                content: Some(content.to_string()),
            }),
        }],
    }
}

fn pipeline(client: Arc<ScriptedClient>) -> QueryPipeline {
    let config = SynthesisConfig {
        max_context_chunks: 2,
        max_retries: 0,
        ..Default::default()
    };
    QueryPipeline::new(
        DocumentLoader::new().unwrap(),
        Arc::new(HashedProvider::new(64)),
        Arc::new(MemoryBackend),
        AnswerSynthesizer::new(client, config),
        ChunkingConfig {
            chunk_size: 12,
            chunk_overlap: 2,
        },
        // Small batch so multi-chunk documents exercise the batching path
        2,
        2,
    )
}

const POLICY_TEXT: &str = "The grace period for premium payment is thirty days \
    from the due date without losing continuity benefits. \
    The waiting period for pre-existing diseases is thirty six months of \
    continuous coverage from the first policy inception. \
    Maternity expenses are covered after twenty four months of continuous \
    coverage with a limit of two deliveries per policy period.";

fn questions(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|q| q.to_string()).collect()
}

#[tokio::test]
async fn test_one_answer_per_question_in_order() {
    let client = ScriptedClient::answering(&["Thirty days.", "Thirty six months."]);
    let pipeline = pipeline(client.clone());

    let answers = pipeline
        .answer_from_text(
            POLICY_TEXT,
            "https://example.com/policy.pdf",
            &questions(&[
                "What is the grace period for premium payment?",
                "What is the waiting period for pre-existing diseases?",
            ]),
        )
        .await
        .unwrap();

    assert_eq!(answers, vec!["Thirty days.", "Thirty six months."]);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_failing_question_degrades_without_disturbing_neighbors() {
    let client = ScriptedClient::new(vec![
        Ok(completion("First answer.")),
        Err(LlmError::RateLimited),
        Ok(completion("Third answer.")),
    ]);
    let pipeline = pipeline(client);

    let answers = pipeline
        .answer_from_text(
            POLICY_TEXT,
            "https://example.com/policy.pdf",
            &questions(&[
                "What is the grace period?",
                "What is the waiting period?",
                "Are maternity expenses covered?",
            ]),
        )
        .await
        .unwrap();

    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0], "First answer.");
    assert_eq!(answers[1], RATE_LIMIT_ANSWER);
    assert_eq!(answers[2], "Third answer.");
}

#[tokio::test]
async fn test_empty_document_yields_sentinel_without_model_calls() {
    let client = ScriptedClient::new(vec![]);
    let pipeline = pipeline(client.clone());

    let answers = pipeline
        .answer_from_text(
            "   \n\t  ",
            "https://example.com/blank.pdf",
            &questions(&["What is covered?", "What is excluded?"]),
        )
        .await
        .unwrap();

    assert_eq!(answers, vec![NO_CONTEXT_ANSWER, NO_CONTEXT_ANSWER]);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_no_questions_touches_nothing() {
    let client = ScriptedClient::new(vec![]);
    let pipeline = pipeline(client.clone());

    let answers = pipeline
        .answer_from_text(POLICY_TEXT, "https://example.com/policy.pdf", &[])
        .await
        .unwrap();

    assert!(answers.is_empty());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_prompt_carries_the_relevant_chunk() {
    let client = ScriptedClient::answering(&["ok"]);
    let pipeline = pipeline(client.clone());

    // Word overlap makes the grace-period chunk the nearest neighbor under
    // the feature-hashing embedder.
    pipeline
        .answer_from_text(
            POLICY_TEXT,
            "https://example.com/policy.pdf",
            &questions(&["What is the grace period for premium payment?"]),
        )
        .await
        .unwrap();

    let prompt = client.user_prompt(0);
    assert!(prompt.contains("[Document Section 1]:"));
    assert!(prompt.contains("grace period"));
    assert!(prompt.contains("What is the grace period for premium payment?"));
}

/// Build a minimal DOCX archive in memory.
fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_run_fetches_and_answers_over_http() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/policy.docx");
            then.status(200)
                .header(
                    "content-type",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                )
                .body(docx_bytes(&[
                    "The grace period for premium payment is thirty days.",
                    "The policy covers hospitalization expenses.",
                ]));
        })
        .await;

    let client = ScriptedClient::answering(&["Thirty days."]);
    let pipeline = pipeline(client);

    let answers = pipeline
        .run(
            &server.url("/policy.docx"),
            &questions(&["What is the grace period?"]),
        )
        .await
        .unwrap();

    assert_eq!(answers, vec!["Thirty days."]);
}

#[tokio::test]
async fn test_run_propagates_fetch_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone.pdf");
            then.status(404);
        })
        .await;

    let client = ScriptedClient::new(vec![]);
    let pipeline = pipeline(client);

    let err = pipeline
        .run(&server.url("/gone.pdf"), &questions(&["Anything?"]))
        .await
        .unwrap_err();
    assert!(matches!(err, docquery_core::AppError::DocumentFetch(_)));
}
