use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use stepwright_engine::refactor::{Collaborators, DocumentWriter, RefactorError, RephraseRefactorer, RunnerTimeouts};
use stepwright_engine::{DocumentSource, RefactoringResult, build_concept_dictionary, parse_concept_document, parse_specification};
use stepwright_runner::{DiscoveryService, RunnerConnection, RunnerError, RunnerLauncher, RunnerSession};
use stepwright_types::{
    ConceptDictionary, Message, MessageType, ParameterPosition, ParseResult, RefactorRequest, RefactorResponse, Specification,
    StepNameResponse,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

// ---------------------------------------------------------------------------
// Collaborator fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemorySource {
    specs: Vec<(PathBuf, String)>,
    concepts: Vec<(PathBuf, String)>,
}

impl MemorySource {
    fn spec(mut self, path: &str, text: &str) -> Self {
        self.specs.push((PathBuf::from(path), text.to_string()));
        self
    }

    fn concept(mut self, path: &str, text: &str) -> Self {
        self.concepts.push((PathBuf::from(path), text.to_string()));
        self
    }
}

impl DocumentSource for MemorySource {
    fn find_specifications(&self) -> (Vec<Specification>, Vec<ParseResult>) {
        self.specs.iter().map(|(path, text)| parse_specification(text, path)).unzip()
    }

    fn build_concept_dictionary(&self) -> (ConceptDictionary, ParseResult) {
        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (path, text) in &self.concepts {
            let (document, result) = parse_concept_document(text, path);
            documents.push(document);
            failures.extend(result.errors);
        }
        let (dictionary, mut result) = build_concept_dictionary(documents);
        for error in failures {
            result.add_error(error);
        }
        (dictionary, result)
    }
}

#[derive(Default)]
struct MemoryWriter {
    files: Mutex<IndexMap<PathBuf, String>>,
}

impl MemoryWriter {
    fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    fn count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl DocumentWriter for MemoryWriter {
    fn write(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// How the scripted runner answers a refactor request.
#[derive(Clone)]
enum RefactorReply {
    Respond(RefactorResponse),
    TimeOut,
}

#[derive(Clone)]
struct Script {
    step_name: StepNameResponse,
    refactor: RefactorReply,
}

impl Script {
    fn implemented(step_name: &str, files: &[&str]) -> Self {
        Self {
            step_name: StepNameResponse {
                is_step_present: true,
                has_alias: false,
                step_name: vec![step_name.to_string()],
            },
            refactor: RefactorReply::Respond(RefactorResponse {
                success: true,
                error: None,
                files_changed: files.iter().map(|file| file.to_string()).collect(),
            }),
        }
    }
}

#[derive(Default)]
struct Journal {
    requests: Mutex<Vec<Message>>,
    launches: AtomicUsize,
    releases: AtomicUsize,
}

impl Journal {
    fn refactor_request(&self) -> Option<RefactorRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find_map(|message| message.refactor_request.clone())
    }
}

struct ScriptedSession {
    script: Script,
    journal: Arc<Journal>,
}

#[async_trait]
impl RunnerSession for ScriptedSession {
    async fn request(&mut self, message: Message, timeout: Duration) -> Result<Message, RunnerError> {
        let message_type = message.message_type;
        self.journal.requests.lock().unwrap().push(message);
        match message_type {
            MessageType::StepNameRequest => Ok(Message::step_name_response(self.script.step_name.clone())),
            MessageType::RefactorRequest => match &self.script.refactor {
                RefactorReply::Respond(response) => Ok(Message::refactor_response(response.clone())),
                RefactorReply::TimeOut => Err(RunnerError::timeout("RefactorRequest", timeout.as_millis() as u64)),
            },
            other => Err(RunnerError::protocol(format!("unexpected {other:?}"))),
        }
    }

    async fn release(&mut self) {
        self.journal.releases.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedLauncher {
    script: Option<Script>,
    journal: Arc<Journal>,
}

impl ScriptedLauncher {
    fn new(script: Script) -> Self {
        Self {
            script: Some(script),
            journal: Arc::default(),
        }
    }

    fn unavailable() -> Self {
        Self {
            script: None,
            journal: Arc::default(),
        }
    }
}

#[async_trait]
impl RunnerLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn RunnerSession>, RunnerError> {
        self.journal.launches.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Some(script) => Ok(Box::new(ScriptedSession {
                script: script.clone(),
                journal: self.journal.clone(),
            })),
            None => Err(RunnerError::startup_failed("java", "command not found")),
        }
    }
}

async fn run(old: &str, new: &str, source: &MemorySource, writer: &MemoryWriter, launcher: &dyn RunnerLauncher) -> RefactoringResult {
    let refactorer = RephraseRefactorer::new(old, new).expect("valid phrases");
    let collaborators = Collaborators {
        source,
        writer,
        launcher,
        timeouts: RunnerTimeouts::default(),
    };
    refactorer.perform(&collaborators).await
}

const BANK_SPEC: &str = "# Bank\n\n## Deposit\n\n* enter <amount> dollars\n";

// ---------------------------------------------------------------------------
// Document and runner layers together
// ---------------------------------------------------------------------------

#[tokio::test]
async fn renames_documents_and_implementation() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("enter <amount> dollars", &["src/BankSteps.java"]));

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(result.is_success(), "{:?}", result.error_messages());
    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/bank.spec")]);
    assert_eq!(result.runner_files_changed, vec!["src/BankSteps.java".to_string()]);
    assert_eq!(
        writer.contents("specs/bank.spec").as_deref(),
        Some("# Bank\n\n## Deposit\n\n* deposit <amount> dollars\n")
    );

    let requests = launcher.journal.requests.lock().unwrap().clone();
    assert_eq!(requests[0].step_name_request.as_ref().map(|request| request.step_value.as_str()), Some("enter {} dollars"));
    let request = launcher.journal.refactor_request().expect("refactor request");
    assert_eq!(
        request.param_positions,
        vec![ParameterPosition {
            new_position: 0,
            old_position: 0
        }]
    );
    assert_eq!(request.new_step_value.parameterized_step_value, "deposit <amount> dollars");
    assert_eq!(launcher.journal.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reordered_parameters_reach_documents_and_runner() {
    let source = MemorySource::default().spec("specs/move.spec", "# Move\n## Transfer\n* transfer \"10\" to \"savings\"\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("transfer <source> to <target>", &["steps.py"]));

    let result = run("transfer <from> to <to>", "transfer <to> from <from>", &source, &writer, &launcher).await;
    assert!(result.is_success());

    let written = writer.contents("specs/move.spec").expect("written");
    assert!(written.contains("* transfer \"savings\" from \"10\""), "{written}");

    let request = launcher.journal.refactor_request().expect("refactor request");
    assert_eq!(request.old_step_value.parameters, vec!["source".to_string(), "target".to_string()]);
    assert_eq!(request.new_step_value.step_value, "transfer {} from {}");
    assert_eq!(request.new_step_value.parameters, vec!["target".to_string(), "source".to_string()]);
    assert_eq!(
        request.param_positions,
        vec![
            ParameterPosition {
                new_position: 0,
                old_position: 1
            },
            ParameterPosition {
                new_position: 1,
                old_position: 0
            },
        ]
    );
}

#[tokio::test]
async fn inline_tables_travel_as_the_table_parameter() {
    let source = MemorySource::default().spec("specs/users.spec", "# Users\n## Setup\n* add users\n|id|\n|1 |\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("add users <table>", &["steps.rb"]));

    let result = run("add users <table>", "create users <table>", &source, &writer, &launcher).await;

    assert!(result.is_success(), "{:?}", result.error_messages());
    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/users.spec")]);
    assert_eq!(
        writer.contents("specs/users.spec").as_deref(),
        Some("# Users\n\n## Setup\n\n* create users\n   |id|\n   |--|\n   |1 |\n")
    );

    let requests = launcher.journal.requests.lock().unwrap().clone();
    assert_eq!(requests[0].step_name_request.as_ref().map(|request| request.step_value.as_str()), Some("add users {}"));
    let request = launcher.journal.refactor_request().expect("refactor request");
    assert_eq!(request.old_step_value.parameters, vec!["table".to_string()]);
    assert_eq!(request.new_step_value.step_value, "create users {}");
    assert_eq!(request.new_step_value.parameters, vec!["table".to_string()]);
    assert_eq!(
        request.param_positions,
        vec![ParameterPosition {
            new_position: 0,
            old_position: 0
        }]
    );
}

#[tokio::test]
async fn specifications_without_the_step_are_left_alone() {
    let source = MemorySource::default()
        .spec("specs/bank.spec", BANK_SPEC)
        .spec("specs/other.spec", "# Other\n## Browse\n* enter <amount> dollars twice\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("enter <amount> dollars", &[]));

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/bank.spec")]);
    assert_eq!(writer.count(), 1);
    assert!(writer.contents("specs/other.spec").is_none());
}

// ---------------------------------------------------------------------------
// Runner failures keep document changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_implementation_keeps_document_changes() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let mut script = Script::implemented("unused", &["never.java"]);
    script.step_name = StepNameResponse::default();
    let launcher = ScriptedLauncher::new(script);

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/bank.spec")]);
    assert!(result.runner_files_changed.is_empty());
    assert_eq!(
        result.error_messages(),
        vec!["Step implementation not found: enter <amount> dollars".to_string()]
    );
    assert!(launcher.journal.refactor_request().is_none());
    assert_eq!(launcher.journal.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn aliased_steps_are_refused() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let mut script = Script::implemented("unused", &[]);
    script.step_name = StepNameResponse {
        is_step_present: true,
        has_alias: true,
        step_name: vec!["stepA".into(), "stepB".into()],
    };
    let launcher = ScriptedLauncher::new(script);

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    let message = &result.error_messages()[0];
    assert!(message.contains("'stepA', 'stepB'"), "{message}");
    assert_eq!(launcher.journal.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refactor_timeout_becomes_a_partial_failure() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let mut script = Script::implemented("enter <amount> dollars", &[]);
    script.refactor = RefactorReply::TimeOut;
    let launcher = ScriptedLauncher::new(script);

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert_eq!(result.specs_changed.len(), 1);
    let error = &result.errors()[0];
    assert!(matches!(error, RefactorError::PartialRefactor(_)));
    assert!(matches!(error.root(), RefactorError::TransportTimeout(_)));
    assert!(error.to_string().starts_with("Only spec files and concepts refactored: Timeout error"));
    assert_eq!(launcher.journal.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn runner_rejection_is_reported_with_context() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let mut script = Script::implemented("enter <amount> dollars", &[]);
    script.refactor = RefactorReply::Respond(RefactorResponse::failed("Step implementation is read-only"));
    let launcher = ScriptedLauncher::new(script);

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert_eq!(
        result.error_messages(),
        vec!["Only spec files and concepts refactored: Step implementation is read-only".to_string()]
    );
    assert!(matches!(result.errors()[0].root(), RefactorError::RunnerRejected(_)));
}

#[tokio::test]
async fn unreachable_runner_is_a_discovery_failure() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::unavailable();

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert_eq!(writer.count(), 1);
    assert!(matches!(&result.errors()[0], RefactorError::DiscoveryFailure(message) if message.starts_with("Failed to connect to test runner")));
    assert_eq!(launcher.journal.releases.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Concepts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn renaming_a_concept_header_sets_the_concept_flag() {
    let source = MemorySource::default()
        .spec("specs/shop.spec", "# Shop\n## Buy\n* login as \"bob\"\n")
        .concept("specs/login.cpt", "# login as <user>\n* open the login page\n* type <user>\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("login as <user>", &[]));

    let result = run("login as <user>", "sign in as <user>", &source, &writer, &launcher).await;

    assert!(result.concept_renamed);
    assert_eq!(result.concepts_changed, vec![PathBuf::from("specs/login.cpt")]);
    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/shop.spec")]);
    assert!(writer.contents("specs/login.cpt").expect("concept written").starts_with("# sign in as <user>\n"));
}

#[tokio::test]
async fn using_a_step_inside_a_concept_leaves_the_flag_unset() {
    let source = MemorySource::default().concept("specs/login.cpt", "# login as <user>\n* open the login page\n* type <user>\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("open the login page", &[]));

    let result = run("open the login page", "visit the login page", &source, &writer, &launcher).await;

    assert!(!result.concept_renamed);
    assert_eq!(result.concepts_changed, vec![PathBuf::from("specs/login.cpt")]);
    assert_eq!(
        result.all_files_changed(),
        vec![PathBuf::from("specs/login.cpt")]
    );
}

// ---------------------------------------------------------------------------
// Pre-check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn parse_errors_stop_before_any_change() {
    let source = MemorySource::default()
        .spec("specs/bank.spec", BANK_SPEC)
        .spec("specs/broken.spec", "# Broken\n## S\n* enter \"100 dollars\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("enter <amount> dollars", &[]));

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert!(matches!(&result.errors()[0], RefactorError::ParseFailure(message) if message.contains("specs/broken.spec:3")));
    assert!(result.specs_changed.is_empty());
    assert_eq!(writer.count(), 0);
    assert_eq!(launcher.journal.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concept_errors_stop_before_any_change() {
    let source = MemorySource::default()
        .spec("specs/bank.spec", BANK_SPEC)
        .concept("specs/a.cpt", "# log out\n* press logout\n")
        .concept("specs/b.cpt", "# log out\n* click logout\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("enter <amount> dollars", &[]));

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(!result.is_success());
    assert_eq!(writer.count(), 0);
    assert_eq!(launcher.journal.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pre_check_warnings_reach_the_final_result() {
    let source = MemorySource::default()
        .spec("specs/bank.spec", BANK_SPEC)
        .spec("specs/empty.spec", "# Empty\n## Nothing yet\n");
    let writer = MemoryWriter::default();
    let launcher = ScriptedLauncher::new(Script::implemented("enter <amount> dollars", &[]));

    let result = run("enter <amount> dollars", "deposit <amount> dollars", &source, &writer, &launcher).await;

    assert!(result.is_success());
    assert!(result.warnings.iter().any(|warning| warning.contains("Nothing yet")));
}

#[tokio::test]
async fn identical_phrases_are_invalid_input() {
    let error = RephraseRefactorer::new("enter <amount> dollars", "enter <amount> dollars").expect_err("same phrase");
    assert_eq!(error, RefactorError::InvalidInput);
    assert_eq!(RefactoringResult::failure(error).error_messages(), vec!["Same old step name and new step name.".to_string()]);
}

// ---------------------------------------------------------------------------
// Loopback transport
// ---------------------------------------------------------------------------

/// A session over a real loopback connection to an in-process runner.
struct LoopbackSession {
    connection: RunnerConnection,
    released: Arc<AtomicBool>,
}

#[async_trait]
impl RunnerSession for LoopbackSession {
    async fn request(&mut self, message: Message, timeout: Duration) -> Result<Message, RunnerError> {
        self.connection.request(message, timeout).await
    }

    async fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Starts a runner task that answers step name requests and never answers a
/// refactor request.
struct SilentRefactorLauncher {
    released: Arc<AtomicBool>,
}

#[async_trait]
impl RunnerLauncher for SilentRefactorLauncher {
    async fn launch(&self) -> Result<Box<dyn RunnerSession>, RunnerError> {
        let discovery = DiscoveryService::start(0).await?;
        let port = discovery.port();

        tokio::spawn(async move {
            let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await else {
                return;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let Ok(request) = serde_json::from_str::<Message>(&line) else {
                    continue;
                };
                if request.message_type != MessageType::StepNameRequest {
                    continue;
                }
                let reply = Message::step_name_response(StepNameResponse {
                    is_step_present: true,
                    has_alias: false,
                    step_name: vec!["enter <amount> dollars".into()],
                })
                .with_id(request.message_id);
                let mut encoded = serde_json::to_string(&reply).unwrap_or_default();
                encoded.push('\n');
                if write_half.write_all(encoded.as_bytes()).await.is_err() {
                    return;
                }
            }
        });

        let stream = discovery.accept(Duration::from_secs(5)).await?;
        Ok(Box::new(LoopbackSession {
            connection: RunnerConnection::new(stream),
            released: self.released.clone(),
        }))
    }
}

#[tokio::test]
async fn silent_runner_times_out_over_tcp() {
    let source = MemorySource::default().spec("specs/bank.spec", BANK_SPEC);
    let writer = MemoryWriter::default();
    let launcher = SilentRefactorLauncher {
        released: Arc::default(),
    };
    let refactorer = RephraseRefactorer::new("enter <amount> dollars", "deposit <amount> dollars").expect("valid phrases");
    let collaborators = Collaborators {
        source: &source,
        writer: &writer,
        launcher: &launcher,
        timeouts: RunnerTimeouts {
            step_name: Duration::from_secs(5),
            refactor: Duration::from_millis(100),
        },
    };

    let result = refactorer.perform(&collaborators).await;

    assert!(!result.is_success());
    assert_eq!(result.specs_changed, vec![PathBuf::from("specs/bank.spec")]);
    assert!(matches!(result.errors()[0].root(), RefactorError::TransportTimeout(_)));
    assert!(launcher.released.load(Ordering::SeqCst));
}
