//! Shared types for Stepwright.
//!
//! - [`document`]: specifications, concepts and the steps inside them
//! - [`messages`]: the request/response envelope spoken with language runners
//! - [`parse`]: parse errors, warnings and per-document results

pub mod document;
pub mod messages;
pub mod parse;

pub use document::{
    ArgKind, Comment, Concept, ConceptDictionary, ConceptDocument, Fragment, Heading, Item, STEP_VALUE_PLACEHOLDER, Scenario,
    Specification, Step, StepArg, TABLE_PARAMETER, Table, Tags,
};
pub use messages::{
    KillProcessRequest, Message, MessageType, ParameterPosition, RefactorRequest, RefactorResponse, StepNameRequest, StepNameResponse,
    StepValue,
};
pub use parse::{ParseError, ParseResult, Warning};
