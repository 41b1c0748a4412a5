//! In-memory document model for specifications and concepts.
//!
//! Documents are produced by the engine's parser and are the unit the refactor
//! core visits and mutates. Every item in a document body is one of the closed
//! [`Item`] variants; only [`Item::Step`] takes part in step renames.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder used in a step's normalized value for every argument.
pub const STEP_VALUE_PLACEHOLDER: &str = "{}";

/// Parameter name that stands for an inline table in a phrase, as in `add users <table>`.
pub const TABLE_PARAMETER: &str = "table";

/// How an argument was written inside a step phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgKind {
    /// Quoted literal, e.g. `"100"`.
    Static,
    /// Angle-bracket reference, e.g. `<amount>`.
    Dynamic,
    /// Inline table written below the step. Always the last argument.
    Table,
}

/// A single argument of a step occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepArg {
    pub kind: ArgKind,
    /// Text between the delimiters, unescaped.
    pub value: String,
}

impl StepArg {
    pub fn new_static(value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Static,
            value: value.into(),
        }
    }

    pub fn new_dynamic(value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Dynamic,
            value: value.into(),
        }
    }

    pub fn new_table() -> Self {
        Self {
            kind: ArgKind::Table,
            value: TABLE_PARAMETER.to_string(),
        }
    }

    /// Render the argument with its delimiters, as it appears in a phrase.
    pub fn render(&self) -> String {
        match self.kind {
            ArgKind::Static => format!("\"{}\"", self.value.replace('"', "\\\"")),
            ArgKind::Dynamic | ArgKind::Table => format!("<{}>", self.value),
        }
    }
}

/// A literal or parameter segment of a step phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    Text(String),
    Parameter(StepArg),
}

/// A step occurrence inside a specification or concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Normalized phrase with every argument replaced by `{}`.
    pub value: String,
    /// Phrase as written (without the leading `*`).
    pub line_text: String,
    /// 1-based line number in the source document; 0 for synthesized steps.
    pub line_no: usize,
    /// Arguments in phrase order.
    pub args: Vec<StepArg>,
    /// Phrase decomposed into text and parameter fragments.
    pub fragments: Vec<Fragment>,
    /// Table attached directly below the step, if any.
    pub inline_table: Option<Table>,
}

impl Step {
    /// Whether `self` and `other` denote the same step signature.
    ///
    /// Comparison is on the normalized value so argument spelling does not matter
    /// and one phrase being a substring of another never matches.
    pub fn same_signature(&self, other: &Step) -> bool {
        self.value.trim() == other.value.trim()
    }

    pub fn has_inline_table(&self) -> bool {
        self.inline_table.is_some()
    }

    /// Phrase text reconstructed from the fragments.
    pub fn render_text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.clone(),
                Fragment::Parameter(arg) => arg.render(),
            })
            .collect()
    }

    /// Attach a table written directly below the step.
    ///
    /// The table becomes the step's last argument, so `* add users` followed by
    /// rows has the value `add users {}` and matches the phrase `add users <table>`.
    pub fn attach_inline_table(&mut self, table: Table) {
        if self.inline_table.is_none() {
            self.value = format!("{} {STEP_VALUE_PLACEHOLDER}", self.value).trim().to_string();
            self.args.push(StepArg::new_table());
        }
        self.inline_table = Some(table);
    }

    /// Rebuild this step from a template phrase and a replacement argument list.
    ///
    /// The template supplies the literal text; its parameter fragments are filled,
    /// in order, from `args`. A table argument is not written into the phrase: it
    /// keeps the inline table attached and moves to the end of the arguments. When
    /// no table argument is left the inline table is dropped. The line number is
    /// kept.
    pub fn rephrase(&mut self, template: &Step, args: Vec<StepArg>) {
        let mut remaining = args.into_iter();
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut phrase_args = Vec::new();
        let mut table_arg = None;
        let mut after_table = false;

        for fragment in &template.fragments {
            match fragment {
                Fragment::Text(text) if after_table => {
                    let rest = text.trim_start();
                    if !rest.is_empty() {
                        let glue = if fragments.is_empty() { "" } else { " " };
                        fragments.push(Fragment::Text(format!("{glue}{rest}")));
                    }
                    after_table = false;
                }
                Fragment::Text(text) => fragments.push(Fragment::Text(text.clone())),
                Fragment::Parameter(placeholder) => {
                    let arg = remaining.next().unwrap_or_else(|| placeholder.clone());
                    if arg.kind == ArgKind::Table {
                        if let Some(Fragment::Text(text)) = fragments.last_mut() {
                            let kept = text.trim_end().len();
                            text.truncate(kept);
                        }
                        table_arg = Some(arg);
                        after_table = true;
                    } else {
                        if after_table && !fragments.is_empty() {
                            fragments.push(Fragment::Text(" ".into()));
                        }
                        after_table = false;
                        phrase_args.push(arg.clone());
                        fragments.push(Fragment::Parameter(arg));
                    }
                }
            }
        }

        self.value = fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.as_str(),
                Fragment::Parameter(_) => STEP_VALUE_PLACEHOLDER,
            })
            .collect::<String>()
            .trim()
            .to_string();
        self.fragments = fragments;
        self.args = phrase_args;
        match table_arg {
            Some(table_arg) if self.inline_table.is_some() => {
                self.value = format!("{} {STEP_VALUE_PLACEHOLDER}", self.value).trim().to_string();
                self.args.push(table_arg);
            }
            _ => self.inline_table = None,
        }
        self.line_text = self.render_text().trim().to_string();
    }
}

/// A table made of a header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    pub values: Vec<String>,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub line_no: usize,
}

/// Body item of a specification, scenario or concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Step(Step),
    Comment(Comment),
    Table(Table),
    Tags(Tags),
}

impl Item {
    pub fn as_step(&self) -> Option<&Step> {
        match self {
            Item::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn as_step_mut(&mut self) -> Option<&mut Step> {
        match self {
            Item::Step(step) => Some(step),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub heading: Heading,
    pub items: Vec<Item>,
}

/// A parsed `.spec` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub file_name: PathBuf,
    /// Comments and tags that precede the heading.
    pub preamble: Vec<Item>,
    pub heading: Option<Heading>,
    /// Items before the first scenario (context steps, tags, comments, data tables).
    pub items: Vec<Item>,
    pub scenarios: Vec<Scenario>,
}

impl Specification {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            preamble: Vec::new(),
            heading: None,
            items: Vec::new(),
            scenarios: Vec::new(),
        }
    }

    /// Every step occurrence in document order, context steps first.
    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.items
            .iter_mut()
            .chain(self.scenarios.iter_mut().flat_map(|scenario| scenario.items.iter_mut()))
            .filter_map(Item::as_step_mut)
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.items
            .iter()
            .chain(self.scenarios.iter().flat_map(|scenario| scenario.items.iter()))
            .filter_map(Item::as_step)
    }
}

/// A concept definition: its defining header phrase and the body it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub header: Step,
    pub items: Vec<Item>,
}

/// A parsed `.cpt` document holding one or more concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDocument {
    pub file_name: PathBuf,
    /// Comments that precede the first concept header.
    pub preamble: Vec<Item>,
    pub concepts: Vec<Concept>,
}

impl ConceptDocument {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            preamble: Vec::new(),
            concepts: Vec::new(),
        }
    }
}

/// All concept documents of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDictionary {
    pub documents: Vec<ConceptDocument>,
}

impl ConceptDictionary {
    /// Find the concept whose header has the given normalized value.
    pub fn find(&self, step_value: &str) -> Option<(&Path, &Concept)> {
        self.documents.iter().find_map(|document| {
            document
                .concepts
                .iter()
                .find(|concept| concept.header.value.trim() == step_value.trim())
                .map(|concept| (document.file_name.as_path(), concept))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.documents.iter().all(|document| document.concepts.is_empty())
    }
}
