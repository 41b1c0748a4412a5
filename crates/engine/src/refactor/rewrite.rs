//! In-memory rename of step occurrences.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stepwright_types::{ConceptDictionary, Specification, Step};
use tracing::debug;

use super::order::OrderMap;

/// What the document rewrite touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    /// One entry per specification, in input order.
    pub specs_changed: IndexMap<PathBuf, bool>,
    /// One entry per concept document, in dictionary order.
    pub concept_files_changed: IndexMap<PathBuf, bool>,
    /// A concept's own header phrase was renamed.
    pub concept_renamed: bool,
    pub warnings: Vec<String>,
}

impl RenameOutcome {
    pub fn changed_specs(&self) -> impl Iterator<Item = &PathBuf> {
        self.specs_changed.iter().filter(|(_, changed)| **changed).map(|(file, _)| file)
    }

    pub fn changed_concept_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.concept_files_changed
            .iter()
            .filter(|(_, changed)| **changed)
            .map(|(file, _)| file)
    }
}

/// Renames single occurrences of `old` to `new`.
#[derive(Debug, Clone, Copy)]
pub struct StepRenamer<'a> {
    old: &'a Step,
    new: &'a Step,
    order: &'a OrderMap,
}

impl<'a> StepRenamer<'a> {
    pub fn new(old: &'a Step, new: &'a Step, order: &'a OrderMap) -> Self {
        Self { old, new, order }
    }

    /// Rename `step` if it has the old signature. Returns whether it changed.
    ///
    /// Each new parameter takes the occurrence's argument at the mapped old
    /// position; unmatched parameters keep the new phrase's own argument.
    pub fn rename(&self, step: &mut Step) -> bool {
        if !step.same_signature(self.old) {
            return false;
        }
        let args = self
            .new
            .args
            .iter()
            .enumerate()
            .map(|(position, own)| {
                self.order
                    .old_position(position)
                    .and_then(|old_position| step.args.get(old_position))
                    .unwrap_or(own)
                    .clone()
            })
            .collect();
        step.rephrase(self.new, args);
        true
    }
}

/// Rename every matching occurrence across specifications and concepts.
pub fn rename_in_documents(specs: &mut [Specification], dictionary: &mut ConceptDictionary, renamer: &StepRenamer<'_>) -> RenameOutcome {
    let mut outcome = RenameOutcome::default();

    for spec in specs.iter_mut() {
        let file_name = spec.file_name.clone();
        let mut changed = false;
        for step in spec.steps_mut() {
            changed |= rename_noting_tables(renamer, step, &file_name, &mut outcome.warnings);
        }
        debug!(file = %file_name.display(), changed, "visited specification");
        outcome.specs_changed.insert(file_name, changed);
    }

    for document in &mut dictionary.documents {
        let file_name = document.file_name.clone();
        let mut changed = false;
        for concept in &mut document.concepts {
            if renamer.rename(&mut concept.header) {
                outcome.concept_renamed = true;
                changed = true;
            }
            for step in concept.items.iter_mut().filter_map(|item| item.as_step_mut()) {
                changed |= rename_noting_tables(renamer, step, &file_name, &mut outcome.warnings);
            }
        }
        debug!(file = %file_name.display(), changed, "visited concept document");
        let entry = outcome.concept_files_changed.entry(file_name).or_insert(false);
        *entry |= changed;
    }

    outcome
}

/// Rename `step` and warn when it carries an inline table.
fn rename_noting_tables(renamer: &StepRenamer<'_>, step: &mut Step, file_name: &Path, warnings: &mut Vec<String>) -> bool {
    let had_table = step.has_inline_table();
    if !renamer.rename(step) {
        return false;
    }
    if step.has_inline_table() {
        warnings.push(format!(
            "{}:{} step '{}' has an inline table; the table was kept unchanged",
            file_name.display(),
            step.line_no,
            step.line_text
        ));
    } else if had_table {
        warnings.push(format!(
            "{}:{} step '{}' no longer takes a table; its inline table was removed",
            file_name.display(),
            step.line_no,
            step.line_text
        ));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_concept_document, parse_specification, parse_step};

    fn rename(old: &str, new: &str, specs: &mut [Specification], dictionary: &mut ConceptDictionary) -> RenameOutcome {
        let old = parse_step(old, 0).expect("old");
        let new = parse_step(new, 0).expect("new");
        let order = OrderMap::between(&old, &new);
        rename_in_documents(specs, dictionary, &StepRenamer::new(&old, &new, &order))
    }

    fn spec(name: &str, text: &str) -> Specification {
        parse_specification(text, Path::new(name)).0
    }

    #[test]
    fn renames_matching_occurrences_with_their_own_arguments() {
        let mut specs = vec![spec(
            "bank.spec",
            "# Bank\n## Move\n* transfer \"10\" to <savings>\n* transfer <all> to \"cash\"\n",
        )];
        let outcome = rename(
            "transfer <amount> to <account>",
            "move <account> from <amount>",
            &mut specs,
            &mut ConceptDictionary::default(),
        );

        assert_eq!(outcome.specs_changed.get(Path::new("bank.spec")), Some(&true));
        let lines: Vec<String> = specs[0].steps().map(|step| step.line_text.clone()).collect();
        assert_eq!(lines, vec!["move <savings> from \"10\"", "move \"cash\" from <all>"]);
        assert!(specs[0].steps().all(|step| step.value == "move {} from {}"));
    }

    #[test]
    fn substrings_of_other_steps_do_not_match() {
        let mut specs = vec![
            spec("a.spec", "# A\n## S\n* enter <amount> dollars now\n"),
            spec("b.spec", "# B\n## S\n* enter <amount> dollars\n"),
        ];
        let outcome = rename("enter <amount> dollars", "deposit <amount> dollars", &mut specs, &mut ConceptDictionary::default());

        assert_eq!(outcome.changed_specs().collect::<Vec<_>>(), vec![Path::new("b.spec")]);
        assert_eq!(specs[0].steps().next().map(|step| step.line_text.as_str()), Some("enter <amount> dollars now"));
    }

    #[test]
    fn new_parameters_keep_their_own_text() {
        let mut specs = vec![spec("a.spec", "# A\n## S\n* book \"101\"\n")];
        rename("book <room>", "book <room> on <date>", &mut specs, &mut ConceptDictionary::default());
        assert_eq!(specs[0].steps().next().map(|step| step.line_text.as_str()), Some("book \"101\" on <date>"));
    }

    #[test]
    fn concept_headers_set_the_concept_flag() {
        let (defining, _) = parse_concept_document("# login as <user>\n* open page\n", Path::new("login.cpt"));
        let (using, _) = parse_concept_document("# checkout\n* login as \"bob\"\n* pay\n", Path::new("shop.cpt"));
        let mut dictionary = ConceptDictionary {
            documents: vec![defining, using],
        };

        let outcome = rename("login as <user>", "sign in as <user>", &mut [], &mut dictionary);
        assert!(outcome.concept_renamed);
        assert_eq!(outcome.changed_concept_files().count(), 2);
        assert_eq!(dictionary.documents[0].concepts[0].header.line_text, "sign in as <user>");

        let (using, _) = parse_concept_document("# checkout\n* pay now\n", Path::new("shop.cpt"));
        let mut dictionary = ConceptDictionary { documents: vec![using] };
        let outcome = rename("pay now", "settle up", &mut [], &mut dictionary);
        assert!(!outcome.concept_renamed);
        assert_eq!(outcome.concept_files_changed.get(Path::new("shop.cpt")), Some(&true));
    }

    #[test]
    fn inline_tables_are_renamed_as_the_table_argument() {
        let mut specs = vec![spec("a.spec", "# A\n## S\n* add users\n|id|\n|1|\n")];
        let outcome = rename("add users <table>", "create users <table>", &mut specs, &mut ConceptDictionary::default());

        assert_eq!(outcome.specs_changed.get(Path::new("a.spec")), Some(&true));
        let step = specs[0].steps().next().expect("step");
        assert_eq!(step.line_text, "create users");
        assert_eq!(step.value, "create users {}");
        assert_eq!(step.inline_table.as_ref().map(|table| table.rows.len()), Some(1));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("a.spec:3"));
    }

    #[test]
    fn phrases_without_the_table_do_not_match_tabled_steps() {
        let mut specs = vec![spec("a.spec", "# A\n## S\n* add users\n|id|\n|1|\n")];
        let outcome = rename("add users", "create users", &mut specs, &mut ConceptDictionary::default());

        assert_eq!(outcome.specs_changed.get(Path::new("a.spec")), Some(&false));
        assert_eq!(specs[0].steps().next().map(|step| step.line_text.as_str()), Some("add users"));
    }

    #[test]
    fn dropping_the_table_parameter_removes_the_table() {
        let mut specs = vec![spec("a.spec", "# A\n## S\n* add users\n|id|\n|1|\n")];
        let outcome = rename("add users <table>", "create users", &mut specs, &mut ConceptDictionary::default());

        let step = specs[0].steps().next().expect("step");
        assert_eq!(step.value, "create users");
        assert!(!step.has_inline_table());
        assert!(outcome.warnings[0].contains("its inline table was removed"));
    }
}
