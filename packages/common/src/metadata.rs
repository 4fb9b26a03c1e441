use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Student details printed in the document title and the submission-info table.
///
/// All fields are free text; nothing is validated beyond presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub subject: String,
    pub reg_no: String,
    pub group: String,
    pub semester: String,
    pub experiment_no: String,
}

impl Metadata {
    /// Rows of the "Submitted By" table, in display order.
    pub fn info_rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Name", self.name.as_str()),
            ("Registration Number", self.reg_no.as_str()),
            ("Semester", self.semester.as_str()),
            ("Group", self.group.as_str()),
        ]
    }

    /// Document title, e.g. "Operating Systems Experiment 3".
    pub fn title(&self) -> String {
        format!("{} Experiment {}", self.subject, self.experiment_no)
    }
}

/// An ordered list of source files plus who submitted them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Presentation order.
    pub files: Vec<PathBuf>,
    pub metadata: Metadata,
}

impl Submission {
    pub fn new(files: Vec<PathBuf>, metadata: Metadata) -> Self {
        Self { files, metadata }
    }

    /// Swap the file at `index` with its predecessor. Returns `false` if nothing moved.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.files.len() {
            return false;
        }
        self.files.swap(index, index - 1);
        true
    }

    /// Swap the file at `index` with its successor. Returns `false` if nothing moved.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.files.len() {
            return false;
        }
        self.files.swap(index, index + 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission::new(
            vec!["a.py".into(), "b.c".into(), "c.html".into()],
            Metadata::default(),
        )
    }

    #[test]
    fn move_up_swaps_with_previous() {
        let mut s = submission();
        assert!(s.move_up(2));
        assert_eq!(s.files, vec![PathBuf::from("a.py"), "c.html".into(), "b.c".into()]);
    }

    #[test]
    fn moves_at_edges_are_noops() {
        let mut s = submission();
        assert!(!s.move_up(0));
        assert!(!s.move_down(2));
        assert!(!s.move_down(7));
        assert_eq!(s.files[0], PathBuf::from("a.py"));
    }

    #[test]
    fn title_joins_subject_and_experiment() {
        let metadata = Metadata {
            subject: "Data Structures".into(),
            experiment_no: "4".into(),
            ..Default::default()
        };
        assert_eq!(metadata.title(), "Data Structures Experiment 4");
    }
}
