//! TalentBuildReport - validated build handed back to Python
//!
//! Holds a `BuildSummary` in Rust memory; the bot reads the pieces it needs
//! for its confirmation reply through getters.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::BuildSummary;

/// Render a validated build as the multi-line text used in chat replies
pub fn render_summary(summary: &BuildSummary) -> String {
    let mut lines = Vec::with_capacity(summary.tree_points.len() + summary.talents.len() + 2);
    lines.push(format!(
        "Level {} {} ({}) - {}/{} points spent",
        summary.level,
        summary.class_name,
        summary.distribution(),
        summary.points_spent,
        summary.points_available
    ));

    for (tree, points) in &summary.tree_points {
        if *points == 0 {
            continue;
        }
        lines.push(format!("{} ({})", tree, points));
        for talent in summary.talents.iter().filter(|t| &t.tree == tree) {
            lines.push(format!("  {} {}", talent.name, talent.ranks));
        }
    }

    match summary.points_remaining() {
        0 => {}
        1 => lines.push("1 point unspent".to_string()),
        n => lines.push(format!("{} points unspent", n)),
    }

    lines.join("\n")
}

/// A talent build that passed validation
#[pyclass(frozen)]
#[derive(Debug)]
pub struct TalentBuildReport {
    summary: BuildSummary,
}

impl TalentBuildReport {
    pub fn new(summary: BuildSummary) -> Self {
        Self { summary }
    }

    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }
}

#[pymethods]
impl TalentBuildReport {
    #[getter]
    fn class_name(&self) -> &str {
        &self.summary.class_name
    }

    #[getter]
    fn level(&self) -> u32 {
        self.summary.level
    }

    #[getter]
    fn points_available(&self) -> u32 {
        self.summary.points_available
    }

    #[getter]
    fn points_spent(&self) -> u32 {
        self.summary.points_spent
    }

    #[getter]
    fn points_remaining(&self) -> u32 {
        self.summary.points_remaining()
    }

    /// Points per tree, e.g. "31/20/0"
    #[getter]
    fn distribution(&self) -> String {
        self.summary.distribution()
    }

    /// Points per tree as {tree: points}, in tree order
    fn tree_points<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (tree, points) in &self.summary.tree_points {
            dict.set_item(tree, *points)?;
        }
        Ok(dict)
    }

    /// Chosen talents as [(name, tree, ranks)], in allocation order
    fn talents<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        let items: Vec<(&str, &str, u32)> = self
            .summary
            .talents
            .iter()
            .map(|t| (t.name.as_str(), t.tree.as_str(), t.ranks))
            .collect();
        PyList::new(py, items)
    }

    /// Multi-line text for the confirmation reply
    fn render(&self) -> String {
        render_summary(&self.summary)
    }

    fn __repr__(&self) -> String {
        format!(
            "TalentBuildReport(class_name={:?}, level={}, distribution={:?})",
            self.summary.class_name,
            self.summary.level,
            self.summary.distribution()
        )
    }
}
