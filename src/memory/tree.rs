use core::fmt::Write as _;

use serde::Serialize;

use super::MemoryRange;

/// An evaluated estimation: a named range plus the components it sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryTree {
    description: String,
    range: MemoryRange,
    components: Vec<MemoryTree>,
}

impl MemoryTree {
    pub(crate) fn leaf(description: String, range: MemoryRange) -> Self {
        Self {
            description,
            range,
            components: Vec::new(),
        }
    }

    pub(crate) fn node(description: String, components: Vec<MemoryTree>) -> Self {
        let range = components.iter().map(|c| c.range).sum();
        Self {
            description,
            range,
            components,
        }
    }

    /// Name of the estimated component.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total range of this subtree.
    pub fn range(&self) -> MemoryRange {
        self.range
    }

    /// Direct children.
    pub fn components(&self) -> &[MemoryTree] {
        &self.components
    }

    /// Finds a direct child by description.
    pub fn component(&self, description: &str) -> Option<&MemoryTree> {
        self.components
            .iter()
            .find(|c| c.description == description)
    }

    /// Renders the tree, one component per line, indented by depth.
    ///
    /// ```text
    /// k-core decomposition: [1 MiB ... 3 MiB]
    /// |-- degree tracker: 391 KiB
    /// |-- core values: 391 KiB
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push_str(&"    ".repeat(depth - 1));
            out.push_str("|-- ");
        }
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}: {}", self.description, self.range);
        for component in &self.components {
            component.render_into(out, depth + 1);
        }
    }
}
