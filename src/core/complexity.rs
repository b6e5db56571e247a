// src/core/complexity.rs
use tree_sitter::Node;

use super::languages::for_each_descendant;

/// Syntax node kinds that add to the cyclomatic-style score
#[derive(Debug, Clone, Copy)]
pub struct ComplexityRules {
    /// Branch, loop and handler constructs (+1 each)
    pub decision_kinds: &'static [&'static str],
    /// Binary boolean expression kind (`a and b`)
    pub boolean_kind: &'static str,
    /// Field holding the boolean operator token
    pub operator_field: &'static str,
}

pub const PYTHON_RULES: ComplexityRules = ComplexityRules {
    decision_kinds: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "except_group_clause",
    ],
    boolean_kind: "boolean_operator",
    operator_field: "operator",
};

/// Score a whole file: 1 + decision constructs + boolean expressions.
///
/// The score covers every construct in the file, not just one function body;
/// the analyzer hands the same value to every function in that file.
/// A run of the same operator (`a and b and c`) is one boolean expression.
pub fn file_complexity(root: Node, rules: &ComplexityRules) -> u32 {
    let mut complexity = 1;

    for_each_descendant(root, |node| {
        let kind = node.kind();
        if rules.decision_kinds.contains(&kind) {
            complexity += 1;
        } else if kind == rules.boolean_kind && !continues_boolean_run(node, rules) {
            complexity += 1;
        }
    });

    complexity
}

/// True when `node` is an operand of a parent boolean with the same operator.
fn continues_boolean_run(node: Node, rules: &ComplexityRules) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if parent.kind() != rules.boolean_kind {
        return false;
    }
    let operator = |n: Node| n.child_by_field_name(rules.operator_field).map(|op| op.kind().to_string());
    operator(parent) == operator(node)
}
