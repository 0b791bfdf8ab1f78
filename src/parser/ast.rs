// AST (Abstract Syntax Tree) definitions for the expression language

use super::lexer::{Token, TokenKind};

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Byte offset into the source text
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Location of the first character of a source text
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Compute the location of a byte offset by walking the source from its start.
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn of_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self::new(offset, line, column)
    }
}

/// A node of the binary expression tree.
///
/// Leaves hold an identifier or constant. Interior nodes hold the operator
/// (or `;` sequence separator) that joins exactly two subtrees; the pair
/// representation makes a one-child node unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub value: String,
    pub kind: TokenKind,
    pub location: SourceLocation,
    children: Option<Box<(AstNode, AstNode)>>,
}

impl AstNode {
    /// Leaf built from a constant or identifier token
    pub fn leaf(token: &Token) -> Self {
        AstNode {
            value: token.text.clone(),
            kind: token.kind,
            location: token.location,
            children: None,
        }
    }

    /// Binary node built from the joining token and its two operands
    pub fn binary(op: &Token, left: AstNode, right: AstNode) -> Self {
        AstNode {
            value: op.text.clone(),
            kind: op.kind,
            location: op.location,
            children: Some(Box::new((left, right))),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The `(left, right)` pair, or `None` for a leaf
    pub fn children(&self) -> Option<(&AstNode, &AstNode)> {
        self.children.as_deref().map(|(l, r)| (l, r))
    }

    pub fn left(&self) -> Option<&AstNode> {
        self.children().map(|(l, _)| l)
    }

    pub fn right(&self) -> Option<&AstNode> {
        self.children().map(|(_, r)| r)
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        match self.children() {
            Some((l, r)) => 1 + l.node_count() + r.node_count(),
            None => 1,
        }
    }

    /// Height of this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((l, r)) => 1 + l.depth().max(r.depth()),
            None => 1,
        }
    }

    /// Structural equality: same values, kinds, and shape, locations ignored
    pub fn same_shape(&self, other: &AstNode) -> bool {
        if self.value != other.value || self.kind != other.kind {
            return false;
        }
        match (self.children(), other.children()) {
            (Some((l1, r1)), Some((l2, r2))) => l1.same_shape(l2) && r1.same_shape(r2),
            (None, None) => true,
            _ => false,
        }
    }

    /// Visit nodes depth-first, parents before children, with their depth
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AstNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a AstNode, usize)) {
        visit(self, depth);
        if let Some((l, r)) = self.children() {
            l.walk_at(depth + 1, visit);
            r.walk_at(depth + 1, visit);
        }
    }
}
