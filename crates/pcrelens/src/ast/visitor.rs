//! The AST visitor framework (`spec.md` §4.4).
//!
//! `Visitor<T>` is polymorphic over a return type `T` and has one method per
//! node variant, mirroring the "double-dispatch visitor with a return type"
//! REDESIGN FLAG in §9: in a sum-type language this collapses to exhaustive
//! pattern matching in [`dispatch`], so no separate `accept()` method needs
//! generating per node type the way an OO double-dispatch visitor would.
//!
//! A concrete visitor overrides only the node kinds it cares about; anything
//! it doesn't override falls back to [`Visitor::default_return`]. Overriding
//! a `visit_*` method does **not** automatically traverse children — call
//! the matching `walk_*` helper to continue recursion, exactly as the
//! teacher's `plotnik-lib::query::visitor` documents for its own
//! `Visitor`/`walk_*` pair.

use super::{Ast, ConditionKind, Node, NodeId};

/// One method per AST node kind, each returning `T`.
pub trait Visitor<T> {
    fn default_return(&self) -> T;

    fn visit_regex(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        walk_regex(self, ast, id)
    }
    fn visit_sequence(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_sequence(self, ast, id)
    }
    fn visit_alternation(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_alternation(self, ast, id)
    }
    fn visit_group(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_group(self, ast, id)
    }
    fn visit_quantifier(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_quantifier(self, ast, id)
    }
    fn visit_conditional(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_conditional(self, ast, id)
    }
    fn visit_define(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_define(self, ast, id)
    }
    fn visit_comment(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_literal(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_char_literal(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_char_type(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_dot(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_anchor(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_assertion(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_keep(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_backref(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_subroutine(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_pcre_verb(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_callout(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_limit_match(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_script_run(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_script_run(self, ast, id)
    }
    fn visit_version_condition(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_char_class(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_char_class(self, ast, id)
    }
    fn visit_range(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_range(self, ast, id)
    }
    fn visit_class_operation(&mut self, ast: &Ast, id: NodeId) -> T {
        walk_class_operation(self, ast, id)
    }
    fn visit_posix_class(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
    fn visit_unicode_prop(&mut self, ast: &Ast, id: NodeId) -> T {
        let _ = (ast, id);
        self.default_return()
    }
}

/// Double dispatch: matches on the node's variant and calls the
/// corresponding `visit_*` method.
pub fn dispatch<T>(ast: &Ast, id: NodeId, visitor: &mut dyn Visitor<T>) -> T {
    match ast.get(id) {
        Node::Regex { .. } => visitor.visit_regex(ast, id),
        Node::Sequence { .. } => visitor.visit_sequence(ast, id),
        Node::Alternation { .. } => visitor.visit_alternation(ast, id),
        Node::Group { .. } => visitor.visit_group(ast, id),
        Node::Quantifier { .. } => visitor.visit_quantifier(ast, id),
        Node::Conditional { .. } => visitor.visit_conditional(ast, id),
        Node::Define { .. } => visitor.visit_define(ast, id),
        Node::Comment { .. } => visitor.visit_comment(ast, id),
        Node::Literal { .. } => visitor.visit_literal(ast, id),
        Node::CharLiteral { .. } => visitor.visit_char_literal(ast, id),
        Node::CharType { .. } => visitor.visit_char_type(ast, id),
        Node::Dot { .. } => visitor.visit_dot(ast, id),
        Node::Anchor { .. } => visitor.visit_anchor(ast, id),
        Node::Assertion { .. } => visitor.visit_assertion(ast, id),
        Node::Keep { .. } => visitor.visit_keep(ast, id),
        Node::Backref { .. } => visitor.visit_backref(ast, id),
        Node::Subroutine { .. } => visitor.visit_subroutine(ast, id),
        Node::PcreVerb { .. } => visitor.visit_pcre_verb(ast, id),
        Node::Callout { .. } => visitor.visit_callout(ast, id),
        Node::LimitMatch { .. } => visitor.visit_limit_match(ast, id),
        Node::ScriptRun { .. } => visitor.visit_script_run(ast, id),
        Node::VersionCondition { .. } => visitor.visit_version_condition(ast, id),
        Node::CharClass { .. } => visitor.visit_char_class(ast, id),
        Node::Range { .. } => visitor.visit_range(ast, id),
        Node::ClassOperation { .. } => visitor.visit_class_operation(ast, id),
        Node::PosixClass { .. } => visitor.visit_posix_class(ast, id),
        Node::UnicodeProp { .. } => visitor.visit_unicode_prop(ast, id),
    }
}

fn child<T>(ast: &Ast, visitor: &mut dyn Visitor<T>, id: NodeId) -> T {
    dispatch(ast, id, visitor)
}

/// Walks into `pattern`; the last-computed child result is returned.
pub fn walk_regex<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Regex { pattern, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *pattern)
}

/// Sequence children in source order (§4.4's stable iteration order).
pub fn walk_sequence<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Sequence { children, .. } = ast.get(id) else {
        unreachable!()
    };
    let mut last = visitor.default_return();
    for &c in children {
        last = child(ast, visitor, c);
    }
    last
}

/// Alternatives in definition order.
pub fn walk_alternation<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Alternation { alternatives, .. } = ast.get(id) else {
        unreachable!()
    };
    let mut last = visitor.default_return();
    for &a in alternatives {
        last = child(ast, visitor, a);
    }
    last
}

pub fn walk_group<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Group { child: c, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *c)
}

pub fn walk_quantifier<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Quantifier { target, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *target)
}

/// Condition (if it's an inline assertion), then yes-branch, then
/// no-branch, matching source order.
pub fn walk_conditional<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Conditional {
        condition,
        yes_branch,
        no_branch,
        ..
    } = ast.get(id)
    else {
        unreachable!()
    };
    match condition {
        ConditionKind::Assertion(cond_id) | ConditionKind::Version(cond_id) => {
            child(ast, visitor, *cond_id);
        }
        _ => {}
    }
    let mut last = child(ast, visitor, *yes_branch);
    if let Some(no) = no_branch {
        last = child(ast, visitor, *no);
    }
    last
}

pub fn walk_define<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Define { content, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *content)
}

pub fn walk_script_run<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::ScriptRun { child: c, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *c)
}

pub fn walk_char_class<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::CharClass { inner, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *inner)
}

/// Start, then end (§4.4: "range start-then-end").
pub fn walk_range<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::Range { start, end, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *start);
    child(ast, visitor, *end)
}

/// Left, then right (§4.4: "class-operation left-then-right").
pub fn walk_class_operation<T>(visitor: &mut dyn Visitor<T>, ast: &Ast, id: NodeId) -> T {
    let Node::ClassOperation { left, right, .. } = ast.get(id) else {
        unreachable!()
    };
    child(ast, visitor, *left);
    child(ast, visitor, *right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, Node};
    use crate::span::ByteSpan;

    /// Counts how many `Literal` nodes are reachable from a given root.
    struct CountLiterals(u32);

    impl Visitor<u32> for CountLiterals {
        fn default_return(&self) -> u32 {
            self.0
        }

        fn visit_literal(&mut self, _ast: &Ast, _id: NodeId) -> u32 {
            self.0 += 1;
            self.0
        }
    }

    #[test]
    fn default_visitor_does_not_auto_recurse_without_walk_call() {
        // visit_sequence's default impl calls walk_sequence, so overriding
        // visit_literal alone and leaving everything else as default still
        // visits every literal child.
        let mut b = AstBuilder::new();
        let l1 = b.push(Node::Literal {
            span: ByteSpan::new(0, 1),
            bytes: vec![b'a'],
        });
        let l2 = b.push(Node::Literal {
            span: ByteSpan::new(1, 2),
            bytes: vec![b'b'],
        });
        let seq = b.push(Node::Sequence {
            span: ByteSpan::new(0, 2),
            children: vec![l1, l2],
        });
        let ast = b.finish(seq);

        let mut counter = CountLiterals(0);
        ast.accept(seq, &mut counter);
        assert_eq!(counter.0, 2);
    }
}
