// Typed expression IR (C3) — the output of elaboration and the input to the
// R1CS compiler.

use std::rc::Rc;

use crate::field::Field;

/// Abstract over various memory management strategies; sub-expressions are
/// shared, not deduplicated (see `comp.rs` for the one normalisation pass
/// that is performed, the smart `Seq` constructor).
pub type Node<T> = Rc<T>;

/// An opaque, monotonically-allocated variable identity. Disjoint from `Loc`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub usize);

/// An opaque, monotonically-allocated heap-location identity naming a
/// compound value (array or pair). Disjoint from `Var`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Loc(pub usize);

/// A type in the surface language: `τ ∈ {Unit, Bool, Field, Arr(τ'), Prod(τ₁,τ₂)}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    Unit,
    Bool,
    Field,
    Arr(Node<Ty>),
    Prod(Node<Ty>, Node<Ty>),
}

impl Ty {
    pub fn arr(elem: Ty) -> Ty {
        Ty::Arr(Node::new(elem))
    }

    pub fn prod(a: Ty, b: Ty) -> Ty {
        Ty::Prod(Node::new(a), Node::new(b))
    }

    /// The compound-by-reference invariant applies to exactly these types.
    pub fn is_compound(&self) -> bool {
        matches!(self, Ty::Arr(_) | Ty::Prod(_, _))
    }
}

/// Literal values. Compound values never appear here directly — only as
/// `LocRef`, per the compound-by-reference invariant.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Unit,
    True,
    False,
    FieldConst(Field),
    LocRef(Loc),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    XOr,
    Eq,
    BEq,
}

/// `TExp[τ]`: a tagged tree carrying both its type and its shape. `ty` is
/// the `τ` superscript from `spec.md`'s grammar.
#[derive(Clone, Debug, PartialEq)]
pub struct TExp {
    pub ty: Ty,
    pub node: TExpNode,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TExpNode {
    Val(Value),
    Var(Var),
    Unop(UnOp, Node<TExp>),
    Binop(BinOp, Node<TExp>, Node<TExp>),
    If(Node<TExp>, Node<TExp>, Node<TExp>),
    /// `Assert(var, e)` — asserts `var ≡ e`.
    Assert(Var, Node<TExp>),
    /// Sequencing; the last element is the result value. Never empty — the
    /// smart constructor in `comp.rs` is the only place these are built.
    Seq(Vec<Node<TExp>>),
    Bot,
}

impl TExp {
    pub fn unit() -> TExp {
        TExp { ty: Ty::Unit, node: TExpNode::Val(Value::Unit) }
    }

    pub fn bool_lit(b: bool) -> TExp {
        TExp {
            ty: Ty::Bool,
            node: TExpNode::Val(if b { Value::True } else { Value::False }),
        }
    }

    pub fn field_const(f: Field) -> TExp {
        TExp { ty: Ty::Field, node: TExpNode::Val(Value::FieldConst(f)) }
    }

    pub fn loc_ref(ty: Ty, loc: Loc) -> TExp {
        debug_assert!(ty.is_compound(), "LocRef must carry a compound type");
        TExp { ty, node: TExpNode::Val(Value::LocRef(loc)) }
    }

    pub fn var(ty: Ty, v: Var) -> TExp {
        TExp { ty, node: TExpNode::Var(v) }
    }

    pub fn bot(ty: Ty) -> TExp {
        TExp { ty, node: TExpNode::Bot }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.node, TExpNode::Bot)
    }

    /// The location named by a `Val(LocRef(_))` node of compound type, per
    /// the compound-by-reference invariant. A trailing `Seq` is transparent
    /// here: the value of a `Seq` is its last element (`spec.md` §9,
    /// Sequencing semantics), so a compound value produced alongside
    /// materialization side effects (e.g. `pair`'s component `Assert`s)
    /// still resolves to its `Loc`.
    pub fn loc_of(&self) -> Option<Loc> {
        match &self.node {
            TExpNode::Val(Value::LocRef(l)) => Some(*l),
            TExpNode::Seq(es) => es.last().and_then(|e| e.loc_of()),
            _ => None,
        }
    }

    /// A sub-expression is *pure* iff it is `Val`, `Var`, or a `Unop`/`Binop`
    /// of pure sub-expressions. `Assert`, `If`, and effectful `Seq`s are not.
    pub fn is_pure(&self) -> bool {
        match &self.node {
            TExpNode::Val(_) | TExpNode::Var(_) => true,
            TExpNode::Unop(_, e) => e.is_pure(),
            TExpNode::Binop(_, l, r) => l.is_pure() && r.is_pure(),
            TExpNode::If(_, _, _) | TExpNode::Assert(_, _) | TExpNode::Bot => false,
            TExpNode::Seq(es) => es.iter().all(|e| e.is_pure()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_ref_requires_compound_ty() {
        let l = Loc(0);
        let e = TExp::loc_ref(Ty::arr(Ty::Field), l);
        assert_eq!(e.loc_of(), Some(l));
    }

    #[test]
    fn test_purity() {
        assert!(TExp::unit().is_pure());
        assert!(TExp::bool_lit(true).is_pure());
        assert!(!TExp::bot(Ty::Unit).is_pure());
        let assert_node = TExp {
            ty: Ty::Unit,
            node: TExpNode::Assert(Var(0), Node::new(TExp::bool_lit(true))),
        };
        assert!(!assert_node.is_pure());
    }
}
