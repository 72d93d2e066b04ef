//! Subtyping relations over semantic types.
//!
//! The only state is the child-to-parent class map, filled in by the type
//! checker as it meets inheriting classes. It belongs to a
//! [`CompilationSession`](crate::CompilationSession) and must be cleared
//! between unrelated compilations.
//!
//! ## Rules
//!
//! - `bool <: int`, `bool <: bool`, `int <: int`
//! - `null <: C` for every class reference `C`
//! - `C <: D` when `D` is `C` or one of its ancestors
//! - two functions (or two methods) are related when the first is a valid
//!   override of the second, see [`TypeRelations::is_method_override`]

use rustc_hash::FxHashMap;

use crate::types::{ArrowType, Type};

/// The class hierarchy and the relations derived from it.
#[derive(Debug, Default, Clone)]
pub struct TypeRelations {
    /// Class name -> immediate superclass name.
    parents: FxHashMap<String, String>,
}

impl TypeRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` extends `parent`.
    pub fn register_parent(&mut self, child: &str, parent: &str) {
        log::trace!("{child} extends {parent}");
        self.parents.insert(child.to_string(), parent.to_string());
    }

    /// Immediate superclass of `class`, if any was registered.
    pub fn parent_of(&self, class: &str) -> Option<&str> {
        self.parents.get(class).map(String::as_str)
    }

    /// `class` followed by its ancestors, nearest first.
    pub fn ancestors<'a>(&'a self, class: &'a str) -> Ancestors<'a> {
        Ancestors {
            rels: self,
            next: Some(class),
            steps: 0,
        }
    }

    /// Forget every registered class.
    pub fn clear(&mut self) {
        self.parents.clear();
    }

    /// Whether `sub` can be used where `sup` is expected.
    pub fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        match (sub, sup) {
            (Type::Bool, Type::Int | Type::Bool) | (Type::Int, Type::Int) => true,
            (Type::Empty, Type::Ref(_)) => true,
            (Type::Arrow(a), Type::Arrow(b)) | (Type::Method(a), Type::Method(b)) => {
                self.is_method_override(a, b)
            }
            (Type::Ref(a), Type::Ref(b)) => self.ancestors(a).any(|ancestor| ancestor == &**b),
            _ => false,
        }
    }

    /// `is_subtype` with the arguments swapped.
    pub fn is_supertype(&self, sup: &Type, sub: &Type) -> bool {
        self.is_subtype(sub, sup)
    }

    /// Whether `overriding` may replace `overridden` in a subclass.
    ///
    /// Requires equal arity and a covariant return type. Each parameter of
    /// the overriding shape is compared against the *return type* of the
    /// overridden one, not against the matching parameter.
    pub fn is_method_override(&self, overriding: &ArrowType, overridden: &ArrowType) -> bool {
        overriding.arity() == overridden.arity()
            && self.is_subtype(&overriding.ret, &overridden.ret)
            && overriding
                .params
                .iter()
                .all(|param| self.is_subtype(param, &overridden.ret))
    }

    /// The most specific type both `a` and `b` are subtypes of.
    ///
    /// If one already is a subtype of the other the more general one is
    /// returned. Otherwise the ancestors of `a` are searched, nearest first,
    /// for one that `b` is a subtype of.
    pub fn lowest_common_ancestor(&self, a: &Type, b: &Type) -> Option<Type> {
        if self.is_subtype(a, b) {
            return Some(b.clone());
        }
        if self.is_subtype(b, a) {
            return Some(a.clone());
        }
        let class = a.class_name()?;
        self.ancestors(class)
            .map(Type::reference)
            .find(|ancestor| self.is_subtype(b, ancestor))
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestors<'a> {
    rels: &'a TypeRelations,
    next: Option<&'a str>,
    steps: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.next?;
        // A cycle can only come from a malformed hierarchy; stop once every
        // registered class has been visited.
        self.steps += 1;
        self.next = if self.steps > self.rels.parents.len() {
            None
        } else {
            self.rels.parent_of(current)
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy() -> TypeRelations {
        // C extends B extends A; D extends A
        let mut rels = TypeRelations::new();
        rels.register_parent("B", "A");
        rels.register_parent("C", "B");
        rels.register_parent("D", "A");
        rels
    }

    #[test]
    fn primitive_subtyping() {
        let rels = TypeRelations::new();
        assert!(rels.is_subtype(&Type::Int, &Type::Int));
        assert!(rels.is_subtype(&Type::Bool, &Type::Bool));
        assert!(rels.is_subtype(&Type::Bool, &Type::Int));
        assert!(!rels.is_subtype(&Type::Int, &Type::Bool));
        assert!(rels.is_supertype(&Type::Int, &Type::Bool));
    }

    #[test]
    fn null_is_subtype_of_references_only() {
        let rels = TypeRelations::new();
        assert!(rels.is_subtype(&Type::Empty, &Type::reference("A")));
        assert!(!rels.is_subtype(&Type::Empty, &Type::Int));
        assert!(!rels.is_subtype(&Type::Empty, &Type::Bool));
        assert!(!rels.is_subtype(&Type::Empty, &Type::Empty));
        assert!(!rels.is_subtype(&Type::reference("A"), &Type::Empty));
    }

    #[test]
    fn inheritance_is_transitive() {
        let rels = hierarchy();
        assert!(rels.is_subtype(&Type::reference("C"), &Type::reference("A")));
        assert!(rels.is_subtype(&Type::reference("C"), &Type::reference("B")));
        assert!(rels.is_subtype(&Type::reference("C"), &Type::reference("C")));
        assert!(!rels.is_subtype(&Type::reference("A"), &Type::reference("C")));
        assert!(!rels.is_subtype(&Type::reference("D"), &Type::reference("B")));
    }

    #[test]
    fn ancestors_nearest_first() {
        let rels = hierarchy();
        let chain: Vec<_> = rels.ancestors("C").collect();
        assert_eq!(chain, vec!["C", "B", "A"]);
        assert_eq!(rels.ancestors("Unknown").collect::<Vec<_>>(), vec!["Unknown"]);
    }

    #[test]
    fn ancestors_terminate_on_cycle() {
        let mut rels = TypeRelations::new();
        rels.register_parent("X", "Y");
        rels.register_parent("Y", "X");
        assert!(rels.ancestors("X").count() <= 3);
    }

    #[test]
    fn lowest_common_ancestor() {
        let rels = hierarchy();
        let a = Type::reference("A");
        let b = Type::reference("B");
        let c = Type::reference("C");
        let d = Type::reference("D");

        assert_eq!(rels.lowest_common_ancestor(&c, &b), Some(b.clone()));
        assert_eq!(rels.lowest_common_ancestor(&b, &c), Some(b.clone()));
        assert_eq!(rels.lowest_common_ancestor(&c, &d), Some(a.clone()));
        assert_eq!(rels.lowest_common_ancestor(&Type::Empty, &c), Some(c));
        assert_eq!(rels.lowest_common_ancestor(&Type::Bool, &Type::Int), Some(Type::Int));
        assert_eq!(rels.lowest_common_ancestor(&Type::Int, &a), None);
        assert_eq!(rels.lowest_common_ancestor(&Type::reference("Z"), &a), None);
    }

    #[test]
    fn override_requires_covariant_return() {
        let rels = hierarchy();
        let base = ArrowType::new(vec![], Type::reference("A"));
        let narrower = ArrowType::new(vec![], Type::reference("C"));
        assert!(rels.is_method_override(&narrower, &base));
        assert!(!rels.is_method_override(&base, &narrower));
    }

    #[test]
    fn override_compares_params_with_overridden_return() {
        let rels = TypeRelations::new();
        let base = ArrowType::new(vec![Type::Int], Type::Int);
        // bool <: int (the overridden return type), so this is accepted
        let with_bool = ArrowType::new(vec![Type::Bool], Type::Int);
        assert!(rels.is_method_override(&with_bool, &base));

        let returns_bool = ArrowType::new(vec![Type::Bool], Type::Bool);
        // int param is not a subtype of the overridden return type bool
        let int_param = ArrowType::new(vec![Type::Int], Type::Bool);
        assert!(!rels.is_method_override(&int_param, &returns_bool));
    }

    #[test]
    fn override_rejects_arity_mismatch() {
        let rels = TypeRelations::new();
        let base = ArrowType::new(vec![Type::Int], Type::Int);
        let extra = ArrowType::new(vec![Type::Int, Type::Int], Type::Int);
        let fewer = ArrowType::new(vec![], Type::Int);
        assert!(!rels.is_method_override(&extra, &base));
        assert!(!rels.is_method_override(&fewer, &base));
    }

    #[test]
    fn arrow_subtyping_uses_override_rule() {
        let rels = TypeRelations::new();
        let f = Type::arrow(vec![Type::Bool], Type::Bool);
        let g = Type::arrow(vec![Type::Int], Type::Int);
        assert!(rels.is_subtype(&f, &g));
        assert!(!rels.is_subtype(&Type::method(vec![], Type::Int), &Type::arrow(vec![], Type::Int)));
    }

    #[test]
    fn clear_forgets_hierarchy() {
        let mut rels = hierarchy();
        rels.clear();
        assert_eq!(rels.parent_of("B"), None);
        assert!(!rels.is_subtype(&Type::reference("B"), &Type::reference("A")));
    }
}
