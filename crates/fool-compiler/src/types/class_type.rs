//! Class layouts.

use std::fmt;
use std::rc::Rc;

use super::{ArrowType, Type};

/// The member layout of a class.
///
/// `fields[i]` is the field at virtual-table offset `-(i + 1)`;
/// `methods[i]` is the method at offset `i`. A subclass starts from a copy
/// of its superclass layout, so inherited members keep their slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassType {
    pub fields: Vec<Type>,
    pub methods: Vec<Rc<ArrowType>>,
}

impl ClassType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index into `fields` for a (negative) field offset.
    pub fn field_index(offset: i32) -> Option<usize> {
        usize::try_from(-offset - 1).ok()
    }

    /// Type of the field stored at `offset`.
    pub fn field_at(&self, offset: i32) -> Option<&Type> {
        Self::field_index(offset).and_then(|i| self.fields.get(i))
    }

    /// Shape of the method stored at `offset`.
    pub fn method_at(&self, offset: i32) -> Option<&Rc<ArrowType>> {
        usize::try_from(offset).ok().and_then(|i| self.methods.get(i))
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("class {")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str(" | ")?;
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{method}")?;
        }
        f.write_str("}")
    }
}
