//! The class catalog: a forest of chain tables, one per inheritance lineage.
//!
//! Entry 0 of every table is a class without a declared parent. Each later
//! entry was appended because its parent already lived in that table, and
//! records the parent's index so lookups can follow the real parent chain.

use super::types::Type;

/// A named, typed slot: field, parameter or local variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub ty: Type,
}

impl Binding {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub ty: Type,
    /// The main class's `String[]` argument, modelled as a field but never laid out
    pub synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Binding>,
    pub locals: Vec<Binding>,
    /// Index of the owning class within its chain table
    pub owner: usize,
}

impl MethodEntry {
    pub fn param(&self, name: &str) -> Option<&Binding> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn local(&self, name: &str) -> Option<&Binding> {
        self.locals.iter().find(|l| l.name == name)
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|p| &p.ty)
    }
}

#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: String,
    /// Own fields in declaration order
    pub fields: Vec<FieldEntry>,
    pub methods: Vec<MethodEntry>,
    pub parent: Option<usize>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            parent: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// One inheritance lineage, in registration order
#[derive(Debug, Clone, Default)]
pub struct ChainTable {
    pub entries: Vec<ClassEntry>,
}

/// Position of a class: which table, and which entry inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassId {
    pub table: usize,
    pub index: usize,
}

/// All chain tables of one compiled unit
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Vec<ChainTable>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[ChainTable] {
        &self.tables
    }

    pub fn class_count(&self) -> usize {
        self.tables.iter().map(|t| t.entries.len()).sum()
    }

    /// Linear scan across every table
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.tables.iter().enumerate().find_map(|(table, chain)| {
            chain
                .entries
                .iter()
                .position(|entry| entry.name == name)
                .map(|index| ClassId { table, index })
        })
    }

    pub fn class(&self, id: ClassId) -> &ClassEntry {
        &self.tables[id.table].entries[id.index]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassEntry {
        &mut self.tables[id.table].entries[id.index]
    }

    /// Start a new table with `entry` as its root
    pub fn open_table(&mut self, entry: ClassEntry) -> ClassId {
        self.tables.push(ChainTable {
            entries: vec![ClassEntry {
                parent: None,
                ..entry
            }],
        });
        ClassId {
            table: self.tables.len() - 1,
            index: 0,
        }
    }

    /// Append `entry` to the table of `parent`
    pub fn append(&mut self, parent: ClassId, entry: ClassEntry) -> ClassId {
        let chain = &mut self.tables[parent.table];
        chain.entries.push(ClassEntry {
            parent: Some(parent.index),
            ..entry
        });
        ClassId {
            table: parent.table,
            index: chain.entries.len() - 1,
        }
    }

    /// `id` itself, then each parent up to the table root
    pub fn lineage(&self, id: ClassId) -> Lineage<'_> {
        Lineage {
            catalog: self,
            next: Some(id),
        }
    }

    /// Nearest definition of `name` at `id` or above it
    pub fn find_method(&self, id: ClassId, name: &str) -> Option<&MethodEntry> {
        self.lineage(id)
            .find_map(|class| self.class(class).method(name))
    }

    /// Nearest definition of `name` strictly above `id`
    pub fn find_inherited_method(&self, id: ClassId, name: &str) -> Option<&MethodEntry> {
        self.lineage(id)
            .skip(1)
            .find_map(|class| self.class(class).method(name))
    }

    /// True when `class` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.lineage(class).any(|id| id == ancestor)
    }
}

/// Iterator over a class and its ancestors, nearest first
pub struct Lineage<'a> {
    catalog: &'a Catalog,
    next: Option<ClassId>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self
            .catalog
            .class(current)
            .parent
            .map(|index| ClassId {
                table: current.table,
                index,
            });
        Some(current)
    }
}
