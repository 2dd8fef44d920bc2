//! Field and method offsets, computed once the unit type-checks.
//!
//! Offsets are counted per chain table, not per class: a derived class
//! continues where the classes before it in the table stopped. A method
//! name that already has a slot from an earlier entry gets no new one.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use super::catalog::{Catalog, ChainTable};

/// Size of one method slot
pub const METHOD_SLOT_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub name: String,
    /// Own fields in declaration order
    pub fields: Vec<Slot>,
    /// Only methods that introduce a new slot
    pub methods: Vec<Slot>,
}

impl ClassLayout {
    pub fn field_offset(&self, name: &str) -> Option<usize> {
        find(&self.fields, name)
    }

    pub fn method_offset(&self, name: &str) -> Option<usize> {
        find(&self.methods, name)
    }
}

fn find(slots: &[Slot], name: &str) -> Option<usize> {
    slots.iter().find(|s| s.name == name).map(|s| s.offset)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLayout {
    pub classes: Vec<ClassLayout>,
}

/// Offsets for every chain table of a unit, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub tables: Vec<TableLayout>,
}

impl LayoutReport {
    pub fn compute(catalog: &Catalog) -> Self {
        let tables = catalog.tables().iter().map(layout_table).collect();
        Self { tables }
    }

    pub fn class(&self, name: &str) -> Option<&ClassLayout> {
        self.tables
            .iter()
            .flat_map(|t| t.classes.iter())
            .find(|c| c.name == name)
    }

    /// Every `Class.member : offset` line, fields before methods for each class
    pub fn entries(&self) -> Vec<String> {
        self.tables
            .iter()
            .flat_map(|t| t.classes.iter())
            .flat_map(|class| {
                class
                    .fields
                    .iter()
                    .chain(class.methods.iter())
                    .map(move |slot| format!("{}.{} : {}", class.name, slot.name, slot.offset))
            })
            .collect()
    }
}

fn layout_table(table: &ChainTable) -> TableLayout {
    let mut field_offset = 0;
    let mut method_offset = 0;
    let mut slotted: HashSet<&str> = HashSet::new();
    let mut classes = Vec::with_capacity(table.entries.len());

    for entry in &table.entries {
        let mut fields = Vec::new();
        for field in entry.fields.iter().filter(|f| !f.synthetic) {
            fields.push(Slot {
                name: field.name.clone(),
                offset: field_offset,
            });
            field_offset += field.ty.size();
        }

        let mut methods = Vec::new();
        for method in &entry.methods {
            if !slotted.insert(method.name.as_str()) {
                continue;
            }
            methods.push(Slot {
                name: method.name.clone(),
                offset: method_offset,
            });
            method_offset += METHOD_SLOT_SIZE;
        }

        debug!(
            class = %entry.name,
            fields = fields.len(),
            new_methods = methods.len(),
            next_field_offset = field_offset,
            next_method_offset = method_offset,
            "class laid out"
        );
        classes.push(ClassLayout {
            name: entry.name.clone(),
            fields,
            methods,
        });
    }

    TableLayout { classes }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, table) in self.tables.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for class in &table.classes {
                writeln!(f, "--- Class {} ---", class.name)?;
                writeln!(f, "--- Variables ---")?;
                for slot in &class.fields {
                    writeln!(f, "{}.{} : {}", class.name, slot.name, slot.offset)?;
                }
                writeln!(f, "--- Methods ---")?;
                for slot in &class.methods {
                    writeln!(f, "{}.{} : {}", class.name, slot.name, slot.offset)?;
                }
            }
        }
        Ok(())
    }
}
